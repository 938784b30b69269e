use std::{collections::BTreeMap, time::Duration};

/// Write-only diagnostics of a generation run. Generation logic never reads these back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationMetrics {
    /// Wall-clock time per phase, keyed by phase name.
    pub timings: BTreeMap<String, Duration>,
    /// Named histograms, each mapping a bucket label to a count.
    pub histograms: BTreeMap<String, BTreeMap<String, usize>>,
    pub warnings: Vec<String>,
}

impl GenerationMetrics {
    /// Adds `elapsed` to the timing of `phase`.
    pub fn record_timing(&mut self, phase: &str, elapsed: Duration) {
        *self.timings.entry(phase.to_owned()).or_default() += elapsed;
    }

    /// Replaces the histogram `name` with `buckets`.
    pub fn record_histogram<I, K>(&mut self, name: &str, buckets: I)
    where
        I: IntoIterator<Item = (K, usize)>,
        K: Into<String>,
    {
        let histogram = buckets
            .into_iter()
            .map(|(bucket, count)| (bucket.into(), count))
            .collect();
        self.histograms.insert(name.to_owned(), histogram);
    }

    /// Records a non-fatal condition and emits it as a `tracing` warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "mapgen::metrics", warning = %message, "metrics.warning");
        self.warnings.push(message);
    }
}
