use std::collections::BTreeMap;

use crate::MapContext;

/// Draw bookkeeping for deterministic replay.
///
/// Every draw made through [`MapContext::random`] bumps the counter of its label before reaching the terrain
/// authority, so a draw is identified by `label` plus its ordinal within that label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RngState {
    pub call_counts: BTreeMap<String, u32>,
    pub seed: Option<u64>,
}

impl RngState {
    /// Number of draws made so far under `label`.
    pub fn count(&self, label: &str) -> u32 {
        self.call_counts.get(label).copied().unwrap_or(0)
    }
}

/// Builds the canonical `"step:op:suffix"` label used by pipeline steps. `suffix` defaults to `rngSeed`.
pub fn random_label(step_id: &str, op_name: &str, suffix: Option<&str>) -> String {
    format!("{step_id}:{op_name}:{}", suffix.unwrap_or("rngSeed"))
}

impl MapContext {
    /// Draws an integer in `[0, max)` from the terrain authority.
    ///
    /// The counter for `label` is incremented first; the authority then receives `"{label}_{ordinal}"`, where
    /// `ordinal` is the number of earlier draws under the same label. A `max` of `0` is treated as `1`.
    pub fn random(&mut self, label: &str, max: u32) -> u32 {
        let max = max.max(1);
        let count = self.rng.call_counts.entry(label.to_owned()).or_insert(0);
        let ordinal = *count;
        *count += 1;
        self.adapter_mut()
            .random_int(max, &format!("{label}_{ordinal}"))
    }
}
