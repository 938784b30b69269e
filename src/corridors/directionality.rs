//! Directionality bias: how well a corridor lines up with the configured plate, wind and current axes.

use glam::DVec2;

use crate::{
    MapContext,
    grid::LineOrientation,
    map_parameters::{DirectionalityConfig, LaneScoring},
};

/// Resolved directionality parameters.
///
/// Axis angles are whole degrees (fractional config values are truncated), `0°` pointing east. The interplay weights
/// are already clamped to `0..=1` and scaled by `cohesion`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Directionality {
    pub cohesion: f64,
    pub plate_axis_deg: f64,
    pub wind_bias_deg: f64,
    /// Wind axis after rotating toward the plate axis.
    pub wind_axis_deg: f64,
    /// Current axis after rotating toward the plate axis, at half the wind's rate.
    pub current_axis_deg: f64,
    pub winds_follow_plates: f64,
    pub currents_follow_winds: f64,
}

impl Directionality {
    pub fn resolve(config: &DirectionalityConfig) -> Self {
        let cohesion = clamp_unit(config.cohesion);
        let plate_axis_deg = config.primary_axes.plate_axis_deg.trunc();
        let wind_bias_deg = config.primary_axes.wind_bias_deg.trunc();
        let current_bias_deg = config.primary_axes.current_bias_deg.trunc();
        let winds_follow_plates = clamp_unit(config.interplay.winds_follow_plates) * cohesion;
        let currents_follow_winds = clamp_unit(config.interplay.currents_follow_winds) * cohesion;

        Self {
            cohesion,
            plate_axis_deg,
            wind_bias_deg,
            wind_axis_deg: wind_bias_deg + (plate_axis_deg * winds_follow_plates).round(),
            current_axis_deg: current_bias_deg
                + (plate_axis_deg * winds_follow_plates * 0.5).round(),
            winds_follow_plates,
            currents_follow_winds,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.cohesion > 0.0
    }

    /// Score bonus of a sea lane running along `orientation`. Zero when cohesion is zero.
    pub fn lane_bias(&self, orientation: LineOrientation, scoring: &LaneScoring) -> i64 {
        if !self.is_enabled() {
            return 0;
        }
        let lane = orientation.direction();
        let wind_alignment = axis_vector(self.wind_axis_deg).dot(lane).abs();
        let current_alignment = axis_vector(self.current_axis_deg).dot(lane).abs();
        let wind_weight = scoring.wind_weight;
        let current_weight =
            scoring.current_weight_base + scoring.current_weight_interplay * self.currents_follow_winds;
        let alignment = (wind_alignment * wind_weight + current_alignment * current_weight)
            / (wind_weight + current_weight);
        (alignment * scoring.bias_scale * self.cohesion).round() as i64
    }

    /// Alignment of `direction` with the raw plate axis and the raw wind bias axis, each in `0..=1`.
    pub fn raw_alignment(&self, direction: DVec2) -> AxisAlignment {
        AxisAlignment {
            plate: axis_vector(self.plate_axis_deg).dot(direction).abs(),
            wind: axis_vector(self.wind_bias_deg).dot(direction).abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAlignment {
    pub plate: f64,
    pub wind: f64,
}

/// Unit vector of a heading in degrees.
pub fn axis_vector(degrees: f64) -> DVec2 {
    DVec2::from_angle(degrees.to_radians())
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

impl MapContext {
    /// Directionality settings in effect: the attached foundation's frozen config when present, otherwise the
    /// context's own config.
    pub fn directionality(&self) -> Directionality {
        let config = match self.foundation() {
            Some(foundation) => &foundation.config().dynamics.directionality,
            None => &self.config.foundation.dynamics.directionality,
        };
        Directionality::resolve(config)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::Directionality;
    use crate::{
        grid::LineOrientation,
        map_parameters::{DirectionalityConfig, Interplay, LaneScoring, PrimaryAxes},
    };

    fn config(cohesion: f64, wind_bias_deg: f64) -> DirectionalityConfig {
        DirectionalityConfig {
            cohesion,
            primary_axes: PrimaryAxes {
                plate_axis_deg: 0.0,
                wind_bias_deg,
                current_bias_deg: wind_bias_deg,
            },
            interplay: Interplay::default(),
        }
    }

    #[test]
    fn zero_cohesion_disables_bias() {
        let directionality = Directionality::resolve(&config(0.0, 0.0));
        for orientation in LineOrientation::ALL {
            assert_eq!(directionality.lane_bias(orientation, &LaneScoring::default()), 0);
        }
    }

    #[test]
    fn aligned_rows_get_the_full_bias() {
        let directionality = Directionality::resolve(&config(1.0, 0.0));
        let scoring = LaneScoring::default();
        assert_eq!(directionality.lane_bias(LineOrientation::Row, &scoring), 25);
        assert_eq!(directionality.lane_bias(LineOrientation::Column, &scoring), 0);
        // cos 45° * 25 = 17.68
        assert_eq!(directionality.lane_bias(LineOrientation::DiagonalSum, &scoring), 18);
    }

    #[test]
    fn wind_rotates_toward_plate_axis() {
        let mut config = config(0.5, 10.0);
        config.primary_axes.plate_axis_deg = 90.0;
        config.interplay.winds_follow_plates = 1.0;
        let directionality = Directionality::resolve(&config);
        assert_eq!(directionality.winds_follow_plates, 0.5);
        assert_eq!(directionality.wind_axis_deg, 10.0 + 45.0);
        assert_eq!(directionality.current_axis_deg, 10.0 + 23.0);
    }

    #[test]
    fn cohesion_is_clamped() {
        assert_eq!(Directionality::resolve(&config(3.0, 0.0)).cohesion, 1.0);
        assert_eq!(Directionality::resolve(&config(-1.0, 0.0)).cohesion, 0.0);
    }

    #[test]
    fn raw_alignment_ignores_interplay() {
        let mut config = config(1.0, 90.0);
        config.interplay.winds_follow_plates = 1.0;
        let alignment = Directionality::resolve(&config).raw_alignment(DVec2::X);
        assert!((alignment.plate - 1.0).abs() < 1e-9);
        assert!(alignment.wind < 1e-9);
    }
}
