//! Whole-route summary figures.

use rp_core::{LoadProfile, TravelEstimate, format_duration};

use crate::NetworkModel;

/// Aggregate figures over every stop and segment of a network.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RouteStats {
    pub total_distance_km:    f64,
    pub total_stops:          usize,
    pub terminal_stops:       usize,
    /// Mean dwell over all stops; `0` with no stops.
    pub avg_dwell_secs:       f64,
    /// Largest absolute segment gradient.
    pub max_gradient_percent: f64,
    /// Absolute gradient averaged over segments, weighted by length.
    pub avg_gradient_percent: f64,
    /// Tightest segment rating; `None` with no segments.
    pub min_max_units:        Option<u32>,
    /// Driving time summed per segment, plus every stop's dwell once.
    pub estimate:             TravelEstimate,
}

impl RouteStats {
    pub fn compute(model: &NetworkModel) -> Self {
        let total_stops = model.stop_count();
        let terminal_stops = model.stops().filter(|s| s.is_terminal).count();
        let dwell_total: f64 = model.stops().map(|s| f64::from(s.dwell_secs)).sum();
        let avg_dwell_secs = if total_stops == 0 { 0.0 } else { dwell_total / total_stops as f64 };

        let mut total_distance_km = 0.0;
        let mut driving_time_secs = 0.0;
        let mut weighted_gradient = 0.0;
        let mut max_gradient_percent: f64 = 0.0;
        let mut min_max_units: Option<u32> = None;
        for seg in model.segments() {
            let gradient = seg.params.gradient_percent.abs();
            total_distance_km += seg.metrics.distance_km;
            driving_time_secs += seg.metrics.travel_time_secs;
            weighted_gradient += gradient * seg.metrics.distance_km;
            max_gradient_percent = max_gradient_percent.max(gradient);
            min_max_units = Some(min_max_units.map_or(seg.params.max_units, |m| m.min(seg.params.max_units)));
        }
        let avg_gradient_percent =
            if total_distance_km > 0.0 { weighted_gradient / total_distance_km } else { 0.0 };

        let effective_speed_kmh = if driving_time_secs > 0.0 {
            total_distance_km / driving_time_secs * 3_600.0
        } else {
            let load = LoadProfile::new(
                0.0,
                min_max_units.unwrap_or(rp_core::metrics::DEFAULT_MAX_UNITS),
                model.vehicle_units(),
            );
            model.speed_model().effective_speed_kmh(&load)
        };

        Self {
            total_distance_km,
            total_stops,
            terminal_stops,
            avg_dwell_secs,
            max_gradient_percent,
            avg_gradient_percent,
            min_max_units,
            estimate: TravelEstimate {
                distance_km: total_distance_km,
                effective_speed_kmh,
                driving_time_secs,
                dwell_time_secs: dwell_total,
                total_time_secs: driving_time_secs + dwell_total,
            },
        }
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{:.2} km, {} stops ({} terminal), avg dwell {:.0} s, max gradient {}%, \
             avg speed {:.1} km/h, total {}",
            self.total_distance_km,
            self.total_stops,
            self.terminal_stops,
            self.avg_dwell_secs,
            self.max_gradient_percent,
            self.estimate.effective_speed_kmh,
            format_duration(self.estimate.total_time_secs),
        )
    }
}
