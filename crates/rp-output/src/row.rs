//! Plain data row types written by output backends.

use rp_sim::{ArrivalNotice, Direction, VehiclePose};

/// One sampled vehicle pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseRow {
    pub frame:       u64,
    pub sim_secs:    f64,
    pub lon:         f64,
    pub lat:         f64,
    pub heading_deg: f64,
    pub path_index:  u64,
    pub progress:    f64,
    pub reversed:    bool,
    pub dwelling:    bool,
}

impl PoseRow {
    pub fn from_pose(frame: u64, pose: &VehiclePose) -> Self {
        Self {
            frame,
            sim_secs:    pose.sim_secs,
            lon:         pose.position.lon,
            lat:         pose.position.lat,
            heading_deg: pose.heading_deg,
            path_index:  pose.index as u64,
            progress:    pose.progress,
            reversed:    pose.direction == Direction::Reversed,
            dwelling:    pose.dwelling,
        }
    }
}

/// One stop call.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalRow {
    pub frame:            u64,
    pub sim_secs:         f64,
    pub stop_id:          u32,
    pub name:             String,
    pub dwell_secs:       u32,
    pub passengers_in:    u32,
    pub passengers_out:   u32,
    pub is_terminal:      bool,
    pub total_dwell_secs: f64,
}

impl ArrivalRow {
    pub fn from_notice(frame: u64, notice: &ArrivalNotice) -> Self {
        Self {
            frame,
            sim_secs:         notice.total_sim_secs,
            stop_id:          notice.stop.0,
            name:             notice.name.clone(),
            dwell_secs:       notice.dwell_secs,
            passengers_in:    notice.passengers_in,
            passengers_out:   notice.passengers_out,
            is_terminal:      notice.is_terminal,
            total_dwell_secs: notice.total_dwell_secs,
        }
    }
}
