//! Frame-driven simulation time.
//!
//! # Design
//!
//! Playback is driven by a stream of frame timestamps (seconds, monotonic,
//! arbitrary origin).  `FrameClock` turns consecutive timestamps into
//! simulated seconds:
//!
//!   sim_delta = (frame_ts - previous_frame_ts) * speed_multiplier
//!
//! The first frame after construction, [`FrameClock::suspend`] or
//! [`FrameClock::reset`] only records its timestamp and yields zero.  That is
//! what makes pause lossless: whatever real time passes while suspended is
//! never fed into the next delta.

use std::fmt;

/// Converts real frame timestamps into simulated elapsed time.
///
/// `FrameClock` is cheap to copy and holds no heap data.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameClock {
    /// Simulated seconds per real second.  Always finite and `> 0`.
    speed_multiplier: f64,
    /// Timestamp of the previous frame; `None` right after start/suspend.
    last_frame_secs:  Option<f64>,
    /// Total simulated seconds handed out since the last reset.
    elapsed_sim_secs: f64,
}

impl FrameClock {
    /// Create a clock.  An invalid multiplier falls back to `1.0`.
    pub fn new(speed_multiplier: f64) -> Self {
        Self {
            speed_multiplier: sanitize_multiplier(speed_multiplier).unwrap_or(1.0),
            last_frame_secs:  None,
            elapsed_sim_secs: 0.0,
        }
    }

    /// Feed the timestamp of a new frame and return the simulated seconds
    /// elapsed since the previous one.
    ///
    /// Timestamps that go backwards yield zero rather than negative time.
    pub fn advance(&mut self, frame_secs: f64) -> f64 {
        let delta_real = match self.last_frame_secs {
            Some(prev) if frame_secs > prev => frame_secs - prev,
            _ => 0.0,
        };
        if frame_secs.is_finite() {
            self.last_frame_secs = Some(frame_secs);
        }
        let delta_sim = delta_real * self.speed_multiplier;
        self.elapsed_sim_secs += delta_sim;
        delta_sim
    }

    /// Forget the previous frame so the next `advance` yields zero.
    #[inline]
    pub fn suspend(&mut self) {
        self.last_frame_secs = None;
    }

    /// Suspend and zero the elapsed counter.  The multiplier is kept.
    pub fn reset(&mut self) {
        self.last_frame_secs  = None;
        self.elapsed_sim_secs = 0.0;
    }

    /// Change the multiplier.  Returns `false` (and changes nothing) for a
    /// non-finite or non-positive value.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> bool {
        match sanitize_multiplier(multiplier) {
            Some(m) => {
                self.speed_multiplier = m;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    #[inline]
    pub fn elapsed_sim_secs(&self) -> f64 {
        self.elapsed_sim_secs
    }

    /// `true` once a frame has been seen since the last start/suspend.
    #[inline]
    pub fn is_primed(&self) -> bool {
        self.last_frame_secs.is_some()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl fmt::Display for FrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.1}s (x{})", self.elapsed_sim_secs, self.speed_multiplier)
    }
}

fn sanitize_multiplier(m: f64) -> Option<f64> {
    (m.is_finite() && m > 0.0).then_some(m)
}
