//! Bitrate budgeting for a single re-encode.
//!
//! `total = bytes * 8 / max(duration, 1)`, then the fixed audio share is
//! taken off and the result is clamped to a quality floor. Going over the
//! byte budget is preferred to producing a sub-floor stream.

use serde::Serialize;

/// Audio target and video floor, in bits per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitrateBudget {
    pub audio_bps: u64,
    pub floor_bps: u64,
}

impl BitrateBudget {
    pub fn new(audio_bps: u64, floor_bps: u64) -> Self {
        Self { audio_bps, floor_bps }
    }

    /// Video bitrate for `target_bytes` spread over `duration_secs`.
    pub fn video_bitrate(&self, target_bytes: u64, duration_secs: f64) -> u64 {
        video_bitrate(target_bytes, duration_secs, self.audio_bps, self.floor_bps)
    }
}

/// Durations that are unknown, zero, negative or NaN count as one second.
pub fn effective_duration(duration_secs: f64) -> f64 {
    if duration_secs.is_finite() && duration_secs > 1.0 {
        duration_secs
    } else {
        1.0
    }
}

/// Pure bitrate formula; see the module docs.
pub fn video_bitrate(target_bytes: u64, duration_secs: f64, audio_bps: u64, floor_bps: u64) -> u64 {
    let total_bps = (target_bytes as f64 * 8.0 / effective_duration(duration_secs)).floor();
    let total_bps = if total_bps >= u64::MAX as f64 {
        u64::MAX
    } else {
        total_bps as u64
    };
    total_bps.saturating_sub(audio_bps).max(floor_bps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MIB;

    const AUDIO: u64 = 96_000;
    const FLOOR: u64 = 200_000;

    #[test]
    fn test_scenario_46mb_over_two_minutes() {
        let bps = video_bitrate(46 * MIB, 120.0, AUDIO, FLOOR);
        // 46 MiB * 8 / 120 s = 3_215_633 b/s total, minus audio
        assert_eq!(bps, 3_215_633 - AUDIO);
    }

    #[test]
    fn test_never_below_floor() {
        for &d in &[0.5, 1.0, 60.0, 3600.0, 36_000.0, 1e9] {
            for &b in &[1u64, 1000, MIB, 46 * MIB] {
                assert!(video_bitrate(b, d, AUDIO, FLOOR) >= FLOOR, "b={} d={}", b, d);
            }
        }
    }

    #[test]
    fn test_long_clip_hits_floor() {
        // 10 hours in 46 MiB is ~10 kb/s total, far below the floor
        assert_eq!(video_bitrate(46 * MIB, 36_000.0, AUDIO, FLOOR), FLOOR);
    }

    #[test]
    fn test_non_positive_duration_behaves_as_one_second() {
        let one = video_bitrate(MIB, 1.0, AUDIO, FLOOR);
        assert_eq!(video_bitrate(MIB, 0.0, AUDIO, FLOOR), one);
        assert_eq!(video_bitrate(MIB, -5.0, AUDIO, FLOOR), one);
        assert_eq!(video_bitrate(MIB, f64::NAN, AUDIO, FLOOR), one);
        assert_eq!(video_bitrate(MIB, 0.25, AUDIO, FLOOR), one);
        assert_eq!(one, MIB * 8 - AUDIO);
    }

    #[test]
    fn test_budget_struct_matches_free_fn() {
        let budget = BitrateBudget::new(AUDIO, FLOOR);
        assert_eq!(budget.video_bitrate(20 * MIB, 95.0), video_bitrate(20 * MIB, 95.0, AUDIO, FLOOR));
    }
}
