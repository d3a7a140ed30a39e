//! Mapping touches on the scrub bar to playback positions.

use crate::state::ScrubGeometry;

/// Where a touch on the scrub bar lands on the media timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekTarget {
    /// Horizontal position along the track, within `[0, 1]`.
    pub fraction: f64,
    /// Playback position in seconds, within `[0, duration]`.
    pub time: f64,
}

/// Converts a horizontal touch offset into a seek target.
///
/// `touch_x` is measured from the left edge of the scrub track. Touches left of the track map to
/// the start and touches right of it map to the end. Returns `None` while either the duration or
/// the track width is still unknown, so that a tap that races media load or the first layout pass
/// does nothing.
pub fn seek_target(touch_x: f64, geometry: ScrubGeometry, duration: f64) -> Option<SeekTarget> {
    if !(duration.is_finite() && duration > 0.0) || !geometry.is_measured() || touch_x.is_nan() {
        return None;
    }
    let fraction = (touch_x / geometry.track_width_px()).clamp(0.0, 1.0);
    // pin the end exactly; `fraction * duration` may land a ulp short or long
    let time = if fraction >= 1.0 {
        duration
    } else {
        (fraction * duration).clamp(0.0, duration)
    };
    Some(SeekTarget { fraction, time })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn quarter_of_track() {
        let target = seek_target(50.0, ScrubGeometry::new(200.0), 100.0).unwrap();
        assert_approx_eq!(f64, target.fraction, 0.25, ulps = 2);
        assert_approx_eq!(f64, target.time, 25.0, ulps = 2);
    }

    #[test]
    fn full_width_is_exactly_the_end() {
        for (width, duration) in [(200.0, 100.0), (333.0, 717.3), (0.7, 1e-3), (1920.0, 5999.99)] {
            let target = seek_target(width, ScrubGeometry::new(width), duration).unwrap();
            assert_eq!(target.fraction, 1.0);
            assert_eq!(target.time, duration);
        }
    }

    #[test]
    fn touches_on_the_track_stay_in_range() {
        let geometry = ScrubGeometry::new(357.0);
        let duration = 611.7;
        for step in 0..=357 {
            let x = step as f64;
            let target = seek_target(x, geometry, duration).unwrap();
            assert!((0.0..=duration).contains(&target.time), "{x} -> {target:?}");
            assert!((0.0..=1.0).contains(&target.fraction), "{x} -> {target:?}");
        }
    }

    #[test]
    fn touches_outside_the_track_clamp() {
        let geometry = ScrubGeometry::new(200.0);
        assert_eq!(seek_target(-30.0, geometry, 80.0).unwrap().time, 0.0);
        assert_eq!(seek_target(900.0, geometry, 80.0).unwrap().time, 80.0);
    }

    #[test]
    fn nothing_to_seek_before_load_or_layout() {
        assert_eq!(seek_target(10.0, ScrubGeometry::new(200.0), 0.0), None);
        assert_eq!(seek_target(10.0, ScrubGeometry::new(200.0), -5.0), None);
        assert_eq!(seek_target(10.0, ScrubGeometry::default(), 100.0), None);
        assert_eq!(seek_target(f64::NAN, ScrubGeometry::new(200.0), 100.0), None);
    }
}
