/*!
    Audio output timestamps.
*/

use ffmpeg_types::{Pts, Rational};

/**
    Assigns audio frame timestamps in the encoder time base.

    Each frame starts no earlier than where the previous one ended, so the
    audio stream stays monotonic and gap-free across a change of audio
    source. Frames without a timestamp are placed right after the previous
    frame.
*/
#[derive(Clone, Copy, Debug)]
pub struct AudioTimeline {
    time_base: Rational,
    next: i64,
    frames: u64,
}

impl AudioTimeline {
    /**
        A timeline in `time_base`, normally `1/sample_rate` of the encoder.
    */
    pub fn new(time_base: Rational) -> Self {
        Self {
            time_base,
            next: 0,
            frames: 0,
        }
    }

    /**
        Timestamp for a frame of `samples` samples whose decoded pts is `pts`
        in `source` time base.
    */
    pub fn stamp(&mut self, pts: Option<i64>, source: Rational, samples: usize) -> i64 {
        let candidate = pts.map_or(self.next, |pts| {
            Pts(pts).rescale(source, self.time_base).0
        });
        let stamped = candidate.max(self.next);

        let duration = i64::try_from(samples).unwrap_or(i64::MAX);
        self.next = stamped.saturating_add(duration);
        self.frames += 1;

        stamped
    }

    /// Where the next frame will start at the earliest.
    pub fn next_pts(&self) -> i64 {
        self.next
    }

    /// Number of frames stamped so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: Rational = Rational::per_sample(48000);

    #[test]
    fn passes_through_contiguous_timestamps() {
        let mut timeline = AudioTimeline::new(RATE);
        assert_eq!(timeline.stamp(Some(0), RATE, 1024), 0);
        assert_eq!(timeline.stamp(Some(1024), RATE, 1024), 1024);
        assert_eq!(timeline.stamp(Some(2048), RATE, 1024), 2048);
        assert_eq!(timeline.frames(), 3);
    }

    #[test]
    fn rescales_from_stream_time_base() {
        let mut timeline = AudioTimeline::new(RATE);
        // 1/1000 stream time base, 500ms
        assert_eq!(timeline.stamp(Some(500), Rational::new(1, 1000), 480), 24000);
    }

    #[test]
    fn keeps_gaps_forward() {
        let mut timeline = AudioTimeline::new(RATE);
        timeline.stamp(Some(0), RATE, 1024);
        assert_eq!(timeline.stamp(Some(4800), RATE, 1024), 4800);
    }

    #[test]
    fn overlap_after_source_switch_is_pushed_back() {
        let mut timeline = AudioTimeline::new(RATE);
        for i in 0..4 {
            timeline.stamp(Some(i * 1024), RATE, 1024);
        }
        // New source restarts near zero
        let first = timeline.stamp(Some(0), RATE, 1024);
        let second = timeline.stamp(Some(1024), RATE, 1024);
        assert_eq!(first, 4096);
        assert_eq!(second, 5120);
    }

    #[test]
    fn missing_pts_follows_previous_frame() {
        let mut timeline = AudioTimeline::new(RATE);
        timeline.stamp(Some(100), RATE, 200);
        assert_eq!(timeline.stamp(None, RATE, 50), 300);
        assert_eq!(timeline.next_pts(), 350);
    }

    #[test]
    fn negative_start_is_clamped() {
        let mut timeline = AudioTimeline::new(RATE);
        assert_eq!(timeline.stamp(Some(-512), RATE, 1024), 0);
    }
}
