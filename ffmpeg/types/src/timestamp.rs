/*!
    Timestamp type for media timing.
*/

use crate::Rational;

/**
    Presentation timestamp in time_base units.

    This is the raw timestamp value from a stream or codec context. It only
    has meaning together with the time base it was produced in.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    /**
        Rescale this timestamp from one time base to another.

        Rounds to the nearest tick, with halfway cases rounded away from zero,
        which matches how the media library rescales packet timestamps.
    */
    pub fn rescale(self, from: Rational, to: Rational) -> Self {
        let numer = self.0 as i128 * from.num as i128 * to.den as i128;
        let denom = from.den as i128 * to.num as i128;
        if denom == 0 {
            return self;
        }
        let (numer, denom) = if denom < 0 {
            (-numer, -denom)
        } else {
            (numer, denom)
        };
        let half = denom / 2;
        let rounded = if numer >= 0 {
            (numer + half) / denom
        } else {
            (numer - half) / denom
        };
        Self(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

impl From<i64> for Pts {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Pts> for i64 {
    fn from(pts: Pts) -> Self {
        pts.0
    }
}
