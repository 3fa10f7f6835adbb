/*!
    Rational number type for time bases and frame rates.
*/

use std::fmt;

/**
    A rational number represented as a numerator and denominator.

    Used for stream time bases (e.g. 1/1000 for Matroska, 1/48000 for audio
    encoders) and frame rates (e.g. 30000/1001).
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    /**
        Create a new rational number.

        # Panics

        Panics if `den` is zero.
    */
    #[inline]
    pub const fn new(num: i32, den: i32) -> Self {
        assert!(den != 0, "denominator cannot be zero");
        Self { num, den }
    }

    /**
        Create a rational number, returning `None` for a zero denominator.

        Container metadata may carry `0/0` for unknown rates, so values read
        from a media library go through this constructor.
    */
    #[inline]
    pub const fn checked(num: i32, den: i32) -> Option<Self> {
        if den == 0 {
            None
        } else {
            Some(Self { num, den })
        }
    }

    /**
        Time base of one sample at the given sample rate.
    */
    #[inline]
    pub const fn per_sample(sample_rate: u32) -> Self {
        Self::new(1, sample_rate as i32)
    }

    /**
        Returns true if both parts are strictly positive.
    */
    #[inline]
    pub const fn is_positive(self) -> bool {
        self.num > 0 && self.den > 0
    }

    /**
        Invert the rational, turning a frame rate into a frame duration.

        # Panics

        Panics if numerator is zero.
    */
    #[inline]
    pub const fn invert(self) -> Self {
        assert!(self.num != 0, "cannot invert zero");
        Self {
            num: self.den,
            den: self.num,
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num, den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "denominator cannot be zero")]
    fn zero_denominator_panics() {
        Rational::new(25, 0);
    }

    #[test]
    fn checked_rejects_zero_denominator() {
        assert_eq!(Rational::checked(0, 0), None);
        assert_eq!(Rational::checked(30000, 1001), Some(Rational::new(30000, 1001)));
    }

    #[test]
    fn per_sample_time_base() {
        let tb = Rational::per_sample(44100);
        assert_eq!(tb, Rational::new(1, 44100));
    }

    #[test]
    fn positivity() {
        assert!(Rational::new(25, 1).is_positive());
        assert!(!Rational::new(0, 1).is_positive());
        assert!(!Rational::new(-1, 25).is_positive());
    }

    #[test]
    fn frame_rate_to_frame_duration() {
        let rate = Rational::new(30000, 1001);
        assert_eq!(rate.invert(), Rational::new(1001, 30000));
    }

    #[test]
    fn display_matches_debug() {
        let tb = Rational::new(1, 1000);
        assert_eq!(format!("{tb}"), "1/1000");
        assert_eq!(format!("{tb:?}"), "1/1000");
    }
}
