// halves go to the even neighbour
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// Coefficient of performance: produced heat per consumed electrical energy.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Cop(pub f64);

impl Cop {
    pub const NONE: Cop = Cop(0.0);

    //zero when nothing was consumed
    pub fn of(produced: f64, used: f64) -> Self {
        if used > 0.0 {
            Cop(round_to(produced / used, 2))
        } else {
            Self::NONE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(0.1 + 0.2, 3), 0.3);
        assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
    }

    #[test]
    fn test_round_to_exact_half_goes_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(0.0625, 3), 0.062);
        assert_eq!(round_to(2.5, 0), 2.0);
    }

    #[test]
    fn test_cop_guarded_against_zero_consumption() {
        assert_eq!(Cop::of(3.0, 0.0), Cop::NONE);
        assert_eq!(Cop::of(3.0, -1.0), Cop::NONE);
        assert_eq!(Cop::of(3.0, 2.0), Cop(1.5));
        assert_eq!(Cop::of(10.0, 3.0), Cop(3.33));
    }

    #[test]
    fn test_cop_tie_rounds_to_even() {
        assert_eq!(Cop::of(1.0, 8.0), Cop(0.12));
        assert_eq!(Cop::of(2.5, 4.0), Cop(0.62));
    }
}
