use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SOMPI_PER_KAS: u64 = 100_000_000;

// 最小单位 sompi，1 KAS = 10^8 sompi
#[derive(Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
#[serde(transparent)]
pub struct Sompi(u64);

impl Sompi {
    pub const ZERO: Sompi = Sompi(0);

    pub fn new(value: u64) -> Self {
        Sompi(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn to_kas(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.0 as i128, 8).normalize()
    }

    // 展示用，保留一位小数
    pub fn display_kas(&self) -> Decimal {
        self.to_kas()
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn from_kas(kas: Decimal) -> Option<Self> {
        if kas.is_sign_negative() {
            return None;
        }

        kas.checked_mul(Decimal::from(SOMPI_PER_KAS))
            .and_then(|sompi| sompi.trunc().to_u64())
            .map(Sompi)
    }
}

impl From<u64> for Sompi {
    fn from(value: u64) -> Self {
        Sompi(value)
    }
}

impl fmt::Display for Sompi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sompi", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sompi_to_kas() {
        assert_eq!(Sompi::new(150_000_000).to_kas(), dec!(1.5));
        assert_eq!(Sompi::new(1).to_kas(), dec!(0.00000001));
        assert_eq!(Sompi::ZERO.to_kas(), dec!(0));
    }

    #[test]
    fn test_sompi_display_kas() {
        assert_eq!(Sompi::new(1_234_567_890).display_kas(), dec!(12.3));
        assert_eq!(Sompi::new(1_250_000_000).display_kas(), dec!(12.5));
        assert_eq!(Sompi::new(1_225_000_000).display_kas(), dec!(12.3));
    }

    #[test]
    fn test_sompi_from_kas() {
        assert_eq!(Sompi::from_kas(dec!(2.5)), Some(Sompi::new(250_000_000)));
        assert_eq!(Sompi::from_kas(dec!(-1)), None);
        assert_eq!(Sompi::from_kas(Decimal::MAX), None);
        assert_eq!(Sompi::from_kas(dec!(200000000000)), None);
    }
}
