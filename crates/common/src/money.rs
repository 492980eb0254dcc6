//! Monetary amounts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Money amount held in minor units (paisa/cents) so sums never drift.
///
/// On the wire it is a plain decimal number with two fractional digits, which
/// is what clients send as `estimatedAmount` and read back as `totalAmount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    minor: i64,
}

impl Money {
    /// Creates an amount from minor units.
    pub fn from_minor(minor: i64) -> Self {
        Self { minor }
    }

    /// Largest major value accepted by [`Money::try_from_major`].
    pub const MAX_MAJOR: f64 = 1_000_000_000_000.0;

    /// Creates an amount from a decimal major value, rounded half away from
    /// zero to two decimals.
    ///
    /// Returns `None` for non-finite values or magnitudes above
    /// [`Money::MAX_MAJOR`].
    pub fn try_from_major(major: f64) -> Option<Self> {
        if !major.is_finite() || major.abs() > Self::MAX_MAJOR {
            return None;
        }
        Some(Self {
            minor: (major * 100.0).round() as i64,
        })
    }

    /// Like [`Money::try_from_major`] but clamps out-of-range input to
    /// `±MAX_MAJOR` (NaN becomes zero).
    pub fn from_major(major: f64) -> Self {
        if major.is_nan() {
            return Self::zero();
        }
        let clamped = major.clamp(-Self::MAX_MAJOR, Self::MAX_MAJOR);
        Self {
            minor: (clamped * 100.0).round() as i64,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { minor: 0 }
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the amount as a decimal major value.
    pub fn as_major(&self) -> f64 {
        self.minor as f64 / 100.0
    }

    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    pub fn is_negative(&self) -> bool {
        self.minor < 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            minor: self.minor.saturating_add(rhs.minor),
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            minor: self.minor.saturating_sub(rhs.minor),
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.minor = self.minor.saturating_add(rhs.minor);
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let major = f64::deserialize(deserializer)?;
        Money::try_from_major(major)
            .ok_or_else(|| serde::de::Error::custom("amount must be a finite number within range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_major_rounds_to_two_decimals() {
        assert_eq!(Money::from_major(650.0).minor(), 65000);
        assert_eq!(Money::from_major(12.345).minor(), 1235);
        assert_eq!(Money::from_major(0.004).minor(), 0);
    }

    #[test]
    fn display() {
        assert_eq!(Money::from_minor(1234).to_string(), "12.34");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-1234).to_string(), "-12.34");
    }

    #[test]
    fn arithmetic_and_sum() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);
        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);

        let total: Money = [a, b, Money::from_minor(1)].into_iter().sum();
        assert_eq!(total.minor(), 1501);
    }

    #[test]
    fn try_from_major_rejects_out_of_range() {
        assert_eq!(Money::try_from_major(650.5), Some(Money::from_minor(65050)));
        assert_eq!(Money::try_from_major(Money::MAX_MAJOR), Some(Money::from_minor(100_000_000_000_000)));
        assert_eq!(Money::try_from_major(5e16), None);
        assert_eq!(Money::try_from_major(-5e16), None);
        assert_eq!(Money::try_from_major(f64::NAN), None);
        assert_eq!(Money::try_from_major(f64::INFINITY), None);
    }

    #[test]
    fn from_major_clamps_to_range() {
        assert_eq!(Money::from_major(5e16).minor(), 100_000_000_000_000);
        assert_eq!(Money::from_major(-5e16).minor(), -100_000_000_000_000);
        assert!(Money::from_major(f64::NAN).is_zero());
    }

    #[test]
    fn addition_saturates_instead_of_overflowing() {
        let big = Money::from_minor(i64::MAX - 1);
        assert_eq!((big + Money::from_minor(10)).minor(), i64::MAX);
        assert_eq!((Money::from_minor(i64::MIN + 1) - Money::from_minor(10)).minor(), i64::MIN);

        let mut acc = big;
        acc += big;
        assert_eq!(acc.minor(), i64::MAX);

        let total: Money = [big, big, big].into_iter().sum();
        assert_eq!(total.minor(), i64::MAX);
    }

    #[test]
    fn deserialize_rejects_huge_amounts() {
        assert!(serde_json::from_str::<Money>("5e16").is_err());
    }

    #[test]
    fn serializes_as_decimal() {
        let json = serde_json::to_string(&Money::from_minor(65000)).unwrap();
        assert_eq!(json, "650.0");

        let parsed: Money = serde_json::from_str("499.99").unwrap();
        assert_eq!(parsed.minor(), 49999);
    }
}
