use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest amount representable in a 10-digit, 2-place column.
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("A valid number is required.")]
    NotANumber,
    #[error("Ensure that there are no more than 2 decimal places.")]
    TooPrecise,
    #[error("Ensure that there are no more than 10 digits in total.")]
    TooLarge,
}

/// An exact amount with two decimal places.
///
/// Stored as canonical text (`"12000.00"`) in every backend and serialized the same way on the
/// wire, so nothing ever passes through a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        let normalized = value.normalize();
        if normalized.scale() > 2 {
            return Err(MoneyError::TooPrecise);
        }
        if normalized.abs() > max_amount() {
            return Err(MoneyError::TooLarge);
        }
        let mut fixed = normalized;
        fixed.rescale(2);
        Ok(Self(fixed))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(s.trim()).map_err(|_| MoneyError::NotANumber)?;
        Money::new(value)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accepts "12000.00" as well as bare JSON numbers.
        let raw = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_text_has_two_places() {
        assert_eq!("12000".parse::<Money>().unwrap().to_string(), "12000.00");
        assert_eq!("12000.5".parse::<Money>().unwrap().to_string(), "12000.50");
        assert_eq!("0".parse::<Money>().unwrap().to_string(), "0.00");
    }

    #[test]
    fn rejects_excess_precision_and_magnitude() {
        assert_eq!("1.005".parse::<Money>(), Err(MoneyError::TooPrecise));
        assert_eq!("100000000.00".parse::<Money>(), Err(MoneyError::TooLarge));
        assert_eq!("abc".parse::<Money>(), Err(MoneyError::NotANumber));
        assert!("99999999.99".parse::<Money>().is_ok());
    }

    #[test]
    fn trailing_zeros_beyond_two_places_are_accepted() {
        assert_eq!("15.000".parse::<Money>().unwrap().to_string(), "15.00");
    }

    #[test]
    fn equal_amounts_compare_equal_regardless_of_input_form() {
        let a: Money = "15000".parse().unwrap();
        let b: Money = "15000.00".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn deserializes_from_number_or_string() {
        let from_str: Money = serde_json::from_str("\"12.50\"").unwrap();
        let from_num: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(serde_json::to_string(&from_num).unwrap(), "\"12.50\"");
    }
}
