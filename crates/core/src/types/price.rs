//! Product price in Brazilian reais.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price is not a number: {0}")]
    Invalid(String),
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative amount with two decimal places.
///
/// ```
/// use catalog_core::Price;
///
/// let price: Price = "1.234,5".parse().unwrap();
/// assert_eq!(price.to_string(), "R$ 1.234,50");
/// assert!("-1".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Build a price, rounding to cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.round_dp(2)))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount without the currency symbol, e.g. `1234,50`, for form inputs.
    #[must_use]
    pub fn to_input_string(&self) -> String {
        format!("{:.2}", self.0).replace('.', ",")
    }
}

/// Parse a user-entered amount.
///
/// Accepts `1234.56`, `1234,56` and `1.234,56`, with or without a leading
/// `R$`. A comma marks the decimal separator whenever one is present.
///
/// # Errors
///
/// Returns [`PriceError::Invalid`] when the text is not a number.
pub fn parse_amount(input: &str) -> Result<Decimal, PriceError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return Err(PriceError::Invalid(input.to_owned()));
    }

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_owned()
    };

    Decimal::from_str(&normalized).map_err(|_| PriceError::Invalid(input.to_owned()))
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_amount(s)?)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = format!("{:.2}", self.0);
        let (units, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, c) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        write!(f, "R$ {grouped},{cents}")
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("1234.56").unwrap(), dec("1234.56"));
        assert_eq!(parse_amount("1234,56").unwrap(), dec("1234.56"));
        assert_eq!(parse_amount("1.234,56").unwrap(), dec("1234.56"));
        assert_eq!(parse_amount(" R$ 10 ").unwrap(), dec("10"));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(parse_amount(""), Err(PriceError::Invalid(_))));
        assert!(matches!(parse_amount("R$"), Err(PriceError::Invalid(_))));
        assert!(matches!(parse_amount("dez"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_new_rejects_negative() {
        assert_eq!(Price::new(dec("-0.01")), Err(PriceError::Negative));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_new_rounds_to_cents() {
        assert_eq!(Price::new(dec("9.999")).unwrap().amount(), dec("10.00"));
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::ZERO.to_string(), "R$ 0,00");
        assert_eq!(Price::new(dec("999.9")).unwrap().to_string(), "R$ 999,90");
        assert_eq!(Price::new(dec("1000")).unwrap().to_string(), "R$ 1.000,00");
        assert_eq!(
            Price::new(dec("1234567.89")).unwrap().to_string(),
            "R$ 1.234.567,89"
        );
    }

    #[test]
    fn test_to_input_string() {
        assert_eq!(Price::new(dec("1234.5")).unwrap().to_input_string(), "1234,50");
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("\"-5\"").is_err());
        let price: Price = serde_json::from_str("\"12.30\"").unwrap();
        assert_eq!(price.amount(), dec("12.30"));
    }
}
