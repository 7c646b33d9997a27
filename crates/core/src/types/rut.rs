//! Chilean national identity number (RUT).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Rut`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RutError {
    /// The input string is empty after trimming.
    #[error("El RUT no puede estar vacío")]
    Empty,
    /// The input is not `<digits>-<check digit>`.
    #[error("El RUT debe tener el formato 12345678-9")]
    InvalidFormat,
    /// The check digit does not match the body (modulo 11).
    #[error("El dígito verificador del RUT no es válido")]
    InvalidCheckDigit,
}

/// A RUT in canonical `12345678-9` form.
///
/// Dots are accepted on input and stripped; a `k` check digit is uppercased.
/// The body is 1-8 digits without a leading zero and the check digit must
/// match it under the modulo-11 rule.
///
/// ```
/// use ferremas_core::Rut;
///
/// let rut = Rut::parse("11.111.111-1").unwrap();
/// assert_eq!(rut.as_str(), "11111111-1");
/// assert_eq!(Rut::parse("12345670-k").unwrap().as_str(), "12345670-K");
/// assert!(Rut::parse("11111111-2").is_err());
/// assert!(Rut::parse("11111111").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Rut(String);

impl Rut {
    /// Maximum number of digits before the check digit.
    pub const MAX_BODY_DIGITS: usize = 8;

    /// Parse a RUT, normalizing dots and case.
    ///
    /// # Errors
    ///
    /// Returns [`RutError::Empty`] for blank input and
    /// [`RutError::InvalidFormat`] for anything not shaped like a RUT.
    pub fn parse(s: &str) -> Result<Self, RutError> {
        let cleaned: String = s.trim().chars().filter(|c| *c != '.').collect();
        if cleaned.is_empty() {
            return Err(RutError::Empty);
        }

        let (body, check) = cleaned.split_once('-').ok_or(RutError::InvalidFormat)?;

        let body_ok = !body.is_empty()
            && body.len() <= Self::MAX_BODY_DIGITS
            && !body.starts_with('0')
            && body.chars().all(|c| c.is_ascii_digit());
        if !body_ok {
            return Err(RutError::InvalidFormat);
        }

        let mut check_chars = check.chars();
        let check = match (check_chars.next(), check_chars.next()) {
            (Some(c), None) if c.is_ascii_digit() => c,
            (Some('k' | 'K'), None) => 'K',
            _ => return Err(RutError::InvalidFormat),
        };

        let number: u32 = body.parse().map_err(|_| RutError::InvalidFormat)?;
        if Self::check_digit(number) != check {
            return Err(RutError::InvalidCheckDigit);
        }

        Ok(Self(format!("{body}-{check}")))
    }

    /// Modulo-11 check digit for a RUT body.
    ///
    /// Digits are weighted 2 to 7 from the right, cycling; `11 - sum % 11`
    /// gives the digit, with 11 written `0` and 10 written `K`.
    #[must_use]
    pub fn check_digit(mut body: u32) -> char {
        let mut sum = 0;
        let mut weight = 2;
        while body > 0 {
            sum += (body % 10) * weight;
            body /= 10;
            weight = if weight == 7 { 2 } else { weight + 1 };
        }

        match 11 - sum % 11 {
            11 => '0',
            10 => 'K',
            d => char::from_digit(d, 10).unwrap_or('0'),
        }
    }

    /// Returns the RUT as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rut {
    type Error = RutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rut> for String {
    fn from(rut: Rut) -> Self {
        rut.0
    }
}

impl AsRef<str> for Rut {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rut {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rut {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rut {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        assert_eq!(Rut::parse("11111111-1").unwrap().as_str(), "11111111-1");
        assert_eq!(Rut::parse(" 9876543-3 ").unwrap().as_str(), "9876543-3");
    }

    #[test]
    fn test_parse_strips_dots_and_uppercases_k() {
        assert_eq!(Rut::parse("12.345.670-k").unwrap().as_str(), "12345670-K");
    }

    #[test]
    fn test_check_digit() {
        assert_eq!(Rut::check_digit(11_111_111), '1');
        assert_eq!(Rut::check_digit(12_345_678), '5');
        assert_eq!(Rut::check_digit(12_345_670), 'K');
        assert_eq!(Rut::check_digit(10_000_013), 'K');
        assert_eq!(Rut::check_digit(20_000_000), '5');
    }

    #[test]
    fn test_parse_rejects_wrong_check_digit() {
        assert_eq!(Rut::parse("11111111-2"), Err(RutError::InvalidCheckDigit));
        assert_eq!(Rut::parse("12345678-K"), Err(RutError::InvalidCheckDigit));
        assert_eq!(Rut::parse("12.345.678-5").unwrap().as_str(), "12345678-5");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(Rut::parse(""), Err(RutError::Empty));
        assert_eq!(Rut::parse("11111111"), Err(RutError::InvalidFormat));
        assert_eq!(Rut::parse("-1"), Err(RutError::InvalidFormat));
        assert_eq!(Rut::parse("0123456-1"), Err(RutError::InvalidFormat));
        assert_eq!(Rut::parse("123456789-1"), Err(RutError::InvalidFormat));
        assert_eq!(Rut::parse("1234567-12"), Err(RutError::InvalidFormat));
        assert_eq!(Rut::parse("1234567-X"), Err(RutError::InvalidFormat));
        assert_eq!(Rut::parse("12a4567-1"), Err(RutError::InvalidFormat));
    }
}
