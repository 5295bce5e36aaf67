use std::fmt;

use serde::{Serialize, Serializer};

/// Total significant digits allowed in a price.
pub const MAX_DIGITS: usize = 10;
/// Digits allowed after the decimal point.
pub const DECIMAL_PLACES: usize = 2;

/// Fixed-point price stored as integer cents (e.g. 999 = 9.99).
///
/// Serialized as a decimal string with exactly two places so clients never
/// see binary floating-point noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    Invalid,
    MaxDigits,
    MaxDecimalPlaces,
    MaxWholeDigits,
}

impl PriceError {
    pub fn message(&self) -> String {
        match self {
            PriceError::Invalid => "A valid number is required.".to_string(),
            PriceError::MaxDigits => format!(
                "Ensure that there are no more than {} digits in total.",
                MAX_DIGITS
            ),
            PriceError::MaxDecimalPlaces => format!(
                "Ensure that there are no more than {} decimal places.",
                DECIMAL_PLACES
            ),
            PriceError::MaxWholeDigits => format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                MAX_DIGITS - DECIMAL_PLACES
            ),
        }
    }
}

impl Price {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parse a decimal literal such as `"9.99"`, `"-3"`, `".5"` or `"1.5e2"`.
    ///
    /// Digit limits apply to the value as written: `"1.000"` has three
    /// decimal places, `"1e3"` has four whole digits.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let s = input.trim();
        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
            Some((m, e)) => (m, e.parse::<i64>().map_err(|_| PriceError::Invalid)?),
            None => (unsigned, 0),
        };
        let (whole, fraction) = match mantissa.split_once('.') {
            Some((w, f)) => (w, f),
            None => (mantissa, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(PriceError::Invalid);
        }

        // Coefficient digits and the power of ten they are scaled by.
        let coefficient = format!("{}{}", whole, fraction);
        let coefficient = match coefficient.trim_start_matches('0') {
            "" => "0",
            digits => digits,
        };
        let scale = exponent.saturating_sub(fraction.len() as i64);

        let digits = coefficient.len() as i64;
        let (total_digits, decimal_places) = if scale >= 0 {
            (digits.saturating_add(scale), 0)
        } else if digits > scale.saturating_neg() {
            (digits, scale.saturating_neg())
        } else {
            (scale.saturating_neg(), scale.saturating_neg())
        };
        let whole_digits = total_digits - decimal_places;

        if total_digits > MAX_DIGITS as i64 {
            return Err(PriceError::MaxDigits);
        }
        if decimal_places > DECIMAL_PLACES as i64 {
            return Err(PriceError::MaxDecimalPlaces);
        }
        if whole_digits > (MAX_DIGITS - DECIMAL_PLACES) as i64 {
            return Err(PriceError::MaxWholeDigits);
        }

        // At most 10 coefficient digits scaled by at most 10^10 below
        // 10^8 units: fits in i64 as cents.
        let units: i64 = coefficient.parse().map_err(|_| PriceError::Invalid)?;
        let total = u32::try_from(scale + DECIMAL_PLACES as i64)
            .ok()
            .and_then(|pow| 10_i64.checked_pow(pow))
            .and_then(|factor| units.checked_mul(factor))
            .ok_or(PriceError::MaxDigits)?;

        Ok(Self(if negative { -total } else { total }))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_decimals() {
        assert_eq!(Price::parse("9.99"), Ok(Price::from_cents(999)));
        assert_eq!(Price::parse("5"), Ok(Price::from_cents(500)));
        assert_eq!(Price::parse("0.5"), Ok(Price::from_cents(50)));
        assert_eq!(Price::parse(".05"), Ok(Price::from_cents(5)));
        assert_eq!(Price::parse("12."), Ok(Price::from_cents(1200)));
        assert_eq!(Price::parse(" 3.10 "), Ok(Price::from_cents(310)));
        assert_eq!(Price::parse("00042.00"), Ok(Price::from_cents(4200)));
    }

    #[test]
    fn negative_values_parse_and_report_negative() {
        let p = Price::parse("-1.25").unwrap();
        assert_eq!(p.cents(), -125);
        assert!(p.is_negative());
        assert!(!Price::parse("+1.25").unwrap().is_negative());
    }

    #[test]
    fn rejects_non_numbers() {
        for bad in ["", ".", "abc", "1.2.3", "1,50", "--1", "e3", "1e", "1e3.5", "NaN"] {
            assert_eq!(Price::parse(bad), Err(PriceError::Invalid), "input {:?}", bad);
        }
    }

    #[test]
    fn enforces_precision_limits() {
        assert_eq!(Price::parse("1.999"), Err(PriceError::MaxDecimalPlaces));
        assert_eq!(Price::parse("1.000"), Err(PriceError::MaxDecimalPlaces));
        assert_eq!(Price::parse("123456789.55"), Err(PriceError::MaxDigits));
        assert_eq!(Price::parse("123456789"), Err(PriceError::MaxWholeDigits));
        assert_eq!(Price::parse("12345678.99"), Ok(Price::from_cents(1_234_567_899)));
    }

    #[test]
    fn accepts_exponent_notation() {
        assert_eq!(Price::parse("1e3"), Ok(Price::from_cents(100_000)));
        assert_eq!(Price::parse("1.5E2"), Ok(Price::from_cents(15_000)));
        assert_eq!(Price::parse("25e-2"), Ok(Price::from_cents(25)));
        assert_eq!(Price::parse("-2e1"), Ok(Price::from_cents(-2_000)));
    }

    #[test]
    fn exponent_notation_is_held_to_digit_limits() {
        assert_eq!(Price::parse("1e16"), Err(PriceError::MaxDigits));
        assert_eq!(Price::parse("1e8"), Err(PriceError::MaxWholeDigits));
        assert_eq!(Price::parse("1e-3"), Err(PriceError::MaxDecimalPlaces));
        assert_eq!(Price::parse("1e999999999999"), Err(PriceError::MaxDigits));
    }

    #[test]
    fn displays_two_decimal_places() {
        assert_eq!(Price::from_cents(999).to_string(), "9.99");
        assert_eq!(Price::from_cents(500).to_string(), "5.00");
        assert_eq!(Price::from_cents(7).to_string(), "0.07");
        assert_eq!(Price::from_cents(-125).to_string(), "-1.25");
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_value(Price::from_cents(999)).unwrap();
        assert_eq!(json, serde_json::json!("9.99"));
    }

    #[test]
    fn error_messages() {
        assert_eq!(PriceError::Invalid.message(), "A valid number is required.");
        assert_eq!(
            PriceError::MaxDecimalPlaces.message(),
            "Ensure that there are no more than 2 decimal places."
        );
        assert_eq!(
            PriceError::MaxDigits.message(),
            "Ensure that there are no more than 10 digits in total."
        );
    }
}
