//! E.164 phone numbers.

use std::fmt;
use std::str::FromStr;

use super::errors::PhoneNumberError;

const MIN_DIGITS: usize = 2;
const MAX_DIGITS: usize = 15;

/// A phone number in E.164 form (`+` then 2 to 15 digits, no leading zero).
///
/// `Debug` and `Display` show only the last four digits.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(input: &str) -> Result<Self, PhoneNumberError> {
        let digits = input
            .strip_prefix('+')
            .ok_or(PhoneNumberError::MissingPrefix)?;

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneNumberError::InvalidCharacter);
        }
        if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneNumberError::InvalidLength(digits.len()));
        }
        if digits.starts_with('0') {
            return Err(PhoneNumberError::LeadingZero);
        }
        Ok(Self(input.to_string()))
    }

    /// The full number, including `+`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `*` for every digit but the last four.
    pub fn masked(&self) -> String {
        let visible = self.0.len().saturating_sub(4).max(1);
        let mut out = String::with_capacity(self.0.len());
        out.push('+');
        out.extend(std::iter::repeat('*').take(visible - 1));
        out.push_str(&self.0[visible..]);
        out
    }
}

impl FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PhoneNumber").field(&self.masked()).finish()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_numbers() {
        for n in ["+15555550123", "+4915112345678", "+12", "+123456789012345"] {
            assert_eq!(PhoneNumber::parse(n).unwrap().as_str(), n);
        }
    }

    #[test]
    fn test_rejections() {
        assert_eq!(PhoneNumber::parse("15555550123"), Err(PhoneNumberError::MissingPrefix));
        assert_eq!(PhoneNumber::parse("+1 555 555"), Err(PhoneNumberError::InvalidCharacter));
        assert_eq!(PhoneNumber::parse("+1-555"), Err(PhoneNumberError::InvalidCharacter));
        assert_eq!(PhoneNumber::parse("+"), Err(PhoneNumberError::InvalidLength(0)));
        assert_eq!(PhoneNumber::parse("+1"), Err(PhoneNumberError::InvalidLength(1)));
        assert_eq!(
            PhoneNumber::parse("+1234567890123456"),
            Err(PhoneNumberError::InvalidLength(16))
        );
        assert_eq!(PhoneNumber::parse("+0123456"), Err(PhoneNumberError::LeadingZero));
    }

    #[test]
    fn test_masking() {
        let phone = PhoneNumber::parse("+15555550123").unwrap();
        assert_eq!(phone.masked(), "+*******0123");
        assert_eq!(format!("{phone}"), "+*******0123");
        assert!(!format!("{phone:?}").contains("5555"));

        assert_eq!(PhoneNumber::parse("+12").unwrap().masked(), "+12");
    }

    proptest! {
        #[test]
        fn prop_masked_length_matches(digits in "[1-9][0-9]{1,14}") {
            let phone = PhoneNumber::parse(&format!("+{digits}")).unwrap();
            prop_assert_eq!(phone.masked().len(), phone.as_str().len());
            prop_assert!(phone.masked().ends_with(&digits[digits.len().saturating_sub(4)..]));
        }
    }
}
