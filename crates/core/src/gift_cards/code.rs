//! Gift Card Codes

use std::{fmt, str::FromStr};

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbols used in generated codes; `0`/`O`, `1`/`I`/`L` and `U` are left out so codes survive
/// being read aloud or copied by hand.
const ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Number of random symbols in a generated code.
pub const CODE_SYMBOLS: usize = 12;

const GROUP_SIZE: usize = 4;

/// Errors raised while parsing a merchant-entered or scanned code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GiftCardCodeError {
    /// Nothing was entered.
    #[error("gift card code is empty")]
    Empty,

    /// The code contains something other than letters, digits and dashes.
    #[error("gift card code contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A redemption code, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GiftCardCode(String);

impl GiftCardCode {
    /// Normalize an entered or scanned code: surrounding whitespace is dropped and letters are
    /// uppercased, so lookups are case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input or characters other than ASCII letters, digits and `-`.
    pub fn parse(raw: &str) -> Result<Self, GiftCardCodeError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(GiftCardCodeError::Empty);
        }

        if let Some(invalid) = trimmed
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
        {
            return Err(GiftCardCodeError::InvalidCharacter(invalid));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Draw a fresh `XXXX-XXXX-XXXX` code from `rng`.
    ///
    /// Callers should pass a cryptographically secure generator (`OsRng`); codes double as
    /// bearer credentials.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut code = String::with_capacity(CODE_SYMBOLS + CODE_SYMBOLS / GROUP_SIZE);

        for index in 0..CODE_SYMBOLS {
            if index > 0 && index % GROUP_SIZE == 0 {
                code.push('-');
            }

            if let Some(symbol) = ALPHABET.choose(rng) {
                code.push(char::from(*symbol));
            }
        }

        Self(code)
    }

    /// The normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for GiftCardCode {
    type Err = GiftCardCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GiftCardCode {
    type Error = GiftCardCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GiftCardCode> for String {
    fn from(value: GiftCardCode) -> Self {
        value.0
    }
}

impl fmt::Display for GiftCardCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::OsRng;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() -> TestResult {
        let code = GiftCardCode::parse("  ab12-cd34 ")?;

        assert_eq!(code.as_str(), "AB12-CD34", "code is normalized");
        assert_eq!(code, GiftCardCode::parse("AB12-CD34")?, "normalized code parses to itself");

        Ok(())
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(
            GiftCardCode::parse("   "),
            Err(GiftCardCodeError::Empty),
            "blank code rejected"
        );
    }

    #[test]
    fn parse_rejects_punctuation() {
        assert_eq!(
            GiftCardCode::parse("AB12;DROP"),
            Err(GiftCardCodeError::InvalidCharacter(';')),
            "punctuation rejected"
        );
    }

    #[test]
    fn generated_codes_are_grouped_and_unambiguous() -> TestResult {
        let code = GiftCardCode::generate(&mut OsRng);
        let groups: Vec<&str> = code.as_str().split('-').collect();

        assert_eq!(groups.len(), 3, "three groups");
        assert!(groups.iter().all(|g| g.len() == GROUP_SIZE), "groups have fixed size");
        assert!(
            code.as_str()
                .bytes()
                .filter(|b| *b != b'-')
                .all(|b| ALPHABET.contains(&b)),
            "only alphabet symbols"
        );

        // Generated codes must survive a parse round trip unchanged.
        assert_eq!(GiftCardCode::parse(code.as_str())?, code, "generated code parses back");

        Ok(())
    }

    #[test]
    fn generated_codes_do_not_repeat() {
        let codes: HashSet<GiftCardCode> = (0..1_000)
            .map(|_| GiftCardCode::generate(&mut OsRng))
            .collect();

        assert_eq!(codes.len(), 1_000, "no collisions in a thousand codes");
    }
}
