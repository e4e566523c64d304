// crates/cep-core/src/cep.rs

//! # Postal codes
//!
//! A [`Cep`] is always exactly eight ASCII digits. Separators (`-`, spaces)
//! are stripped by [`Cep::normalize`] before validation, so `"01310-930"`
//! and `"01310930"` parse to the same value.
//!
//! Because every `Cep` is zero-padded to the same width, the derived `Ord`
//! (plain string order) is also numeric order. Range containment relies on
//! that.

use crate::error::{CepError, Result};
use crate::model::AddressKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of digits in a CEP.
pub const CEP_LEN: usize = 8;

/// A validated, normalized 8-digit Brazilian postal code.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cep(String);

impl Cep {
    /// Strips hyphens and whitespace. Does not validate.
    ///
    /// ```rust
    /// use cep_core::Cep;
    /// assert_eq!(Cep::normalize(" 01310-930 "), "01310930");
    /// ```
    pub fn normalize(raw: &str) -> String {
        raw.chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect()
    }

    /// Normalizes `raw` and checks that exactly eight ASCII digits remain.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = Self::normalize(raw);
        if normalized.len() != CEP_LEN || !normalized.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CepError::Format(format!(
                "CEP must have exactly {CEP_LEN} digits, got {raw:?}"
            )));
        }
        Ok(Cep(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `NNNNN-NNN` presentation form.
    pub fn formatted(&self) -> String {
        format!("{}-{}", &self.0[..5], &self.0[5..])
    }

    /// The whole code as a number (`"01310930"` -> `1_310_930`).
    pub fn value(&self) -> u32 {
        self.0
            .bytes()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
    }

    /// The last three digits as an integer.
    pub fn suffix(&self) -> u16 {
        // Eight validated ASCII digits: the fold cannot overflow or fail.
        self.0[5..]
            .bytes()
            .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
    }

    /// Classification implied by the suffix alone, without any lookup.
    ///
    /// | suffix | kind |
    /// |---|---|
    /// | 900–959 | [`AddressKind::LargeUser`] |
    /// | 970–989, 999 | [`AddressKind::OperationalUnit`] |
    /// | 990–998 | [`AddressKind::CommunityPoBox`] |
    pub fn suffix_kind(&self) -> Option<AddressKind> {
        match self.suffix() {
            900..=959 => Some(AddressKind::LargeUser),
            970..=989 | 999 => Some(AddressKind::OperationalUnit),
            990..=998 => Some(AddressKind::CommunityPoBox),
            _ => None,
        }
    }

    /// Inclusive containment in `[start, end]`.
    pub fn within(&self, start: &Cep, end: &Cep) -> bool {
        start <= self && self <= end
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cep {
    type Err = CepError;

    fn from_str(s: &str) -> Result<Self> {
        Cep::parse(s)
    }
}

impl TryFrom<String> for Cep {
    type Error = CepError;

    fn try_from(value: String) -> Result<Self> {
        Cep::parse(&value)
    }
}

impl From<Cep> for String {
    fn from(cep: Cep) -> Self {
        cep.0
    }
}

impl AsRef<str> for Cep {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cep(s: &str) -> Cep {
        Cep::parse(s).unwrap()
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in ".*") {
            let once = Cep::normalize(&raw);
            prop_assert_eq!(Cep::normalize(&once), once);
        }

        /// Hyphen and surrounding blanks never change the parsed code.
        #[test]
        fn separators_are_ignored(n in 0u32..100_000_000, pad in "[ -]{0,3}") {
            let digits = format!("{n:08}");
            let raw = format!("{pad}{}-{}{pad}", &digits[..5], &digits[5..]);
            let parsed = Cep::parse(&raw).unwrap();
            prop_assert_eq!(parsed.as_str(), digits.as_str());
            prop_assert_eq!(parsed.value(), n);
            prop_assert_eq!(Cep::parse(&parsed.formatted()).unwrap(), parsed);
        }

        #[test]
        fn parse_accepts_exactly_eight_digits(raw in "[0-9a-z -]{0,12}") {
            let normalized = Cep::normalize(&raw);
            let expected = normalized.len() == CEP_LEN && normalized.bytes().all(|b| b.is_ascii_digit());
            prop_assert_eq!(Cep::parse(&raw).is_ok(), expected);
        }
    }

    #[test]
    fn rejects_malformed_codes() {
        for raw in ["123", "abcdefgh", "12345-6789", "", "0131093a", "013109300"] {
            assert!(
                matches!(Cep::parse(raw), Err(CepError::Format(_))),
                "expected format error for {raw:?}"
            );
        }
    }

    #[test]
    fn accepts_hyphenated_code() {
        assert_eq!(cep("01310-930").as_str(), "01310930");
        assert_eq!(cep("01310930").formatted(), "01310-930");
    }

    #[test]
    fn suffix_heuristic_boundaries() {
        assert_eq!(cep("01310899").suffix_kind(), None);
        assert_eq!(cep("01310900").suffix_kind(), Some(AddressKind::LargeUser));
        assert_eq!(cep("01310959").suffix_kind(), Some(AddressKind::LargeUser));
        assert_eq!(cep("01310960").suffix_kind(), None);
        assert_eq!(cep("01310969").suffix_kind(), None);
        assert_eq!(cep("01310970").suffix_kind(), Some(AddressKind::OperationalUnit));
        assert_eq!(cep("01310989").suffix_kind(), Some(AddressKind::OperationalUnit));
        assert_eq!(cep("01310990").suffix_kind(), Some(AddressKind::CommunityPoBox));
        assert_eq!(cep("01310998").suffix_kind(), Some(AddressKind::CommunityPoBox));
        assert_eq!(cep("01310999").suffix_kind(), Some(AddressKind::OperationalUnit));
        assert_eq!(cep("01310000").suffix(), 0);
    }

    #[test]
    fn containment_is_inclusive_on_both_ends() {
        let start = cep("01000000");
        let end = cep("01099999");
        assert!(cep("01000000").within(&start, &end));
        assert!(cep("01099999").within(&start, &end));
        assert!(cep("01050000").within(&start, &end));
        assert!(!cep("00999999").within(&start, &end));
        assert!(!cep("01100000").within(&start, &end));
    }

    #[test]
    fn serde_goes_through_validation() {
        let c: Cep = serde_json::from_str("\"01310-930\"").unwrap();
        assert_eq!(c.as_str(), "01310930");
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"01310930\"");
        assert!(serde_json::from_str::<Cep>("\"123\"").is_err());
    }
}
