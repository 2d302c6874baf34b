use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn canonical_renspa_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}\.\d{3}\.\d\.\d{5}/\d{2}$").expect("valid regex"))
}

/// A CUIT (taxpayer identifier) in its canonical `XX-XXXXXXXX-X` form.
///
/// Used as the key for bulk registry queries; one CUIT owns zero-or-many
/// RENSPA.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cuit(String);

impl Cuit {
    /// Parses a CUIT given with or without hyphens.
    ///
    /// All 11 payload characters must be ASCII digits; a length match alone
    /// is not accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let digits: String = input.trim().chars().filter(|c| *c != '-').collect();
        if digits.len() != 11 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidCuit {
                input: input.to_string(),
            });
        }
        Ok(Self(format!(
            "{}-{}-{}",
            &digits[..2],
            &digits[2..10],
            &digits[10..]
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 11 digits without separators (file names, upstream query strings).
    pub fn digits(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

impl std::fmt::Display for Cuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A RENSPA (sanitary-registry identifier of one production unit) in its
/// canonical `NN.NNN.N.NNNNN/NN` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Renspa(String);

impl Renspa {
    /// Parses a RENSPA from the canonical dotted/slash form or from a flat
    /// 13-digit string, which is regrouped as 2.3.1.5/2.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if canonical_renspa_regex().is_match(trimmed) {
            return Ok(Self(trimmed.to_string()));
        }
        if trimmed.len() == 13 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self(format!(
                "{}.{}.{}.{}/{}",
                &trimmed[..2],
                &trimmed[2..5],
                &trimmed[5..6],
                &trimmed[6..11],
                &trimmed[11..]
            )));
        }
        Err(Error::InvalidRenspa {
            input: input.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 13 digits without separators.
    pub fn digits(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

impl std::fmt::Display for Renspa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
