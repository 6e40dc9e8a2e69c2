// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Validated wallet addresses.
//!
//! Addresses are validated once at the API boundary and normalized to
//! lowercase, which is also the form used for Firestore document IDs.

use serde::{Deserialize, Serialize};

/// A validated, lowercase-normalized wallet address (`0x` + 40 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse and normalize a raw address string.
    pub fn parse(raw: &str) -> Result<Self, WalletAddressError> {
        let trimmed = raw.trim();

        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or(WalletAddressError::MissingPrefix)?;

        if hex_part.len() != 40 {
            return Err(WalletAddressError::InvalidLength(trimmed.len()));
        }

        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WalletAddressError::InvalidHex);
        }

        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = WalletAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

/// Wallet address validation errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WalletAddressError {
    #[error("Wallet address must start with 0x")]
    MissingPrefix,

    #[error("Wallet address must be 42 characters, got {0}")]
    InvalidLength(usize),

    #[error("Wallet address contains non-hex characters")]
    InvalidHex,
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    #[test]
    fn test_parse_normalizes_to_lowercase() {
        let addr = WalletAddress::parse(VALID).unwrap();
        assert_eq!(addr.as_str(), "0x52908400098527886e0f7030069857d2e4169ee7");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let addr = WalletAddress::parse(&format!("  {}\n", VALID)).unwrap();
        assert_eq!(addr.as_str(), "0x52908400098527886e0f7030069857d2e4169ee7");
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        let err = WalletAddress::parse("52908400098527886E0F7030069857D2E4169EE7").unwrap_err();
        assert_eq!(err, WalletAddressError::MissingPrefix);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = WalletAddress::parse("0x1234").unwrap_err();
        assert!(matches!(err, WalletAddressError::InvalidLength(_)));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let err =
            WalletAddress::parse("0xZZ908400098527886E0F7030069857D2E4169EE7").unwrap_err();
        assert_eq!(err, WalletAddressError::InvalidHex);
    }

    #[test]
    fn test_serde_round_trip() {
        let addr = WalletAddress::parse(VALID).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        let back: WalletAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let result: Result<WalletAddress, _> = serde_json::from_str("\"not-a-wallet\"");
        assert!(result.is_err());
    }
}
