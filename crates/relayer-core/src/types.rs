//! Scalar wire types shared by tasks and events.

use std::fmt;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ApiError, Result};

/// Binary field carried as a standard base64 string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Base64Bytes(pub Vec<u8>);

impl Base64Bytes {
    /// Borrow the decoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Base64Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Base64Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Serialize for Base64Bytes {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64_STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Base64Bytes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// Common accessors over signed and unsigned token amounts.
pub trait TokenAmount {
    /// Decimal string amount.
    fn amount(&self) -> &str;

    /// Token identifier; `None` means the chain's native token.
    fn token_id(&self) -> Option<&str>;
}

/// Amount of a token, as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub amount: String,

    #[serde(rename = "tokenID", skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl Token {
    /// Amount of the chain's native token.
    pub fn native(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            token_id: None,
        }
    }

    /// Set the token identifier.
    pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }
}

impl TokenAmount for Token {
    fn amount(&self) -> &str {
        &self.amount
    }

    fn token_id(&self) -> Option<&str> {
        self.token_id.as_deref()
    }
}

/// Token amount that is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedToken {
    pub amount: String,

    #[serde(rename = "tokenID", skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl TokenAmount for UnsignedToken {
    fn amount(&self) -> &str {
        &self.amount
    }

    fn token_id(&self) -> Option<&str> {
        self.token_id.as_deref()
    }
}

/// Globally unique identifier of a cross-chain message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossChainID {
    #[serde(rename = "sourceChain")]
    pub source_chain: String,

    #[serde(rename = "messageID")]
    pub message_id: String,
}

impl fmt::Display for CrossChainID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.source_chain, self.message_id)
    }
}

/// A cross-chain message as routed by the relayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub source_chain: String,
    pub source_address: String,
    pub destination_address: String,
    pub payload_hash: Base64Bytes,
}

impl Message {
    /// Identifier of this message across chains.
    pub fn cross_chain_id(&self) -> CrossChainID {
        CrossChainID {
            source_chain: self.source_chain.clone(),
            message_id: self.message_id.clone(),
        }
    }
}

/// Outcome of a message execution on the destination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageExecutionStatus {
    Successful,
    Reverted,
}

/// Kind of token manager deployed by the interchain token service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenManagerType {
    NativeInterchainToken,
    MintBurnFrom,
    LockUnlock,
    LockUnlockFee,
    MintBurn,
}

impl TokenManagerType {
    /// Convert the ordinal of the solidity `TokenManagerType` enum.
    ///
    /// Ordinals follow the declaration order of `ITokenManagerType.sol`.
    pub fn from_solidity_enum(value: u8) -> Result<Self> {
        match value {
            0 => Ok(TokenManagerType::NativeInterchainToken),
            1 => Ok(TokenManagerType::MintBurnFrom),
            2 => Ok(TokenManagerType::LockUnlock),
            3 => Ok(TokenManagerType::LockUnlockFee),
            4 => Ok(TokenManagerType::MintBurn),
            other => Err(ApiError::InvalidTokenManagerType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, TokenManagerType::NativeInterchainToken)]
    #[case(1, TokenManagerType::MintBurnFrom)]
    #[case(2, TokenManagerType::LockUnlock)]
    #[case(3, TokenManagerType::LockUnlockFee)]
    #[case(4, TokenManagerType::MintBurn)]
    fn test_token_manager_type_from_solidity(
        #[case] ordinal: u8,
        #[case] expected: TokenManagerType,
    ) {
        assert_eq!(TokenManagerType::from_solidity_enum(ordinal), Ok(expected));
    }

    #[test]
    fn test_token_manager_type_out_of_range() {
        let err = TokenManagerType::from_solidity_enum(5).unwrap_err();
        assert_eq!(err.to_string(), "invalid TokenManagerType: 5");
    }

    #[test]
    fn test_token_omits_missing_token_id() {
        let json = serde_json::to_string(&Token::native("123")).unwrap();
        assert_eq!(json, r#"{"amount":"123"}"#);

        let json = serde_json::to_string(&Token::native("5").with_token_id("uaxl")).unwrap();
        assert_eq!(json, r#"{"amount":"5","tokenID":"uaxl"}"#);
    }

    #[test]
    fn test_token_accessors() {
        let token = Token::native("42").with_token_id("0xabc");
        assert_eq!(token.amount(), "42");
        assert_eq!(token.token_id(), Some("0xabc"));

        let unsigned = UnsignedToken {
            amount: "7".into(),
            token_id: None,
        };
        assert_eq!(unsigned.amount(), "7");
        assert_eq!(unsigned.token_id(), None);
    }

    #[test]
    fn test_message_wire_keys() {
        let message = Message {
            message_id: "0x01-1".into(),
            source_chain: "ethereum".into(),
            source_address: "0xsrc".into(),
            destination_address: "0xdst".into(),
            payload_hash: Base64Bytes::from(&b"hash"[..]),
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["messageID"], "0x01-1");
        assert_eq!(value["sourceChain"], "ethereum");
        assert_eq!(value["destinationAddress"], "0xdst");
        assert_eq!(value["payloadHash"], "aGFzaA==");

        let decoded: Message = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.cross_chain_id().to_string(), "ethereum_0x01-1");
    }

    #[test]
    fn test_base64_rejects_invalid_input() {
        let result: std::result::Result<Base64Bytes, _> = serde_json::from_str(r#""not base64!""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_execution_status_wire_form() {
        let json = serde_json::to_string(&MessageExecutionStatus::Successful).unwrap();
        assert_eq!(json, r#""SUCCESSFUL""#);
    }
}
