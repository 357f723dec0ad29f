//! Cost model.
//!
//! A [`Cost`] is either a single [`Token`] amount or an itemized list of
//! [`Fee`]s. It has no wrapper key on the wire: the Token shape is a bare JSON
//! object and the Fees shape a bare JSON array. Construction never validates;
//! invalid costs are representable and rejected by [`Cost::validate`].

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::types::Token;

/// Metadata attached to a single fee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeMetadata {
    #[serde(rename = "txID", skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

/// One itemized charge, unique by `id` within its list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub id: String,

    pub token: Token,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<FeeMetadata>,
}

impl Fee {
    /// Create a fee without description or metadata.
    pub fn new(id: impl Into<String>, token: Token) -> Self {
        Self {
            id: id.into(),
            token,
            description: None,
            meta: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the transaction the fee was paid in.
    pub fn with_tx_id(mut self, tx_id: impl Into<String>) -> Self {
        self.meta = Some(FeeMetadata {
            tx_id: Some(tx_id.into()),
        });
        self
    }
}

/// Itemized fee list.
pub type Fees = Vec<Fee>;

/// Either a [`Token`] or a list of [`Fee`]s, kept in wire form.
#[derive(Debug, Clone)]
pub struct Cost {
    raw: Box<RawValue>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    Object,
    Array,
    Other,
}

impl Cost {
    /// Cost holding a single token amount.
    pub fn from_token(token: &Token) -> Result<Self> {
        let raw =
            serde_json::value::to_raw_value(token).map_err(|e| ApiError::encode("Token", e))?;
        Ok(Self { raw })
    }

    /// Cost holding an itemized fee list.
    pub fn from_fees(fees: &[Fee]) -> Result<Self> {
        let raw = serde_json::value::to_raw_value(fees).map_err(|e| ApiError::encode("Fees", e))?;
        Ok(Self { raw })
    }

    /// Wrap an arbitrary JSON document without checking its shape.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw = serde_json::from_str(json).map_err(|e| ApiError::decode("Cost", e))?;
        Ok(Self { raw })
    }

    /// The stored JSON text.
    pub fn as_json(&self) -> &str {
        self.raw.get()
    }

    fn shape(&self) -> Shape {
        match self.raw.get().trim_start().as_bytes().first() {
            Some(b'{') => Shape::Object,
            Some(b'[') => Shape::Array,
            _ => Shape::Other,
        }
    }

    /// Decode the Token shape: an object carrying `amount`.
    pub fn as_token(&self) -> Result<Token> {
        if self.shape() != Shape::Object {
            return Err(ApiError::ShapeMismatch {
                expected: "Token",
                message: "expected a JSON object".to_string(),
            });
        }

        serde_json::from_str(self.raw.get()).map_err(|e| ApiError::ShapeMismatch {
            expected: "Token",
            message: e.to_string(),
        })
    }

    /// Decode the Fees shape: an array of fees.
    pub fn as_fees(&self) -> Result<Fees> {
        if self.shape() != Shape::Array {
            return Err(ApiError::ShapeMismatch {
                expected: "Fees",
                message: "expected a JSON array".to_string(),
            });
        }

        serde_json::from_str(self.raw.get()).map_err(|e| ApiError::ShapeMismatch {
            expected: "Fees",
            message: e.to_string(),
        })
    }

    /// Check that the cost is a Token, or a Fees list with unique ids.
    pub fn validate(&self) -> Result<()> {
        let token_err = match self.as_token() {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        let fees = self.as_fees().map_err(|fees_err| {
            debug!(cost = self.raw.get(), "cost matches neither shape");
            ApiError::ShapeMismatch {
                expected: "Token or Fees",
                message: format!("{token_err}; {fees_err}"),
            }
        })?;

        let mut ids = HashSet::with_capacity(fees.len());
        for fee in &fees {
            if !ids.insert(fee.id.as_str()) {
                debug!(fee_id = %fee.id, "duplicate fee id in cost");
                return Err(ApiError::DuplicateFeeId(fee.id.clone()));
            }
        }

        Ok(())
    }
}

impl From<Token> for Cost {
    fn from(token: Token) -> Self {
        Self::from_token(&token).expect("Token always serializes to JSON")
    }
}

impl From<Fees> for Cost {
    fn from(fees: Fees) -> Self {
        Self::from_fees(&fees).expect("Fees always serialize to JSON")
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.raw.get() == other.raw.get()
    }
}

impl Eq for Cost {}

impl Serialize for Cost {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cost {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Box::<RawValue>::deserialize(deserializer).map(|raw| Self { raw })
    }
}

/// An event that may carry a cost.
///
/// `fees` normalizes the cost into a fee list regardless of its shape.
pub trait CostBearing {
    fn event_id(&self) -> &str;

    /// Transaction id from the event metadata, if any.
    fn tx_id(&self) -> Option<&str>;

    fn cost(&self) -> Option<&Cost>;

    fn fees(&self) -> Result<Fees> {
        create_fees(self)
    }
}

/// Normalize the cost of `event` into a fee list.
///
/// A Token cost becomes a single fee identified by the event id and tagged
/// with the event's transaction id. A Fees cost is returned as is, and a
/// missing cost yields an empty list.
pub fn create_fees<E: CostBearing + ?Sized>(event: &E) -> Result<Fees> {
    let Some(cost) = event.cost() else {
        return Ok(Fees::new());
    };

    let token_err = match cost.as_token() {
        Ok(token) => {
            let mut fee = Fee::new(event.event_id(), token);
            if let Some(tx_id) = event.tx_id() {
                fee = fee.with_tx_id(tx_id);
            }
            return Ok(vec![fee]);
        }
        Err(err) => err,
    };

    cost.as_fees().map_err(|fees_err| ApiError::ShapeMismatch {
        expected: "Token or Fees",
        message: format!("failed to get fees: {token_err}; {fees_err}"),
    })
}
