//! Inbound notifications.
//!
//! An [`Event`] is a flat union like [`Task`](crate::task::Task). On top of
//! the typed accessors it carries a validation layer keyed by event type that
//! checks the `cost` field without decoding the full variant.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use relayer_core::{
    union_registry, ApiError, Base64Bytes, Cost, CostBearing, CrossChainID, Message,
    MessageExecutionStatus, RawUnion, Result, Token, TokenManagerType, UnionContainer,
    UnsignedToken,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Union of every event variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(RawUnion);

union_registry! {
    /// A decoded event of any registered type.
    #[derive(Debug, Clone, PartialEq)]
    pub enum EventValue for Event {
        GasCredit(GasCreditEvent) = "GAS_CREDIT",
        GasRefunded(GasRefundedEvent) = "GAS_REFUNDED",
        Call(CallEvent) = "CALL",
        MessageApproved(MessageApprovedEvent) = "MESSAGE_APPROVED",
        MessageExecuted(MessageExecutedEvent) = "MESSAGE_EXECUTED",
        MessageExecutedV2(MessageExecutedEventV2) = "MESSAGE_EXECUTED/V2",
        CannotExecuteMessage(CannotExecuteMessageEvent) = "CANNOT_EXECUTE_MESSAGE",
        CannotExecuteMessageV2(CannotExecuteMessageEventV2) = "CANNOT_EXECUTE_MESSAGE/V2",
        CannotRouteMessage(CannotRouteMessageEvent) = "CANNOT_ROUTE_MESSAGE",
        CannotExecuteTask(CannotExecuteTaskEvent) = "CANNOT_EXECUTE_TASK",
        SignersRotated(SignersRotatedEvent) = "SIGNERS_ROTATED",
        ITSInterchainTransfer(ITSInterchainTransferEvent) = "ITS/INTERCHAIN_TRANSFER",
        ITSInterchainTokenDeploymentStarted(ITSInterchainTokenDeploymentStartedEvent) = "ITS/INTERCHAIN_TOKEN_DEPLOYMENT_STARTED",
        ITSLinkTokenStarted(ITSLinkTokenStartedEvent) = "ITS/LINK_TOKEN_STARTED",
        ITSTokenMetadataRegistered(ITSTokenMetadataRegisteredEvent) = "ITS/TOKEN_METADATA_REGISTERED",
        AppInterchainTransferSent(AppInterchainTransferSentEvent) = "APP/INTERCHAIN_TRANSFER_SENT",
        AppInterchainTransferReceived(AppInterchainTransferReceivedEvent) = "APP/INTERCHAIN_TRANSFER_RECEIVED",
    }
}

#[derive(Deserialize)]
struct EventIdShadow {
    #[serde(rename = "eventID")]
    event_id: String,
}

#[derive(Deserialize)]
struct CostShadow {
    cost: Option<Cost>,
}

impl Event {
    /// Id of the held event, read without decoding the full variant.
    pub fn event_id(&self) -> Result<String> {
        let shadow: EventIdShadow = self.0.decode_partial("eventID")?;
        Ok(shadow.event_id)
    }

    /// The tag parsed into [`EventType`].
    pub fn event_type(&self) -> Result<EventType> {
        self.discriminator()?.parse()
    }

    /// Check the semantic rules attached to the event type.
    ///
    /// Only the `cost` key of the payload is decoded. Events without a tag, or
    /// with a tag that carries no rule, are always valid.
    pub fn validate(&self) -> Result<()> {
        let Ok(event_type) = self.event_type() else {
            return Ok(());
        };

        match event_type.cost_rule() {
            CostRule::Ignored => Ok(()),
            CostRule::Optional => self.validate_cost(event_type, false),
            CostRule::Required => self.validate_cost(event_type, true),
        }
    }

    fn validate_cost(&self, event_type: EventType, mandatory: bool) -> Result<()> {
        let shadow: CostShadow = self.0.decode_partial("cost")?;

        let Some(cost) = shadow.cost else {
            if mandatory {
                debug!(%event_type, "event is missing a mandatory cost");
                return Err(ApiError::MissingCost {
                    event_type: event_type.to_string(),
                });
            }
            return Ok(());
        };

        cost.validate()
    }
}

/// What an event type requires of its `cost` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostRule {
    /// Cost is not inspected.
    Ignored,
    /// Cost may be absent; if present it must be valid.
    Optional,
    /// Cost must be present and valid.
    Required,
}

/// Closed set of event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    GasCredit,
    GasRefunded,
    Call,
    MessageApproved,
    MessageExecuted,
    MessageExecutedV2,
    CannotExecuteMessage,
    CannotExecuteMessageV2,
    CannotRouteMessage,
    CannotExecuteTask,
    SignersRotated,
    ITSInterchainTransfer,
    ITSInterchainTokenDeploymentStarted,
    ITSLinkTokenStarted,
    ITSTokenMetadataRegistered,
    AppInterchainTransferSent,
    AppInterchainTransferReceived,
}

impl EventType {
    pub const ALL: [EventType; 17] = [
        EventType::GasCredit,
        EventType::GasRefunded,
        EventType::Call,
        EventType::MessageApproved,
        EventType::MessageExecuted,
        EventType::MessageExecutedV2,
        EventType::CannotExecuteMessage,
        EventType::CannotExecuteMessageV2,
        EventType::CannotRouteMessage,
        EventType::CannotExecuteTask,
        EventType::SignersRotated,
        EventType::ITSInterchainTransfer,
        EventType::ITSInterchainTokenDeploymentStarted,
        EventType::ITSLinkTokenStarted,
        EventType::ITSTokenMetadataRegistered,
        EventType::AppInterchainTransferSent,
        EventType::AppInterchainTransferReceived,
    ];

    /// Wire tag of this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::GasCredit => "GAS_CREDIT",
            EventType::GasRefunded => "GAS_REFUNDED",
            EventType::Call => "CALL",
            EventType::MessageApproved => "MESSAGE_APPROVED",
            EventType::MessageExecuted => "MESSAGE_EXECUTED",
            EventType::MessageExecutedV2 => "MESSAGE_EXECUTED/V2",
            EventType::CannotExecuteMessage => "CANNOT_EXECUTE_MESSAGE",
            EventType::CannotExecuteMessageV2 => "CANNOT_EXECUTE_MESSAGE/V2",
            EventType::CannotRouteMessage => "CANNOT_ROUTE_MESSAGE",
            EventType::CannotExecuteTask => "CANNOT_EXECUTE_TASK",
            EventType::SignersRotated => "SIGNERS_ROTATED",
            EventType::ITSInterchainTransfer => "ITS/INTERCHAIN_TRANSFER",
            EventType::ITSInterchainTokenDeploymentStarted => {
                "ITS/INTERCHAIN_TOKEN_DEPLOYMENT_STARTED"
            }
            EventType::ITSLinkTokenStarted => "ITS/LINK_TOKEN_STARTED",
            EventType::ITSTokenMetadataRegistered => "ITS/TOKEN_METADATA_REGISTERED",
            EventType::AppInterchainTransferSent => "APP/INTERCHAIN_TRANSFER_SENT",
            EventType::AppInterchainTransferReceived => "APP/INTERCHAIN_TRANSFER_RECEIVED",
        }
    }

    /// Cost requirement of this event type.
    pub fn cost_rule(&self) -> CostRule {
        match self {
            EventType::CannotExecuteTask => CostRule::Optional,
            EventType::GasRefunded
            | EventType::MessageApproved
            | EventType::MessageExecuted
            | EventType::MessageExecutedV2 => CostRule::Required,
            _ => CostRule::Ignored,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        EventType::ALL
            .into_iter()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| ApiError::UnknownDiscriminator(s.to_string()))
    }
}

impl Serialize for EventType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// Chain-scoped metadata common to every event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    #[serde(rename = "txID", skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized: Option<bool>,
}

impl EventMetadata {
    /// Metadata for an event observed in transaction `tx_id`.
    pub fn for_tx(tx_id: impl Into<String>) -> Self {
        Self {
            tx_id: Some(tx_id.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEventMetadata {
    #[serde(flatten)]
    pub base: EventMetadata,

    #[serde(rename = "parentMessageID", skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_source_chain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_context: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageApprovedEventMetadata {
    #[serde(flatten)]
    pub base: EventMetadata,

    #[serde(rename = "commandID", skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageExecutedEventMetadata {
    #[serde(flatten)]
    pub base: EventMetadata,

    #[serde(rename = "commandID", skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,

    #[serde(rename = "childMessageIDs", skip_serializing_if = "Option::is_none")]
    pub child_message_ids: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revert_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignersRotatedEventMetadata {
    #[serde(flatten)]
    pub base: EventMetadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signers_hash: Option<Base64Bytes>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u64>,
}

/// Fields shared by every event, usable to read the id of an unknown event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBase {
    #[serde(rename = "eventID")]
    pub event_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
}

/// Why a message or task could not be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CannotExecuteReason {
    InsufficientGas,
    Error,
}

/// Gas paid for a message on the source chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCreditEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub refund_address: String,
    pub payment: Token,
}

/// Unused gas returned to the payer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasRefundedEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub recipient_address: String,
    pub refunded_amount: Token,
    pub cost: Cost,
}

/// A contract call initiated on the source chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<CallEventMetadata>,
    pub message: Message,
    pub destination_chain: String,
    pub payload: Base64Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_token: Option<Token>,
}

/// A message approved on the destination gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageApprovedEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MessageApprovedEventMetadata>,
    pub message: Message,
    pub cost: Cost,
}

/// A message executed on the destination chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageExecutedEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MessageExecutedEventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub source_chain: String,
    pub status: MessageExecutionStatus,
    pub cost: Cost,
}

/// A message executed successfully, identified by its cross-chain id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageExecutedEventV2 {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MessageExecutedEventMetadata>,
    #[serde(rename = "crossChainID")]
    pub cross_chain_id: CrossChainID,
    pub cost: Cost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CannotExecuteMessageEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "taskItemID")]
    pub task_item_id: Uuid,
    pub reason: CannotExecuteReason,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CannotExecuteMessageEventV2 {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub source_chain: String,
    pub reason: CannotExecuteReason,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CannotRouteMessageEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub source_chain: String,
    pub reason: String,
    pub details: String,
}

/// A task the relayer gave up on, optionally with the cost it incurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CannotExecuteTaskEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "taskItemID")]
    pub task_item_id: Uuid,
    pub reason: CannotExecuteReason,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Cost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignersRotatedEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SignersRotatedEventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub source_chain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ITSInterchainTransferEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub source_chain: String,
    pub destination_chain: String,
    pub token_spent: Token,
    pub source_address: String,
    pub destination_address: String,
    pub data_hash: Base64Bytes,
}

/// Token deployed through the interchain token service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchainTokenDefinition {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ITSInterchainTokenDeploymentStartedEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub destination_chain: String,
    pub token: InterchainTokenDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ITSLinkTokenStartedEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub destination_chain: String,
    #[serde(rename = "tokenID")]
    pub token_id: String,
    pub source_token_address: String,
    pub destination_token_address: String,
    pub token_manager_type: TokenManagerType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ITSTokenMetadataRegisteredEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub address: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInterchainTransferSentEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub source_chain: String,
    pub destination_chain: String,
    pub sender: String,
    pub recipient: String,
    pub token_spent: UnsignedToken,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInterchainTransferReceivedEvent {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMetadata>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub source_chain: String,
    pub sender: String,
    pub recipient: String,
    pub token_received: UnsignedToken,
}

impl CostBearing for CannotExecuteTaskEvent {
    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn tx_id(&self) -> Option<&str> {
        self.meta.as_ref()?.tx_id.as_deref()
    }

    fn cost(&self) -> Option<&Cost> {
        self.cost.as_ref()
    }
}

impl CostBearing for GasRefundedEvent {
    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn tx_id(&self) -> Option<&str> {
        self.meta.as_ref()?.tx_id.as_deref()
    }

    fn cost(&self) -> Option<&Cost> {
        Some(&self.cost)
    }
}

impl CostBearing for MessageApprovedEvent {
    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn tx_id(&self) -> Option<&str> {
        self.meta.as_ref()?.base.tx_id.as_deref()
    }

    fn cost(&self) -> Option<&Cost> {
        Some(&self.cost)
    }
}

impl CostBearing for MessageExecutedEvent {
    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn tx_id(&self) -> Option<&str> {
        self.meta.as_ref()?.base.tx_id.as_deref()
    }

    fn cost(&self) -> Option<&Cost> {
        Some(&self.cost)
    }
}

impl CostBearing for MessageExecutedEventV2 {
    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn tx_id(&self) -> Option<&str> {
        self.meta.as_ref()?.base.tx_id.as_deref()
    }

    fn cost(&self) -> Option<&Cost> {
        Some(&self.cost)
    }
}

/// Common view over [`MessageExecutedEvent`] and [`MessageExecutedEventV2`].
pub trait GeneralizedMessageExecutedEvent: CostBearing {
    fn cross_chain_id(&self) -> CrossChainID;

    fn status(&self) -> MessageExecutionStatus;

    fn meta(&self) -> Option<&MessageExecutedEventMetadata>;
}

impl GeneralizedMessageExecutedEvent for MessageExecutedEvent {
    fn cross_chain_id(&self) -> CrossChainID {
        CrossChainID {
            source_chain: self.source_chain.clone(),
            message_id: self.message_id.clone(),
        }
    }

    fn status(&self) -> MessageExecutionStatus {
        self.status
    }

    fn meta(&self) -> Option<&MessageExecutedEventMetadata> {
        self.meta.as_ref()
    }
}

impl GeneralizedMessageExecutedEvent for MessageExecutedEventV2 {
    fn cross_chain_id(&self) -> CrossChainID {
        self.cross_chain_id.clone()
    }

    /// V2 events are only emitted for successful executions.
    fn status(&self) -> MessageExecutionStatus {
        MessageExecutionStatus::Successful
    }

    fn meta(&self) -> Option<&MessageExecutedEventMetadata> {
        self.meta.as_ref()
    }
}
