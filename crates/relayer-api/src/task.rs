//! Outbound work units.
//!
//! A [`Task`] is a flat union: the `type` tag and the fields of the active
//! variant share the same JSON object.

use std::fmt;
use std::str::FromStr;

use relayer_core::{
    union_registry, ApiError, Base64Bytes, Message, RawUnion, Result, Token, UnionContainer,
};
use serde::{Deserialize, Serialize};

/// Union of every task variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Task(RawUnion);

union_registry! {
    /// A decoded task of any registered type.
    #[derive(Debug, Clone, PartialEq)]
    pub enum TaskValue for Task {
        ConstructProof(ConstructProofTask) = "CONSTRUCT_PROOF",
        Execute(ExecuteTask) = "EXECUTE",
        GatewayTransaction(GatewayTransactionTask) = "GATEWAY_TX",
        ReactToExpiredSigningSession(ReactToExpiredSigningSessionTask) = "REACT_TO_EXPIRED_SIGNING_SESSION",
        ReactToWasmEvent(ReactToWasmEventTask) = "REACT_TO_WASM_EVENT",
        Refund(RefundTask) = "REFUND",
        Verify(VerifyTask) = "VERIFY",
        ReactToRetriablePoll(ReactToRetriablePollTask) = "REACT_TO_RETRIABLE_POLL",
    }
}

impl Task {
    /// The tag parsed into [`TaskType`].
    pub fn task_type(&self) -> Result<TaskType> {
        self.discriminator()?.parse()
    }
}

/// Closed set of task types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "CONSTRUCT_PROOF")]
    ConstructProof,
    #[serde(rename = "EXECUTE")]
    Execute,
    #[serde(rename = "GATEWAY_TX")]
    GatewayTransaction,
    #[serde(rename = "REACT_TO_EXPIRED_SIGNING_SESSION")]
    ReactToExpiredSigningSession,
    #[serde(rename = "REACT_TO_WASM_EVENT")]
    ReactToWasmEvent,
    #[serde(rename = "REFUND")]
    Refund,
    #[serde(rename = "VERIFY")]
    Verify,
    #[serde(rename = "REACT_TO_RETRIABLE_POLL")]
    ReactToRetriablePoll,
}

impl TaskType {
    pub const ALL: [TaskType; 8] = [
        TaskType::ConstructProof,
        TaskType::Execute,
        TaskType::GatewayTransaction,
        TaskType::ReactToExpiredSigningSession,
        TaskType::ReactToWasmEvent,
        TaskType::Refund,
        TaskType::Verify,
        TaskType::ReactToRetriablePoll,
    ];

    /// Wire tag of this task type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::ConstructProof => "CONSTRUCT_PROOF",
            TaskType::Execute => "EXECUTE",
            TaskType::GatewayTransaction => "GATEWAY_TX",
            TaskType::ReactToExpiredSigningSession => "REACT_TO_EXPIRED_SIGNING_SESSION",
            TaskType::ReactToWasmEvent => "REACT_TO_WASM_EVENT",
            TaskType::Refund => "REFUND",
            TaskType::Verify => "VERIFY",
            TaskType::ReactToRetriablePoll => "REACT_TO_RETRIABLE_POLL",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        TaskType::ALL
            .into_iter()
            .find(|task_type| task_type.as_str() == s)
            .ok_or_else(|| ApiError::UnknownTaskType(s.to_string()))
    }
}

/// Build a proof for a message on a chain without a gateway contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructProofTask {
    pub message: Message,
    pub payload: Base64Bytes,
}

/// Execute an approved message on the destination chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTask {
    pub message: Message,
    pub payload: Base64Bytes,
    pub available_gas_balance: Token,
}

/// Broadcast a prepared transaction to the destination gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTransactionTask {
    pub execute_data: Base64Bytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactToExpiredSigningSessionTask {
    #[serde(rename = "sessionID")]
    pub session_id: u64,
    #[serde(rename = "broadcastID")]
    pub broadcast_id: String,
    pub invoked_contract_address: String,
    pub request_payload: Base64Bytes,
}

/// Attribute of a wasm event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasmEventAttribute {
    pub key: String,
    pub value: String,
}

/// Event emitted by a wasm contract on the hub chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasmEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Vec<WasmEventAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactToWasmEventTask {
    pub event: WasmEvent,
    pub height: u64,
}

/// Refund the remaining gas balance of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundTask {
    pub message: Message,
    pub refund_recipient_address: String,
    pub remaining_gas_balance: Token,
}

/// Verify a message on the source chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTask {
    pub message: Message,
    pub payload: Base64Bytes,
    pub destination_chain: String,
}

/// Quorum reached on one poll item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuorumReachedEvent {
    pub status: String,
    pub content: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactToRetriablePollTask {
    #[serde(rename = "pollID")]
    pub poll_id: u64,
    #[serde(rename = "broadcastID")]
    pub broadcast_id: String,
    pub invoked_contract_address: String,
    pub request_payload: Base64Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorum_reached_events: Option<Vec<QuorumReachedEvent>>,
}
