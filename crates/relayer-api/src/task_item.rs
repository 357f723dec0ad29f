//! Task items as handed to relayers.
//!
//! Unlike [`Task`], a [`TaskItem`] nests the task fields under a `task` key
//! next to an optional `meta` object: `{"type": ..., "task": {...}, "meta": {...}}`.

use std::collections::BTreeMap;

use relayer_core::{
    union_registry, ApiError, CrossChainID, RawUnion, Result, UnionContainer, Variant,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::task::{
    ConstructProofTask, ExecuteTask, GatewayTransactionTask, ReactToExpiredSigningSessionTask,
    ReactToRetriablePollTask, ReactToWasmEventTask, RefundTask, Task, TaskType, TaskValue,
    VerifyTask,
};

/// Union of every task item variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskItem(RawUnion);

union_registry! {
    /// A decoded task item of any registered type.
    #[derive(Debug, Clone, PartialEq)]
    pub enum TaskItemValue for TaskItem {
        ConstructProof(ConstructProofTaskItem) = "CONSTRUCT_PROOF",
        Execute(ExecuteTaskItem) = "EXECUTE",
        GatewayTransaction(GatewayTransactionTaskItem) = "GATEWAY_TX",
        ReactToExpiredSigningSession(ReactToExpiredSigningSessionTaskItem) = "REACT_TO_EXPIRED_SIGNING_SESSION",
        ReactToWasmEvent(ReactToWasmEventTaskItem) = "REACT_TO_WASM_EVENT",
        Refund(RefundTaskItem) = "REFUND",
        Verify(VerifyTaskItem) = "VERIFY",
        ReactToRetriablePoll(ReactToRetriablePollTaskItem) = "REACT_TO_RETRIABLE_POLL",
    }
}

impl TaskItem {
    /// The tag parsed into [`TaskType`].
    pub fn task_type(&self) -> Result<TaskType> {
        self.discriminator()?.parse()
    }

    /// The nested task as a flat [`Task`] union.
    pub fn task(&self) -> Result<Task> {
        self.value_by_discriminator()?.into_task().to_union()
    }

    /// Replace the task with `task_json` decoded as `task_type`.
    ///
    /// The type comes from outside the payload; the JSON itself need not carry
    /// a tag. Fields already on the item other than `type` and `task` (such as
    /// `meta`) are kept.
    pub fn set_task_from_json(&mut self, task_type: &str, task_json: &str) -> Result<()> {
        let task_type: TaskType = task_type.parse()?;
        debug!(%task_type, "setting task item from json");

        match task_type {
            TaskType::ConstructProof => self.set_task(task_json, |task| ConstructProofTaskItem {
                task,
                meta: None,
            }),
            TaskType::Execute => {
                self.set_task(task_json, |task| ExecuteTaskItem { task, meta: None })
            }
            TaskType::GatewayTransaction => {
                self.set_task(task_json, |task| GatewayTransactionTaskItem { task, meta: None })
            }
            TaskType::ReactToExpiredSigningSession => {
                self.set_task(task_json, |task| ReactToExpiredSigningSessionTaskItem {
                    task,
                    meta: None,
                })
            }
            TaskType::ReactToWasmEvent => {
                self.set_task(task_json, |task| ReactToWasmEventTaskItem { task, meta: None })
            }
            TaskType::Refund => {
                self.set_task(task_json, |task| RefundTaskItem { task, meta: None })
            }
            TaskType::Verify => {
                self.set_task(task_json, |task| VerifyTaskItem { task, meta: None })
            }
            TaskType::ReactToRetriablePoll => self.set_task(task_json, |task| {
                ReactToRetriablePollTaskItem { task, meta: None }
            }),
        }
    }

    fn set_task<T, I>(&mut self, task_json: &str, wrap: impl FnOnce(T) -> I) -> Result<()>
    where
        T: Variant<Union = Task>,
        I: Variant<Union = TaskItem>,
    {
        let task: T = serde_json::from_str(task_json).map_err(|e| ApiError::decode(T::NAME, e))?;
        self.merge_variant(&wrap(task))
    }
}

impl TaskItemValue {
    /// Drop the item metadata, keeping the task.
    pub fn into_task(self) -> TaskValue {
        match self {
            TaskItemValue::ConstructProof(item) => TaskValue::ConstructProof(item.task),
            TaskItemValue::Execute(item) => TaskValue::Execute(item.task),
            TaskItemValue::GatewayTransaction(item) => TaskValue::GatewayTransaction(item.task),
            TaskItemValue::ReactToExpiredSigningSession(item) => {
                TaskValue::ReactToExpiredSigningSession(item.task)
            }
            TaskItemValue::ReactToWasmEvent(item) => TaskValue::ReactToWasmEvent(item.task),
            TaskItemValue::Refund(item) => TaskValue::Refund(item.task),
            TaskItemValue::Verify(item) => TaskValue::Verify(item.task),
            TaskItemValue::ReactToRetriablePoll(item) => TaskValue::ReactToRetriablePoll(item.task),
        }
    }
}

/// Metadata of tasks executed on the destination chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationChainTaskMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoped_messages: Option<Vec<CrossChainID>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_context: Option<BTreeMap<String, String>>,
}

/// Metadata of tasks executed on the source chain or the hub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceChainTaskMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoped_messages: Option<Vec<CrossChainID>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructProofTaskItem {
    pub task: ConstructProofTask,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<DestinationChainTaskMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteTaskItem {
    pub task: ExecuteTask,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<DestinationChainTaskMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayTransactionTaskItem {
    pub task: GatewayTransactionTask,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<DestinationChainTaskMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactToExpiredSigningSessionTaskItem {
    pub task: ReactToExpiredSigningSessionTask,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SourceChainTaskMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactToWasmEventTaskItem {
    pub task: ReactToWasmEventTask,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SourceChainTaskMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundTaskItem {
    pub task: RefundTask,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SourceChainTaskMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyTaskItem {
    pub task: VerifyTask,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SourceChainTaskMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactToRetriablePollTaskItem {
    pub task: ReactToRetriablePollTask,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SourceChainTaskMetadata>,
}
