//! Task envelopes returned by the task feed.

use chrono::{DateTime, Utc};
use relayer_core::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::TaskType;
use crate::task_item::TaskItem;

/// Identifier of a task item.
pub type TaskItemID = Uuid;

/// A task item addressed to a chain, as published by the task feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub id: TaskItemID,
    pub chain: String,
    pub timestamp: DateTime<Utc>,
    pub task: TaskItem,
}

impl TaskEnvelope {
    pub fn task_item_id(&self) -> TaskItemID {
        self.id
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Type of the enclosed task item.
    pub fn task_type(&self) -> Result<TaskType> {
        self.task.task_type()
    }
}
