//! # Relayer API
//!
//! Task and event unions of the cross-chain relayer API.
//!
//! - [`Task`] - Outbound work units, flat `{type, ...fields}` objects
//! - [`TaskItem`] - Tasks as handed to relayers, `{type, task, meta?}` objects
//! - [`Event`] - Inbound notifications, with cost validation
//! - [`TaskEnvelope`] - A task item addressed to a chain

pub mod envelope;
pub mod event;
pub mod task;
pub mod task_item;

pub use envelope::{TaskEnvelope, TaskItemID};
pub use event::{
    CostRule, Event, EventBase, EventMetadata, EventType, EventValue,
    GeneralizedMessageExecutedEvent,
};
pub use task::{Task, TaskType, TaskValue};
pub use task_item::{TaskItem, TaskItemValue};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::envelope::TaskEnvelope;
    pub use crate::event::{Event, EventType, EventValue, GeneralizedMessageExecutedEvent};
    pub use crate::task::{Task, TaskType, TaskValue};
    pub use crate::task_item::{TaskItem, TaskItemValue};
    pub use relayer_core::prelude::*;
}
