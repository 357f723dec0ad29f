use pretty_assertions::assert_eq;
use relayer_api::prelude::*;
use relayer_api::task::{
    ConstructProofTask, ExecuteTask, GatewayTransactionTask, QuorumReachedEvent,
    ReactToExpiredSigningSessionTask, ReactToRetriablePollTask, ReactToWasmEventTask, RefundTask,
    VerifyTask, WasmEvent, WasmEventAttribute,
};
use relayer_api::task_item::{
    ConstructProofTaskItem, DestinationChainTaskMetadata, ExecuteTaskItem,
    GatewayTransactionTaskItem, ReactToExpiredSigningSessionTaskItem,
    ReactToRetriablePollTaskItem, ReactToWasmEventTaskItem, RefundTaskItem,
    SourceChainTaskMetadata, VerifyTaskItem,
};
use relayer_core::{Base64Bytes, CrossChainID};

fn message() -> Message {
    Message {
        message_id: "0xabc-1".into(),
        source_chain: "ethereum".into(),
        source_address: "0xsource".into(),
        destination_address: "0xdestination".into(),
        payload_hash: Base64Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
    }
}

fn sample_tasks() -> Vec<TaskValue> {
    vec![
        TaskValue::ConstructProof(ConstructProofTask {
            message: message(),
            payload: Base64Bytes::from(&b"payload"[..]),
        }),
        TaskValue::Execute(ExecuteTask {
            message: message(),
            payload: Base64Bytes::from(&b"payload"[..]),
            available_gas_balance: Token::native("1000").with_token_id("uaxl"),
        }),
        TaskValue::GatewayTransaction(GatewayTransactionTask {
            execute_data: Base64Bytes::from(&b"execute"[..]),
        }),
        TaskValue::ReactToExpiredSigningSession(ReactToExpiredSigningSessionTask {
            session_id: 42,
            broadcast_id: "broadcast-1".into(),
            invoked_contract_address: "axelar1contract".into(),
            request_payload: Base64Bytes::from(&b"{}"[..]),
        }),
        TaskValue::ReactToWasmEvent(ReactToWasmEventTask {
            event: WasmEvent {
                kind: "wasm-voting_started".into(),
                attributes: vec![WasmEventAttribute {
                    key: "poll_id".into(),
                    value: "7".into(),
                }],
            },
            height: 1_234_567,
        }),
        TaskValue::Refund(RefundTask {
            message: message(),
            refund_recipient_address: "0xrefund".into(),
            remaining_gas_balance: Token::native("17"),
        }),
        TaskValue::Verify(VerifyTask {
            message: message(),
            payload: Base64Bytes::from(&b"payload"[..]),
            destination_chain: "avalanche".into(),
        }),
        TaskValue::ReactToRetriablePoll(ReactToRetriablePollTask {
            poll_id: 9,
            broadcast_id: "broadcast-2".into(),
            invoked_contract_address: "axelar1voting".into(),
            request_payload: Base64Bytes::from(&b"{}"[..]),
            quorum_reached_events: Some(vec![QuorumReachedEvent {
                status: "succeeded_on_chain".into(),
                content: serde_json::json!({"index": 0}),
            }]),
        }),
    ]
}

fn as_task_value(task: &Task, tag: &str) -> Result<TaskValue> {
    match tag {
        "CONSTRUCT_PROOF" => task.as_variant::<ConstructProofTask>().map(TaskValue::from),
        "EXECUTE" => task.as_variant::<ExecuteTask>().map(TaskValue::from),
        "GATEWAY_TX" => task.as_variant::<GatewayTransactionTask>().map(TaskValue::from),
        "REACT_TO_EXPIRED_SIGNING_SESSION" => task
            .as_variant::<ReactToExpiredSigningSessionTask>()
            .map(TaskValue::from),
        "REACT_TO_WASM_EVENT" => task.as_variant::<ReactToWasmEventTask>().map(TaskValue::from),
        "REFUND" => task.as_variant::<RefundTask>().map(TaskValue::from),
        "VERIFY" => task.as_variant::<VerifyTask>().map(TaskValue::from),
        "REACT_TO_RETRIABLE_POLL" => task
            .as_variant::<ReactToRetriablePollTask>()
            .map(TaskValue::from),
        other => panic!("no accessor for {other}"),
    }
}

#[test]
fn every_task_variant_round_trips_through_its_accessor() {
    for value in sample_tasks() {
        let task = value.to_union().unwrap();
        assert_eq!(task.discriminator().unwrap(), value.tag());
        assert_eq!(as_task_value(&task, value.tag()).unwrap(), value);
        assert_eq!(task.value_by_discriminator().unwrap(), value);
    }
}

#[test]
fn every_other_accessor_reports_a_type_mismatch() {
    for value in sample_tasks() {
        let task = value.to_union().unwrap();
        for tag in TaskValue::TAGS.iter().filter(|tag| **tag != value.tag()) {
            let err = as_task_value(&task, tag).unwrap_err();
            assert!(
                matches!(err, ApiError::TypeMismatch { .. }),
                "{} read as {tag}: {err:?}",
                value.tag()
            );
        }
    }
}

#[test]
fn task_encoding_is_stable() {
    for value in sample_tasks() {
        let first = serde_json::to_string(&value.to_union().unwrap()).unwrap();
        let decoded: Task = serde_json::from_str(&first).unwrap();
        let second = serde_json::to_string(&decoded).unwrap();
        assert_eq!(first, second);
        assert_eq!(decoded.value_by_discriminator().unwrap(), value);
    }
}

#[test]
fn task_items_accept_every_task_type() {
    for value in sample_tasks() {
        let task_json = match value.to_union().unwrap().raw().payload() {
            Some(payload) => payload.get().to_string(),
            None => unreachable!("encoded task has a payload"),
        };

        let mut item = TaskItem::default();
        item.set_task_from_json(value.tag(), &task_json).unwrap();

        assert_eq!(item.task_type().unwrap().as_str(), value.tag());
        assert_eq!(item.value_by_discriminator().unwrap().into_task(), value);
    }
}

#[test]
fn unknown_task_tag_is_rejected() {
    let task: Task = serde_json::from_str(r#"{"type":"TELEPORT","to":"moon"}"#).unwrap();
    assert_eq!(task.discriminator().unwrap(), "TELEPORT");
    assert_eq!(
        task.value_by_discriminator(),
        Err(ApiError::UnknownDiscriminator("TELEPORT".to_string()))
    );
    assert_eq!(
        task.task_type(),
        Err(ApiError::UnknownTaskType("TELEPORT".to_string()))
    );
}

fn scoped_messages() -> Option<Vec<CrossChainID>> {
    Some(vec![CrossChainID {
        source_chain: "ethereum".into(),
        message_id: "0xabc-1".into(),
    }])
}

fn destination_meta() -> Option<DestinationChainTaskMetadata> {
    Some(DestinationChainTaskMetadata {
        scoped_messages: scoped_messages(),
        source_context: Some([("xrpl.tx".to_string(), "0xsource-tx".to_string())].into()),
    })
}

fn source_meta() -> Option<SourceChainTaskMetadata> {
    Some(SourceChainTaskMetadata {
        scoped_messages: scoped_messages(),
    })
}

/// Every task sample wrapped as an item, alternating present and absent meta.
fn sample_task_items() -> Vec<TaskItemValue> {
    sample_tasks()
        .into_iter()
        .enumerate()
        .map(|(index, task)| {
            let with_meta = index % 2 == 0;
            let destination = destination_meta().filter(|_| with_meta);
            let source = source_meta().filter(|_| with_meta);

            match task {
                TaskValue::ConstructProof(task) => ConstructProofTaskItem {
                    task,
                    meta: destination,
                }
                .into(),
                TaskValue::Execute(task) => ExecuteTaskItem {
                    task,
                    meta: destination,
                }
                .into(),
                TaskValue::GatewayTransaction(task) => GatewayTransactionTaskItem {
                    task,
                    meta: destination,
                }
                .into(),
                TaskValue::ReactToExpiredSigningSession(task) => {
                    ReactToExpiredSigningSessionTaskItem { task, meta: source }.into()
                }
                TaskValue::ReactToWasmEvent(task) => {
                    ReactToWasmEventTaskItem { task, meta: source }.into()
                }
                TaskValue::Refund(task) => RefundTaskItem { task, meta: source }.into(),
                TaskValue::Verify(task) => VerifyTaskItem { task, meta: source }.into(),
                TaskValue::ReactToRetriablePoll(task) => {
                    ReactToRetriablePollTaskItem { task, meta: source }.into()
                }
            }
        })
        .collect()
}

fn as_task_item_value(item: &TaskItem, tag: &str) -> Result<TaskItemValue> {
    match tag {
        "CONSTRUCT_PROOF" => item
            .as_variant::<ConstructProofTaskItem>()
            .map(TaskItemValue::from),
        "EXECUTE" => item.as_variant::<ExecuteTaskItem>().map(TaskItemValue::from),
        "GATEWAY_TX" => item
            .as_variant::<GatewayTransactionTaskItem>()
            .map(TaskItemValue::from),
        "REACT_TO_EXPIRED_SIGNING_SESSION" => item
            .as_variant::<ReactToExpiredSigningSessionTaskItem>()
            .map(TaskItemValue::from),
        "REACT_TO_WASM_EVENT" => item
            .as_variant::<ReactToWasmEventTaskItem>()
            .map(TaskItemValue::from),
        "REFUND" => item.as_variant::<RefundTaskItem>().map(TaskItemValue::from),
        "VERIFY" => item.as_variant::<VerifyTaskItem>().map(TaskItemValue::from),
        "REACT_TO_RETRIABLE_POLL" => item
            .as_variant::<ReactToRetriablePollTaskItem>()
            .map(TaskItemValue::from),
        other => panic!("no accessor for {other}"),
    }
}

#[test]
fn samples_cover_every_task_item_tag() {
    let tags: Vec<&str> = sample_task_items().iter().map(TaskItemValue::tag).collect();
    assert_eq!(tags, TaskItemValue::TAGS.to_vec());
    assert_eq!(TaskItemValue::TAGS, TaskValue::TAGS);
}

#[test]
fn every_task_item_variant_round_trips_through_its_accessor() {
    for value in sample_task_items() {
        let item = value.to_union().unwrap();
        assert_eq!(item.discriminator().unwrap(), value.tag());
        assert_eq!(item.task_type().unwrap().as_str(), value.tag());
        assert_eq!(as_task_item_value(&item, value.tag()).unwrap(), value);
        assert_eq!(item.value_by_discriminator().unwrap(), value);
        assert_eq!(
            item.task().unwrap().value_by_discriminator().unwrap(),
            value.clone().into_task()
        );
    }
}

#[test]
fn every_other_task_item_accessor_reports_a_type_mismatch() {
    for value in sample_task_items() {
        let item = value.to_union().unwrap();
        for tag in TaskItemValue::TAGS.iter().filter(|tag| **tag != value.tag()) {
            let err = as_task_item_value(&item, tag).unwrap_err();
            assert!(
                matches!(err, ApiError::TypeMismatch { .. }),
                "{} read as {tag}: {err:?}",
                value.tag()
            );
        }
    }
}

#[test]
fn task_item_encoding_is_stable() {
    for value in sample_task_items() {
        let first = serde_json::to_string(&value.to_union().unwrap()).unwrap();
        assert!(first.starts_with(&format!(r#"{{"type":"{}","task":{{"#, value.tag())));

        let decoded: TaskItem = serde_json::from_str(&first).unwrap();
        assert_eq!(serde_json::to_string(&decoded).unwrap(), first);
        assert_eq!(decoded.value_by_discriminator().unwrap(), value);

        let reencoded = decoded.value_by_discriminator().unwrap().to_union().unwrap();
        assert_eq!(serde_json::to_string(&reencoded).unwrap(), first);
    }
}
