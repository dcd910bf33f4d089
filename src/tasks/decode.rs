//! Decoding of task nodes from the control endpoint.
//!
//! A node is a JSON object with a `task_type` discriminator, a `task_id`, and
//! the fields of its variant. The upstream tree format is string-valued, so
//! numbers and booleans are accepted either natively or as strings.

use serde_json::Value;
use uuid::Uuid;

use crate::agent::MeanDwell;
use crate::error::DecodeError;
use crate::tasks::{ConfigureTask, ExecuteTask, GetTask, ListTask, PutTask, Task};

/// Decode one task node.
pub fn decode_task(node: &Value) -> Result<Task, DecodeError> {
    if !node.is_object() {
        return Err(DecodeError::NotAnObject);
    }

    let task_type = str_field(node, "task_type")?;
    let id = id_field(node)?;

    let task: Task = match task_type {
        GetTask::KEY => GetTask::new(id, str_field(node, "path")?).into(),
        PutTask::KEY => PutTask::new(
            id,
            str_field(node, "path")?,
            str_field(node, "contents")?,
        )
        .into(),
        ListTask::KEY => ListTask::new(id, str_field(node, "path")?, depth_field(node)?).into(),
        ExecuteTask::KEY => ExecuteTask::new(id, str_field(node, "command")?).into(),
        ConfigureTask::KEY => ConfigureTask::new(
            id,
            mean_dwell_field(node)?,
            bool_field(node, "is_running")?,
        )
        .into(),
        other => {
            return Err(DecodeError::UnknownTaskType {
                task_type: other.to_string(),
            });
        }
    };

    Ok(task)
}

fn field<'a>(node: &'a Value, field: &'static str) -> Result<&'a Value, DecodeError> {
    node.get(field)
        .filter(|v| !v.is_null())
        .ok_or(DecodeError::MissingField { field })
}

fn str_field<'a>(node: &'a Value, name: &'static str) -> Result<&'a str, DecodeError> {
    field(node, name)?
        .as_str()
        .ok_or_else(|| DecodeError::InvalidField {
            field: name,
            reason: "expected a string".to_string(),
        })
}

fn id_field(node: &Value) -> Result<Uuid, DecodeError> {
    let raw = str_field(node, "task_id")?;
    Uuid::parse_str(raw).map_err(|e| DecodeError::InvalidField {
        field: "task_id",
        reason: e.to_string(),
    })
}

fn depth_field(node: &Value) -> Result<u8, DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidField {
        field: "depth",
        reason,
    };

    let depth = match field(node, "depth")? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| invalid(format!("{} is not a non-negative integer", n)))?,
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(format!("'{}': {}", s, e)))?,
        other => return Err(invalid(format!("expected an integer, got {}", other))),
    };

    u8::try_from(depth).map_err(|_| invalid(format!("{} exceeds 255", depth)))
}

fn mean_dwell_field(node: &Value) -> Result<MeanDwell, DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidField {
        field: "mean_dwell",
        reason,
    };

    let seconds = match field(node, "mean_dwell")? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("{} is not representable", n)))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(format!("'{}': {}", s, e)))?,
        other => return Err(invalid(format!("expected a number, got {}", other))),
    };

    MeanDwell::new(seconds).map_err(|e| invalid(e.to_string()))
}

fn bool_field(node: &Value, name: &'static str) -> Result<bool, DecodeError> {
    match field(node, name)? {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(DecodeError::InvalidField {
            field: name,
            reason: format!("expected a boolean, got {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "6f1c2a3e-8c4d-4b7a-9f0e-1a2b3c4d5e6f";

    fn id() -> Uuid {
        Uuid::parse_str(ID).unwrap()
    }

    #[test]
    fn test_decode_each_variant() {
        let get = decode_task(&json!({"task_type": "get", "task_id": ID, "path": "/etc/hostname"}));
        assert_eq!(get.unwrap(), Task::from(GetTask::new(id(), "/etc/hostname")));

        let put = decode_task(
            &json!({"task_type": "put", "task_id": ID, "path": "/tmp/x", "contents": "hi"}),
        );
        assert_eq!(put.unwrap(), Task::from(PutTask::new(id(), "/tmp/x", "hi")));

        let list = decode_task(&json!({"task_type": "list", "task_id": ID, "path": "/tmp", "depth": 2}));
        assert_eq!(list.unwrap(), Task::from(ListTask::new(id(), "/tmp", 2)));

        let exec = decode_task(&json!({"task_type": "execute", "task_id": ID, "command": "uname -a"}));
        assert_eq!(exec.unwrap(), Task::from(ExecuteTask::new(id(), "uname -a")));

        let configure = decode_task(&json!({
            "task_type": "configure",
            "task_id": ID,
            "mean_dwell": 2.5,
            "is_running": false
        }));
        assert_eq!(
            configure.unwrap(),
            Task::from(ConfigureTask::new(id(), MeanDwell::new(2.5).unwrap(), false))
        );
    }

    #[test]
    fn test_decode_accepts_string_encoded_scalars() {
        let list = decode_task(&json!({"task_type": "list", "task_id": ID, "path": "/", "depth": "3"}));
        assert_eq!(list.unwrap(), Task::from(ListTask::new(id(), "/", 3)));

        let configure = decode_task(&json!({
            "task_type": "configure",
            "task_id": ID,
            "mean_dwell": "0.5",
            "is_running": "true"
        }));
        assert_eq!(
            configure.unwrap(),
            Task::from(ConfigureTask::new(id(), MeanDwell::new(0.5).unwrap(), true))
        );
    }

    #[test]
    fn test_unknown_task_type() {
        let err = decode_task(&json!({"task_type": "delete", "task_id": ID, "path": "/"}))
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnknownTaskType { task_type } if task_type == "delete"));
    }

    #[test]
    fn test_missing_and_malformed_fields() {
        let err = decode_task(&json!({"task_type": "get", "task_id": ID})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: "path" }));

        let err = decode_task(&json!({"task_type": "get", "path": "/"})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: "task_id" }));

        let err = decode_task(&json!({"task_type": "get", "task_id": "nope", "path": "/"}))
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "task_id", .. }));

        let err = decode_task(&json!({"task_type": "list", "task_id": ID, "path": "/", "depth": "deep"}))
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "depth", .. }));

        let err = decode_task(&json!({"task_type": "list", "task_id": ID, "path": "/", "depth": 256}))
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "depth", .. }));

        let err = decode_task(&json!({
            "task_type": "configure",
            "task_id": ID,
            "mean_dwell": 1.0,
            "is_running": "yes"
        }))
        .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "is_running", .. }));

        let err = decode_task(&json!("get")).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject));
    }

    #[test]
    fn test_non_positive_mean_dwell_is_rejected() {
        for bad in [json!(0), json!(-1.5), json!("0")] {
            let err = decode_task(&json!({
                "task_type": "configure",
                "task_id": ID,
                "mean_dwell": bad,
                "is_running": true
            }))
            .unwrap_err();
            assert!(matches!(err, DecodeError::InvalidField { field: "mean_dwell", .. }));
        }
    }
}
