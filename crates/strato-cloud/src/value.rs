//! Navigation through dynamic JSON responses
//!
//! Most API responses deserialize into typed structs. A few are genuinely
//! dynamic — job results whose `entities` shape depends on the job kind,
//! status fields polled before the full response type is known. For those
//! this module walks a [`serde_json::Value`] by path, reporting *missing*
//! and *wrong type* as distinct errors instead of silently falling back.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Why a path lookup failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("no value at {0:?}")]
    NotFound(String),

    #[error("value at {path:?} is not {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
    },
}

/// Walk `root` along `path`, one object key per element.
///
/// `indices` optionally maps a dot-joined path prefix to an array index:
/// after descending to a prefix listed there, the value at that prefix must
/// be an array and navigation continues at the given element. This mirrors
/// how list-typed configuration blocks are addressed (`"node_config" -> 0`).
pub fn navigate_value<'a>(
    root: &'a Value,
    path: &[&str],
    indices: Option<&HashMap<String, usize>>,
) -> Result<&'a Value, PathError> {
    let mut current = root;
    let mut walked = String::new();

    for key in path {
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(key);

        let object = current.as_object().ok_or_else(|| PathError::WrongType {
            path: parent_of(&walked),
            expected: "an object",
        })?;
        current = object
            .get(*key)
            .ok_or_else(|| PathError::NotFound(walked.clone()))?;

        if let Some(index) = indices.and_then(|m| m.get(walked.as_str())) {
            let array = current.as_array().ok_or_else(|| PathError::WrongType {
                path: walked.clone(),
                expected: "an array",
            })?;
            current = array
                .get(*index)
                .ok_or_else(|| PathError::NotFound(format!("{walked}[{index}]")))?;
        }
    }

    Ok(current)
}

/// Navigate to a string value.
pub fn navigate_str<'a>(
    root: &'a Value,
    path: &[&str],
    indices: Option<&HashMap<String, usize>>,
) -> Result<&'a str, PathError> {
    let value = navigate_value(root, path, indices)?;
    value.as_str().ok_or_else(|| PathError::WrongType {
        path: path.join("."),
        expected: "a string",
    })
}

/// Navigate to an integer value.
pub fn navigate_i64(
    root: &Value,
    path: &[&str],
    indices: Option<&HashMap<String, usize>>,
) -> Result<i64, PathError> {
    let value = navigate_value(root, path, indices)?;
    value.as_i64().ok_or_else(|| PathError::WrongType {
        path: path.join("."),
        expected: "an integer",
    })
}

fn parent_of(walked: &str) -> String {
    match walked.rsplit_once('.') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job() -> Value {
        json!({
            "status": "SUCCESS",
            "entities": { "volume_id": "vol-0001" },
            "sub_jobs": [
                { "status": "SUCCESS", "entities": { "volume_id": "vol-0002" } },
                { "status": "RUNNING" }
            ]
        })
    }

    #[test]
    fn walks_nested_objects() {
        let job = job();
        let v = navigate_value(&job, &["entities", "volume_id"], None).unwrap();
        assert_eq!(v, "vol-0001");
    }

    #[test]
    fn missing_key_is_not_found() {
        let err = navigate_value(&job(), &["entities", "server_id"], None).unwrap_err();
        assert_eq!(err, PathError::NotFound("entities.server_id".to_string()));
    }

    #[test]
    fn descending_into_a_scalar_is_wrong_type() {
        let err = navigate_value(&job(), &["status", "code"], None).unwrap_err();
        assert_eq!(
            err,
            PathError::WrongType {
                path: "status".to_string(),
                expected: "an object",
            }
        );
    }

    #[test]
    fn indices_select_array_elements() {
        let indices = HashMap::from([("sub_jobs".to_string(), 0usize)]);
        let job = job();
        let v = navigate_str(&job, &["sub_jobs", "entities", "volume_id"], Some(&indices)).unwrap();
        assert_eq!(v, "vol-0002");
    }

    #[test]
    fn out_of_range_index_is_not_found() {
        let indices = HashMap::from([("sub_jobs".to_string(), 5usize)]);
        let err = navigate_value(&job(), &["sub_jobs"], Some(&indices)).unwrap_err();
        assert_eq!(err, PathError::NotFound("sub_jobs[5]".to_string()));
    }

    #[test]
    fn typed_accessor_rejects_mismatched_type() {
        let err = navigate_i64(&job(), &["status"], None).unwrap_err();
        assert_eq!(
            err,
            PathError::WrongType {
                path: "status".to_string(),
                expected: "an integer",
            }
        );
    }
}
