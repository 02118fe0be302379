// File: server/src/bulk/json_patch.rs
//! JSON Patch (RFC 6902) operations applied to property rule trees
//!
//! Only `add`, `remove`, `replace` and `test` are supported; rule updates
//! never need `move` or `copy`. Paths are JSON Pointers (RFC 6901) rooted at
//! the rule document returned by PAPI, e.g. `/rules/behaviors/0/options`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Test { path: String, value: Value },
}

impl PatchOperation {
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("invalid JSON pointer '{0}'")]
    InvalidPointer(String),
    #[error("path '{0}' does not exist")]
    MissingPath(String),
    #[error("array index out of bounds at '{0}'")]
    IndexOutOfBounds(String),
    #[error("test failed at '{0}'")]
    TestFailed(String),
    #[error("cannot remove or replace the document root")]
    RootTarget,
}

/// Apply every operation in order; the document is left untouched on error
pub fn apply(document: &mut Value, operations: &[PatchOperation]) -> Result<(), PatchError> {
    let mut working = document.clone();
    for operation in operations {
        apply_one(&mut working, operation)?;
    }
    *document = working;
    Ok(())
}

fn apply_one(document: &mut Value, operation: &PatchOperation) -> Result<(), PatchError> {
    match operation {
        PatchOperation::Add { path, value } => add(document, path, value.clone()),
        PatchOperation::Remove { path } => remove(document, path).map(|_| ()),
        PatchOperation::Replace { path, value } => {
            if path.is_empty() {
                *document = value.clone();
                return Ok(());
            }
            let target = document
                .pointer_mut(path)
                .ok_or_else(|| PatchError::MissingPath(path.clone()))?;
            *target = value.clone();
            Ok(())
        }
        PatchOperation::Test { path, value } => match document.pointer(path) {
            Some(current) if current == value => Ok(()),
            _ => Err(PatchError::TestFailed(path.clone())),
        },
    }
}

// Split a pointer into its parent pointer and unescaped last token
fn split_pointer(path: &str) -> Result<(&str, String), PatchError> {
    if !path.starts_with('/') {
        return Err(PatchError::InvalidPointer(path.to_string()));
    }
    let index = path.rfind('/').unwrap_or(0);
    let token = path[index + 1..].replace("~1", "/").replace("~0", "~");
    Ok((&path[..index], token))
}

fn parse_index(token: &str, len: usize, path: &str, allow_end: bool) -> Result<usize, PatchError> {
    let index: usize = token
        .parse()
        .map_err(|_| PatchError::InvalidPointer(path.to_string()))?;
    let limit = if allow_end { len } else { len.saturating_sub(1) };
    if index > limit || (!allow_end && len == 0) {
        return Err(PatchError::IndexOutOfBounds(path.to_string()));
    }
    Ok(index)
}

fn add(document: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *document = value;
        return Ok(());
    }
    let (parent_path, token) = split_pointer(path)?;
    let parent = document
        .pointer_mut(parent_path)
        .ok_or_else(|| PatchError::MissingPath(parent_path.to_string()))?;

    match parent {
        Value::Object(map) => {
            map.insert(token, value);
            Ok(())
        }
        Value::Array(items) => {
            if token == "-" {
                items.push(value);
            } else {
                let index = parse_index(&token, items.len(), path, true)?;
                items.insert(index, value);
            }
            Ok(())
        }
        _ => Err(PatchError::MissingPath(path.to_string())),
    }
}

fn remove(document: &mut Value, path: &str) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Err(PatchError::RootTarget);
    }
    let (parent_path, token) = split_pointer(path)?;
    let parent = document
        .pointer_mut(parent_path)
        .ok_or_else(|| PatchError::MissingPath(parent_path.to_string()))?;

    match parent {
        Value::Object(map) => map
            .remove(&token)
            .ok_or_else(|| PatchError::MissingPath(path.to_string())),
        Value::Array(items) => {
            let index = parse_index(&token, items.len(), path, false)?;
            Ok(items.remove(index))
        }
        _ => Err(PatchError::MissingPath(path.to_string())),
    }
}
