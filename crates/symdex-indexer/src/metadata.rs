//! Metadata payloads attached to template-variable records
//!
//! The payload is a small JSON object; `parse` is what index readers use to
//! get the structured form back.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Malformed template variable metadata: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decoded metadata of a template variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Metadata {
    /// The variable holds an instance of a class
    Reference {
        #[serde(rename = "className")]
        class_name: String,
        namespace: String,
        #[serde(rename = "viewPath")]
        view_path: String,
        method: String,
    },
    /// The variable holds a literal value
    Scalar {
        name: String,
        #[serde(rename = "viewPath")]
        view_path: String,
        method: String,
    },
}

/// Payload for a variable referencing an instance of `class_name`
pub fn reference(class_name: &str, namespace: &str, view_path: &str, method: &str) -> String {
    json!({
        "type": "reference",
        "className": class_name,
        "namespace": namespace,
        "viewPath": view_path,
        "method": method,
    })
    .to_string()
}

/// Payload for a variable holding a literal value
pub fn scalar(name: &str, view_path: &str, method: &str) -> String {
    json!({
        "type": "scalar",
        "name": name,
        "viewPath": view_path,
        "method": method,
    })
    .to_string()
}

pub fn parse(payload: &str) -> Result<Metadata, MetadataError> {
    Ok(serde_json::from_str(payload)?)
}
