//! Flow import and export formats.
//!
//! An import file is either `{"flows": [...]}` or a bare array of flows.
//! An export is the list of stored flows serialised to a JSON string and
//! wrapped as `{"file": "<json>"}`, which is what the download endpoint
//! returns. The string can be fed straight back into [`parse_upload`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FlowError, Result};
use crate::models::{Flow, FlowCreate, FlowListCreate};

/// Body of the download endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    pub file: String,
}

/// Parse an uploaded file into a validated list of flows to create.
pub fn parse_upload(contents: &[u8]) -> Result<FlowListCreate> {
    let value: Value = serde_json::from_slice(contents)
        .map_err(|e| FlowError::Invalid(format!("file is not valid JSON: {e}")))?;

    let wrapped = value
        .as_object()
        .is_some_and(|map| map.contains_key("flows"));

    let list = if wrapped {
        serde_json::from_value::<FlowListCreate>(value)
            .map_err(|e| FlowError::Invalid(format!("invalid flow list: {e}")))?
    } else if value.is_array() {
        let flows = serde_json::from_value::<Vec<FlowCreate>>(value)
            .map_err(|e| FlowError::Invalid(format!("invalid flow list: {e}")))?;
        FlowListCreate { flows }
    } else {
        return Err(FlowError::Invalid(
            "expected an array of flows or an object with a \"flows\" key".to_string(),
        ));
    };

    list.validate()?;
    Ok(list)
}

/// Serialise every flow for download.
pub fn export_flows(flows: &[Flow]) -> Result<ExportFile> {
    Ok(ExportFile {
        file: serde_json::to_string(flows)?,
    })
}
