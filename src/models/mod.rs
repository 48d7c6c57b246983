use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{FlowError, Result};

/// A stored flow. This is also the shape every read endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flow {
    /// Build a new flow with a fresh id from creation input.
    pub fn from_create(input: FlowCreate) -> Self {
        let now = Utc::now();
        Flow {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            data: input.data,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a flow. Unknown fields such as `id` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl FlowCreate {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

/// Partial update. The outer `Option` records whether the field was sent at
/// all; for `description` and `data` the inner `None` means "clear it".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FlowUpdate {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub data: Option<Option<Value>>,
}

impl FlowUpdate {
    pub fn validate(&self) -> Result<()> {
        match &self.name {
            Some(Some(name)) => validate_name(name),
            Some(None) => Err(FlowError::Invalid("name cannot be null".to_string())),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.data.is_none()
    }
}

/// Several flows created in one unit of work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowListCreate {
    pub flows: Vec<FlowCreate>,
}

impl FlowListCreate {
    pub fn validate(&self) -> Result<()> {
        validate_all(&self.flows)
    }
}

/// Validate every entry, naming the first offending index.
pub fn validate_all(flows: &[FlowCreate]) -> Result<()> {
    for (i, flow) in flows.iter().enumerate() {
        flow.validate().map_err(|e| match e {
            FlowError::Invalid(msg) => FlowError::Invalid(format!("flows[{i}]: {msg}")),
            other => other,
        })?;
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        Err(FlowError::Invalid("name cannot be empty".to_string()))
    } else {
        Ok(())
    }
}

// Any value present in the input, including `null`, lands in the outer `Some`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
