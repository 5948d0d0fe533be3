//! # Operation Registry
//!
//! Maps a `{type, payload}` pair to a typed [`ConfigOperation`]. The catalog
//! is closed: an unknown type is a hard error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::configtx::ConfigTx;
use crate::domain::errors::ConfigOpError;
use crate::domain::operations::*;

/// One client-specified operation as it arrives over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdateOperation {
    #[serde(rename = "type")]
    pub op_type: String,
    #[serde(default)]
    pub payload: Value,
}

impl ConfigUpdateOperation {
    pub fn new(op_type: impl Into<String>, payload: Value) -> Self {
        Self {
            op_type: op_type.into(),
            payload,
        }
    }

    /// Build from a typed payload struct.
    pub fn typed<P: Serialize>(
        op_type: OperationType,
        payload: &P,
    ) -> Result<Self, ConfigOpError> {
        let payload = serde_json::to_value(payload).map_err(|e| ConfigOpError::InvalidPayload {
            op_type: op_type.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(op_type.as_str(), payload))
    }
}

fn parse<T>(
    op_type: OperationType,
    payload: &Value,
) -> Result<Box<dyn ConfigOperation>, ConfigOpError>
where
    T: ConfigOperation + DeserializeOwned + 'static,
{
    // A missing payload reaches validate() as an all-default struct.
    let payload = match payload {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    let op: T = serde_json::from_value(payload).map_err(|e| ConfigOpError::InvalidPayload {
        op_type: op_type.to_string(),
        message: e.to_string(),
    })?;
    Ok(Box::new(op))
}

/// Construct the operation for `op.op_type`. Does not validate.
pub fn build_operation(
    op: &ConfigUpdateOperation,
) -> Result<Box<dyn ConfigOperation>, ConfigOpError> {
    let op_type: OperationType = op.op_type.parse()?;
    let payload = &op.payload;
    match op_type {
        OperationType::AddOrg => parse::<AddOrg>(op_type, payload),
        OperationType::RemoveOrg => parse::<RemoveOrg>(op_type, payload),
        OperationType::UpdateOrgMsp => parse::<UpdateOrgMsp>(op_type, payload),
        OperationType::SetAnchorPeers => parse::<SetAnchorPeers>(op_type, payload),
        OperationType::AddConsenter => parse::<AddConsenter>(op_type, payload),
        OperationType::RemoveConsenter => parse::<RemoveConsenter>(op_type, payload),
        OperationType::UpdateConsenter => parse::<UpdateConsenter>(op_type, payload),
        OperationType::UpdateEtcdRaftOptions => parse::<UpdateEtcdRaftOptions>(op_type, payload),
        OperationType::UpdateBatchSize => parse::<UpdateBatchSize>(op_type, payload),
        OperationType::UpdateBatchTimeout => parse::<UpdateBatchTimeout>(op_type, payload),
    }
}

/// Validate, then modify.
pub fn apply(op: &dyn ConfigOperation, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
    op.validate()?;
    op.modify(tx)?;
    debug!(operation = op.name(), "Applied config operation");
    Ok(())
}
