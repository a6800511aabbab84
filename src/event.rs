use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle action requested by CloudFormation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Create => "Create",
            Action::Read => "Read",
            Action::Update => "Update",
            Action::Delete => "Delete",
            Action::List => "List",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationStatus {
    Success,
    Failed,
}

/// Temporary credentials CloudFormation hands to the handler
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl fmt::Debug for CallerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A single handler invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    pub type_name: String,
    pub action: Action,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub caller_credentials: Option<CallerCredentials>,
    #[serde(default)]
    pub previous_resource_state: Option<Value>,
    #[serde(default)]
    pub desired_resource_state: Value,
}

/// Outcome of a handler invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent<M> {
    pub status: OperationStatus,
    pub message: String,
    pub resource_model: M,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl<M> ProgressEvent<M> {
    pub fn success(action: Action, resource_model: M) -> Self {
        Self {
            status: OperationStatus::Success,
            message: format!("{action} complete"),
            resource_model,
            error_message: None,
        }
    }

    pub fn failed(action: Action, resource_model: M, error: &anyhow::Error) -> Self {
        Self {
            status: OperationStatus::Failed,
            message: format!("{action} failed"),
            resource_model,
            error_message: Some(format!("{error:#}")),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }

    pub fn map_model<N>(self, f: impl FnOnce(M) -> N) -> ProgressEvent<N> {
        ProgressEvent {
            status: self.status,
            message: self.message,
            resource_model: f(self.resource_model),
            error_message: self.error_message,
        }
    }
}
