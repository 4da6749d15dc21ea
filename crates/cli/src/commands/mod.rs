pub mod attribute_change;
pub mod config;
pub mod detail;
pub mod overview;
pub mod seed;
mod session;

pub use session::{CatalogArgs, ContextArgs, Session};

use serde::Serialize;
use serde_json::Value;
use storefront_core::errors::{ApplicationError, InterfaceError};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, Value::Null)
    }

    pub fn success_with_data(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 6);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Maps an application error onto the interface taxonomy under a fresh
    /// correlation id; the detailed message only goes to the log.
    pub fn from_application_error(command: &str, error: ApplicationError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        warn!(
            event_name = "cli.command.failed",
            command,
            correlation_id = %correlation_id,
            error = %error,
            "command failed"
        );

        let interface = error.into_interface(correlation_id);
        let (error_class, exit_code) = match interface {
            InterfaceError::BadRequest { .. } => ("bad_request", 4),
            InterfaceError::ServiceUnavailable { .. } => ("service_unavailable", 5),
            InterfaceError::Internal { .. } => ("internal", 6),
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: interface.user_message().to_string(),
            correlation_id: Some(interface.correlation_id().to_string()),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}
