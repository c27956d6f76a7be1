use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Command names understood by the backend.
pub mod commands {
    pub const GET_PERSONS: &str = "get_persons";
    pub const CREATE_PERSON: &str = "create_person";
    pub const UPDATE_PERSON: &str = "update_person";
    pub const DELETE_PERSON: &str = "delete_person";
    pub const GET_FILES: &str = "get_files";
    pub const ADD_FILE: &str = "add_file";
    pub const UPDATE_FILE: &str = "update_file";
    pub const DELETE_FILE: &str = "delete_file";
    pub const GET_RECORDS: &str = "get_records";
    pub const ADD_RECORD: &str = "add_record";
    pub const UPDATE_RECORD: &str = "update_record";
    pub const DELETE_RECORD: &str = "delete_record";
    pub const EXPORT_TO_CSV: &str = "export_to_csv";
}

/// Why a remote command did not produce a usable result.
///
/// Stores do not branch on the variant: any error is a failure. The variants
/// exist so callers can word their messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command never got an answer from the backend.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The backend answered and refused the request.
    #[error("{message}")]
    Application { kind: String, message: String },
    /// The backend answered with something the client could not decode.
    #[error("unexpected response to `{command}`: {message}")]
    Decode { command: String, message: String },
}

impl CommandError {
    pub fn application(kind: impl Into<String>, message: impl Into<String>) -> Self {
        CommandError::Application {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Asynchronous request/response boundary to the backend. Arguments and
/// results are JSON; argument keys are camelCase.
#[async_trait]
pub trait RemoteCommandPort: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError>;
}

/// Invokes `command` and decodes the result into `T`.
pub async fn call<T: DeserializeOwned>(
    port: &dyn RemoteCommandPort,
    command: &str,
    args: Value,
) -> Result<T, CommandError> {
    let value = port.invoke(command, args).await?;
    serde_json::from_value(value).map_err(|err| CommandError::Decode {
        command: command.to_string(),
        message: err.to_string(),
    })
}
