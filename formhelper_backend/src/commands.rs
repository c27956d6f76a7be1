//! Command dispatch for the person, file and table record collections.
//!
//! Every command takes a JSON object of camelCase arguments and answers with a
//! JSON value. The same router backs the HTTP transport and in-process
//! callers.

use crate::database::repositories::RecordFilter;
use crate::database::Database;
use crate::error::ServiceError;
use crate::files::{AddFileInput, FileService, UpdateFileInput};
use crate::persons::PersonService;
use crate::records::{AddRecordInput, RecordService};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

pub mod names {
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

    pub const ALL: &[&str] = &[
        GET_PERSONS,
        CREATE_PERSON,
        UPDATE_PERSON,
        DELETE_PERSON,
        GET_FILES,
        ADD_FILE,
        UPDATE_FILE,
        DELETE_FILE,
        GET_RECORDS,
        ADD_RECORD,
        UPDATE_RECORD,
        DELETE_RECORD,
        EXPORT_TO_CSV,
    ];
}

#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("invalid arguments for `{command}`: {message}")]
    BadArguments { command: String, message: String },
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl CommandFailure {
    /// Stable machine-readable tag carried on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandFailure::UnknownCommand(_) => "unknown_command",
            CommandFailure::BadArguments { .. } | CommandFailure::Rejected(_) => "bad_request",
            CommandFailure::NotFound(_) => "not_found",
            CommandFailure::Internal(_) => "internal",
        }
    }
}

impl From<ServiceError> for CommandFailure {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(message) => CommandFailure::Rejected(message),
            err @ ServiceError::NotFound { .. } => CommandFailure::NotFound(err.to_string()),
            ServiceError::Storage(err) => CommandFailure::Internal(err),
        }
    }
}

#[derive(Deserialize)]
struct NameArgs {
    name: String,
}

#[derive(Deserialize)]
struct IdArgs {
    id: i64,
}

#[derive(Deserialize)]
struct RenameArgs {
    id: i64,
    name: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RecordQuery {
    #[serde(default)]
    file_id: Option<i64>,
    #[serde(default)]
    person_id: Option<i64>,
}

#[derive(Deserialize)]
struct ContentArgs {
    id: i64,
    content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportArgs {
    person_id: i64,
    file_path: PathBuf,
}

#[derive(Clone)]
pub struct CommandRouter {
    persons: PersonService,
    files: FileService,
    records: RecordService,
}

impl CommandRouter {
    pub fn new(database: Database) -> Self {
        Self {
            persons: PersonService::new(database.clone()),
            files: FileService::new(database.clone()),
            records: RecordService::new(database),
        }
    }

    pub fn dispatch(&self, command: &str, args: Value) -> Result<Value, CommandFailure> {
        let result = self.route(command, args);
        match &result {
            Ok(_) => tracing::debug!(command, "command handled"),
            Err(CommandFailure::Internal(err)) => {
                tracing::error!(command, error = ?err, "command failed")
            }
            Err(err) => tracing::info!(command, kind = err.kind(), %err, "command rejected"),
        }
        result
    }

    fn route(&self, command: &str, args: Value) -> Result<Value, CommandFailure> {
        match command {
            names::GET_PERSONS => encode(self.persons.list_persons()?),
            names::CREATE_PERSON => {
                let NameArgs { name } = decode(command, args)?;
                encode(self.persons.create_person(&name)?)
            }
            names::UPDATE_PERSON => {
                let RenameArgs { id, name } = decode(command, args)?;
                self.persons.update_person(id, &name)?;
                Ok(Value::Null)
            }
            names::DELETE_PERSON => {
                let IdArgs { id } = decode(command, args)?;
                self.persons.delete_person(id)?;
                Ok(Value::Null)
            }
            names::GET_FILES => encode(self.files.list_files()?),
            names::ADD_FILE => {
                let input: AddFileInput = decode(command, args)?;
                encode(self.files.add_file(input)?)
            }
            names::UPDATE_FILE => {
                let input: UpdateFileInput = decode(command, args)?;
                self.files.update_file(input)?;
                Ok(Value::Null)
            }
            names::DELETE_FILE => {
                let IdArgs { id } = decode(command, args)?;
                self.files.delete_file(id)?;
                Ok(Value::Null)
            }
            names::GET_RECORDS => {
                let query: RecordQuery = if args.is_null() {
                    RecordQuery::default()
                } else {
                    decode(command, args)?
                };
                let filter = RecordFilter::from_ids(query.file_id, query.person_id);
                encode(self.records.list_records(filter)?)
            }
            names::ADD_RECORD => {
                let input: AddRecordInput = decode(command, args)?;
                encode(self.records.add_record(input)?)
            }
            names::UPDATE_RECORD => {
                let ContentArgs { id, content } = decode(command, args)?;
                self.records.update_record(id, &content)?;
                Ok(Value::Null)
            }
            names::DELETE_RECORD => {
                let IdArgs { id } = decode(command, args)?;
                self.records.delete_record(id)?;
                Ok(Value::Null)
            }
            names::EXPORT_TO_CSV => {
                let ExportArgs {
                    person_id,
                    file_path,
                } = decode(command, args)?;
                encode(self.records.export_csv(person_id, &file_path)?)
            }
            other => Err(CommandFailure::UnknownCommand(other.to_string())),
        }
    }
}

fn decode<T: DeserializeOwned>(command: &str, args: Value) -> Result<T, CommandFailure> {
    serde_json::from_value(args).map_err(|err| CommandFailure::BadArguments {
        command: command.to_string(),
        message: err.to_string(),
    })
}

fn encode<T: Serialize>(value: T) -> Result<Value, CommandFailure> {
    serde_json::to_value(value).map_err(|err| CommandFailure::Internal(err.into()))
}
