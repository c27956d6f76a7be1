//! In-memory stand-in for the backend used by the store tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use formhelper_frontend::models::{FileId, FileRecord, Person, PersonId, RecordId, TableRecord};
use formhelper_frontend::port::{commands, CommandError, RemoteCommandPort};
use serde_json::{json, Value};

#[derive(Default)]
struct RemoteState {
    persons: Vec<Person>,
    files: Vec<FileRecord>,
    records: Vec<TableRecord>,
    next_id: i64,
    clock: u64,
    failures: HashMap<String, usize>,
    calls: Vec<String>,
}

impl RemoteState {
    fn tick(&mut self) -> String {
        self.clock += 1;
        format!("2024-01-01T00:00:{:02}.000000Z", self.clock)
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Honors the command table with newest-first listings. Failures can be
/// scheduled per command.
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the next `times` invocations of `command` fail with a transport
    /// error.
    pub fn fail_next(&self, command: &str, times: usize) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(command.to_string(), times);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn persons(&self) -> Vec<Person> {
        self.state.lock().unwrap().persons.clone()
    }

    pub fn files(&self) -> Vec<FileRecord> {
        self.state.lock().unwrap().files.clone()
    }

    pub fn records(&self) -> Vec<TableRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Registers a file directly on the remote side.
    pub fn seed_file(&self, name: &str, person_id: Option<PersonId>) -> FileId {
        let mut state = self.state.lock().unwrap();
        let id = FileId(state.allocate_id());
        let created_at = state.tick();
        state.files.insert(
            0,
            FileRecord {
                id,
                person_id,
                file_name: name.to_string(),
                file_path: format!("/forms/{name}"),
                file_type: "pdf".to_string(),
                created_at,
            },
        );
        id
    }

    /// Adds a person directly on the remote side, bypassing any store.
    pub fn seed_person(&self, name: &str) -> PersonId {
        let mut state = self.state.lock().unwrap();
        let id = PersonId(state.allocate_id());
        let now = state.tick();
        state.persons.insert(
            0,
            Person {
                id,
                name: name.to_string(),
                created_at: now.clone(),
                updated_at: now,
            },
        );
        id
    }

    fn handle(state: &mut RemoteState, command: &str, args: &Value) -> Result<Value, CommandError> {
        let missing = |field: &str| CommandError::application("bad_request", format!("missing `{field}`"));
        let text = |field: &str| -> Result<String, CommandError> {
            args.get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| missing(field))
        };
        let id = || args.get("id").and_then(Value::as_i64).ok_or_else(|| missing("id"));

        match command {
            commands::GET_PERSONS => Ok(json!(state.persons)),
            commands::GET_FILES => Ok(json!(state.files)),
            commands::CREATE_PERSON => {
                let name = text("name")?;
                let id = PersonId(state.allocate_id());
                let now = state.tick();
                state.persons.insert(
                    0,
                    Person {
                        id,
                        name,
                        created_at: now.clone(),
                        updated_at: now,
                    },
                );
                Ok(json!(id))
            }
            commands::UPDATE_PERSON => {
                let (id, name) = (id()?, text("name")?);
                let now = state.tick();
                let person = state
                    .persons
                    .iter_mut()
                    .find(|p| p.id == PersonId(id))
                    .ok_or_else(|| CommandError::application("not_found", format!("person {id} not found")))?;
                person.name = name;
                person.updated_at = now;
                Ok(Value::Null)
            }
            commands::DELETE_PERSON => {
                let id = id()?;
                let before = state.persons.len();
                state.persons.retain(|p| p.id != PersonId(id));
                if state.persons.len() == before {
                    return Err(CommandError::application("not_found", format!("person {id} not found")));
                }
                Ok(Value::Null)
            }
            commands::ADD_FILE => {
                let person_id = args.get("personId").and_then(Value::as_i64).map(PersonId);
                let record = FileRecord {
                    id: FileId(state.allocate_id()),
                    person_id,
                    file_name: text("fileName")?,
                    file_path: text("filePath")?,
                    file_type: text("fileType")?,
                    created_at: state.tick(),
                };
                let id = record.id;
                state.files.insert(0, record);
                Ok(json!(id))
            }
            commands::UPDATE_FILE => {
                let id = id()?;
                let person_id = args.get("personId").and_then(Value::as_i64).map(PersonId);
                let (file_name, file_path, file_type) =
                    (text("fileName")?, text("filePath")?, text("fileType")?);
                let file = state
                    .files
                    .iter_mut()
                    .find(|f| f.id == FileId(id))
                    .ok_or_else(|| CommandError::application("not_found", format!("file {id} not found")))?;
                file.person_id = person_id;
                file.file_name = file_name;
                file.file_path = file_path;
                file.file_type = file_type;
                Ok(Value::Null)
            }
            commands::DELETE_FILE => {
                let id = id()?;
                let before = state.files.len();
                state.files.retain(|f| f.id != FileId(id));
                if state.files.len() == before {
                    return Err(CommandError::application("not_found", format!("file {id} not found")));
                }
                Ok(Value::Null)
            }
            commands::GET_RECORDS => {
                let file_id = args.get("fileId").and_then(Value::as_i64).map(FileId);
                let person_id = args.get("personId").and_then(Value::as_i64).map(PersonId);
                let listed: Vec<&TableRecord> = state
                    .records
                    .iter()
                    .filter(|r| match (file_id, person_id) {
                        (Some(file_id), _) => r.file_id == file_id,
                        (None, Some(person_id)) => r.person_id == Some(person_id),
                        (None, None) => true,
                    })
                    .collect();
                Ok(json!(listed))
            }
            commands::ADD_RECORD => {
                let file_id = args
                    .get("fileId")
                    .and_then(Value::as_i64)
                    .map(FileId)
                    .ok_or_else(|| missing("fileId"))?;
                let content = text("content")?;
                let file_person = state
                    .files
                    .iter()
                    .find(|f| f.id == file_id)
                    .map(|f| f.person_id)
                    .ok_or_else(|| CommandError::application("not_found", format!("file {file_id} not found")))?;
                let person_id = args
                    .get("personId")
                    .and_then(Value::as_i64)
                    .map(PersonId)
                    .or(file_person);
                let record = TableRecord {
                    id: RecordId(state.allocate_id()),
                    file_id,
                    person_id,
                    content,
                    created_at: state.tick(),
                };
                let id = record.id;
                state.records.insert(0, record);
                Ok(json!(id))
            }
            commands::UPDATE_RECORD => {
                let (id, content) = (id()?, text("content")?);
                let record = state
                    .records
                    .iter_mut()
                    .find(|r| r.id == RecordId(id))
                    .ok_or_else(|| CommandError::application("not_found", format!("record {id} not found")))?;
                record.content = content;
                Ok(Value::Null)
            }
            commands::DELETE_RECORD => {
                let id = id()?;
                let before = state.records.len();
                state.records.retain(|r| r.id != RecordId(id));
                if state.records.len() == before {
                    return Err(CommandError::application("not_found", format!("record {id} not found")));
                }
                Ok(Value::Null)
            }
            commands::EXPORT_TO_CSV => {
                let person_id = args
                    .get("personId")
                    .and_then(Value::as_i64)
                    .map(PersonId)
                    .ok_or_else(|| missing("personId"))?;
                text("filePath")?;
                let exported = state
                    .records
                    .iter()
                    .filter(|r| r.person_id == Some(person_id))
                    .count();
                Ok(json!(exported))
            }
            other => Err(CommandError::application(
                "unknown_command",
                format!("unknown command `{other}`"),
            )),
        }
    }
}

#[async_trait]
impl RemoteCommandPort for FakeRemote {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(command.to_string());
        if let Some(remaining) = state.failures.get_mut(command) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CommandError::Transport(format!("{command} dropped")));
            }
        }
        Self::handle(&mut state, command, &args)
    }
}
