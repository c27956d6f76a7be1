use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A registered file. `person_id` is the id the file was created with; it is
/// not updated when that person goes away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    #[serde(default)]
    pub person_id: Option<PersonId>,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub created_at: String,
}

/// Fields for `add_file` and `update_file`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDraft {
    #[serde(default)]
    pub person_id: Option<PersonId>,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
}

impl FileDraft {
    pub fn new(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            person_id: None,
            file_name: file_name.into(),
            file_path: file_path.into(),
            file_type: file_type.into(),
        }
    }

    pub fn for_person(mut self, person_id: PersonId) -> Self {
        self.person_id = Some(person_id);
        self
    }
}

impl From<&FileRecord> for FileDraft {
    fn from(record: &FileRecord) -> Self {
        Self {
            person_id: record.person_id,
            file_name: record.file_name.clone(),
            file_path: record.file_path.clone(),
            file_type: record.file_type.clone(),
        }
    }
}

/// A table extracted from a file. Both references are value copies and may
/// dangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    pub id: RecordId,
    pub file_id: FileId,
    #[serde(default)]
    pub person_id: Option<PersonId>,
    /// JSON text, see [`RecordTable`].
    pub content: String,
    pub created_at: String,
}

impl TableRecord {
    /// Parses `content`. `None` when it is not a table object.
    pub fn table(&self) -> Option<RecordTable> {
        serde_json::from_str(&self.content).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordTable {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl RecordTable {
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Which slice of the record collection a [`crate::store::RecordStore`]
/// mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordScope {
    #[default]
    All,
    File(FileId),
    Person(PersonId),
}

impl RecordScope {
    /// Arguments for `get_records`.
    pub fn to_args(self) -> Value {
        match self {
            RecordScope::All => Value::Null,
            RecordScope::File(id) => json!({ "fileId": id }),
            RecordScope::Person(id) => json!({ "personId": id }),
        }
    }
}
