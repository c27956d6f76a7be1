use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub person_id: Option<i64>,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub created_at: String,
}

/// Column values for a file row that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFileRecord {
    pub person_id: Option<i64>,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub created_at: String,
}

/// One table extracted from a file. `content` is the table as JSON text:
/// `{"headers": [...], "rows": [[...], ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    pub id: i64,
    pub file_id: i64,
    pub person_id: Option<i64>,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTableRecord {
    pub file_id: i64,
    pub person_id: Option<i64>,
    pub content: String,
    pub created_at: String,
}
