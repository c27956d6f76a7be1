mod files;
mod persons;
mod records;

use super::models::{FileRecord, NewFileRecord, NewTableRecord, PersonRecord, TableRecord};
use anyhow::Result;
use rusqlite::Connection;

pub trait PersonRepository {
    fn create(&self, name: &str, created_at: &str) -> Result<i64>;
    fn list(&self) -> Result<Vec<PersonRecord>>;
    /// Returns `false` when no row carries `id`.
    fn rename(&self, id: i64, name: &str, updated_at: &str) -> Result<bool>;
    fn delete(&self, id: i64) -> Result<bool>;
}

pub trait FileRepository {
    fn create(&self, record: &NewFileRecord) -> Result<i64>;
    fn get(&self, id: i64) -> Result<Option<FileRecord>>;
    fn list(&self) -> Result<Vec<FileRecord>>;
    /// Rewrites every mutable column; `created_at` is left untouched.
    fn update(&self, record: &FileRecord) -> Result<bool>;
    fn delete(&self, id: i64) -> Result<bool>;
}

/// Which table records a listing returns. A file filter wins over a person
/// filter when both are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    File(i64),
    Person(i64),
}

impl RecordFilter {
    pub fn from_ids(file_id: Option<i64>, person_id: Option<i64>) -> Self {
        match (file_id, person_id) {
            (Some(file_id), _) => RecordFilter::File(file_id),
            (None, Some(person_id)) => RecordFilter::Person(person_id),
            (None, None) => RecordFilter::All,
        }
    }
}

pub trait RecordRepository {
    fn create(&self, record: &NewTableRecord) -> Result<i64>;
    fn list(&self, filter: RecordFilter) -> Result<Vec<TableRecord>>;
    fn update_content(&self, id: i64, content: &str) -> Result<bool>;
    fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn persons(&self) -> impl PersonRepository + '_ {
        persons::SqlitePersonRepository { conn: self.conn }
    }

    pub fn files(&self) -> impl FileRepository + '_ {
        files::SqliteFileRepository { conn: self.conn }
    }

    pub fn records(&self) -> impl RecordRepository + '_ {
        records::SqliteRecordRepository { conn: self.conn }
    }
}
