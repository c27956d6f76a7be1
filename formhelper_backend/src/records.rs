use crate::database::models::{NewTableRecord, TableRecord};
use crate::database::repositories::{FileRepository, RecordFilter, RecordRepository};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::export;
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Input for storing a table extracted from `file_id`. Without a `person_id`
/// the record inherits the file's person reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRecordInput {
    pub file_id: i64,
    #[serde(default)]
    pub person_id: Option<i64>,
    pub content: String,
}

#[derive(Clone)]
pub struct RecordService {
    database: Database,
}

impl RecordService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn list_records(&self, filter: RecordFilter) -> ServiceResult<Vec<TableRecord>> {
        Ok(self
            .database
            .with_repositories(|repos| repos.records().list(filter))?)
    }

    pub fn add_record(&self, input: AddRecordInput) -> ServiceResult<i64> {
        let content = require_json(&input.content)?;
        let file = self
            .database
            .with_repositories(|repos| repos.files().get(input.file_id))?
            .ok_or(ServiceError::NotFound {
                entity: "file",
                id: input.file_id,
            })?;
        let record = NewTableRecord {
            file_id: file.id,
            person_id: input.person_id.or(file.person_id),
            content,
            created_at: now_utc_iso(),
        };
        let id = self
            .database
            .with_repositories(|repos| repos.records().create(&record))?;
        tracing::debug!(record_id = id, file_id = file.id, "table record stored");
        Ok(id)
    }

    pub fn update_record(&self, id: i64, content: &str) -> ServiceResult<()> {
        let content = require_json(content)?;
        let found = self
            .database
            .with_repositories(|repos| repos.records().update_content(id, &content))?;
        if !found {
            return Err(ServiceError::NotFound {
                entity: "record",
                id,
            });
        }
        tracing::debug!(record_id = id, "table record updated");
        Ok(())
    }

    pub fn delete_record(&self, id: i64) -> ServiceResult<()> {
        let found = self
            .database
            .with_repositories(|repos| repos.records().delete(id))?;
        if !found {
            return Err(ServiceError::NotFound {
                entity: "record",
                id,
            });
        }
        tracing::debug!(record_id = id, "table record deleted");
        Ok(())
    }

    /// Writes every record of `person_id` to `path` as CSV and returns how
    /// many records were exported. A person without records yields a file
    /// holding only the byte order mark.
    pub fn export_csv(&self, person_id: i64, path: &Path) -> ServiceResult<usize> {
        let records = self.list_records(RecordFilter::Person(person_id))?;
        export::write_csv(path, &records)?;
        tracing::info!(
            person_id,
            records = records.len(),
            path = %path.display(),
            "records exported"
        );
        Ok(records.len())
    }
}

fn require_json(content: &str) -> ServiceResult<String> {
    serde_json::from_str::<serde_json::Value>(content)
        .map_err(|err| ServiceError::Invalid(format!("content is not valid JSON: {err}")))?;
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{AddFileInput, FileService};
    use std::fs;
    use tempfile::tempdir;

    const TABLE: &str = r#"{"headers":["Item","Qty"],"rows":[["Pens","4"]]}"#;

    fn setup() -> (FileService, RecordService) {
        let database = Database::open_in_memory().unwrap();
        (FileService::new(database.clone()), RecordService::new(database))
    }

    fn add_file(files: &FileService, person_id: Option<i64>) -> i64 {
        files
            .add_file(AddFileInput {
                person_id,
                file_name: "order.xlsx".into(),
                file_path: "/forms/order.xlsx".into(),
                file_type: "excel".into(),
            })
            .unwrap()
    }

    fn input(file_id: i64, person_id: Option<i64>, content: &str) -> AddRecordInput {
        AddRecordInput {
            file_id,
            person_id,
            content: content.into(),
        }
    }

    #[test]
    fn records_inherit_the_file_person_unless_given() {
        let (files, records) = setup();
        let file = add_file(&files, Some(3));

        let inherited = records.add_record(input(file, None, TABLE)).unwrap();
        let explicit = records.add_record(input(file, Some(8), TABLE)).unwrap();

        let all = records.list_records(RecordFilter::All).unwrap();
        let person_of = |id| all.iter().find(|r| r.id == id).unwrap().person_id;
        assert_eq!(person_of(inherited), Some(3));
        assert_eq!(person_of(explicit), Some(8));
        assert_eq!(
            records.list_records(RecordFilter::Person(3)).unwrap().len(),
            1
        );
    }

    #[test]
    fn records_need_an_existing_file_and_json_content() {
        let (files, records) = setup();
        assert!(matches!(
            records.add_record(input(42, None, TABLE)),
            Err(ServiceError::NotFound { entity: "file", id: 42 })
        ));

        let file = add_file(&files, None);
        assert!(matches!(
            records.add_record(input(file, None, "{oops")),
            Err(ServiceError::Invalid(_))
        ));
        let id = records.add_record(input(file, None, TABLE)).unwrap();
        assert!(matches!(
            records.update_record(id, "[unclosed"),
            Err(ServiceError::Invalid(_))
        ));
    }

    #[test]
    fn update_and_delete_report_missing_records() {
        let (_, records) = setup();
        assert!(matches!(
            records.update_record(7, "{}"),
            Err(ServiceError::NotFound { entity: "record", id: 7 })
        ));
        assert!(matches!(
            records.delete_record(7),
            Err(ServiceError::NotFound { entity: "record", id: 7 })
        ));
    }

    #[test]
    fn records_outlive_their_file() {
        let (files, records) = setup();
        let file = add_file(&files, None);
        let id = records.add_record(input(file, None, TABLE)).unwrap();

        files.delete_file(file).unwrap();

        let stored = records.list_records(RecordFilter::File(file)).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
    }

    #[test]
    fn export_writes_only_the_persons_records() {
        let (files, records) = setup();
        let file = add_file(&files, Some(1));
        records.add_record(input(file, None, TABLE)).unwrap();
        records
            .add_record(input(file, Some(2), r#"{"rows":[["other"]]}"#))
            .unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("person-1.csv");
        assert_eq!(records.export_csv(1, &path).unwrap(), 1);

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "\u{feff}Item,Qty\nPens,4\n\n");
    }
}
