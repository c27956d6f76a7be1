use crate::database::models::{FileRecord, NewFileRecord};
use crate::database::repositories::FileRepository;
use crate::database::Database;
use crate::error::{require_text, ServiceError, ServiceResult};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};

/// Input for registering a file. `person_id` is stored as given and never
/// checked against the persons table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFileInput {
    #[serde(default)]
    pub person_id: Option<i64>,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileInput {
    pub id: i64,
    #[serde(default)]
    pub person_id: Option<i64>,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
}

#[derive(Clone)]
pub struct FileService {
    database: Database,
}

impl FileService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn list_files(&self) -> ServiceResult<Vec<FileRecord>> {
        Ok(self.database.with_repositories(|repos| repos.files().list())?)
    }

    pub fn add_file(&self, input: AddFileInput) -> ServiceResult<i64> {
        let record = NewFileRecord {
            person_id: input.person_id,
            file_name: require_text("fileName", &input.file_name)?,
            file_path: require_text("filePath", &input.file_path)?,
            file_type: require_text("fileType", &input.file_type)?,
            created_at: now_utc_iso(),
        };
        let id = self
            .database
            .with_repositories(|repos| repos.files().create(&record))?;
        tracing::debug!(file_id = id, person_id = ?record.person_id, "file registered");
        Ok(id)
    }

    pub fn update_file(&self, input: UpdateFileInput) -> ServiceResult<()> {
        let record = FileRecord {
            id: input.id,
            person_id: input.person_id,
            file_name: require_text("fileName", &input.file_name)?,
            file_path: require_text("filePath", &input.file_path)?,
            file_type: require_text("fileType", &input.file_type)?,
            created_at: String::new(),
        };
        let found = self
            .database
            .with_repositories(|repos| repos.files().update(&record))?;
        if !found {
            return Err(ServiceError::NotFound {
                entity: "file",
                id: input.id,
            });
        }
        tracing::debug!(file_id = input.id, "file updated");
        Ok(())
    }

    pub fn delete_file(&self, id: i64) -> ServiceResult<()> {
        let found = self
            .database
            .with_repositories(|repos| repos.files().delete(id))?;
        if !found {
            return Err(ServiceError::NotFound { entity: "file", id });
        }
        tracing::debug!(file_id = id, "file deleted");
        Ok(())
    }
}
