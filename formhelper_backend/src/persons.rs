use crate::database::models::PersonRecord;
use crate::database::repositories::PersonRepository;
use crate::database::Database;
use crate::error::{require_text, ServiceError, ServiceResult};
use crate::utils::now_utc_iso;

#[derive(Clone)]
pub struct PersonService {
    database: Database,
}

impl PersonService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn list_persons(&self) -> ServiceResult<Vec<PersonRecord>> {
        Ok(self
            .database
            .with_repositories(|repos| repos.persons().list())?)
    }

    pub fn create_person(&self, name: &str) -> ServiceResult<i64> {
        let name = require_text("name", name)?;
        let created_at = now_utc_iso();
        let id = self
            .database
            .with_repositories(|repos| repos.persons().create(&name, &created_at))?;
        tracing::debug!(person_id = id, "person created");
        Ok(id)
    }

    pub fn update_person(&self, id: i64, name: &str) -> ServiceResult<()> {
        let name = require_text("name", name)?;
        let updated_at = now_utc_iso();
        let found = self
            .database
            .with_repositories(|repos| repos.persons().rename(id, &name, &updated_at))?;
        if !found {
            return Err(ServiceError::NotFound {
                entity: "person",
                id,
            });
        }
        tracing::debug!(person_id = id, "person renamed");
        Ok(())
    }

    /// Removes the person only. Files that reference it keep their
    /// `person_id`.
    pub fn delete_person(&self, id: i64) -> ServiceResult<()> {
        let found = self
            .database
            .with_repositories(|repos| repos.persons().delete(id))?;
        if !found {
            return Err(ServiceError::NotFound {
                entity: "person",
                id,
            });
        }
        tracing::debug!(person_id = id, "person deleted");
        Ok(())
    }
}
