use crate::database::models::PersonRecord;
use anyhow::Result;
use rusqlite::{params, Connection, Row};

pub(super) struct SqlitePersonRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<PersonRecord> {
    Ok(PersonRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

impl<'conn> super::PersonRepository for SqlitePersonRepository<'conn> {
    fn create(&self, name: &str, created_at: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO persons (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, created_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list(&self) -> Result<Vec<PersonRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, created_at, updated_at
            FROM persons
            ORDER BY created_at DESC, id DESC
            "#,
        )?;
        let persons = stmt
            .query_map([], person_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(persons)
    }

    fn rename(&self, id: i64, name: &str, updated_at: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE persons SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, updated_at, id],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM persons WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
