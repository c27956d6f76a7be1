use crate::database::models::{FileRecord, NewFileRecord};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteFileRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        person_id: row.get(1)?,
        file_name: row.get(2)?,
        file_path: row.get(3)?,
        file_type: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl<'conn> super::FileRepository for SqliteFileRepository<'conn> {
    fn create(&self, record: &NewFileRecord) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO files (person_id, file_name, file_path, file_type, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.person_id,
                record.file_name,
                record.file_path,
                record.file_type,
                record.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: i64) -> Result<Option<FileRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, person_id, file_name, file_path, file_type, created_at
                FROM files
                WHERE id = ?1
                "#,
                params![id],
                file_from_row,
            )
            .optional()?)
    }

    fn list(&self) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, person_id, file_name, file_path, file_type, created_at
            FROM files
            ORDER BY created_at DESC, id DESC
            "#,
        )?;
        let files = stmt
            .query_map([], file_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(files)
    }

    fn update(&self, record: &FileRecord) -> Result<bool> {
        let changed = self.conn.execute(
            r#"
            UPDATE files
            SET person_id = ?1, file_name = ?2, file_path = ?3, file_type = ?4
            WHERE id = ?5
            "#,
            params![
                record.person_id,
                record.file_name,
                record.file_path,
                record.file_type,
                record.id
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM files WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
