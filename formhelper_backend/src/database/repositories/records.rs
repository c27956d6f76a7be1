use super::RecordFilter;
use crate::database::models::{NewTableRecord, TableRecord};
use anyhow::Result;
use rusqlite::{params, Connection, Row};

pub(super) struct SqliteRecordRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<TableRecord> {
    Ok(TableRecord {
        id: row.get(0)?,
        file_id: row.get(1)?,
        person_id: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl<'conn> super::RecordRepository for SqliteRecordRepository<'conn> {
    fn create(&self, record: &NewTableRecord) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO table_records (file_id, person_id, content, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.file_id,
                record.person_id,
                record.content,
                record.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list(&self, filter: RecordFilter) -> Result<Vec<TableRecord>> {
        let (clause, key) = match filter {
            RecordFilter::All => ("", None),
            RecordFilter::File(id) => ("WHERE file_id = ?1", Some(id)),
            RecordFilter::Person(id) => ("WHERE person_id = ?1", Some(id)),
        };
        let sql = format!(
            "SELECT id, file_id, person_id, content, created_at \
             FROM table_records {clause} \
             ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match key {
            Some(key) => stmt.query_map(params![key], record_from_row)?,
            None => stmt.query_map([], record_from_row)?,
        };
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn update_content(&self, id: i64, content: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE table_records SET content = ?1 WHERE id = ?2",
            params![content, id],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM table_records WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
