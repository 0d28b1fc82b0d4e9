use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::Language;

pub fn list_languages(conn: &Connection) -> Result<Vec<Language>> {
    let mut stmt = conn.prepare("SELECT code, name, native_name, script FROM languages ORDER BY name")?;
    let rows = stmt.query_map([], row_to_language)?;
    rows.collect()
}

pub fn get_language(conn: &Connection, code: &str) -> Result<Option<Language>> {
    conn.query_row(
        "SELECT code, name, native_name, script FROM languages WHERE code = ?1",
        params![code],
        row_to_language,
    )
    .optional()
}

fn row_to_language(row: &rusqlite::Row) -> Result<Language> {
    Ok(Language {
        code: row.get(0)?,
        name: row.get(1)?,
        native_name: row.get(2)?,
        script: row.get(3)?,
    })
}
