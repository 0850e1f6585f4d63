use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use echos_types::models::Tag;

use crate::models::{TagRow, now, ts_text};
use crate::{Database, Result, StoreError};

impl Database {
    pub fn create_tag(&self, name: &str, color: &str) -> Result<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("tag name must not be empty".into()));
        }
        if !is_hex_color(color) {
            return Err(StoreError::Validation(format!(
                "tag color must be a #rrggbb hex string, got '{color}'"
            )));
        }

        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.to_ascii_lowercase(),
            created_at: now(),
        };

        self.with_write(|conn| {
            conn.execute(
                "INSERT INTO tags (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    tag.id.to_string(),
                    tag.name,
                    tag.color,
                    ts_text(tag.created_at)
                ],
            )?;
            Ok(())
        })?;

        Ok(tag)
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        self.with_read(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, color, created_at FROM tags ORDER BY name ASC")?;

            let rows = stmt
                .query_map([], tag_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(TagRow::into_tag).collect()
        })
    }

    pub fn find_tag(&self, id: Uuid) -> Result<Option<Tag>> {
        self.with_read(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, color, created_at FROM tags WHERE id = ?1")?;

            let row = stmt.query_row([id.to_string()], tag_row).optional()?;

            row.map(TagRow::into_tag).transpose()
        })
    }
}

fn tag_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TagRow> {
    Ok(TagRow {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn is_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}
