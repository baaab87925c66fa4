//! SQLite-backed `ContentService`.

use crate::auth::Credential;
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::folder::{Folder, FolderId};
use crate::model::note::{Note, NoteId};
use crate::service::content::{ContentError, ContentResult, ContentService};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;

/// Content store over a migrated SQLite connection.
pub struct SqliteContentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContentStore<'conn> {
    /// Creates the store from a connection returned by `open_db*`.
    pub fn try_new(conn: &'conn Connection) -> ContentResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(DbError::SchemaNotReady {
                expected_version,
                actual_version,
            }
            .into());
        }
        Ok(Self { conn })
    }

    fn folder_exists(&self, id: FolderId) -> ContentResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM folders WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn ensure_folder(&self, id: FolderId) -> ContentResult<()> {
        if self.folder_exists(id)? {
            Ok(())
        } else {
            Err(ContentError::NotFound(format!("folder {id}")))
        }
    }

    fn parent_of(&self, id: FolderId) -> ContentResult<Option<FolderId>> {
        let parent = self
            .conn
            .query_row("SELECT parent_id FROM folders WHERE id = ?1;", [id], |row| {
                row.get::<_, Option<FolderId>>(0)
            })
            .optional()?;
        parent.ok_or_else(|| ContentError::NotFound(format!("folder {id}")))
    }

    fn would_create_cycle(&self, id: FolderId, candidate_parent: FolderId) -> ContentResult<bool> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent);
        while let Some(current) = cursor {
            if current == id || !visited.insert(current) {
                return Ok(true);
            }
            cursor = self.parent_of(current)?;
        }
        Ok(false)
    }

    fn expect_changed(changed: usize, what: impl FnOnce() -> String) -> ContentResult<()> {
        if changed == 0 {
            return Err(ContentError::NotFound(what()));
        }
        Ok(())
    }
}

impl ContentService for SqliteContentStore<'_> {
    fn list_folders(&self, _credential: &Credential) -> ContentResult<Vec<Folder>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, parent_id FROM folders ORDER BY id ASC;")?;
        let rows = stmt.query_map([], parse_folder_row)?;
        let folders = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(folders)
    }

    fn list_notes(&self, _credential: &Credential) -> ContentResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, heading, folder_id, is_private FROM notes ORDER BY id ASC;")?;
        let rows = stmt.query_map([], parse_note_row)?;
        let notes = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    fn create_folder(
        &self,
        _credential: &Credential,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> ContentResult<()> {
        if let Some(parent_id) = parent_id {
            self.ensure_folder(parent_id)?;
        }
        self.conn.execute(
            "INSERT INTO folders (name, parent_id) VALUES (?1, ?2);",
            params![name, parent_id],
        )?;
        info!(
            "event=folder_create module=store status=ok folder_id={}",
            self.conn.last_insert_rowid()
        );
        Ok(())
    }

    fn create_note(
        &self,
        _credential: &Credential,
        heading: &str,
        folder_id: Option<FolderId>,
    ) -> ContentResult<()> {
        if let Some(folder_id) = folder_id {
            self.ensure_folder(folder_id)?;
        }
        self.conn.execute(
            "INSERT INTO notes (heading, body, folder_id) VALUES (?1, '{}', ?2);",
            params![heading, folder_id],
        )?;
        info!(
            "event=note_create module=store status=ok note_id={}",
            self.conn.last_insert_rowid()
        );
        Ok(())
    }

    fn delete_folder(&self, _credential: &Credential, id: FolderId) -> ContentResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM folders WHERE id = ?1;", [id])?;
        Self::expect_changed(changed, || format!("folder {id}"))
    }

    fn delete_note(&self, _credential: &Credential, id: NoteId) -> ContentResult<()> {
        let changed = self.conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Self::expect_changed(changed, || format!("note {id}"))
    }

    fn set_folder_parent(
        &self,
        _credential: &Credential,
        id: FolderId,
        parent_id: Option<FolderId>,
    ) -> ContentResult<()> {
        self.ensure_folder(id)?;
        if let Some(parent_id) = parent_id {
            self.ensure_folder(parent_id)?;
            if self.would_create_cycle(id, parent_id)? {
                warn!(
                    "event=folder_move module=store status=rejected folder_id={id} parent_id={parent_id}"
                );
                return Err(ContentError::Conflict(format!(
                    "moving folder {id} under {parent_id} would create a cycle"
                )));
            }
        }
        self.conn.execute(
            "UPDATE folders
             SET parent_id = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, parent_id],
        )?;
        Ok(())
    }

    fn set_note_folder(
        &self,
        _credential: &Credential,
        id: NoteId,
        folder_id: Option<FolderId>,
    ) -> ContentResult<()> {
        if let Some(folder_id) = folder_id {
            self.ensure_folder(folder_id)?;
        }
        let changed = self.conn.execute(
            "UPDATE notes
             SET folder_id = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, folder_id],
        )?;
        Self::expect_changed(changed, || format!("note {id}"))
    }

    fn toggle_note_privacy(&self, _credential: &Credential, id: NoteId) -> ContentResult<bool> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET is_private = 1 - is_private,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;
        Self::expect_changed(changed, || format!("note {id}"))?;
        let is_private: i64 =
            self.conn
                .query_row("SELECT is_private FROM notes WHERE id = ?1;", [id], |row| {
                    row.get(0)
                })?;
        Ok(is_private == 1)
    }
}

fn parse_folder_row(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
    })
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        heading: row.get(1)?,
        folder_id: row.get(2)?,
        is_private: row.get::<_, i64>(3)? == 1,
    })
}
