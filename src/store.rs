//! Persistence for journal sessions and the pose catalog.
//!
//! Records live as JSON documents in a single SQLite table, grouped by
//! collection. Bodies are decoded and validated on the way out; a document
//! that fails validation is logged and skipped rather than failing the read.

use crate::catalog::{default_poses, NewPose, PoseDocument, PoseId, YogaPose};
use crate::error::{JournalError, Result};
use crate::session::{PracticeSession, SessionDocument, SessionId};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

pub const SESSIONS: &str = "sessions";
pub const POSES: &str = "yogaPoses";

/// The operations the journal needs from a document store.
pub trait PracticeStore {
    fn list_sessions(&self) -> Result<Vec<PracticeSession>>;
    fn add_session(&mut self, doc: &SessionDocument) -> Result<PracticeSession>;
    fn list_poses(&self) -> Result<Vec<YogaPose>>;
    fn add_pose(&mut self, pose: NewPose) -> Result<YogaPose>;
    /// Returns whether a pose was removed.
    fn delete_pose(&mut self, id: PoseId) -> Result<bool>;
    /// Seed the default catalog unless a non-custom pose already exists.
    /// Returns the number of poses inserted.
    fn seed_default_poses_if_empty(&mut self) -> Result<usize>;
}

/// SQLite-backed document store
#[derive(Debug)]
pub struct JournalDb {
    conn: Connection,
}

impl JournalDb {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!("opening journal database at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)",
            [],
        )?;

        Ok(JournalDb { conn })
    }

    fn insert(&self, collection: &str, body: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO documents (collection, body) VALUES (?1, ?2)",
            params![collection, body],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Raw (id, body) pairs of a collection in insertion order.
    fn documents(&self, collection: &str) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY id")?;

        let rows = stmt.query_map([collection], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut docs = Vec::new();
        for row in rows {
            docs.push(row?);
        }

        Ok(docs)
    }

    /// Insert a raw body without validation. Used to import documents
    /// written elsewhere.
    pub fn insert_raw(&self, collection: &str, body: &str) -> Result<i64> {
        self.insert(collection, body)
    }
}

fn decode_session(id: i64, body: &str) -> Result<PracticeSession> {
    let doc: SessionDocument = serde_json::from_str(body).map_err(|e| {
        JournalError::InvalidDocument {
            id,
            reason: e.to_string(),
        }
    })?;
    PracticeSession::from_document(SessionId(id), doc)
}

fn decode_pose(id: i64, body: &str) -> Result<YogaPose> {
    let doc: PoseDocument = serde_json::from_str(body).map_err(|e| {
        JournalError::InvalidDocument {
            id,
            reason: e.to_string(),
        }
    })?;
    YogaPose::from_document(PoseId(id), doc, Utc::now())
}

/// Keep the valid records; log and drop the rest.
fn keep_valid<T>(collection: &str, decoded: impl Iterator<Item = Result<T>>) -> Vec<T> {
    decoded
        .filter_map(|item| match item {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("skipping {collection} document: {e}");
                None
            }
        })
        .collect()
}

impl PracticeStore for JournalDb {
    fn list_sessions(&self) -> Result<Vec<PracticeSession>> {
        let docs = self.documents(SESSIONS)?;
        Ok(keep_valid(
            SESSIONS,
            docs.iter().map(|(id, body)| decode_session(*id, body)),
        ))
    }

    fn add_session(&mut self, doc: &SessionDocument) -> Result<PracticeSession> {
        // Validate before anything touches the table.
        let mut session = PracticeSession::from_document(SessionId(0), doc.clone())?;
        let id = self.insert(SESSIONS, &serde_json::to_string(doc)?)?;
        session.id = SessionId(id);
        tracing::info!("recorded session {} on {}", session.id, session.date);
        Ok(session)
    }

    fn list_poses(&self) -> Result<Vec<YogaPose>> {
        let docs = self.documents(POSES)?;
        Ok(keep_valid(
            POSES,
            docs.iter().map(|(id, body)| decode_pose(*id, body)),
        ))
    }

    fn add_pose(&mut self, pose: NewPose) -> Result<YogaPose> {
        let pose = pose.normalize()?;
        let now = Utc::now();
        let doc = pose.to_document(true, now);
        let id = self.insert(POSES, &serde_json::to_string(&doc)?)?;
        tracing::info!("added custom pose {:?} as {}", pose.name, id);
        YogaPose::from_document(PoseId(id), doc, now)
    }

    fn delete_pose(&mut self, id: PoseId) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![POSES, id.0],
        )?;
        if removed == 0 {
            tracing::debug!("no pose with id {id} to delete");
        }
        Ok(removed > 0)
    }

    fn seed_default_poses_if_empty(&mut self) -> Result<usize> {
        if self.list_poses()?.iter().any(|p| !p.is_custom) {
            tracing::debug!("default poses already present");
            return Ok(0);
        }

        let defaults = default_poses()?;
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        for pose in &defaults {
            let body = serde_json::to_string(&pose.to_document(false, now))?;
            tx.execute(
                "INSERT INTO documents (collection, body) VALUES (?1, ?2)",
                params![POSES, body],
            )?;
        }
        tx.commit()?;

        tracing::info!("seeded {} default poses", defaults.len());
        Ok(defaults.len())
    }
}

/// Fallback used when no database can be opened: reads serve an empty
/// journal and the bundled catalog, writes are refused.
#[derive(Debug, Clone)]
pub struct OfflineStore {
    started_at: DateTime<Utc>,
}

impl OfflineStore {
    pub fn new() -> Self {
        tracing::warn!("journal store is not configured; using bundled defaults");
        Self {
            started_at: Utc::now(),
        }
    }
}

impl Default for OfflineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PracticeStore for OfflineStore {
    fn list_sessions(&self) -> Result<Vec<PracticeSession>> {
        Ok(Vec::new())
    }

    fn add_session(&mut self, _doc: &SessionDocument) -> Result<PracticeSession> {
        Err(JournalError::NotConfigured)
    }

    fn list_poses(&self) -> Result<Vec<YogaPose>> {
        default_poses()?
            .into_iter()
            .enumerate()
            .map(|(i, pose)| {
                let doc = pose.to_document(false, self.started_at);
                YogaPose::from_document(PoseId(i as i64 + 1), doc, self.started_at)
            })
            .collect()
    }

    fn add_pose(&mut self, _pose: NewPose) -> Result<YogaPose> {
        Err(JournalError::NotConfigured)
    }

    fn delete_pose(&mut self, _id: PoseId) -> Result<bool> {
        Ok(false)
    }

    fn seed_default_poses_if_empty(&mut self) -> Result<usize> {
        Ok(0)
    }
}
