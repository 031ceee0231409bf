//! Flat L2 vector index persisted in SQLite
//!
//! Each row holds the insertion position, the place record (JSON) and its
//! embedding (little-endian f32 BLOB) together, so records and vectors
//! cannot drift apart. The whole table is loaded into memory on open and
//! searched exhaustively.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::core::place::PlaceRecord;
use crate::error::{Result, TourError};

/// One index entry: a place and its embedding at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPlace {
    pub position: usize,
    pub place: PlaceRecord,
    pub embedding: Vec<f32>,
}

/// A search result with its squared L2 distance to the query.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub position: usize,
    pub place: &'a PlaceRecord,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexMeta {
    pub embedding_model: String,
    pub dimension: usize,
    pub entry_count: usize,
    pub built_at: Option<String>,
}

#[derive(Debug)]
pub struct FlatIndex {
    entries: Vec<IndexedPlace>,
    dimension: usize,
    embedding_model: String,
    built_at: Option<String>,
}

impl FlatIndex {
    /// Build an in-memory index. All vectors must share one non-zero dimension.
    pub fn from_entries(entries: Vec<IndexedPlace>, embedding_model: &str) -> Result<Self> {
        let dimension = entries.first().map(|e| e.embedding.len()).unwrap_or(0);

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimension) {
            return Err(TourError::IndexBuild(format!(
                "embedding for '{}' has dimension {}, expected {}",
                bad.place.name,
                bad.embedding.len(),
                dimension
            )));
        }
        if !entries.is_empty() && dimension == 0 {
            return Err(TourError::IndexBuild("embeddings are empty".to_string()));
        }
        if let Some((i, e)) = entries.iter().enumerate().find(|(i, e)| e.position != *i) {
            return Err(TourError::IndexBuild(format!(
                "entry {} has position {}",
                i, e.position
            )));
        }

        Ok(Self {
            entries,
            dimension,
            embedding_model: embedding_model.to_string(),
            built_at: None,
        })
    }

    /// Load a persisted index. Missing or unreadable files are `IndexUnavailable`.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TourError::IndexUnavailable(format!(
                "no index at {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(unavailable)?;

        let mut stmt = conn
            .prepare("SELECT position, record, embedding FROM places ORDER BY position")
            .map_err(unavailable)?;
        let rows = stmt
            .query_map([], |row| {
                let position: i64 = row.get(0)?;
                let record: String = row.get(1)?;
                let blob: Vec<u8> = row.get(2)?;
                Ok((position, record, blob))
            })
            .map_err(unavailable)?;

        let mut entries = Vec::new();
        for row in rows {
            let (position, record, blob) = row.map_err(unavailable)?;
            let place: PlaceRecord = serde_json::from_str(&record).map_err(|e| {
                TourError::IndexUnavailable(format!("corrupt record at {}: {}", position, e))
            })?;
            entries.push(IndexedPlace {
                position: position as usize,
                place,
                embedding: blob_to_embedding(&blob),
            });
        }

        let model = read_meta(&conn, "embedding_model")?.unwrap_or_default();
        let built_at = read_meta(&conn, "built_at")?;

        let mut index = Self::from_entries(entries, &model)
            .map_err(|e| TourError::IndexUnavailable(e.to_string()))?;
        index.built_at = built_at;

        info!(
            path = %path.display(),
            entries = index.len(),
            dimension = index.dimension,
            "loaded vector index"
        );
        Ok(index)
    }

    /// Write the index to `path`, replacing any previous file atomically.
    ///
    /// Rows go into a sibling temporary file inside one transaction; the
    /// file is renamed over `path` only after the commit succeeds.
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(build_failed)?;
        }

        let tmp_path = sibling(path, ".tmp");
        if tmp_path.exists() {
            fs::remove_file(&tmp_path).map_err(build_failed)?;
        }

        let write = || -> rusqlite::Result<()> {
            let mut conn = Connection::open(&tmp_path)?;
            conn.execute_batch(
                r#"
                CREATE TABLE places (
                    position INTEGER PRIMARY KEY,
                    record TEXT NOT NULL,
                    embedding BLOB NOT NULL
                );

                CREATE TABLE index_meta (
                    key TEXT PRIMARY KEY,
                    value TEXT
                );
                "#,
            )?;

            let tx = conn.transaction()?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO places (position, record, embedding) VALUES (?1, ?2, ?3)",
                )?;
                for entry in &self.entries {
                    let record = serde_json::to_string(&entry.place)
                        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                    insert.execute(params![
                        entry.position as i64,
                        record,
                        embedding_to_blob(&entry.embedding)
                    ])?;
                }

                let mut meta =
                    tx.prepare("INSERT INTO index_meta (key, value) VALUES (?1, ?2)")?;
                meta.execute(params!["embedding_model", self.embedding_model])?;
                meta.execute(params!["dimension", self.dimension.to_string()])?;
                meta.execute(params!["entry_count", self.entries.len().to_string()])?;
                meta.execute(params!["built_at", chrono::Utc::now().to_rfc3339()])?;
            }
            tx.commit()
        };

        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp_path);
            return Err(build_failed(e));
        }

        fs::rename(&tmp_path, path).map_err(build_failed)?;
        debug!(path = %path.display(), entries = self.entries.len(), "persisted vector index");
        Ok(())
    }

    /// The `k` nearest entries by squared L2 distance, nearest first.
    ///
    /// Ties are broken by index position. Asking for more entries than the
    /// index holds returns all of them.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor<'_>>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(TourError::IndexUnavailable(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let mut neighbors: Vec<Neighbor<'_>> = self
            .entries
            .iter()
            .map(|e| Neighbor {
                position: e.position,
                place: &e.place,
                distance: squared_l2(query, &e.embedding),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }

    pub fn meta(&self) -> IndexMeta {
        IndexMeta {
            embedding_model: self.embedding_model.clone(),
            dimension: self.dimension,
            entry_count: self.entries.len(),
            built_at: self.built_at.clone(),
        }
    }

    pub fn entries(&self) -> &[IndexedPlace] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

/// Exclusive marker file held while an index is being rebuilt.
///
/// Removed on drop. A second builder fails instead of racing the first.
/// The file holds the builder's process id; a lock left by a killed build
/// stays until someone deletes it.
#[derive(Debug)]
pub struct BuildLock {
    path: PathBuf,
}

impl BuildLock {
    pub fn acquire(index_path: &Path) -> Result<Self> {
        let path = sibling(index_path, ".lock");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(build_failed)?;
        }
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(held(&path)),
            Err(e) => return Err(build_failed(e)),
        };
        let lock = Self { path };
        write!(file, "{}", std::process::id()).map_err(build_failed)?;
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn held(path: &Path) -> TourError {
    let owner = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .map(|pid| format!(" by process {pid}"))
        .unwrap_or_default();
    TourError::IndexBuild(format!(
        "index build lock {} is held{}; delete it if no build is running",
        path.display(),
        owner
    ))
}

impl Drop for BuildLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn read_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM index_meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(unavailable)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn unavailable(e: impl std::fmt::Display) -> TourError {
    TourError::IndexUnavailable(e.to_string())
}

fn build_failed(e: impl std::fmt::Display) -> TourError {
    TourError::IndexBuild(e.to_string())
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::place::Division;

    fn entry(position: usize, name: &str, embedding: Vec<f32>) -> IndexedPlace {
        IndexedPlace {
            position,
            place: PlaceRecord::new(name, Division::Dhaka).with_description(name),
            embedding,
        }
    }

    fn sample_index() -> FlatIndex {
        FlatIndex::from_entries(
            vec![
                entry(0, "origin", vec![0.0, 0.0]),
                entry(1, "far", vec![3.0, 4.0]),
                entry(2, "near", vec![1.0, 0.0]),
                entry(3, "near-twin", vec![0.0, 1.0]),
            ],
            "test-model",
        )
        .unwrap()
    }

    #[test]
    fn test_blob_conversion() {
        let embedding = vec![1.0, 2.0, 3.0, -0.5];
        assert_eq!(blob_to_embedding(&embedding_to_blob(&embedding)), embedding);
    }

    #[test]
    fn test_search_orders_by_distance_then_position() -> anyhow::Result<()> {
        let index = sample_index();
        let hits = index.search(&[0.0, 0.0], 3)?;
        let names: Vec<&str> = hits.iter().map(|h| h.place.name.as_str()).collect();
        assert_eq!(names, vec!["origin", "near", "near-twin"]);
        assert_eq!(hits[1].distance, 1.0);
        assert_eq!(hits[2].distance, 1.0);
        Ok(())
    }

    #[test]
    fn test_k_larger_than_population_returns_everything() -> anyhow::Result<()> {
        let index = sample_index();
        let hits = index.search(&[3.0, 4.0], 50)?;
        assert_eq!(hits.len(), 4);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(hits[0].place.name, "far");
        assert_eq!(hits[0].distance, 0.0);
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = sample_index();
        let err = index.search(&[1.0, 2.0, 3.0], 1).unwrap_err();
        assert!(matches!(err, TourError::IndexUnavailable(_)));

        let err = FlatIndex::from_entries(
            vec![entry(0, "a", vec![1.0]), entry(1, "b", vec![1.0, 2.0])],
            "m",
        )
        .unwrap_err();
        assert!(matches!(err, TourError::IndexBuild(_)));
    }

    #[test]
    fn test_positions_must_be_sequential() {
        let err = FlatIndex::from_entries(vec![entry(1, "a", vec![1.0])], "m").unwrap_err();
        assert!(matches!(err, TourError::IndexBuild(_)));
    }

    #[test]
    fn test_persist_and_open() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data/index.db");

        let index = sample_index();
        index.persist(&path)?;
        assert!(!sibling(&path, ".tmp").exists());

        let loaded = FlatIndex::open(&path)?;
        assert_eq!(loaded.entries(), index.entries());
        let meta = loaded.meta();
        assert_eq!(meta.embedding_model, "test-model");
        assert_eq!(meta.dimension, 2);
        assert_eq!(meta.entry_count, 4);
        assert!(meta.built_at.is_some());
        Ok(())
    }

    #[test]
    fn test_persist_replaces_previous_index() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.db");

        sample_index().persist(&path)?;
        let smaller = FlatIndex::from_entries(vec![entry(0, "only", vec![9.0])], "other")?;
        smaller.persist(&path)?;

        let loaded = FlatIndex::open(&path)?;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.embedding_model(), "other");
        Ok(())
    }

    #[test]
    fn test_open_missing_index() {
        let err = FlatIndex::open(Path::new("/nonexistent/index.db")).unwrap_err();
        assert!(matches!(err, TourError::IndexUnavailable(_)));
    }

    #[test]
    fn test_build_lock_is_exclusive() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.db");

        let lock = BuildLock::acquire(&path)?;
        assert!(BuildLock::acquire(&path).is_err());
        drop(lock);
        assert!(BuildLock::acquire(&path).is_ok());
        Ok(())
    }

    #[test]
    fn test_build_lock_error_names_lock_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.db");

        let lock = BuildLock::acquire(&path)?;
        let lock_path = lock.path().to_path_buf();
        assert_eq!(fs::read_to_string(&lock_path)?, std::process::id().to_string());

        let msg = BuildLock::acquire(&path).unwrap_err().to_string();
        assert!(msg.contains(&lock_path.display().to_string()));
        assert!(msg.contains(&format!("by process {}", std::process::id())));
        assert!(msg.contains("delete it if no build is running"));
        drop(lock);

        // left behind by a killed build
        fs::write(&lock_path, "")?;
        let msg = BuildLock::acquire(&path).unwrap_err().to_string();
        assert!(msg.contains(&lock_path.display().to_string()));
        assert!(!msg.contains("by process"));

        fs::remove_file(&lock_path)?;
        assert!(BuildLock::acquire(&path).is_ok());
        Ok(())
    }
}
