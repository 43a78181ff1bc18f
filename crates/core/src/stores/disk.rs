use crate::models::{IndexEntry, ScoredChunk};
use crate::traits::VectorIndex;
use crate::QueryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub const INDEX_FILE_NAME: &str = "index.json";

#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    built_at: DateTime<Utc>,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

#[derive(Default)]
struct IndexState {
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
}

/// File-backed vector index. Every upsert rewrites the whole index file, so
/// whatever was persisted last survives a process restart. Reads take a
/// shared lock; upserts take the write lock, which keeps rebuilds exclusive
/// against in-flight queries.
pub struct DiskVectorStore {
    file_path: PathBuf,
    state: RwLock<IndexState>,
}

impl DiskVectorStore {
    /// Starts an empty index that will persist under `dir`. Nothing is
    /// written until the first upsert, so an aborted build leaves any
    /// previously persisted index untouched; the first successful upsert
    /// replaces it (last full build wins).
    pub fn create(dir: &Path) -> Result<Self, QueryError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            file_path: dir.join(INDEX_FILE_NAME),
            state: RwLock::new(IndexState::default()),
        })
    }

    /// Loads a previously persisted index from `dir`.
    pub async fn open(dir: &Path) -> Result<Self, QueryError> {
        let file_path = dir.join(INDEX_FILE_NAME);
        let bytes = tokio::fs::read(&file_path)
            .await
            .map_err(|_| QueryError::IndexNotReady(file_path.display().to_string()))?;

        let persisted: PersistedIndex = serde_json::from_slice(&bytes)
            .map_err(|_| QueryError::IndexNotReady(file_path.display().to_string()))?;

        Ok(Self {
            file_path,
            state: RwLock::new(IndexState {
                dimensions: Some(persisted.dimensions),
                entries: persisted.entries,
            }),
        })
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn persist(&self, state: &IndexState) -> Result<(), QueryError> {
        let persisted = PersistedIndex {
            built_at: Utc::now(),
            dimensions: state.dimensions.unwrap_or(0),
            entries: state.entries.clone(),
        };
        let bytes = serde_json::to_vec(&persisted)?;
        tokio::fs::write(&self.file_path, bytes).await?;
        Ok(())
    }
}

fn check_dimensions(expected: Option<usize>, got: usize) -> Result<(), QueryError> {
    match expected {
        Some(dimensions) if dimensions != got => Err(QueryError::BackendResponse {
            backend: "disk-index".to_string(),
            details: format!("vector dimension {got} does not match index dimension {dimensions}"),
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl VectorIndex for DiskVectorStore {
    async fn upsert(&self, entries: &[IndexEntry]) -> Result<(), QueryError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write().await;
        for entry in entries {
            check_dimensions(state.dimensions, entry.vector.len())?;
            state.dimensions.get_or_insert(entry.vector.len());
            state
                .entries
                .retain(|existing| existing.chunk.chunk_id != entry.chunk.chunk_id);
            state.entries.push(entry.clone());
        }

        self.persist(&state).await
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, QueryError> {
        let state = self.state.read().await;
        check_dimensions(state.dimensions, vector.len())?;
        Ok(super::rank_entries(&state.entries, vector, top_k))
    }
}
