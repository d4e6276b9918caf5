//! Flat vector index persisted as an index file plus a parallel metadata file
//!
//! Every insert is a full load-append-save. The two files are written one
//! after the other, so a crash between the renames can leave them out of
//! step. Both carry the same generation stamp, bumped on every save; a pair
//! whose stamps or lengths disagree is reported as `IndexUnavailable` by
//! search and insert alike, and is never written over.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::{DuplicatePolicy, StorageConfig};
use crate::error::{Error, Result};
use crate::types::{RecordMeta, SearchHit, VectorRecord};

/// Serialized index: all vectors share `dimension`, fixed by the first insert
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlatIndex {
    generation: u64,
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    fn new(dimension: usize) -> Self {
        Self {
            generation: 0,
            dimension,
            vectors: Vec::new(),
        }
    }
}

/// Serialized metadata, stamped with the generation of its index
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MetadataFile {
    generation: u64,
    records: Vec<RecordMeta>,
}

/// Result of a single insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Records in the store after the insert
    pub index_size: usize,
    /// Vector dimension of the store
    pub dimension: usize,
    /// Older entries for the same source removed first
    pub replaced: usize,
}

/// Persisted flat vector store
pub struct VectorStore {
    index_path: PathBuf,
    metadata_path: PathBuf,
    duplicate_policy: DuplicatePolicy,
    /// Serialises load-append-save within this process only
    write_guard: Mutex<()>,
}

impl VectorStore {
    /// Create a store over the files named in `config`
    pub fn new(config: &StorageConfig) -> Self {
        Self::open(config.index_path(), config.metadata_path(), config.duplicate_policy)
    }

    /// Create a store over explicit file paths
    pub fn open(
        index_path: impl Into<PathBuf>,
        metadata_path: impl Into<PathBuf>,
        duplicate_policy: DuplicatePolicy,
    ) -> Self {
        Self {
            index_path: index_path.into(),
            metadata_path: metadata_path.into(),
            duplicate_policy,
            write_guard: Mutex::new(()),
        }
    }

    /// Whether any store file exists on disk
    pub fn exists(&self) -> bool {
        self.index_path.exists() || self.metadata_path.exists()
    }

    /// Append a record and persist both files before returning
    pub fn insert(&self, record: VectorRecord) -> Result<InsertOutcome> {
        if record.vector.is_empty() {
            return Err(Error::Validation("cannot index an empty vector".to_string()));
        }
        if record.vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::Validation("vector contains non-finite values".to_string()));
        }

        let _guard = self.write_guard.lock();

        let (mut index, mut metadata) = match self.load()? {
            Some(loaded) => loaded,
            None => {
                tracing::info!(
                    "Creating vector store at {} ({}-d)",
                    self.index_path.display(),
                    record.vector.len()
                );
                (FlatIndex::new(record.vector.len()), Vec::new())
            }
        };

        if record.vector.len() != index.dimension {
            return Err(Error::DimensionMismatch {
                expected: index.dimension,
                actual: record.vector.len(),
            });
        }

        let replaced = match self.duplicate_policy {
            DuplicatePolicy::Allow => 0,
            DuplicatePolicy::Replace => {
                remove_source(&mut index.vectors, &mut metadata, &record.source_id)
            }
        };
        if replaced > 0 {
            tracing::debug!("Replacing {} entries for {}", replaced, record.source_id);
        }

        metadata.push(record.meta());
        index.vectors.push(record.vector);
        index.generation += 1;

        self.save(&index, metadata)?;

        Ok(InsertOutcome {
            index_size: index.vectors.len(),
            dimension: index.dimension,
            replaced,
        })
    }

    /// Return up to `k` records ordered by ascending distance to `query`.
    ///
    /// Fails with `NoIndex` if the store has never been written. Equal
    /// distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let (index, metadata) = self.load()?.ok_or(Error::NoIndex)?;

        if query.len() != index.dimension {
            return Err(Error::DimensionMismatch {
                expected: index.dimension,
                actual: query.len(),
            });
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(Error::Validation("query vector contains non-finite values".to_string()));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = index
            .vectors
            .iter()
            .zip(metadata.iter())
            .enumerate()
            .map(|(position, (vector, _))| (position, squared_l2(query, vector)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, distance)| {
                let meta = &metadata[position];
                SearchHit {
                    position,
                    source_id: meta.source_id.clone(),
                    topic: meta.topic.clone(),
                    distance,
                }
            })
            .collect())
    }

    /// Stored metadata in insertion order (empty if the store does not exist)
    pub fn records(&self) -> Result<Vec<RecordMeta>> {
        Ok(self.load()?.map(|(_, metadata)| metadata).unwrap_or_default())
    }

    /// Vector dimension, once fixed by the first insert
    pub fn dimension(&self) -> Result<Option<usize>> {
        Ok(self.load()?.map(|(index, _)| index.dimension))
    }

    /// Read both files, refusing a pair that was not saved together
    fn load(&self) -> Result<Option<(FlatIndex, Vec<RecordMeta>)>> {
        match (self.index_path.exists(), self.metadata_path.exists()) {
            (false, false) => Ok(None),
            (true, true) => {
                let index: FlatIndex = read_bincode(&self.index_path)?;
                let metadata: MetadataFile = read_bincode(&self.metadata_path)?;

                if index.generation != metadata.generation {
                    return Err(Error::index_unavailable(format!(
                        "index is at generation {} but metadata is at {}",
                        index.generation, metadata.generation
                    )));
                }
                if index.vectors.len() != metadata.records.len() {
                    return Err(Error::index_unavailable(format!(
                        "index holds {} vectors but metadata lists {} records",
                        index.vectors.len(),
                        metadata.records.len()
                    )));
                }
                Ok(Some((index, metadata.records)))
            }
            (index_present, _) => Err(Error::index_unavailable(format!(
                "{} exists without {}",
                if index_present { self.index_path.display() } else { self.metadata_path.display() },
                if index_present { self.metadata_path.display() } else { self.index_path.display() },
            ))),
        }
    }

    fn save(&self, index: &FlatIndex, records: Vec<RecordMeta>) -> Result<()> {
        for path in [&self.index_path, &self.metadata_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::store_write(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        let metadata = MetadataFile {
            generation: index.generation,
            records,
        };
        write_bincode(&self.index_path, index)?;
        write_bincode(&self.metadata_path, &metadata)?;
        Ok(())
    }
}

/// Remove every entry for `source_id`, keeping vectors and metadata aligned
fn remove_source(vectors: &mut Vec<Vec<f32>>, metadata: &mut Vec<RecordMeta>, source_id: &str) -> usize {
    let before = metadata.len();
    let keep: Vec<bool> = metadata.iter().map(|m| m.source_id != source_id).collect();

    let mut flags = keep.iter();
    vectors.retain(|_| *flags.next().unwrap_or(&true));
    let mut flags = keep.iter();
    metadata.retain(|_| *flags.next().unwrap_or(&true));

    before - metadata.len()
}

/// Squared Euclidean distance
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn read_bincode<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::index_unavailable(format!("cannot read {}: {}", path.display(), e)))?;
    let (value, _) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
        .map_err(|e| Error::index_unavailable(format!("{} is corrupt: {}", path.display(), e)))?;
    Ok(value)
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| Error::store_write(format!("cannot encode {}: {}", path.display(), e)))?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, &bytes)
        .and_then(|_| std::fs::rename(&tmp, path))
        .map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            Error::store_write(format!("cannot write {}: {}", path.display(), e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir, policy: DuplicatePolicy) -> VectorStore {
        VectorStore::open(dir.path().join("vectors.index"), dir.path().join("vectors.meta"), policy)
    }

    #[test]
    fn test_search_before_first_insert_is_no_index() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, DuplicatePolicy::Allow);
        assert!(matches!(store.search(&[1.0, 0.0], 3), Err(Error::NoIndex)));
        assert!(store.records().unwrap().is_empty());
        assert!(!store.exists());
    }

    #[test]
    fn test_insert_persists_and_orders_by_distance() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, DuplicatePolicy::Allow);

        store.insert(VectorRecord::new(vec![0.0, 0.0], "origin", "/a.txt")).unwrap();
        store.insert(VectorRecord::new(vec![3.0, 4.0], "far", "/b.txt")).unwrap();
        let outcome = store.insert(VectorRecord::new(vec![1.0, 0.0], "near", "/c.txt")).unwrap();
        assert_eq!(outcome.index_size, 3);
        assert_eq!(outcome.dimension, 2);

        // A fresh handle sees the same data
        let reopened = store_in(&dir, DuplicatePolicy::Allow);
        let hits = reopened.search(&[0.9, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source_id, "/c.txt");
        assert_eq!(hits[1].source_id, "/a.txt");
        assert!(hits[0].distance <= hits[1].distance);
        assert!((hits[0].distance - 0.01).abs() < 1e-5);
    }

    #[test]
    fn test_search_never_exceeds_k() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, DuplicatePolicy::Allow);
        for i in 0..5 {
            store
                .insert(VectorRecord::new(vec![i as f32], "t", format!("/{}.txt", i)))
                .unwrap();
        }
        assert_eq!(store.search(&[2.0], 3).unwrap().len(), 3);
        assert_eq!(store.search(&[2.0], 10).unwrap().len(), 5);
        assert!(store.search(&[2.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_fixed_by_first_insert() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, DuplicatePolicy::Allow);
        assert_eq!(store.dimension().unwrap(), None);
        store.insert(VectorRecord::new(vec![1.0, 2.0, 3.0], "t", "/a.txt")).unwrap();
        assert_eq!(store.dimension().unwrap(), Some(3));

        let err = store.insert(VectorRecord::new(vec![1.0, 2.0], "t", "/b.txt")).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2 }));
        assert_eq!(store.records().unwrap().len(), 1);

        let err = store.search(&[1.0], 1).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 1 }));
    }

    #[test]
    fn test_duplicate_policies() {
        let dir = TempDir::new().unwrap();
        let allow = store_in(&dir, DuplicatePolicy::Allow);
        allow.insert(VectorRecord::new(vec![1.0], "pricing", "/p.txt")).unwrap();
        allow.insert(VectorRecord::new(vec![1.5], "pricing", "/p.txt")).unwrap();
        assert_eq!(allow.records().unwrap().len(), 2);

        let replace = store_in(&dir, DuplicatePolicy::Replace);
        let outcome = replace.insert(VectorRecord::new(vec![2.0], "pricing", "/p.txt")).unwrap();
        assert_eq!(outcome.replaced, 2);
        assert_eq!(outcome.index_size, 1);
        let hits = replace.search(&[2.0], 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 0.0);
    }

    #[test]
    fn test_corrupt_index_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, DuplicatePolicy::Allow);
        store.insert(VectorRecord::new(vec![1.0], "t", "/a.txt")).unwrap();

        std::fs::write(dir.path().join("vectors.index"), b"\xff\xff\xff").unwrap();
        assert!(matches!(store.search(&[1.0], 1), Err(Error::IndexUnavailable(_))));
        assert!(matches!(
            store.insert(VectorRecord::new(vec![1.0], "t", "/b.txt")),
            Err(Error::IndexUnavailable(_))
        ));
    }

    #[test]
    fn test_missing_half_of_pair_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, DuplicatePolicy::Allow);
        store.insert(VectorRecord::new(vec![1.0], "t", "/a.txt")).unwrap();
        std::fs::remove_file(dir.path().join("vectors.meta")).unwrap();
        assert!(matches!(store.search(&[1.0], 1), Err(Error::IndexUnavailable(_))));
    }

    #[test]
    fn test_pair_from_different_saves_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, DuplicatePolicy::Replace);
        store.insert(VectorRecord::new(vec![0.0, 0.0], "a", "/a.txt")).unwrap();
        store.insert(VectorRecord::new(vec![10.0, 10.0], "b", "/b.txt")).unwrap();
        let stale_meta = std::fs::read(dir.path().join("vectors.meta")).unwrap();

        // Replace reorders the entries but keeps both files the same length
        store.insert(VectorRecord::new(vec![5.0, 5.0], "a", "/a.txt")).unwrap();
        std::fs::write(dir.path().join("vectors.meta"), &stale_meta).unwrap();

        assert!(matches!(store.search(&[10.0, 10.0], 1), Err(Error::IndexUnavailable(_))));
        assert!(matches!(store.records(), Err(Error::IndexUnavailable(_))));
        assert!(matches!(
            store.insert(VectorRecord::new(vec![1.0, 1.0], "c", "/c.txt")),
            Err(Error::IndexUnavailable(_))
        ));
        assert_eq!(std::fs::read(dir.path().join("vectors.meta")).unwrap(), stale_meta);
    }

    #[test]
    fn test_rejects_empty_and_non_finite_vectors() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, DuplicatePolicy::Allow);
        assert!(matches!(
            store.insert(VectorRecord::new(vec![], "t", "/a.txt")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.insert(VectorRecord::new(vec![f32::NAN], "t", "/a.txt")),
            Err(Error::Validation(_))
        ));
        assert!(!store.exists());
    }
}
