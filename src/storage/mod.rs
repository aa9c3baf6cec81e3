//! Storage layer for roadmap data.
//!
//! The whole feature collection is one JSON array stored under a single key
//! (`roadmap_features` by default), the same shape the browser build keeps
//! in local storage. [`FeatureStore`] loads it once, applies mutations in
//! memory and writes the full array back after each change.
//!
//! ## Storage Backends
//!
//! - **File backend** (default): `<data_dir>/store/<key>.json`
//! - **Memory backend**: for tests and embedding
//!
//! Content that is not a JSON array is logged and treated as an empty
//! collection. Individual records that cannot be read are kept verbatim and
//! written back after the readable ones. Write failures are returned to the
//! caller and leave the in-memory collection unchanged.

pub mod backend;

pub use backend::{BackendType, FileBackend, KeyValueBackend, MemoryBackend};

use crate::models::{
    DecodedFeatures, Feature, FeatureDraft, FeatureSink, decode_collection, encode_collection,
};
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Key the feature list is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "roadmap_features";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RMAP_DATA_DIR";

/// Prefix of generated feature ids.
pub const FEATURE_ID_PREFIX: &str = "ft";

/// Get the data directory.
///
/// Precedence: explicit override (the `--data-dir` flag, which clap also
/// fills from `RMAP_DATA_DIR`) > `RMAP_DATA_DIR` > `~/.local/share/roadmap/`.
pub fn get_data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("roadmap"))
}

/// Generate a unique ID for a feature.
///
/// Format: `<prefix>-<4 hex chars>`, hashed from the seed and the current time.
pub fn generate_id(prefix: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", prefix, &hash_hex[..4])
}

/// Validate a feature ID given on the command line.
///
/// Any non-blank id is accepted: generated ids look like `ft-a1b2`, records
/// created in the browser use millisecond timestamps.
pub fn validate_feature_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidId("feature ID must not be empty".to_string()));
    }
    if id.chars().any(char::is_control) {
        return Err(Error::InvalidId(format!(
            "feature ID contains control characters: {:?}",
            id
        )));
    }
    Ok(())
}

/// Decode stored content, falling back to an empty collection.
fn load_features(key: &str, content: &str) -> DecodedFeatures {
    decode_collection(content).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "stored features are not a JSON array, starting empty");
        DecodedFeatures::default()
    })
}

/// The feature collection bound to a backend and key.
pub struct FeatureStore {
    backend: Box<dyn KeyValueBackend>,
    key: String,
    features: Vec<Feature>,
    unreadable: Vec<serde_json::Value>,
}

impl std::fmt::Debug for FeatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureStore")
            .field("backend", &self.backend.backend_type())
            .field("key", &self.key)
            .field("features", &self.features.len())
            .field("unreadable", &self.unreadable.len())
            .finish()
    }
}

impl FeatureStore {
    /// Open the collection stored under `key` in `backend`.
    pub fn open(backend: Box<dyn KeyValueBackend>, key: &str) -> Result<Self> {
        let decoded = match backend.read(key) {
            Ok(Some(content)) => load_features(key, &content),
            Ok(None) => DecodedFeatures::default(),
            Err(Error::InvalidInput(msg)) => return Err(Error::InvalidInput(msg)),
            Err(e) => {
                tracing::warn!(key, error = %e, "could not read stored features, starting empty");
                DecodedFeatures::default()
            }
        };
        tracing::debug!(
            key,
            count = decoded.features.len(),
            unreadable = decoded.unreadable.len(),
            location = %backend.location(),
            "opened feature store"
        );
        Ok(Self {
            backend,
            key: key.to_string(),
            features: decoded.features,
            unreadable: decoded.unreadable,
        })
    }

    /// Open the file-backed collection in a data directory.
    pub fn open_in(data_dir: &Path, key: &str) -> Result<Self> {
        Self::open(Box::new(FileBackend::new(data_dir)), key)
    }

    /// An empty collection held in memory.
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            key: DEFAULT_STORAGE_KEY.to_string(),
            features: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// All features in stored order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Stored records that could not be read as features.
    pub fn unreadable(&self) -> &[serde_json::Value] {
        &self.unreadable
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Get a feature by ID.
    pub fn get(&self, id: &str) -> Result<&Feature> {
        self.features
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.features
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Generate an id not used by any stored feature.
    fn fresh_id(&self, seed: &str) -> String {
        let mut attempt = 0u32;
        loop {
            let id = generate_id(FEATURE_ID_PREFIX, &format!("{}:{}", seed, attempt));
            if self.features.iter().all(|f| f.id != id) {
                return id;
            }
            attempt += 1;
        }
    }

    /// Create a feature from a draft, append it and persist.
    pub fn add(&mut self, draft: FeatureDraft) -> Result<Feature> {
        let id = self.fresh_id(&draft.name);
        let feature = Feature::from_draft(id, draft);
        feature.validate()?;
        let mut next = self.features.clone();
        next.push(feature.clone());
        self.commit(next)?;
        tracing::info!(id = %feature.id, name = %feature.name, "added feature");
        Ok(feature)
    }

    /// Replace the feature with the same id and persist.
    pub fn update(&mut self, feature: Feature) -> Result<()> {
        feature.validate()?;
        let index = self.position(&feature.id)?;
        let id = feature.id.clone();
        let mut next = self.features.clone();
        next[index] = feature;
        self.commit(next)?;
        tracing::info!(%id, "updated feature");
        Ok(())
    }

    /// Remove a feature by id and persist. Returns the removed feature.
    pub fn delete(&mut self, id: &str) -> Result<Feature> {
        let index = self.position(id)?;
        let mut next = self.features.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        tracing::info!(id, "deleted feature");
        Ok(removed)
    }

    /// Write the whole collection back to the backend.
    pub fn save(&mut self) -> Result<()> {
        let features = std::mem::take(&mut self.features);
        let result = self.write(&features);
        self.features = features;
        result
    }

    /// Persist `features`, and only then make them the in-memory collection.
    fn commit(&mut self, features: Vec<Feature>) -> Result<()> {
        self.write(&features)?;
        self.features = features;
        Ok(())
    }

    fn write(&mut self, features: &[Feature]) -> Result<()> {
        let records = encode_collection(features, &self.unreadable)?;
        let content = serde_json::to_string_pretty(&records)?;
        self.backend.write(&self.key, &content)
    }
}

impl FeatureSink for FeatureStore {
    fn update_feature(&mut self, feature: Feature) {
        if let Err(e) = self.update(feature) {
            tracing::warn!(error = %e, "update rejected");
        }
    }

    fn delete_feature(&mut self, id: &str) {
        if let Err(e) = self.delete(id) {
            tracing::warn!(id, error = %e, "delete rejected");
        }
    }
}
