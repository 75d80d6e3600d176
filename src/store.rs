//! Persistence of configuration and recorded defects.
//!
//! The `store` module defines the [`KeyValueStore`] trait that every
//! storage backend implements, two backends (in-memory and a directory
//! of JSON files), and the [`Repository`] that reads and writes the
//! application's two keys: the system configuration and the defect
//! collection.

use crate::error::Result;
use crate::models::{Defect, SystemConfig};
use crate::samples::sample_defects;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const CONFIG_KEY: &str = "systemConfig";
pub const DEFECTS_KEY: &str = "defects";

/// A string-keyed store of JSON documents.
///
/// Stores must be thread-safe (`Send + Sync`) because the HTTP layer
/// shares one across request handlers.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: String) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Keeps documents in memory.  Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Stores each key as `<key>.json` inside a directory, which is
/// created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, key: &str, value: String) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        // Readers never observe a partially written document.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Typed access to the configuration and the defect collection.
pub struct Repository {
    store: Box<dyn KeyValueStore>,
}

impl Repository {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// The saved configuration, or the defaults when none was saved.
    pub fn load_config(&self) -> Result<SystemConfig> {
        match self.store.get(CONFIG_KEY)? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(SystemConfig::default()),
        }
    }

    /// Validates the configuration, re-derives every hourly cost and
    /// persists it.  Returns the configuration as saved.
    pub fn save_config(&self, mut config: SystemConfig) -> Result<SystemConfig> {
        config.validate()?;
        config.refresh_hourly_costs()?;
        self.store.put(CONFIG_KEY, serde_json::to_string(&config)?)?;
        tracing::debug!(roles = config.job_roles.len(), "saved system configuration");
        Ok(config)
    }

    pub fn reset_config(&self) -> Result<SystemConfig> {
        self.store.remove(CONFIG_KEY)?;
        tracing::debug!("restored default system configuration");
        Ok(SystemConfig::default())
    }

    pub fn defects(&self) -> Result<Vec<Defect>> {
        match self.store.get(DEFECTS_KEY)? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_defects(&self, defects: &[Defect]) -> Result<()> {
        self.store.put(DEFECTS_KEY, serde_json::to_string(defects)?)
    }

    pub fn append_defect(&self, defect: Defect) -> Result<()> {
        let mut defects = self.defects()?;
        tracing::debug!(id = %defect.id, title = %defect.breakdown.input.title, "recording defect");
        defects.push(defect);
        self.write_defects(&defects)
    }

    /// Deletes the defects with the given ids.  Returns how many were
    /// removed.
    pub fn delete_defects(&self, ids: &[String]) -> Result<usize> {
        let mut defects = self.defects()?;
        let before = defects.len();
        defects.retain(|d| !ids.contains(&d.id));
        let removed = before - defects.len();
        if removed > 0 {
            self.write_defects(&defects)?;
        }
        tracing::debug!(removed, "deleted defects");
        Ok(removed)
    }

    /// Deletes every defect.  Returns how many were removed.
    pub fn clear_defects(&self) -> Result<usize> {
        let removed = self.defects()?.len();
        self.store.remove(DEFECTS_KEY)?;
        tracing::debug!(removed, "cleared defects");
        Ok(removed)
    }

    /// Seeds the sample defects when the collection is empty.  Returns
    /// how many were added.
    pub fn seed_samples_if_empty(&self, config: &SystemConfig) -> Result<usize> {
        if !self.defects()?.is_empty() {
            return Ok(0);
        }
        let samples = sample_defects(config);
        let count = samples.len();
        self.write_defects(&samples)?;
        tracing::info!(count, "seeded sample defects");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PerceivedImpact, Phase};
    use crate::simulator::DefectDraft;
    use tempfile::TempDir;

    fn recorded(title: &str, config: &SystemConfig) -> Defect {
        let mut draft = DefectDraft::new(title, PerceivedImpact::MildIrritation);
        draft.add_role(config, "dev-junior").unwrap();
        Defect::from_breakdown(draft.simulate(config).unwrap())
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let repo = Repository::new(MemoryStore::new());
        assert_eq!(repo.load_config().unwrap(), SystemConfig::default());
        assert!(repo.defects().unwrap().is_empty());
    }

    #[test]
    fn test_save_config_validates_and_refreshes() {
        let repo = Repository::new(MemoryStore::new());
        let mut config = SystemConfig::default();
        config.job_roles[0].salary_paid = Some(17600.0);
        config.job_roles[0].hourly_cost = 1.0;
        let saved = repo.save_config(config).unwrap();
        assert_eq!(saved.job_roles[0].hourly_cost, 100.0);
        assert_eq!(repo.load_config().unwrap(), saved);

        let mut bad = saved.clone();
        bad.phase_multipliers.set(Phase::Production, 0.0);
        assert!(repo.save_config(bad).is_err());
        assert_eq!(repo.load_config().unwrap(), saved);

        assert_eq!(repo.reset_config().unwrap(), SystemConfig::default());
        assert_eq!(repo.load_config().unwrap(), SystemConfig::default());
    }

    #[test]
    fn test_append_and_delete_defects() {
        let repo = Repository::new(MemoryStore::new());
        let config = SystemConfig::default();
        let a = recorded("A", &config);
        let b = recorded("B", &config);
        let c = recorded("C", &config);
        repo.append_defect(a.clone()).unwrap();
        repo.append_defect(b.clone()).unwrap();
        repo.append_defect(c.clone()).unwrap();

        let removed = repo
            .delete_defects(&[a.id.clone(), "missing".to_string(), c.id.clone()])
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.defects().unwrap(), vec![b]);

        assert_eq!(repo.clear_defects().unwrap(), 1);
        assert!(repo.defects().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let config = SystemConfig::default();
        let defect = recorded("Persistido", &config);
        {
            let repo = Repository::new(FileStore::new(dir.path().join("data")));
            repo.append_defect(defect.clone()).unwrap();
        }
        let repo = Repository::new(FileStore::new(dir.path().join("data")));
        assert_eq!(repo.defects().unwrap(), vec![defect]);
        assert!(dir.path().join("data").join("defects.json").is_file());
        repo.clear_defects().unwrap();
        assert!(!dir.path().join("data").join("defects.json").exists());
        repo.clear_defects().unwrap();
    }

    #[test]
    fn test_seed_only_fills_empty_collection() {
        let repo = Repository::new(MemoryStore::new());
        let config = SystemConfig::default();
        let seeded = repo.seed_samples_if_empty(&config).unwrap();
        assert!(seeded > 0);
        assert_eq!(repo.seed_samples_if_empty(&config).unwrap(), 0);
        assert_eq!(repo.defects().unwrap().len(), seeded);
    }
}
