use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CORE_FILE: &str = "pokemon_core_dataset.csv";
pub const EVOLUTION_FILE: &str = "pokemon_evolution_long.csv";
pub const MOVES_FILE: &str = "pokemon_moves_height_weight.csv";
pub const PROCESSED_DIR: &str = "processed";
pub const STAGING_DIR: &str = ".processed-staging";
const RETIRED_DIR: &str = ".processed-old";
pub const DEFAULT_DB: &str = "pokedex.sqlite";

/// Layout of the data directory: raw extracts at the root, intermediate
/// tables under `processed/`, the database next to them by default.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use `custom_dir`, else `./data` when present, else the platform data dir
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let root = match custom_dir {
            Some(dir) => dir,
            None => {
                let local = PathBuf::from("data");
                if local.is_dir() {
                    local
                } else {
                    let proj_dirs = ProjectDirs::from("", "", "pokedex-seed")
                        .context("Could not determine data directory")?;
                    proj_dirs.data_dir().to_path_buf()
                }
            }
        };

        Ok(Self { root })
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn core_file(&self) -> PathBuf {
        self.root.join(CORE_FILE)
    }

    pub fn evolution_file(&self) -> PathBuf {
        self.root.join(EVOLUTION_FILE)
    }

    pub fn moves_file(&self) -> PathBuf {
        self.root.join(MOVES_FILE)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join(PROCESSED_DIR)
    }

    /// Where a wrangle run writes before its output is published
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    /// Create an empty staging directory, dropping leftovers of an
    /// interrupted run
    pub fn begin_staging(&self) -> Result<PathBuf> {
        let dir = self.staging_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to remove stale staging dir {:?}", dir))?;
        }
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create staging dir {:?}", dir))?;
        Ok(dir)
    }

    /// Replace `processed/` with the staging directory and return it
    pub fn publish_staging(&self) -> Result<PathBuf> {
        let staging = self.staging_dir();
        let processed = self.processed_dir();
        let retired = self.root.join(RETIRED_DIR);

        if retired.exists() {
            fs::remove_dir_all(&retired)
                .with_context(|| format!("Failed to remove {:?}", retired))?;
        }
        if processed.exists() {
            fs::rename(&processed, &retired)
                .with_context(|| format!("Failed to move aside {:?}", processed))?;
        }
        fs::rename(&staging, &processed)
            .with_context(|| format!("Failed to publish {:?}", processed))?;

        if let Err(err) = fs::remove_dir_all(&retired) {
            if retired.exists() {
                warn!("Could not remove {:?}: {}", retired, err);
            }
        }
        Ok(processed)
    }

    /// Drop a failed run's staging directory
    pub fn discard_staging(&self) {
        let dir = self.staging_dir();
        if let Err(err) = fs::remove_dir_all(&dir) {
            warn!("Could not remove staging dir {:?}: {}", dir, err);
        }
    }

    /// Database path, `db` if given
    pub fn database(&self, db: Option<PathBuf>) -> PathBuf {
        db.unwrap_or_else(|| self.root.join(DEFAULT_DB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout() {
        let data = DataDir::at("/srv/pokedex");

        assert_eq!(data.core_file(), PathBuf::from("/srv/pokedex/pokemon_core_dataset.csv"));
        assert_eq!(data.processed_dir(), PathBuf::from("/srv/pokedex/processed"));
        assert_eq!(data.database(None), PathBuf::from("/srv/pokedex/pokedex.sqlite"));
        assert_eq!(
            data.database(Some(PathBuf::from("other.db"))),
            PathBuf::from("other.db")
        );
    }

    #[test]
    fn test_publish_replaces_processed() {
        let dir = tempdir().unwrap();
        let data = DataDir::new(Some(dir.path().to_path_buf())).unwrap();

        let staging = data.begin_staging().unwrap();
        fs::write(staging.join("pokemon.csv"), "first").unwrap();
        let processed = data.publish_staging().unwrap();
        assert_eq!(fs::read_to_string(processed.join("pokemon.csv")).unwrap(), "first");

        let staging = data.begin_staging().unwrap();
        fs::write(staging.join("evolutions.csv"), "second").unwrap();
        data.publish_staging().unwrap();

        assert!(!processed.join("pokemon.csv").exists());
        assert!(processed.join("evolutions.csv").exists());
        assert!(!data.staging_dir().exists());
        assert!(!dir.path().join(RETIRED_DIR).exists());
    }

    #[test]
    fn test_begin_staging_clears_leftovers() {
        let dir = tempdir().unwrap();
        let data = DataDir::at(dir.path());

        let staging = data.begin_staging().unwrap();
        fs::write(staging.join("stale.csv"), "x").unwrap();

        let staging = data.begin_staging().unwrap();
        assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);

        data.discard_staging();
        assert!(!staging.exists());
    }
}
