use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use mealprint_core::catalog::Catalog;

/// The dataset shipped with the binary, used when no catalog file is
/// configured. Per-kg coefficients in the standard catalog column layout.
const DEFAULT_CATALOG: &str = include_str!("data/foods.csv");

pub struct Config {
    pub catalog_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "mealprint").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let catalog_path = data_dir.join("foods.csv");

        Ok(Config {
            catalog_path,
            data_dir,
        })
    }

    /// Resolve and load the catalog: an explicit `--catalog` path wins,
    /// then `$MEALPRINT_CATALOG`, then `foods.csv` in the data directory,
    /// then the bundled dataset. A missing or malformed file is fatal;
    /// nothing works without the catalog.
    pub fn load_catalog(&self, override_path: Option<&Path>) -> Result<Catalog> {
        if let Some(path) = override_path {
            return Catalog::from_path(path);
        }
        if let Ok(path) = std::env::var("MEALPRINT_CATALOG") {
            return Catalog::from_path(Path::new(&path));
        }
        if self.catalog_path.exists() {
            return Catalog::from_path(&self.catalog_path);
        }
        Catalog::from_reader(DEFAULT_CATALOG.as_bytes()).context("Bundled catalog is malformed")
    }

    /// Load the API key from disk, or generate a new one.
    ///
    /// Returns `(key, newly_created)` where `newly_created` is true when a
    /// fresh key was just generated (first run).
    pub fn load_or_create_api_key(&self) -> Result<(String, bool)> {
        use rand::Rng;
        use std::fmt::Write;

        let path = self.data_dir.join("api_key");

        if path.exists() {
            let key = std::fs::read_to_string(&path).context("Failed to read API key file")?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok((key, false));
            }
        }

        let bytes: [u8; 32] = rand::rng().random();
        let key = bytes
            .iter()
            .fold(String::with_capacity(64), |mut acc: String, b| {
                let _ = write!(acc, "{b:02x}");
                acc
            });
        std::fs::write(&path, &key).context("Failed to write API key file")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to set API key file permissions")?;
        }
        eprintln!("Generated new API key: {key}");
        eprintln!("Include in requests: Authorization: Bearer {key}");
        Ok((key, true))
    }
}
