//! Locations the service looks in for its model assets.
use std::path::PathBuf;

const APP_DIR: &str = "cropix";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsAccess {
    Home,
    Config,
    Current,
}

impl FsAccess {
    /// Base path for the directory type.
    ///
    /// # Arguments
    /// * `raw` - If `true`, returns the base path without the `cropix` subdirectory.
    fn get_path(&self, raw: bool) -> anyhow::Result<PathBuf> {
        let base_path = match self {
            FsAccess::Home => dirs::home_dir(),
            FsAccess::Config => dirs::config_dir(),
            FsAccess::Current => std::env::current_dir().ok(),
        };

        let mut path = base_path.ok_or_else(|| {
            anyhow::anyhow!("Unable to resolve the {:?} directory on this platform", self)
        })?;

        if !raw {
            match self {
                FsAccess::Home => path.push(format!(".{APP_DIR}")),
                FsAccess::Config => path.push(APP_DIR),
                FsAccess::Current => {}
            }
        }
        Ok(path)
    }

    /// Application directory, e.g. `~/.config/cropix`, `~/.cropix` or the working directory.
    /// Nothing is created on disk.
    pub fn path(&self) -> anyhow::Result<PathBuf> {
        self.get_path(false)
    }

    /// The directory without the application subdirectory, e.g. `~/.config`.
    pub fn raw_path(&self) -> anyhow::Result<PathBuf> {
        self.get_path(true)
    }

    /// First location holding `models/class_names.json`, searched in the
    /// order current directory, config directory, home directory.
    pub fn find_asset_dir() -> Option<PathBuf> {
        [FsAccess::Current, FsAccess::Config, FsAccess::Home]
            .iter()
            .filter_map(|fs| fs.path().ok())
            .find(|dir| dir.join("models").join("class_names.json").is_file())
    }
}
