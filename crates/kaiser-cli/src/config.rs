use kaiser_driver::DriverConfig;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KaiserConfig {
    pub dump_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    /// Breakpoint armed at start-up, in the same hex syntax as `--break`.
    pub breakpoint: Option<String>,
    /// Log the status line every this many frames.
    pub status_every: u64,
    pub driver: DriverConfig,
}

impl Default for KaiserConfig {
    fn default() -> Self {
        Self {
            dump_dir: PathBuf::from("dumps"),
            screenshot_dir: PathBuf::from("screenshots"),
            breakpoint: None,
            status_every: 60,
            driver: DriverConfig::default(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("kaiser").join("kaiser.toml");
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("kaiser").join("kaiser.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("kaiser")
            .join("kaiser.toml");
    }

    PathBuf::from("kaiser.toml")
}

/// Reads the config at `path`. A missing file gives the defaults silently;
/// a malformed one gives the defaults with a warning.
pub fn load_from_file(path: &Path) -> KaiserConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return KaiserConfig::default(),
    };

    match toml::from_str::<KaiserConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse config {}: {e}; using defaults",
                path.display()
            );
            KaiserConfig::default()
        }
    }
}

pub fn save_to_file(path: &Path, cfg: &KaiserConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let text = toml::to_string_pretty(cfg).map_err(std::io::Error::other)?;
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from_file(&dir.path().join("nope.toml"));
        assert_eq!(cfg, KaiserConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kaiser.toml");
        std::fs::write(
            &path,
            "breakpoint = \"$200\"\n[driver]\nturbo_interval_ms = 2\n",
        )
        .unwrap();

        let cfg = load_from_file(&path);
        assert_eq!(cfg.breakpoint.as_deref(), Some("$200"));
        assert_eq!(cfg.driver.turbo_interval_ms, 2);
        assert_eq!(cfg.driver.frame_interval_ms, 16);
        assert_eq!(cfg.status_every, 60);
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kaiser.toml");
        std::fs::write(&path, "status_every = \"often\"").unwrap();
        assert_eq!(load_from_file(&path), KaiserConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kaiser.toml");
        let mut cfg = KaiserConfig::default();
        cfg.driver.disassembly_lines = 16;
        cfg.screenshot_dir = PathBuf::from("/tmp/shots");

        save_to_file(&path, &cfg).unwrap();
        assert_eq!(load_from_file(&path), cfg);
    }
}
