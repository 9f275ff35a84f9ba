use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::AppConfig;

/// Default data directory: `$VIDPLAN_DATA_DIR`, else `~/.vidplan`.
pub fn get_data_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(v) = std::env::var("VIDPLAN_DATA_DIR") {
        if !v.trim().is_empty() {
            return Ok(PathBuf::from(shellexpand_home(v.trim())));
        }
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".vidplan"))
}

pub fn load_default() -> Result<AppConfig, ConfigError> {
    // Priority 1: <data_dir>/config.toml (highest)
    let data_dir = get_data_dir()?;
    let data_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let cfg = if data_config.exists() {
        read_config(&data_config)?
    } else if local_config.exists() {
        read_config(local_config)?
    } else {
        AppConfig::default()
    };

    finalize(cfg, data_dir)
}

/// Load a specific config file, using its parent directory as data directory
/// unless the file names one.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let cfg = read_config(path)?;
    let data_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    finalize(cfg, data_dir)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn finalize(mut cfg: AppConfig, fallback_data_dir: PathBuf) -> Result<AppConfig, ConfigError> {
    apply_env_overrides(&mut cfg)?;

    let data_dir = match cfg.paths.data_dir.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => PathBuf::from(shellexpand_home(d)),
        _ => fallback_data_dir,
    };
    std::fs::create_dir_all(&data_dir)?;

    cfg.paths.config_dir = resolve_dir(&data_dir, &cfg.paths.config_dir);
    cfg.paths.projects_dir = resolve_dir(&data_dir, &cfg.paths.projects_dir);
    cfg.paths.output_dir = resolve_dir(&data_dir, &cfg.paths.output_dir);
    cfg.paths.data_dir = Some(data_dir.to_string_lossy().to_string());

    // Update logging directory to use data directory if not set
    if cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }

    Ok(cfg)
}

// Environment variable overrides (Priority 0: highest)
fn apply_env_overrides(cfg: &mut AppConfig) -> Result<(), ConfigError> {
    if let Ok(v) = std::env::var("VIDPLAN_DATA_DIR") {
        if !v.trim().is_empty() {
            cfg.paths.data_dir = Some(v.trim().to_string());
        }
    }
    if let Ok(v) = std::env::var("VIDPLAN_VIDEO_TOOL") {
        if !v.trim().is_empty() {
            cfg.executor.video_tool = v.trim().to_string();
        }
    }
    if let Ok(v) = std::env::var("VIDPLAN_MAX_PARALLEL") {
        if !v.trim().is_empty() {
            let n = v
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidEnv {
                    key: "VIDPLAN_MAX_PARALLEL".to_string(),
                    value: v.clone(),
                })?;
            cfg.executor.max_parallel = Some(n.max(1));
        }
    }
    Ok(())
}

fn resolve_dir(base: &Path, dir: &str) -> String {
    let expanded = shellexpand_home(dir);
    let path = PathBuf::from(&expanded);
    if path.is_absolute() {
        expanded
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn shellexpand_home(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_relative_dirs_resolve_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[paths]
projects_dir = "work"

[executor]
video_tool = "/opt/explainer/bin/explain"
max_parallel = 3

[memory]
aggregate_every = 10
"#,
        )
        .unwrap();

        let cfg = load_from_path(&path).unwrap();
        assert_eq!(
            PathBuf::from(&cfg.paths.projects_dir),
            dir.path().join("work")
        );
        assert_eq!(
            PathBuf::from(&cfg.paths.config_dir),
            dir.path().join("catalog")
        );
        assert_eq!(cfg.executor.video_tool, "/opt/explainer/bin/explain");
        assert_eq!(cfg.executor.max_parallel, Some(3));
        assert_eq!(cfg.memory.aggregate_every, 10);
        assert_eq!(cfg.memory.min_preference_count, 2);
        assert!(cfg.logging.directory.unwrap().ends_with("logs"));
    }

    #[test]
    fn test_malformed_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[executor\nvideo_tool = 1").unwrap();

        assert!(matches!(
            load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_absolute_dirs_untouched() {
        let base = Path::new("/data");
        assert_eq!(resolve_dir(base, "/srv/out"), "/srv/out");
        assert_eq!(
            PathBuf::from(resolve_dir(base, "out")),
            PathBuf::from("/data/out")
        );
    }
}
