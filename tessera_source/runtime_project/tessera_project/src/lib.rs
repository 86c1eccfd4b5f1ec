use std::{
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
};
use toml::Value;

pub const RUNTIME_TOML: &str = "runtime.toml";
pub const DEFAULT_MANIFEST: &str = "game.json";
pub const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where assets come from. Exactly one of the two per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetBase {
    Directory(PathBuf),
    Url(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub assets: AssetBase,
    pub manifest: String,
    pub timestep: f32,
    pub pointer_lock: bool,
    pub log_level: String,
}

impl RuntimeConfig {
    /// Config used when a project directory has no `runtime.toml`.
    pub fn default_for_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            assets: AssetBase::Directory(root.into()),
            manifest: DEFAULT_MANIFEST.to_string(),
            timestep: DEFAULT_TIMESTEP,
            pointer_lock: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        match &self.assets {
            AssetBase::Directory(dir) => Some(dir),
            AssetBase::Url(_) => None,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        match &self.assets {
            AssetBase::Url(url) => Some(url),
            AssetBase::Directory(_) => None,
        }
    }

    /// Relative `base_dir` values are taken relative to `root` (the config's directory).
    pub fn rooted_at(mut self, root: &Path) -> Self {
        if let AssetBase::Directory(dir) = &self.assets {
            if dir.is_relative() {
                self.assets = AssetBase::Directory(resolve_local_path(&dir.to_string_lossy(), root));
            }
        }
        self
    }
}

#[derive(Debug)]
pub enum ProjectError {
    Io(std::io::Error),
    ParseToml(toml::de::Error),
    MissingField(&'static str),
    InvalidField(&'static str, String),
}

impl Display for ProjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::ParseToml(err) => write!(f, "{err}"),
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidField(field, reason) => write!(f, "invalid field `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<std::io::Error> for ProjectError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ProjectError {
    fn from(value: toml::de::Error) -> Self {
        Self::ParseToml(value)
    }
}

/// `local://x` and `/x` resolve under `local_root`; anything else joins onto it when relative.
pub fn resolve_local_path(input: &str, local_root: &Path) -> PathBuf {
    let rel = if let Some(stripped) = input.strip_prefix("local://") {
        stripped.trim_start_matches('/')
    } else if input.starts_with('/') {
        input.trim_start_matches('/')
    } else {
        let path = PathBuf::from(input);
        if path.is_absolute() {
            return path;
        }
        input
    };
    if rel.is_empty() || rel == "." {
        return local_root.to_path_buf();
    }
    local_root.join(rel)
}

pub fn default_runtime_toml() -> String {
    format!(
        r#"[assets]
base_dir = "."
manifest = "{DEFAULT_MANIFEST}"

[physics]
timestep = {DEFAULT_TIMESTEP}

[input]
pointer_lock = false

[log]
level = "{DEFAULT_LOG_LEVEL}"
"#
    )
}

/// Reads `<root>/runtime.toml`, falling back to defaults when it does not exist.
pub fn load_runtime_config(root: &Path) -> Result<RuntimeConfig, ProjectError> {
    let path = root.join(RUNTIME_TOML);
    if !path.exists() {
        return Ok(RuntimeConfig::default_for_dir(root));
    }
    load_runtime_toml(&path)
}

pub fn load_runtime_toml(path: &Path) -> Result<RuntimeConfig, ProjectError> {
    let contents = fs::read_to_string(path)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(parse_runtime_toml(&contents)?.rooted_at(root))
}

pub fn parse_runtime_toml(contents: &str) -> Result<RuntimeConfig, ProjectError> {
    let value: Value = contents.parse::<Value>()?;
    let assets_table = value
        .get("assets")
        .and_then(Value::as_table)
        .ok_or(ProjectError::MissingField("assets"))?;

    let base_dir = optional_str(assets_table.get("base_dir"), "assets.base_dir")?;
    let base_url = optional_str(assets_table.get("base_url"), "assets.base_url")?;
    let assets = match (base_dir, base_url) {
        (Some(dir), None) => AssetBase::Directory(PathBuf::from(dir)),
        (None, Some(url)) => {
            let url = url.trim_end_matches('/');
            if url.is_empty() {
                return Err(ProjectError::InvalidField(
                    "assets.base_url",
                    "must not be empty".to_string(),
                ));
            }
            AssetBase::Url(url.to_string())
        }
        (Some(_), Some(_)) => {
            return Err(ProjectError::InvalidField(
                "assets",
                "set either `base_dir` or `base_url`, not both".to_string(),
            ));
        }
        (None, None) => {
            return Err(ProjectError::InvalidField(
                "assets",
                "one of `base_dir` or `base_url` is required".to_string(),
            ));
        }
    };

    let manifest = optional_str(assets_table.get("manifest"), "assets.manifest")?
        .unwrap_or(DEFAULT_MANIFEST)
        .to_string();
    if manifest.trim().is_empty() {
        return Err(ProjectError::InvalidField(
            "assets.manifest",
            "must not be empty".to_string(),
        ));
    }

    let timestep = match section(&value, "physics")?.and_then(|t| t.get("timestep")) {
        None => DEFAULT_TIMESTEP,
        Some(raw) => {
            // Integers are accepted so `timestep = 1` does not fail on type alone.
            let step = raw
                .as_float()
                .or_else(|| raw.as_integer().map(|i| i as f64))
                .ok_or_else(|| {
                    ProjectError::InvalidField("physics.timestep", "must be a number".to_string())
                })?;
            if !step.is_finite() || step <= 0.0 {
                return Err(ProjectError::InvalidField(
                    "physics.timestep",
                    format!("must be greater than 0, got {step}"),
                ));
            }
            step as f32
        }
    };

    let pointer_lock = match section(&value, "input")?.and_then(|t| t.get("pointer_lock")) {
        None => false,
        Some(raw) => raw.as_bool().ok_or_else(|| {
            ProjectError::InvalidField("input.pointer_lock", "must be a boolean".to_string())
        })?,
    };

    let log_level = optional_str(
        section(&value, "log")?.and_then(|t| t.get("level")),
        "log.level",
    )?
    .unwrap_or(DEFAULT_LOG_LEVEL)
    .to_string();

    Ok(RuntimeConfig {
        assets,
        manifest,
        timestep,
        pointer_lock,
        log_level,
    })
}

fn section<'a>(
    value: &'a Value,
    name: &'static str,
) -> Result<Option<&'a toml::map::Map<String, Value>>, ProjectError> {
    match value.get(name) {
        None => Ok(None),
        Some(v) => v
            .as_table()
            .map(Some)
            .ok_or_else(|| ProjectError::InvalidField(name, "must be a table".to_string())),
    }
}

fn optional_str<'a>(
    value: Option<&'a Value>,
    field: &'static str,
) -> Result<Option<&'a str>, ProjectError> {
    match value {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| ProjectError::InvalidField(field, "must be a string".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_DIR_SEQ: AtomicU64 = AtomicU64::new(0);

    fn temp_test_dir() -> PathBuf {
        let seq = TEST_DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tessera_project_test_{pid}_{nonce}_{seq}"))
    }

    #[test]
    fn parse_runtime_toml_reads_all_sections() {
        let toml = r#"
[assets]
base_dir = "game"
manifest = "manifest.json"

[physics]
timestep = 0.01

[input]
pointer_lock = true

[log]
level = "debug"
"#;

        let parsed = parse_runtime_toml(toml).expect("failed to parse runtime.toml");
        assert_eq!(parsed.assets, AssetBase::Directory(PathBuf::from("game")));
        assert_eq!(parsed.manifest, "manifest.json");
        assert!((parsed.timestep - 0.01).abs() < 1e-6);
        assert!(parsed.pointer_lock);
        assert_eq!(parsed.log_level, "debug");
    }

    #[test]
    fn parse_runtime_toml_applies_defaults() {
        let toml = r#"
[assets]
base_url = "https://cdn.example/game/"
"#;

        let parsed = parse_runtime_toml(toml).expect("failed to parse runtime.toml");
        assert_eq!(parsed.base_url(), Some("https://cdn.example/game"));
        assert_eq!(parsed.base_dir(), None);
        assert_eq!(parsed.manifest, DEFAULT_MANIFEST);
        assert_eq!(parsed.timestep, DEFAULT_TIMESTEP);
        assert!(!parsed.pointer_lock);
        assert_eq!(parsed.log_level, "info");
    }

    #[test]
    fn parse_runtime_toml_requires_exactly_one_base() {
        let both = r#"
[assets]
base_dir = "game"
base_url = "https://cdn.example/game"
"#;
        assert!(matches!(
            parse_runtime_toml(both),
            Err(ProjectError::InvalidField("assets", _))
        ));

        let neither = r#"
[assets]
manifest = "game.json"
"#;
        assert!(matches!(
            parse_runtime_toml(neither),
            Err(ProjectError::InvalidField("assets", _))
        ));

        assert!(matches!(
            parse_runtime_toml("[log]\nlevel = \"warn\"\n"),
            Err(ProjectError::MissingField("assets"))
        ));
    }

    #[test]
    fn parse_runtime_toml_rejects_non_positive_timestep() {
        let toml = r#"
[assets]
base_dir = "."

[physics]
timestep = 0
"#;
        let err = parse_runtime_toml(toml).expect_err("expected parse failure");
        assert!(matches!(err, ProjectError::InvalidField("physics.timestep", _)));
    }

    #[test]
    fn default_runtime_toml_parses() {
        let parsed = parse_runtime_toml(&default_runtime_toml()).expect("default config");
        assert_eq!(parsed.assets, AssetBase::Directory(PathBuf::from(".")));
        assert_eq!(parsed.manifest, DEFAULT_MANIFEST);
    }

    #[test]
    fn resolve_local_path_maps_slash_to_local_root() {
        let root = PathBuf::from("D:/workspace");
        assert_eq!(
            resolve_local_path("/games/demo", &root),
            PathBuf::from("D:/workspace").join("games").join("demo")
        );
        assert_eq!(resolve_local_path("/", &root), root);
        assert_eq!(resolve_local_path(".", &root), root);
        assert_eq!(
            resolve_local_path("local://games/demo", &root),
            PathBuf::from("D:/workspace").join("games").join("demo")
        );
    }

    #[test]
    fn load_runtime_config_roots_relative_base_dir() -> Result<(), ProjectError> {
        let root = temp_test_dir();
        fs::create_dir_all(&root)?;

        let missing = load_runtime_config(&root)?;
        assert_eq!(missing.base_dir(), Some(root.as_path()));

        fs::write(
            root.join(RUNTIME_TOML),
            "[assets]\nbase_dir = \"assets\"\n",
        )?;
        let loaded = load_runtime_config(&root)?;
        assert_eq!(loaded.base_dir(), Some(root.join("assets").as_path()));

        let _ = fs::remove_dir_all(&root);
        Ok(())
    }
}
