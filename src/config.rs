use crate::error::BuildError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "ccd.toml";

/// Project configuration (`ccd.toml`). Read once per invocation.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub package: PackageConfig,
    #[serde(default)]
    pub build: BuildConfig,
    /// Directory every relative path in the config is resolved against.
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PackageConfig {
    #[serde(default = "default_name")]
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BuildConfig {
    pub compiler: String,
    pub flags: Vec<String>,
    pub defines: Vec<String>,
    pub libs: Vec<String>,
    pub source_dirs: Vec<String>,
    pub include_dirs: Vec<String>,
    pub library_dirs: Vec<String>,
    pub source_extensions: Vec<String>,
    pub include_extensions: Vec<String>,
    pub extra_sources: Vec<String>,
    pub extra_objects: Vec<String>,
    pub object_dir: String,
    pub state_file: String,
}

fn default_name() -> String {
    "program".to_string()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: "clang++".to_string(),
            flags: strings(&["-Wall"]),
            defines: Vec::new(),
            libs: Vec::new(),
            source_dirs: strings(&["src"]),
            include_dirs: strings(&["include"]),
            library_dirs: Vec::new(),
            source_extensions: strings(&["cpp", "c"]),
            include_extensions: strings(&["hpp", "h"]),
            extra_sources: Vec::new(),
            extra_objects: Vec::new(),
            object_dir: "obj".to_string(),
            state_file: "modinfo.json".to_string(),
        }
    }
}

impl Config {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Parse `ccd.toml` contents and root the result at `root`.
    pub fn parse(content: &str, root: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let root = root.into();
        let mut config: Config = toml::from_str(content).map_err(|e| BuildError::Config {
            path: root.join(CONFIG_FILE),
            reason: e.to_string(),
        })?;
        config.root = root;
        Ok(config)
    }

    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn source_dirs(&self) -> Vec<PathBuf> {
        self.build.source_dirs.iter().map(|d| self.resolve(d)).collect()
    }

    pub fn include_dirs(&self) -> Vec<PathBuf> {
        self.build.include_dirs.iter().map(|d| self.resolve(d)).collect()
    }

    pub fn object_dir(&self) -> PathBuf {
        self.resolve(&self.build.object_dir)
    }

    pub fn state_path(&self) -> PathBuf {
        self.resolve(&self.build.state_file)
    }

    /// Final executable, with the platform suffix (`.exe` on Windows).
    pub fn program_path(&self) -> PathBuf {
        self.resolve(&format!(
            "{}{}",
            self.package.name,
            std::env::consts::EXE_SUFFIX
        ))
    }
}

/// Load `ccd.toml` from `root`, falling back to defaults when it is absent.
pub fn load_config(root: &Path) -> Result<Config, BuildError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::with_root(root));
    }
    let content = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
    Config::parse(&content, root)
}
