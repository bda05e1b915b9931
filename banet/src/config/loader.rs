//! Loading configuration files into a [`ConfigDict`].
//!
//! Configuration files are declarative TOML or JSON documents. Their top-level
//! keys become the configuration bindings; keys starting with `__` are reserved
//! and never returned. The only reserved key with a meaning is `__include__`,
//! which names other configuration files to load first and merge underneath.
//!
//! Includes are resolved against the loader's search path. While a file is being
//! loaded its own directory sits at the front of the search path, so sibling
//! files resolve first; the search path is restored once the load returns,
//! whether it succeeded or not.

use std::collections::BTreeMap;
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use log::{debug, trace};

use super::{dict::ConfigDict, value::ConfigValue};
use crate::error::{BANetError, BANetResult};

/// Key listing files to load underneath the current one.
pub const INCLUDE_KEY: &str = "__include__";

/// Prefix of reserved keys that are excluded from loaded bindings.
const RESERVED_PREFIX: &str = "__";

/// Document formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document (`.toml`).
    Toml,
    /// JSON document (`.json`).
    Json,
}

impl ConfigFormat {
    /// Accepted file suffixes.
    pub const EXTENSIONS: &'static [&'static str] = &["toml", "json"];

    /// Picks the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn parse(self, path: &Path, contents: &str) -> BANetResult<ConfigDict> {
        match self {
            Self::Toml => Ok(ConfigDict::from(toml::from_str::<toml::Table>(contents)?)),
            Self::Json => match serde_json::from_str::<serde_json::Value>(contents)? {
                serde_json::Value::Object(map) => Ok(ConfigDict::from(map)),
                other => Err(BANetError::InvalidDocument {
                    path: path.to_path_buf(),
                    reason: format!(
                        "top level must be an object, found {}",
                        ConfigValue::from(other).kind()
                    ),
                }),
            },
        }
    }
}

/// Loads configuration files, owning the search path used to resolve includes.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    search_path: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader with an empty search path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directory to the search path.
    pub fn with_search_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.search_path.push(dir.as_ref().to_path_buf());
        self
    }

    /// Directories consulted, in order, when resolving includes.
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Load a file into a plain map of its non-reserved top-level bindings.
    pub fn load_dict(
        &mut self,
        file_path: impl AsRef<Path>,
    ) -> BANetResult<BTreeMap<String, ConfigValue>> {
        let mut stack = Vec::new();
        self.load_file(file_path.as_ref(), &mut stack)
            .map(ConfigDict::into_inner)
    }

    /// Load a file into a [`ConfigDict`].
    pub fn load(&mut self, file_path: impl AsRef<Path>) -> BANetResult<ConfigDict> {
        self.load_dict(file_path).map(ConfigDict::from)
    }

    fn load_file(&mut self, file_path: &Path, stack: &mut Vec<PathBuf>) -> BANetResult<ConfigDict> {
        let (path, format) = validate_path(file_path)?;
        let canonical = fs::canonicalize(&path)?;
        if stack.contains(&canonical) {
            return Err(BANetError::IncludeCycle { path });
        }

        debug!("loading config (format={format:?}, path={})", path.display());
        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        stack.push(canonical);
        let result = SearchPathScope::enter(self, config_dir).load_bindings(&path, format, stack);
        stack.pop();
        result
    }

    fn load_bindings(
        &mut self,
        path: &Path,
        format: ConfigFormat,
        stack: &mut Vec<PathBuf>,
    ) -> BANetResult<ConfigDict> {
        let contents = fs::read_to_string(path)?;
        let mut document = format.parse(path, &contents)?;

        let includes = match document.remove(INCLUDE_KEY) {
            Some(value) => include_list(value)?,
            None => Vec::new(),
        };

        let mut merged = ConfigDict::new();
        for include in includes {
            let resolved = self.resolve(&include)?;
            debug!("including {} from {}", resolved.display(), path.display());
            merged.merge(self.load_file(&resolved, stack)?);
        }

        let own: ConfigDict = document
            .into_iter()
            .filter(|(name, _)| {
                let reserved = name.starts_with(RESERVED_PREFIX);
                if reserved {
                    trace!("skipping reserved binding '{name}'");
                }
                !reserved
            })
            .collect();
        merged.merge(own);

        Ok(merged)
    }

    /// Resolve an include against the search path; absolute paths are used as is.
    fn resolve(&self, include: &str) -> BANetResult<PathBuf> {
        let candidate = Path::new(include);
        if candidate.is_absolute() {
            return Ok(candidate.to_path_buf());
        }

        self.search_path
            .iter()
            .map(|dir| dir.join(candidate))
            .find(|path| path.is_file())
            .ok_or_else(|| BANetError::FileNotFound {
                path: candidate.to_path_buf(),
            })
    }
}

/// Keeps a directory at the front of the loader's search path for as long as
/// the scope lives.
struct SearchPathScope<'a> {
    loader: &'a mut ConfigLoader,
}

impl<'a> SearchPathScope<'a> {
    fn enter(loader: &'a mut ConfigLoader, dir: PathBuf) -> Self {
        debug!("search path push {}", dir.display());
        loader.search_path.insert(0, dir);
        Self { loader }
    }
}

impl Deref for SearchPathScope<'_> {
    type Target = ConfigLoader;

    fn deref(&self) -> &Self::Target {
        self.loader
    }
}

impl DerefMut for SearchPathScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.loader
    }
}

impl Drop for SearchPathScope<'_> {
    fn drop(&mut self) {
        if !self.loader.search_path.is_empty() {
            let dir = self.loader.search_path.remove(0);
            debug!("search path pop {}", dir.display());
        }
    }
}

/// Checks suffix, existence and file stem before anything is read.
fn validate_path(file_path: &Path) -> BANetResult<(PathBuf, ConfigFormat)> {
    let path = if file_path.is_absolute() {
        file_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(file_path)
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = path
        .extension()
        .and_then(|extension| extension.to_str())
        .and_then(ConfigFormat::from_extension)
        .ok_or_else(|| BANetError::WrongFileType {
            file_name,
            expected: ConfigFormat::EXTENSIONS
                .iter()
                .map(|extension| format!(".{extension}"))
                .collect::<Vec<_>>()
                .join("/"),
        })?;

    if !path.is_file() {
        return Err(BANetError::FileNotFound { path });
    }

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem.contains('.') {
        return Err(BANetError::MalformedModuleName { stem });
    }

    Ok((path, format))
}

fn include_list(value: ConfigValue) -> BANetResult<Vec<String>> {
    let invalid = || BANetError::InvalidValue {
        key: INCLUDE_KEY.to_string(),
        expected: "a string or a list of strings",
    };

    match value {
        ConfigValue::String(include) => Ok(vec![include]),
        ConfigValue::List(values) => values
            .into_iter()
            .map(|value| match value {
                ConfigValue::String(include) => Ok(include),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

/// Load a configuration file into a plain map using a fresh [`ConfigLoader`].
pub fn load_config_dict(file_path: impl AsRef<Path>) -> BANetResult<BTreeMap<String, ConfigValue>> {
    ConfigLoader::new().load_dict(file_path)
}

/// Load a configuration file into a [`ConfigDict`] using a fresh [`ConfigLoader`].
pub fn load_config(file_path: impl AsRef<Path>) -> BANetResult<ConfigDict> {
    ConfigLoader::new().load(file_path)
}
