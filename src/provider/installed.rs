//! Locally installed component information

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::parser::plugin_header::{HEADER_SCAN_BYTES, PluginHeader, PluginHeaderParser};
use crate::version::types::ComponentIdentity;

#[derive(Debug, Error)]
pub enum InstalledInfoError {
    #[error("Failed to read plugin file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin file {0:?} has no Version header")]
    MissingVersion(PathBuf),

    #[error("Plugin file {path:?} is not inside plugins directory {plugins_dir:?}")]
    OutsidePluginsDir { path: PathBuf, plugins_dir: PathBuf },
}

/// Installed version and header of a registered component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledInfo {
    pub identity: ComponentIdentity,
    pub version: String,
    pub header: PluginHeader,
}

/// Where the installed version of a component comes from
pub trait InstalledSource: Send + Sync {
    fn load(&self, identity: &ComponentIdentity) -> Result<InstalledInfo, InstalledInfoError>;
}

/// Reads the installed version from the plugin main file header
pub struct PluginFileSource {
    plugin_file: PathBuf,
    parser: PluginHeaderParser,
}

impl PluginFileSource {
    pub fn new(plugin_file: PathBuf) -> Self {
        Self {
            plugin_file,
            parser: PluginHeaderParser::new(),
        }
    }

    fn read_header_bytes(&self) -> Result<String, InstalledInfoError> {
        let io_error = |source| InstalledInfoError::Io {
            path: self.plugin_file.clone(),
            source,
        };

        let mut buffer = Vec::with_capacity(HEADER_SCAN_BYTES);
        File::open(&self.plugin_file)
            .map_err(io_error)?
            .take(HEADER_SCAN_BYTES as u64)
            .read_to_end(&mut buffer)
            .map_err(io_error)?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl InstalledSource for PluginFileSource {
    fn load(&self, identity: &ComponentIdentity) -> Result<InstalledInfo, InstalledInfoError> {
        let content = self.read_header_bytes()?;
        let header = self.parser.parse(&content);

        let Some(version) = header.version.clone() else {
            return Err(InstalledInfoError::MissingVersion(self.plugin_file.clone()));
        };

        Ok(InstalledInfo {
            identity: identity.clone(),
            version,
            header,
        })
    }
}

/// Installed version supplied directly by the host
pub struct FixedVersion(pub String);

impl InstalledSource for FixedVersion {
    fn load(&self, identity: &ComponentIdentity) -> Result<InstalledInfo, InstalledInfoError> {
        Ok(InstalledInfo {
            identity: identity.clone(),
            version: self.0.clone(),
            header: PluginHeader::default(),
        })
    }
}

/// A plugin main file resolved against the plugins directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLocation {
    pub path: PathBuf,
    pub identity: ComponentIdentity,
}

/// Resolve `plugin_file` against `plugins_dir` and derive its identity.
///
/// The file path key is the path relative to `plugins_dir` with `/`
/// separators ("acme-tool/acme-tool.php"). The slug is the first directory of
/// that key, or the file stem for single-file plugins ("hello.php" -> "hello").
/// Relative paths not already under `plugins_dir` are taken relative to it.
pub fn locate_plugin(
    plugins_dir: &Path,
    plugin_file: &Path,
) -> Result<PluginLocation, InstalledInfoError> {
    let path = if plugin_file.starts_with(plugins_dir) || plugin_file.is_absolute() {
        plugin_file.to_path_buf()
    } else {
        plugins_dir.join(plugin_file)
    };

    let outside = || InstalledInfoError::OutsidePluginsDir {
        path: path.clone(),
        plugins_dir: plugins_dir.to_path_buf(),
    };

    let relative = path.strip_prefix(plugins_dir).map_err(|_| outside())?;

    let segments = relative
        .components()
        .map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<Vec<String>>>()
        .filter(|segments| !segments.is_empty())
        .ok_or_else(outside)?;

    let slug = if segments.len() > 1 {
        segments[0].clone()
    } else {
        relative
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| segments[0].clone())
    };

    let identity = ComponentIdentity::new(slug, segments.join("/"));

    Ok(PluginLocation { path, identity })
}
