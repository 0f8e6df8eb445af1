//! Configuration file discovery and loading for mail-checker.

use std::path::{Path, PathBuf};

use config_core::Config;

/// Environment variable naming the configuration file.
#[cfg(feature = "env")]
pub const ENV_VAR: &str = "MAIL_CHECKER_CONFIG";

/// A payload annotated with the file it came from.
#[derive(Debug)]
pub struct Meta<T> {
    /// The actual payload.
    pub payload: T,

    /// The path.
    pub path: PathBuf,
}

/// Error returned while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// No configuration file found in any of the provided paths.
    #[error("no config file found in paths: {paths:?}")]
    NotFound {
        /// The paths that were tried.
        paths: Vec<PathBuf>,
    },

    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Error returned while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Failed to read the configuration file.
    #[error(transparent)]
    Read(ReadError),

    /// Failed to parse the configuration contents.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,

        /// Underlying parse error.
        #[source]
        source: config_yaml::ParseError,
    },
}

/// Read the contents of the first existing file in the list of paths.
///
/// Missing files are skipped; any other read failure stops the search.
pub async fn read<P>(paths: &[P]) -> Result<Meta<String>, ReadError>
where
    P: AsRef<Path>,
{
    for path in paths {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(payload) => {
                return Ok(Meta {
                    payload,
                    path: path.to_path_buf(),
                });
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::trace!(path = %path.display(), "config file not found");
            }
            Err(source) => {
                return Err(ReadError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    Err(ReadError::NotFound {
        paths: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
    })
}

/// Load configuration from the explicit path, or from the first existing
/// default path.
pub async fn with(explicit: Option<PathBuf>) -> Result<Meta<Config>, LoadError> {
    let paths: Vec<PathBuf> = config_paths::resolve(explicit).collect();
    let Meta { payload, path } = read(&paths).await.map_err(LoadError::Read)?;

    match config_yaml::parse_str(&payload) {
        Ok(payload) => {
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(Meta { payload, path })
        }
        Err(source) => Err(LoadError::Parse { path, source }),
    }
}

/// Load configuration from the explicit path, the path in the
/// `MAIL_CHECKER_CONFIG` env var, or the default paths, in that order.
#[cfg(feature = "env")]
pub async fn with_default_env_var(
    explicit: Option<PathBuf>,
) -> Result<Meta<Config>, WithDefaultEnvVarError> {
    let explicit = match explicit {
        Some(path) => Some(path),
        None => envfury::maybe(ENV_VAR).map_err(WithDefaultEnvVarError::Env)?,
    };
    with(explicit).await.map_err(WithDefaultEnvVarError::Load)
}

/// Errors that can occur during configuration loading.
#[cfg(feature = "env")]
#[derive(Debug, thiserror::Error)]
pub enum WithDefaultEnvVarError {
    /// Env variable reading error.
    #[error("config path env var read: {0}")]
    Env(#[source] envfury::Error<envfury::ValueError<<PathBuf as std::str::FromStr>::Err>>),

    /// Loading configuration error.
    #[error(transparent)]
    Load(LoadError),
}
