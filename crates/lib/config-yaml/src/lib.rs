//! YAML settings parsing for mail-checker.

use config_core::Config;

/// The settings document is not valid.
#[derive(Debug, thiserror::Error)]
#[error("invalid YAML settings: {0}")]
pub struct ParseError(#[source] pub serde_yaml_bw::Error);

/// Whether a document holds nothing but blank lines and comments.
fn is_blank(contents: &str) -> bool {
    contents
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

/// Parse settings from a YAML document.
///
/// A document with no content yields the default settings.
pub fn parse_str(contents: &str) -> Result<Config, ParseError> {
    if is_blank(contents) {
        return Ok(Config::default());
    }

    serde_yaml_bw::from_str(contents).map_err(ParseError)
}
