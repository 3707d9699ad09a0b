//! File plumbing shared by the subcommands.

use std::path::Path;

use rollcall_engine::MatchConfig;

use crate::CliError;

/// Read a file as UTF-8, falling back to Windows-1252 for the usual
/// spreadsheet exports.
pub fn read_file_as_utf8(path: &Path) -> Result<String, CliError> {
    let bytes = std::fs::read(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

pub fn write_text(path: &Path, text: &str) -> Result<(), CliError> {
    std::fs::write(path, text)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))
}

/// Load match settings from a TOML file (or the defaults), then fold the
/// command-line overrides in and re-validate.
pub fn load_config(
    path: Option<&Path>,
    min_score: Option<f64>,
    category: Option<String>,
) -> Result<MatchConfig, CliError> {
    let mut config = match path {
        Some(p) => {
            let text = read_file_as_utf8(p)?;
            MatchConfig::from_toml(&text).map_err(CliError::engine)?
        }
        None => MatchConfig::default(),
    };
    if let Some(score) = min_score {
        config.matching.min_score = score;
    }
    if let Some(cat) = category {
        config.matching.category = Some(cat);
    }
    config.validate().map_err(CliError::engine)?;
    Ok(config)
}
