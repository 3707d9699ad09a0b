//! `rollcall validate`: check a match settings file without running.

use std::path::PathBuf;

use rollcall_engine::MatchConfig;

use crate::files::read_file_as_utf8;
use crate::CliError;

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let text = read_file_as_utf8(&config_path)?;
    let config = MatchConfig::from_toml(&text).map_err(CliError::engine)?;

    let category = match &config.matching.category {
        Some(c) => format!(", category filter '{c}'"),
        None => String::new(),
    };
    eprintln!(
        "valid: min_score {}, absolute_token_cap {}, {} nickname rule(s){}",
        config.matching.min_score,
        config.matching.absolute_token_cap,
        config.nickname_table().len(),
        category,
    );
    Ok(())
}
