use std::path::Path;

use outline_core::{HeuristicConfig, Heuristics};

use crate::prelude::*;

/// Load the heuristics once at start-up: the built-in tables, or an override
/// TOML file when `--heuristics` is given. Every pattern is compiled here.
pub fn load(path: Option<&Path>) -> Result<Heuristics> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| f!("failed to read heuristics file {}", path.display()))?;
            let config = HeuristicConfig::from_toml_str(&text).map_err(|e| Error::InvalidHeuristics {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            log::info!("loaded heuristics from {}", path.display());
            config
        }
        None => HeuristicConfig::default(),
    };

    Heuristics::compile(config).map_err(|e| eyre!(e))
}
