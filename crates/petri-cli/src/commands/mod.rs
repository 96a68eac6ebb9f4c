pub mod run;
pub mod traits;

use std::path::Path;

use petri_core::TraitTable;
use petri_simulation::Settings;
use tracing::info;

/// Load a trait table from a JSON file, or the built-in table.
fn load_table(path: Option<&Path>) -> Result<TraitTable, String> {
    let Some(path) = path else {
        return Ok(TraitTable::builtin());
    };
    let json = read(path)?;
    let table =
        TraitTable::from_json(&json).map_err(|e| format!("invalid trait table {}: {e}", path.display()))?;
    info!(path = %path.display(), "loaded trait table");
    Ok(table)
}

/// Load settings from a JSON file, or the defaults.
fn load_settings(path: Option<&Path>) -> Result<Settings, String> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let json = read(path)?;
    let settings =
        Settings::from_json(&json).map_err(|e| format!("invalid settings {}: {e}", path.display()))?;
    info!(path = %path.display(), "loaded settings");
    Ok(settings)
}

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}
