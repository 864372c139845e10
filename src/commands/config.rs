//! `wavegraph config`: edit the TOML settings in place.

use anyhow::{anyhow, Context};
use std::path::Path;
use std::process::Command;

use crate::config::{ensure_config_file, WaveGraphConfig};

/// Tried in order when `$EDITOR` is unset or blank.
const FALLBACK_EDITORS: [&str; 2] = ["nano", "vi"];

/// Opens the config file in an editor, then checks what was saved.
///
/// A missing file is first written with the defaults so every setting is listed.
/// An invalid result is reported but not reverted; `watch` and `export` refuse it
/// until it is fixed.
///
/// # Errors
/// - If the config file cannot be created
/// - If no editor is available or it exits unsuccessfully
pub fn handle_config() -> anyhow::Result<()> {
    let path = ensure_config_file()?;
    let editor = resolve_editor(std::env::var("EDITOR").ok(), is_on_path).ok_or_else(|| {
        anyhow!(
            "No editor found. Set $EDITOR to edit {}",
            path.display()
        )
    })?;
    tracing::info!("Editing {} with {editor}", path.display());

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;
    if !status.success() {
        return Err(anyhow!("Editor '{editor}' exited with {status}"));
    }

    report_validity(&path);
    Ok(())
}

fn report_validity(path: &Path) {
    match WaveGraphConfig::load_from(path) {
        Ok(_) => tracing::info!("Saved configuration is valid"),
        Err(e) => {
            tracing::warn!("Saved configuration is invalid: {e:#}");
            eprintln!("Warning: {e:#}");
        }
    }
}

/// `$EDITOR` when set, otherwise the first fallback that `available` accepts.
fn resolve_editor(from_env: Option<String>, available: impl Fn(&str) -> bool) -> Option<String> {
    from_env
        .filter(|editor| !editor.trim().is_empty())
        .or_else(|| {
            FALLBACK_EDITORS
                .iter()
                .copied()
                .find(|editor| available(*editor))
                .map(str::to_string)
        })
}

fn is_on_path(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .output()
        .is_ok_and(|output| output.status.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_variable_wins() {
        let editor = resolve_editor(Some("hx".to_string()), |_| true);
        assert_eq!(editor.as_deref(), Some("hx"));
    }

    #[test]
    fn test_blank_editor_variable_falls_back() {
        let editor = resolve_editor(Some("  ".to_string()), |name| name == "vi");
        assert_eq!(editor.as_deref(), Some("vi"));
        let editor = resolve_editor(None, |_| true);
        assert_eq!(editor.as_deref(), Some("nano"));
    }

    #[test]
    fn test_no_editor_available() {
        assert_eq!(resolve_editor(None, |_| false), None);
    }
}
