//! File naming for states, captures and saved configs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Number of `-N` suffixes tried before falling back to a timestamp.
const CONFIG_NAME_ATTEMPTS: u32 = 16;

/// Save state file for `slot`.
///
/// Slot 0 is `<base>.state`, slot N is `<base>.stateN` and the auto slot (-1)
/// is `<base>.state.auto`.
pub fn state_path(base: &Path, slot: i32) -> PathBuf {
    let suffix = match slot {
        0 => ".state".to_string(),
        s if s < 0 => ".state.auto".to_string(),
        s => format!(".state{s}"),
    };
    with_suffix(base, &suffix)
}

/// Append `suffix` to the full file name of `base` (keeping any dots in it).
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Sanitize a content name for use in filenames.
///
/// Lowercases, replaces anything that is not alphanumeric with `_` and
/// collapses runs of underscores.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// `<name>_<suffix>_<timestamp>.<extension>`
pub fn timestamped_filename(name: &str, suffix: &str, extension: &str) -> String {
    let now = chrono::Local::now();
    format!(
        "{}_{}_{}.{}",
        sanitize_filename(name),
        suffix,
        now.format("%Y-%m-%d_%H-%M-%S"),
        extension
    )
}

/// `dir`, or `<data dir>/<fallback>` when unset; created if missing.
pub fn output_dir(dir: Option<&Path>, fallback: &str) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => crate::config::data_dir()
            .context("Failed to get project directories")?
            .join(fallback),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

/// First unused config file name for `core_name` in `dir`.
///
/// Tries `<core>.toml`, then `<core>-0.toml` through `<core>-15.toml`, then
/// a dated name.
pub fn new_config_path(dir: &Path, core_name: &str) -> PathBuf {
    let name = sanitize_filename(core_name);
    let name = if name.is_empty() { "core".to_string() } else { name };

    let candidate = dir.join(format!("{name}.toml"));
    if !candidate.exists() {
        return candidate;
    }
    (0..CONFIG_NAME_ATTEMPTS)
        .map(|i| dir.join(format!("{name}-{i}.toml")))
        .find(|path| !path.exists())
        .unwrap_or_else(|| {
            let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
            dir.join(format!("{name}-{stamp}.toml"))
        })
}
