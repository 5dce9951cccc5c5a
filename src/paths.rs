// SPDX-License-Identifier: MPL-2.0
//! Application directories.
//!
//! Resolution order, most specific first:
//! 1. explicit override passed to the `_with_override()` functions (tests)
//! 2. `--data-dir` / `--config-dir`, registered once via [`init_cli_overrides`]
//! 3. `SNAPPY_DATA_DIR` / `SNAPPY_CONFIG_DIR`
//! 4. platform default from `dirs`, with `Snappy` appended

use std::path::PathBuf;
use std::sync::OnceLock;

const APP_NAME: &str = "Snappy";

/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "SNAPPY_DATA_DIR";

/// Environment variable overriding the config directory.
pub const ENV_CONFIG_DIR: &str = "SNAPPY_CONFIG_DIR";

static CLI_DATA_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Registers the directory flags given on the command line.
///
/// Only the first call has an effect. Returns `false` if overrides were
/// already registered.
pub fn init_cli_overrides(data_dir: Option<String>, config_dir: Option<String>) -> bool {
    let data_set = CLI_DATA_DIR.set(data_dir.map(PathBuf::from)).is_ok();
    let config_set = CLI_CONFIG_DIR.set(config_dir.map(PathBuf::from)).is_ok();
    data_set && config_set
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn resolve(
    override_path: Option<PathBuf>,
    cli: &OnceLock<Option<PathBuf>>,
    env_var: &str,
    platform: fn() -> Option<PathBuf>,
) -> Option<PathBuf> {
    override_path
        .or_else(|| cli.get().and_then(Clone::clone))
        .or_else(|| env_dir(env_var))
        .or_else(|| platform().map(|dir| dir.join(APP_NAME)))
}

/// Returns the directory for application state such as diagnostic reports.
///
/// Platform defaults:
/// - Linux: `~/.local/share/Snappy/`
/// - macOS: `~/Library/Application Support/Snappy/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\Snappy\`
pub fn get_app_data_dir() -> Option<PathBuf> {
    get_app_data_dir_with_override(None)
}

/// Same as [`get_app_data_dir`], with an explicit override taking priority.
pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(override_path, &CLI_DATA_DIR, ENV_DATA_DIR, dirs::data_dir)
}

/// Returns the directory holding `settings.toml`.
///
/// Platform defaults:
/// - Linux: `~/.config/Snappy/`
/// - macOS: `~/Library/Application Support/Snappy/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\Snappy\`
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Same as [`get_app_config_dir`], with an explicit override taking priority.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(
        override_path,
        &CLI_CONFIG_DIR,
        ENV_CONFIG_DIR,
        dirs::config_dir,
    )
}
