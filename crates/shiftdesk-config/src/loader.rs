// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./shiftdesk.toml` > `~/.config/shiftdesk/shiftdesk.toml`
//! > `/etc/shiftdesk/shiftdesk.toml` with environment variable overrides via the
//! `SHIFTDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ShiftdeskConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/shiftdesk/shiftdesk.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "shiftdesk.toml";

/// Top-level sections, used to map `SHIFTDESK_<SECTION>_<KEY>` env vars.
const SECTIONS: &[&str] = &["server", "openai", "chat", "conversation"];

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shiftdesk").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/shiftdesk/shiftdesk.toml`
/// 3. `~/.config/shiftdesk/shiftdesk.toml`
/// 4. `./shiftdesk.toml`
/// 5. `SHIFTDESK_*` environment variables
pub fn load_config() -> Result<ShiftdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ShiftdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShiftdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ShiftdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShiftdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ShiftdeskConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `SHIFTDESK_OPENAI_API_KEY` to `openai.api_key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// underscore-containing keys such as `max_turns` survive intact.
fn env_provider() -> Env {
    Env::prefixed("SHIFTDESK_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
