//! User identity resolution.
//!
//! Every decision is stamped with the acting user. Identity is resolved
//! through a chain, first match wins:
//!
//! 1. `--as <user>`: explicit per-command override
//! 2. `MEALSWIPE_USER` env var
//! 3. `user-id` in `~/.mealswipe/config.toml`
//! 4. [`DEMO_USER`], the anonymous placeholder

use std::env;

use crate::config::Config;

/// Placeholder identity for anonymous use.
pub const DEMO_USER: &str = "demo-user";

/// Resolve the acting user from the tiered resolution chain.
pub fn resolve_user_id(explicit: Option<&str>, config: &Config) -> String {
    resolve_from(explicit, env::var("MEALSWIPE_USER").ok(), config)
}

fn resolve_from(explicit: Option<&str>, from_env: Option<String>, config: &Config) -> String {
    // 1. Explicit --as flag.
    if let Some(id) = explicit.filter(|s| !s.is_empty()) {
        return id.to_string();
    }

    // 2. MEALSWIPE_USER environment variable.
    if let Some(id) = from_env.filter(|s| !s.is_empty()) {
        return id;
    }

    // 3. Config file.
    if let Some(id) = config.user_id.as_deref().filter(|s| !s.is_empty()) {
        return id.to_string();
    }

    DEMO_USER.to_string()
}
