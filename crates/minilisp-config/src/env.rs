use std::collections::HashMap;

use tracing::debug;

use crate::merge::set_nested;

/// Proxy toggle inherited from the site's build scripts.
pub const PROXY_ENV_VAR: &str = "USE_CF_PROXY";

/// Overrides `source.url`.
pub const SOURCE_URL_ENV_VAR: &str = "MINILISP_ASSETS_URL";

/// Overrides `install.destination`.
pub const DESTINATION_ENV_VAR: &str = "MINILISP_ASSETS_DEST";

/// Overrides `logging.level`.
pub const LOG_LEVEL_ENV_VAR: &str = "MINILISP_LOG";

/// Snapshot the environment variables the loader cares about.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    [
        PROXY_ENV_VAR,
        SOURCE_URL_ENV_VAR,
        DESTINATION_ENV_VAR,
        LOG_LEVEL_ENV_VAR,
    ]
    .into_iter()
    .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_owned(), v)))
    .collect()
}

/// Returns `true` when the proxy variable is present and non-empty.
#[must_use]
pub fn proxy_requested(env: &HashMap<String, String>) -> bool {
    env.get(PROXY_ENV_VAR).is_some_and(|v| !v.is_empty())
}

/// Write environment overrides into the merged config tree.
///
/// Environment values win over file values. Empty values are ignored.
pub fn apply_env_overrides(merged: &mut toml::Value, env: &HashMap<String, String>) {
    if proxy_requested(env) {
        debug!(var = PROXY_ENV_VAR, "proxy enabled from environment");
        set_nested(merged, &["source", "use_proxy"], toml::Value::Boolean(true));
    }

    let string_overrides = [
        (SOURCE_URL_ENV_VAR, ["source", "url"]),
        (DESTINATION_ENV_VAR, ["install", "destination"]),
        (LOG_LEVEL_ENV_VAR, ["logging", "level"]),
    ];
    for (var, path) in string_overrides {
        if let Some(value) = env.get(var).filter(|v| !v.is_empty()) {
            debug!(var, "config override from environment");
            set_nested(merged, &path, toml::Value::String(value.clone()));
        }
    }
}
