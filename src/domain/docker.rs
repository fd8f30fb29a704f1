//! Docker daemon configuration for resolving names through WARP.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Path of the Docker daemon configuration on linux runners.
pub const DAEMON_CONFIG_PATH: &str = "/etc/docker/daemon.json";

/// Addresses of the WARP local DNS proxy.
pub const WARP_DNS_SERVERS: [&str; 2] = ["127.0.2.2", "127.0.2.3"];

/// Merge the WARP DNS servers into an existing `daemon.json`, preserving
/// every other key. Missing or blank input starts from an empty object.
///
/// # Errors
///
/// Returns an error if the existing content is not a JSON object.
pub fn merge_dns(existing: Option<&str>) -> Result<String> {
    let mut config = match existing.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("parsing daemon.json")? {
            Value::Object(map) => map,
            _ => anyhow::bail!("daemon.json must contain a JSON object"),
        },
        None => Map::new(),
    };
    config.insert(
        "dns".to_string(),
        Value::Array(
            WARP_DNS_SERVERS
                .iter()
                .map(|s| Value::String((*s).to_string()))
                .collect(),
        ),
    );
    let mut out = serde_json::to_string_pretty(&Value::Object(config))
        .context("serializing daemon.json")?;
    out.push('\n');
    Ok(out)
}
