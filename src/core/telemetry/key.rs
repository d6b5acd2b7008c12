//! Composite `host:container` keys.
//!
//! Container-scoped data is addressed by a single flat key so that a lookup
//! is one map probe and "all containers of host X" is one prefix scan.

/// Build the composite key for a container on a host.
pub fn compose(host_id: &str, container_id: &str) -> String {
    format!("{}:{}", host_id, container_id)
}

/// Split a composite key back into (host_id, container_id).
///
/// Splits on the first `:` so container ids may themselves contain colons.
/// Returns `None` for keys without a separator.
pub fn parse(key: &str) -> Option<(&str, &str)> {
    key.split_once(':')
}

/// Whether `key` addresses a container on `host_id`.
pub fn has_host_prefix(key: &str, host_id: &str) -> bool {
    key.len() > host_id.len()
        && key.as_bytes()[host_id.len()] == b':'
        && key.starts_with(host_id)
}
