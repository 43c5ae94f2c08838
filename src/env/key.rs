//! Environment key derivation
//!
//! Maps a field path (type name, then field names) to one environment
//! variable name. The mapping is total and injective for a fixed schema as
//! long as field names are distinct within their containing type.

/// Normalize one path segment: uppercase, with `.` and `-` mapped to `_`.
pub fn normalize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Derive the environment variable name for a field path.
pub fn env_key(prefix: &str, path: &[String]) -> String {
    let mut key = String::from(prefix);
    for segment in path {
        key.push('_');
        key.push_str(&normalize_segment(segment));
    }
    key
}
