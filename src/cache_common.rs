use std::path::PathBuf;

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Resolve a path from `env_var`, falling back to `default`.
pub fn path_with_env_override(env_var: &str, default: &str) -> PathBuf {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => expand_tilde(value.trim()),
        _ => PathBuf::from(default),
    }
}

/// Calculate MD5 hash of bytes
pub fn calculate_md5_bytes(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}
