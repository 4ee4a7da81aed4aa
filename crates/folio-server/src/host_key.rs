//! SSH host identity key.
//!
//! The key is read from an OpenSSH private key file. A missing file is not an
//! error: a fresh Ed25519 key is generated and written there, so the server
//! keeps the same identity across restarts.

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use rand::rngs::OsRng;
use russh::keys::ssh_key::{Algorithm, LineEnding, PrivateKey};

use crate::ServerError;

/// Load the host key at `path`, generating it first if the file is missing.
///
/// # Errors
///
/// [`ServerError::HostKey`] if the file exists but cannot be parsed, or a new
/// key cannot be written.
pub fn load_or_generate(path: &Path) -> Result<PrivateKey, ServerError> {
    if path.exists() {
        let key = russh::keys::load_secret_key(path, None).map_err(|e| host_key_error(path, e))?;
        tracing::debug!(path = %path.display(), algorithm = %key.algorithm(), "loaded host key");
        return Ok(key);
    }

    generate(path)
}

fn generate(path: &Path) -> Result<PrivateKey, ServerError> {
    let key =
        PrivateKey::random(&mut OsRng, Algorithm::Ed25519).map_err(|e| host_key_error(path, e))?;
    let encoded = key.to_openssh(LineEnding::LF).map_err(|e| host_key_error(path, e))?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| host_key_error(path, e))?;
    }
    let mut file = owner_only().open(path).map_err(|e| host_key_error(path, e))?;
    file.write_all(encoded.as_bytes()).map_err(|e| host_key_error(path, e))?;

    tracing::info!(path = %path.display(), "generated new host key");
    Ok(key)
}

/// Options that create a new file readable only by its owner.
fn owner_only() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    options
}

fn host_key_error(path: &Path, err: impl std::fmt::Display) -> ServerError {
    ServerError::HostKey { path: path.to_path_buf(), reason: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_then_reloads_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("id_ed25519");

        let generated = load_or_generate(&path).unwrap();
        assert!(path.exists());
        assert_eq!(generated.algorithm(), Algorithm::Ed25519);

        let reloaded = load_or_generate(&path).unwrap();
        assert_eq!(reloaded.public_key(), generated.public_key());
    }

    #[cfg(unix)]
    #[test]
    fn generated_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id_ed25519");
        load_or_generate(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_never_group_or_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id_ed25519");
        // Created owner-only, not narrowed afterwards.
        owner_only().open(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn malformed_key_is_host_key_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id_ed25519");
        fs::write(&path, "not a key").unwrap();

        let err = load_or_generate(&path).unwrap_err();
        assert!(matches!(err, ServerError::HostKey { .. }), "{err}");
    }
}
