//! Path resolution for the snapshot directory.
//!
//! Resolution priority for the data directory:
//! 1. `PKGPORT_DIR` environment variable (or the `--dir` flag, which clap
//!    maps onto it)
//! 2. `XDG_DATA_HOME/pkgport` (if set)
//! 3. `~/.local/share/pkgport`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable overriding the snapshot directory
pub const ENV_DATA_DIR: &str = "PKGPORT_DIR";

/// Get the directory holding inventory snapshots.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        let path = expand(&dir);
        log::debug!("using data dir from {}: {}", ENV_DATA_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        let path = PathBuf::from(xdg_data).join("pkgport");
        log::debug!("using XDG_DATA_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("share").join("pkgport");
    log::debug!("using default data dir: {}", path.display());
    Ok(path)
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Env mutations are process-global and the test runner is
    /// multi-threaded; every test touching `PKGPORT_DIR` or
    /// `XDG_DATA_HOME` takes this lock first.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Helper to run a test with temporary env var
    ///
    /// # Safety
    /// Uses unsafe env::set_var/remove_var; callers must hold `ENV_LOCK`
    /// so no other test reads or writes the environment concurrently.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: caller holds ENV_LOCK
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: caller holds ENV_LOCK
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    fn without_env_var<F, R>(key: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: caller holds ENV_LOCK
        unsafe { env::remove_var(key) };
        let result = f();
        if let Some(v) = original {
            // SAFETY: caller holds ENV_LOCK
            unsafe { env::set_var(key, v) };
        }
        result
    }

    #[test]
    fn test_data_dir_env_override() {
        let _env = lock_env();
        with_env_var(ENV_DATA_DIR, "/custom/snapshots", || {
            assert_eq!(data_dir().unwrap(), PathBuf::from("/custom/snapshots"));
        });
    }

    #[test]
    fn test_data_dir_env_override_with_tilde() {
        let _env = lock_env();
        let home = dirs::home_dir().unwrap();
        with_env_var(ENV_DATA_DIR, "~/snapshots-tilde-test", || {
            assert_eq!(data_dir().unwrap(), home.join("snapshots-tilde-test"));
        });
    }

    #[test]
    fn test_data_dir_xdg() {
        let _env = lock_env();
        without_env_var(ENV_DATA_DIR, || {
            with_env_var("XDG_DATA_HOME", "/tmp/xdg-data-test", || {
                assert_eq!(
                    data_dir().unwrap(),
                    PathBuf::from("/tmp/xdg-data-test/pkgport")
                );
            });
        });
    }

    #[test]
    fn test_data_dir_default() {
        let _env = lock_env();
        without_env_var(ENV_DATA_DIR, || {
            without_env_var("XDG_DATA_HOME", || {
                let home = dirs::home_dir().unwrap();
                assert_eq!(
                    data_dir().unwrap(),
                    home.join(".local").join("share").join("pkgport")
                );
            });
        });
    }

    #[test]
    fn test_expand_with_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/snapshots"), home.join("snapshots"));
    }

    #[test]
    fn test_expand_absolute() {
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
