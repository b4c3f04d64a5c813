use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};

/// Joins whatever follows a leading `~` onto the caller's home directory, so
/// `~/.ssh/id.pub` and `~keys/id.pub` both land under home. Paths without a
/// leading `~` are returned unchanged.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    expand_home_with(path, dirs::home_dir)
}

fn expand_home_with<F>(path: &str, home_dir: F) -> Result<PathBuf>
where
    F: FnOnce() -> Option<PathBuf>,
{
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };

    let home = home_dir().ok_or(ProvisionError::HomeDir)?;
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        return Ok(home);
    }
    Ok(home.join(Path::new(rest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> Option<PathBuf> {
        Some(PathBuf::from("/home/ops"))
    }

    #[test]
    fn test_expands_tilde_prefix() {
        let path = expand_home_with("~/.ssh/id_ed25519.pub", home).unwrap();
        assert_eq!(path, PathBuf::from("/home/ops/.ssh/id_ed25519.pub"));
        assert!(path.is_absolute());
    }

    #[test]
    fn test_bare_tilde_is_home() {
        let path = expand_home_with("~", home).unwrap();
        assert_eq!(path, PathBuf::from("/home/ops"));
    }

    #[test]
    fn test_tilde_without_slash_is_joined_under_home() {
        let path = expand_home_with("~other/id.pub", home).unwrap();
        assert_eq!(path, PathBuf::from("/home/ops/other/id.pub"));
        assert!(path.is_absolute());
    }

    #[test]
    fn test_other_paths_are_unchanged() {
        for input in ["/etc/keys/id.pub", "keys/id.pub", "./~/id.pub"] {
            let path = expand_home_with(input, || panic!("home dir looked up for {input}")).unwrap();
            assert_eq!(path, PathBuf::from(input));
        }
    }

    #[test]
    fn test_unknown_home_is_an_error() {
        let err = expand_home_with("~/.ssh/id.pub", || None).unwrap_err();
        assert!(matches!(err, ProvisionError::HomeDir));
    }

    #[test]
    fn test_expand_home_uses_real_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home("~/id.pub").unwrap(), home.join("id.pub"));
    }
}
