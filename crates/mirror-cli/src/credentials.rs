//! Remote host credentials from the environment or a `.env` file

use std::path::Path;

use mirror_remote::Credentials;

use crate::error::{CliError, Result};

pub const IDENTITY_VAR: &str = "MIRROR_IDENTITY";
pub const SECRET_VAR: &str = "MIRROR_SECRET";

/// Load `{root}/.env` (without overriding variables already set), then
/// read the credential pair from the environment.
///
/// Returns `None` when neither variable is set; a half-configured pair is
/// an error.
pub fn load(root: &Path) -> Result<Option<Credentials>> {
    let dotenv = root.join(".env");
    match dotenvy::from_path(&dotenv) {
        Ok(()) => tracing::debug!(path = %dotenv.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => {
            return Err(CliError::user(format!(
                "failed to read {}: {e}",
                dotenv.display()
            )));
        }
    }

    pair(
        std::env::var(IDENTITY_VAR).ok(),
        std::env::var(SECRET_VAR).ok(),
    )
}

fn pair(identity: Option<String>, secret: Option<String>) -> Result<Option<Credentials>> {
    let identity = identity.filter(|v| !v.trim().is_empty());
    let secret = secret.filter(|v| !v.is_empty());

    match (identity, secret) {
        (Some(identity), Some(secret)) => Ok(Some(Credentials::new(identity.trim(), secret))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(CliError::user(format!("{IDENTITY_VAR} is set but {SECRET_VAR} is not"))),
        (None, Some(_)) => Err(CliError::user(format!("{SECRET_VAR} is set but {IDENTITY_VAR} is not"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_pair() {
        let credentials = pair(Some(" bot@example.com ".into()), Some("pw".into()))
            .unwrap()
            .unwrap();
        assert_eq!(credentials.identity, "bot@example.com");
        assert_eq!(credentials.secret, "pw");
    }

    #[test]
    fn test_absent_pair() {
        assert!(pair(None, None).unwrap().is_none());
        assert!(pair(Some("  ".into()), Some(String::new())).unwrap().is_none());
    }

    #[test]
    fn test_half_pair_is_error() {
        let err = pair(Some("bot".into()), None).unwrap_err();
        assert!(err.to_string().contains(SECRET_VAR));
        assert!(pair(None, Some("pw".into())).is_err());
    }
}
