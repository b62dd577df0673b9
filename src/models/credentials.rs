use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Represents the client credentials an application was issued.
///
/// # Fields
///
/// * `client_id` - The application's client ID.
/// * `client_secret` - The application's secret. Kept in a [`SecretString`]
///   so it is never printed by `Debug` or written to logs.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.expose_secret().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("my-app", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("my-app"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_is_complete() {
        assert!(Credentials::new("id", "secret").is_complete());
        assert!(!Credentials::new("", "secret").is_complete());
        assert!(!Credentials::new("id", "").is_complete());
    }
}
