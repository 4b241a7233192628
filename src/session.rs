//! Login credentials and the authenticated session.

use std::env;
use std::fmt;

use serde::Deserialize;

use crate::error::{ClcError, Result};

/// Environment variable holding the API username.
pub const USERNAME_ENV: &str = "CLC_V2_API_USERNAME";
/// Environment variable holding the API password.
pub const PASSWORD_ENV: &str = "CLC_V2_API_PASSWD";

/// Username/password pair used for bearer-token login.
///
/// Either half may be absent; the check happens at login time so a client
/// can be built before credentials are known.
#[derive(Clone, Default)]
pub struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Read `CLC_V2_API_USERNAME` and `CLC_V2_API_PASSWD`.
    pub fn from_env() -> Self {
        Self {
            username: env::var(USERNAME_ENV).ok().filter(|v| !v.is_empty()),
            password: env::var(PASSWORD_ENV).ok().filter(|v| !v.is_empty()),
        }
    }

    /// Both halves, or a configuration error.
    pub(crate) fn require(&self) -> Result<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Ok((u, p)),
            _ => Err(ClcError::ConfigMissing(
                "V2 API username and password not provided".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// An authenticated session: bearer token plus the account and location
/// aliases the provider assigned at login.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    bearer_token: String,
    account_alias: String,
    location_alias: String,
}

impl Session {
    pub fn new(
        bearer_token: impl Into<String>,
        account_alias: impl Into<String>,
        location_alias: impl Into<String>,
    ) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            account_alias: account_alias.into(),
            location_alias: location_alias.into(),
        }
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    /// Account alias scoping every resource path.
    pub fn account_alias(&self) -> &str {
        &self.account_alias
    }

    /// Default datacenter for the account.
    pub fn location_alias(&self) -> &str {
        &self.location_alias
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("account_alias", &self.account_alias)
            .field("location_alias", &self.location_alias)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_missing_halves() {
        let creds = Credentials::default();
        assert!(matches!(creds.require(), Err(ClcError::ConfigMissing(_))));

        let creds = Credentials {
            username: Some("user".into()),
            password: None,
        };
        assert!(matches!(creds.require(), Err(ClcError::ConfigMissing(_))));

        let creds = Credentials::new("user", "");
        assert!(matches!(creds.require(), Err(ClcError::ConfigMissing(_))));
    }

    #[test]
    fn test_require_accepts_both() {
        let creds = Credentials::new("user", "secret");
        assert_eq!(creds.require().unwrap(), ("user", "secret"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds = Credentials::new("user", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));

        let session = Session::new("tok-123", "ACME", "WA1");
        let debug = format!("{session:?}");
        assert!(debug.contains("ACME"));
        assert!(!debug.contains("tok-123"));
    }

    #[test]
    fn test_session_deserializes_login_response() {
        let session: Session = serde_json::from_value(serde_json::json!({
            "userName": "user",
            "accountAlias": "ACME",
            "locationAlias": "WA1",
            "roles": ["AccountAdmin"],
            "bearerToken": "tok"
        }))
        .unwrap();
        assert_eq!(session.bearer_token(), "tok");
        assert_eq!(session.account_alias(), "ACME");
        assert_eq!(session.location_alias(), "WA1");
    }
}
