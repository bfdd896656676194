//! Client-side authentication configuration.
//!
//! A [`ClientAuth`] tells a [`TransportFactory`](crate::soap::TransportFactory)
//! how the outbound connection logs in to the KDC. [`ClientAuthConfig`] is the
//! deserializable form applications keep in their own configuration files.

use serde::Deserialize;
use thiserror::Error;

use crate::credential::{DelegatedCredential, Password, ScopedCredential};

/// Login module name used when the configuration does not name one.
pub const DEFAULT_LOGIN_MODULE: &str = "spnego-client";

/// How an outbound transport authenticates.
#[derive(Debug)]
pub enum ClientAuth {
    /// Log in through the named login module (keytab or ticket cache).
    LoginModule {
        /// Login module name
        name: String,
    },
    /// Use an already acquired GSS credential.
    Credential(ScopedCredential),
    /// Log in through the named login module with a username and password.
    Password {
        /// Login module name
        login_module: String,
        /// Kerberos user name
        username: String,
        /// User password
        password: Password,
    },
}

impl ClientAuth {
    /// Authenticates through the named login module.
    pub fn login_module(name: impl Into<String>) -> Self {
        ClientAuth::LoginModule { name: name.into() }
    }

    /// Authenticates with `credential`, disposing it once the transport is done with it.
    pub fn credential(credential: DelegatedCredential) -> Self {
        Self::credential_with_dispose(credential, true)
    }

    /// Authenticates with `credential`, disposing it afterwards only if `dispose` is set.
    pub fn credential_with_dispose(credential: DelegatedCredential, dispose: bool) -> Self {
        ClientAuth::Credential(ScopedCredential::new(credential, dispose))
    }

    /// Authenticates through the named login module with explicit credentials.
    pub fn password(
        login_module: impl Into<String>,
        username: impl Into<String>,
        password: Password,
    ) -> Self {
        ClientAuth::Password {
            login_module: login_module.into(),
            username: username.into(),
            password,
        }
    }

    /// Returns the login module name, if this mode goes through one.
    pub fn login_module_name(&self) -> Option<&str> {
        match self {
            ClientAuth::LoginModule { name } => Some(name),
            ClientAuth::Password { login_module, .. } => Some(login_module),
            ClientAuth::Credential(_) => None,
        }
    }
}

/// Deserializable client authentication settings.
///
/// # Examples
///
/// ```
/// use spnego_core::config::{ClientAuth, ClientAuthConfig};
///
/// let config: ClientAuthConfig = serde_json::from_str(
///     r#"{ "login_module": "spnego-client", "username": "svc", "password": "s3cret" }"#,
/// )
/// .unwrap();
///
/// let auth = config.into_client_auth().unwrap();
/// assert!(matches!(auth, ClientAuth::Password { .. }));
/// ```
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClientAuthConfig {
    /// Login module name
    pub login_module: String,
    /// Kerberos user name, for password logins
    pub username: Option<String>,
    /// Password, for password logins
    pub password: Option<Password>,
}

impl Default for ClientAuthConfig {
    fn default() -> Self {
        Self {
            login_module: DEFAULT_LOGIN_MODULE.to_string(),
            username: None,
            password: None,
        }
    }
}

impl ClientAuthConfig {
    /// Validates the settings and turns them into a [`ClientAuth`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the login module name is blank, or if
    /// only one of username and password is set.
    pub fn into_client_auth(self) -> Result<ClientAuth, ConfigError> {
        let login_module = self.login_module.trim().to_string();
        if login_module.is_empty() {
            return Err(ConfigError::EmptyLoginModule);
        }

        match (self.username, self.password) {
            (None, None) => Ok(ClientAuth::login_module(login_module)),
            (Some(username), Some(password)) => {
                Ok(ClientAuth::password(login_module, username, password))
            }
            (Some(username), None) => Err(ConfigError::MissingPassword { username }),
            (None, Some(_)) => Err(ConfigError::MissingUsername),
        }
    }
}

/// Invalid client authentication settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The login module name is empty.
    #[error("login module name must not be empty")]
    EmptyLoginModule,
    /// A username was configured without a password.
    #[error("username '{username}' is configured without a password")]
    MissingPassword {
        /// The configured user name
        username: String,
    },
    /// A password was configured without a username.
    #[error("password is configured without a username")]
    MissingUsername,
}
