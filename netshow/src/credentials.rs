//! Credential resolution.
//!
//! Credentials are looked up by a symbolic id against a snapshot of
//! environment-style key/value pairs taken once at startup. For the id
//! `gns3` the store reads:
//!
//! ```text
//! GNS3_USERNAME      required
//! GNS3_PASSWORD      required
//! GNS3_SECRET        required (enable secret)
//! GNS3_DEVICE_TYPE   optional, a platform id such as cisco_ios
//! ```

use std::collections::HashMap;
use std::fmt;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::platform::Platform;

const USERNAME: &str = "USERNAME";
const PASSWORD: &str = "PASSWORD";
const SECRET: &str = "SECRET";
const DEVICE_TYPE: &str = "DEVICE_TYPE";

/// Username, password and enable secret for a group of devices.
pub struct CredentialSet {
    username: String,
    password: SecretString,
    enable_secret: SecretString,
    device_type: Option<Platform>,
}

impl CredentialSet {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        enable_secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            enable_secret: SecretString::from(enable_secret.into()),
            device_type: None,
        }
    }

    pub fn with_device_type(mut self, platform: Platform) -> Self {
        self.device_type = Some(platform);
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn enable_secret(&self) -> &SecretString {
        &self.enable_secret
    }

    /// Platform these credentials are normally used with, if configured.
    pub fn device_type(&self) -> Option<Platform> {
        self.device_type
    }

    pub(crate) fn into_parts(self) -> (String, SecretString, SecretString) {
        (self.username, self.password, self.enable_secret)
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("enable_secret", &"<redacted>")
            .field("device_type", &self.device_type)
            .finish()
    }
}

/// Read-only snapshot of credential entries.
#[derive(Clone, Default)]
pub struct CredentialStore {
    vars: HashMap<String, String>,
}

impl CredentialStore {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a store from explicit key/value pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Resolve the credential set stored under `credential_id`.
    pub fn resolve(&self, credential_id: &str) -> Result<CredentialSet, ConfigError> {
        let prefix = env_prefix(credential_id)?;

        let username = self.required(credential_id, &prefix, USERNAME)?;
        let password = self.required(credential_id, &prefix, PASSWORD)?;
        let secret = self.required(credential_id, &prefix, SECRET)?;

        let mut set = CredentialSet::new(username, password, secret);

        if let Some(device_type) = self
            .vars
            .get(&format!("{prefix}_{DEVICE_TYPE}"))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
        {
            set = set.with_device_type(device_type.parse()?);
        }

        Ok(set)
    }


    fn required(&self, id: &str, prefix: &str, field: &str) -> Result<&str, ConfigError> {
        let var = format!("{prefix}_{field}");
        match self.vars.get(&var) {
            None => Err(ConfigError::MissingCredential {
                id: id.to_string(),
                var,
            }),
            Some(value) if value.is_empty() => Err(ConfigError::EmptyCredential {
                id: id.to_string(),
                var,
            }),
            Some(value) => Ok(value.as_str()),
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("entries", &self.vars.len())
            .finish()
    }
}

/// `gns3` -> `GNS3`, `lab-core` -> `LAB_CORE`
fn env_prefix(credential_id: &str) -> Result<String, ConfigError> {
    let id = credential_id.trim();
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(ConfigError::InvalidCredentialId {
            id: credential_id.to_string(),
        });
    }
    Ok(id.to_ascii_uppercase().replace('-', "_"))
}
