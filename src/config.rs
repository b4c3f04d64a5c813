use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};

pub const DEFAULT_ENV_FILE: &str = ".env";

pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const KEY_NAME: &str = "KEY_NAME";
pub const PUBLIC_KEY_PATH: &str = "PUBLIC_KEY_PATH";
pub const AMI_ID: &str = "AMI_ID";
pub const INSTANCE_TYPE: &str = "INSTANCE_TYPE";
pub const SUBNET_ID: &str = "SUBNET_ID";

/// Where the process environment came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvSource {
    File(PathBuf),
    Missing(PathBuf),
    Unreadable { path: PathBuf, reason: String },
}

impl Display for EnvSource {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            EnvSource::File(path) => write!(f, "Using .env file at: {}", path.display()),
            EnvSource::Missing(path) => write!(
                f,
                "Info: .env file does not exist at: {}. Falling back to system environment variables.",
                path.display()
            ),
            EnvSource::Unreadable { path, reason } => write!(
                f,
                "Warning: Could not load .env file at {}: {}. Falling back to system environment variables.",
                path.display(),
                reason
            ),
        }
    }
}

/// Merges a dotenv file into the process environment. Variables that are
/// already set keep their value. A file that fails to parse is not fatal.
pub fn load_env_file(path: &Path) -> EnvSource {
    if !path.exists() {
        return EnvSource::Missing(path.to_path_buf());
    }

    match dotenvy::from_path(path) {
        Ok(()) => EnvSource::File(path.to_path_buf()),
        Err(err) => EnvSource::Unreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        },
    }
}

/// Immutable provisioning settings, resolved once at startup.
///
/// The AWS region and credentials are checked on construction. The remaining
/// settings are only checked by the step that first needs them, so a missing
/// `AMI_ID` is reported after the key pair was imported.
#[derive(Clone)]
pub struct Config {
    region: String,
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    key_name: Option<String>,
    public_key_path: Option<String>,
    ami_id: Option<String>,
    instance_type: Option<String>,
    subnet_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ProvisionError::MissingVar(key));

        Ok(Config {
            region: require(AWS_REGION)?,
            access_key_id: require(AWS_ACCESS_KEY_ID)?,
            secret_access_key: require(AWS_SECRET_ACCESS_KEY)?,
            session_token: get(AWS_SESSION_TOKEN),
            key_name: get(KEY_NAME),
            public_key_path: get(PUBLIC_KEY_PATH),
            ami_id: get(AMI_ID),
            instance_type: get(INSTANCE_TYPE),
            subnet_id: get(SUBNET_ID),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn key_name(&self) -> Result<&str> {
        required(&self.key_name, KEY_NAME)
    }

    pub fn public_key_path(&self) -> Result<&str> {
        required(&self.public_key_path, PUBLIC_KEY_PATH)
    }

    pub fn ami_id(&self) -> Result<&str> {
        required(&self.ami_id, AMI_ID)
    }

    pub fn instance_type(&self) -> Result<&str> {
        required(&self.instance_type, INSTANCE_TYPE)
    }

    pub fn subnet_id(&self) -> Option<&str> {
        self.subnet_id.as_deref()
    }
}

fn required<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str> {
    value.as_deref().ok_or(ProvisionError::MissingVar(key))
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("key_name", &self.key_name)
            .field("public_key_path", &self.public_key_path)
            .field("ami_id", &self.ami_id)
            .field("instance_type", &self.instance_type)
            .field("subnet_id", &self.subnet_id)
            .finish()
    }
}
