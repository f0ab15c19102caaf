use crate::engine::SessionOptions;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:4713";
pub const DEFAULT_APP_PATH: &str = r"C:\Metastock\Downloader\Downloader.exe";
pub const DEFAULT_LOGIN_RETRY: u32 = 5;
pub const DEFAULT_DOWNLOAD_TIMEOUT_MINUTES: u64 = 30;
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// DataLink account typed into the login dialog
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Remote automation endpoint address
    pub endpoint: String,
    /// Downloader executable as seen by the endpoint
    pub app_path: PathBuf,
    pub credentials: Credentials,
    /// How many times the login dialog may be filled in
    pub login_retry_limit: u32,
    pub download_timeout_minutes: u64,
    pub launch_timeout: Duration,
    pub command_timeout: Duration,
}

impl DriverConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            app_path: PathBuf::from(DEFAULT_APP_PATH),
            credentials,
            login_retry_limit: DEFAULT_LOGIN_RETRY,
            download_timeout_minutes: DEFAULT_DOWNLOAD_TIMEOUT_MINUTES,
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            app: self.app_path.clone(),
            launch_timeout: self.launch_timeout,
            command_timeout: self.command_timeout,
        }
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_minutes.saturating_mul(60))
    }
}
