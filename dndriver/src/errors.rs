use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Cannot login after {attempts} attempt(s)")]
    LoginExhausted { attempts: u32 },

    #[error("Download timeout after {minutes} minute(s)")]
    DownloadTimeout { minutes: u64 },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Remote automation protocol error: {0}")]
    Protocol(String),

    #[error("No open automation session")]
    NotConnected,

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Automation server process error: {0}")]
    Process(String),
}

impl AutomationError {
    /// True when the error came from talking to the endpoint rather than
    /// from the Downloader UI being in an unexpected state.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AutomationError::Connection(_) | AutomationError::Protocol(_)
        )
    }
}
