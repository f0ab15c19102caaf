use crate::{AutomationError, Selector};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Opaque id the endpoint hands out for a located element
pub type ElementId = String;

/// Capabilities used to open a remote session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Executable the endpoint launches
    pub app: PathBuf,
    /// How long the endpoint waits for the app's top-level window. Zero leaves
    /// the endpoint default in place.
    pub launch_timeout: Duration,
    /// Upper bound for every individual automation call
    pub command_timeout: Duration,
}

/// One open session against a remote automation endpoint
#[async_trait::async_trait]
pub trait AutomationEngine: Send + Sync {
    /// Find the first element matching `selector`, searching below `root`
    /// or the whole session when `root` is `None`.
    ///
    /// Absence is `Ok(None)`. Only transport or protocol faults are errors.
    async fn find_element(
        &self,
        selector: &Selector,
        root: Option<&str>,
    ) -> Result<Option<ElementId>, AutomationError>;

    async fn click(&self, element: &str) -> Result<(), AutomationError>;

    async fn clear(&self, element: &str) -> Result<(), AutomationError>;

    async fn send_keys(&self, element: &str, text: &str) -> Result<(), AutomationError>;

    /// Close the application window and end the session
    async fn close(&self) -> Result<(), AutomationError>;
}

/// Opens sessions. Kept separate from [`AutomationEngine`] so a driver can
/// reconnect after a disconnect.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn open(
        &self,
        options: &SessionOptions,
    ) -> Result<Arc<dyn AutomationEngine>, AutomationError>;
}
