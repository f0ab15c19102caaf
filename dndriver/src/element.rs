use crate::engine::{AutomationEngine, ElementId};
use crate::{AutomationError, Locator, Selector};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// A located UI element.
///
/// Handles are cheap and short lived: dialogs in the Downloader come and go,
/// so callers re-resolve instead of holding on to them across poll ticks.
#[derive(Clone)]
pub struct UIElement {
    id: ElementId,
    engine: Arc<dyn AutomationEngine>,
}

impl fmt::Debug for UIElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UIElement").field("id", &self.id).finish()
    }
}

impl PartialEq for UIElement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl UIElement {
    pub(crate) fn new(id: ElementId, engine: Arc<dyn AutomationEngine>) -> Self {
        Self { id, engine }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Locator scoped to this element's subtree
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        Locator::new(self.engine.clone(), selector.into()).within(self.clone())
    }

    #[instrument(level = "trace", skip(self), fields(id = %self.id))]
    pub async fn click(&self) -> Result<(), AutomationError> {
        self.engine.click(&self.id).await
    }

    #[instrument(level = "trace", skip(self), fields(id = %self.id))]
    pub async fn clear(&self) -> Result<(), AutomationError> {
        self.engine.clear(&self.id).await
    }

    // text is skipped so credentials never reach the logs
    #[instrument(level = "trace", skip(self, text), fields(id = %self.id))]
    pub async fn send_keys(&self, text: &str) -> Result<(), AutomationError> {
        self.engine.send_keys(&self.id, text).await
    }
}
