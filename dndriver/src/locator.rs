use tracing::{debug, instrument};

use crate::element::UIElement;
use crate::engine::AutomationEngine;
use crate::errors::AutomationError;
use crate::selector::Selector;
use std::sync::Arc;

/// Resolves a selector against the session root or a parent element.
///
/// A lookup never turns "not there" into an error: `find` yields `None` and
/// callers branch on it. Errors are reserved for the endpoint misbehaving.
#[derive(Clone)]
pub struct Locator {
    engine: Arc<dyn AutomationEngine>,
    selector: Selector,
    root: Option<UIElement>,
}

impl Locator {
    /// Create a new locator with the given selector
    pub fn new(engine: Arc<dyn AutomationEngine>, selector: Selector) -> Self {
        Self {
            engine,
            selector,
            root: None,
        }
    }

    /// Set the root element for this locator
    pub fn within(mut self, element: UIElement) -> Self {
        self.root = Some(element);
        self
    }

    /// Look the element up once, without waiting.
    #[instrument(level = "debug", skip(self), fields(selector = %self.selector))]
    pub async fn find(&self) -> Result<Option<UIElement>, AutomationError> {
        if let Selector::Invalid(reason) = &self.selector {
            return Err(AutomationError::InvalidSelector(reason.clone()));
        }
        let root = self.root.as_ref().map(|r| r.id());
        let found = self.engine.find_element(&self.selector, root).await?;
        debug!(found = found.is_some(), "lookup finished");
        Ok(found.map(|id| UIElement::new(id, self.engine.clone())))
    }

    /// Like [`Locator::find`] but absence becomes `ElementNotFound` carrying `what`.
    pub async fn expect(&self, what: &str) -> Result<UIElement, AutomationError> {
        self.find()
            .await?
            .ok_or_else(|| AutomationError::ElementNotFound(what.to_string()))
    }

    /// Get a nested locator rooted at the element this one resolves to
    pub async fn locator(
        &self,
        selector: impl Into<Selector>,
    ) -> Result<Option<Locator>, AutomationError> {
        let selector = selector.into();
        Ok(self.find().await?.map(|parent| parent.locator(selector)))
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}
