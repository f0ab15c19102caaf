//! Automation of the Downloader desktop application
//!
//! The Downloader is driven through a remote UI-automation endpoint
//! (WinAppDriver speaking JSON over HTTP): log in to DataLink, start a
//! download, wait for the collection report and close it.

pub mod config;
pub mod element;
pub mod engine;
pub mod errors;
pub mod locator;
pub mod orchestrator;
pub mod poller;
pub mod selector;
pub mod server;
pub mod winappdriver;

pub use config::{Credentials, DriverConfig};
pub use element::UIElement;
pub use engine::{AutomationEngine, Connector, ElementId, SessionOptions};
pub use errors::AutomationError;
pub use locator::Locator;
pub use orchestrator::{ConsoleWindows, DownloadOrchestrator, POLL_INTERVAL};
pub use selector::Selector;
pub use server::AutomationServer;
pub use winappdriver::WinAppDriver;
