use crate::config::{Credentials, DriverConfig};
use crate::engine::{AutomationEngine, Connector, SessionOptions};
use crate::poller::{next_action, NextAction, Observation};
use crate::selector::downloader;
use crate::winappdriver::WinAppDriver;
use crate::{AutomationError, Locator, Selector, UIElement};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Fixed interval between two looks at the Downloader while waiting
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The Downloader's main window and its console panel, resolved once per
/// [`DownloadOrchestrator::download`] call. Dialogs inside them are looked
/// up again on every poll tick.
#[derive(Debug, Clone)]
pub struct ConsoleWindows {
    pub main_window: UIElement,
    pub console: UIElement,
}

/// Drives one Downloader run: connect, open the console, start the download,
/// babysit it until the collection report shows up, disconnect.
pub struct DownloadOrchestrator {
    connector: Arc<dyn Connector>,
    app_path: PathBuf,
    credentials: Credentials,
    engine: Option<Arc<dyn AutomationEngine>>,
}

impl DownloadOrchestrator {
    pub fn new(
        connector: Arc<dyn Connector>,
        app_path: impl Into<PathBuf>,
        credentials: Credentials,
    ) -> Self {
        Self {
            connector,
            app_path: app_path.into(),
            credentials,
            engine: None,
        }
    }

    /// Orchestrator talking to the WinAppDriver endpoint named in `config`
    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(
            Arc::new(WinAppDriver::new(config.endpoint.clone())),
            config.app_path.clone(),
            config.credentials.clone(),
        )
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_some()
    }

    /// Open the remote session, which makes the endpoint launch the Downloader.
    /// Does nothing when a session is already open.
    #[instrument(skip(self), fields(app = %self.app_path.display()))]
    pub async fn connect(
        &mut self,
        launch_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<(), AutomationError> {
        if self.engine.is_some() {
            debug!("Already connected");
            return Ok(());
        }
        let options = SessionOptions {
            app: self.app_path.clone(),
            launch_timeout,
            command_timeout,
        };
        self.engine = Some(self.connector.open(&options).await?);
        Ok(())
    }

    /// Close the session (and with it the Downloader). Never fails: close
    /// errors are logged and the orchestrator is left ready for `connect`.
    #[instrument(skip(self))]
    pub async fn disconnect(&mut self) {
        let Some(engine) = self.engine.take() else {
            return;
        };
        match engine.close().await {
            Ok(()) => debug!("Session closed"),
            Err(e) => warn!("Failed to close session cleanly: {}", e),
        }
    }

    /// Start a download and wait until the Downloader reports it finished.
    #[instrument(skip(self))]
    pub async fn download(
        &self,
        login_retry_limit: u32,
        download_timeout_minutes: u64,
    ) -> Result<(), AutomationError> {
        let windows = self.open_downloader_console().await?;
        self.click_download_button(&windows.console).await?;
        self.wait_for_download_to_complete(&windows, login_retry_limit, download_timeout_minutes)
            .await
    }

    fn locator(&self, selector: Selector) -> Result<Locator, AutomationError> {
        let engine = self.engine.clone().ok_or(AutomationError::NotConnected)?;
        Ok(Locator::new(engine, selector))
    }

    /// Find the main window and make sure its console panel is showing.
    ///
    /// The console is often hidden right after launch; it gets toggled once
    /// and looked up again before giving up.
    pub async fn open_downloader_console(&self) -> Result<ConsoleWindows, AutomationError> {
        debug!("Finding Downloader main window");
        let main_window = self
            .locator(downloader::main_window())?
            .expect("Downloader main window")
            .await?;

        debug!("Finding Downloader console");
        if let Some(console) = main_window.locator(downloader::console()).find().await? {
            return Ok(ConsoleWindows {
                main_window,
                console,
            });
        }

        debug!("Console hidden, toggling it with Ctrl+D");
        main_window
            .send_keys(downloader::CONSOLE_TOGGLE_KEYS)
            .await?;

        debug!("Finding Downloader console again");
        let console = main_window
            .locator(downloader::console())
            .expect("Downloader console")
            .await?;
        Ok(ConsoleWindows {
            main_window,
            console,
        })
    }

    /// Press the Download button, switching to the Download tab first when
    /// the console shows another tab. The button is clicked exactly once:
    /// every click starts a new download.
    pub async fn click_download_button(&self, console: &UIElement) -> Result<(), AutomationError> {
        debug!("Finding Download button");
        let button = match console.locator(downloader::download_button()).find().await? {
            Some(button) => button,
            None => {
                debug!("Download button not showing, finding Download tab");
                let tab = console
                    .locator(downloader::download_tab())
                    .expect("Download tab")
                    .await?;
                debug!("Switching to Download tab");
                tab.click().await?;
                console
                    .locator(downloader::download_button())
                    .expect("Download button")
                    .await?
            }
        };

        debug!("Clicking Download button");
        button.click().await
    }

    /// Look at the screen in priority order, stopping at the first hit.
    async fn observe(
        &self,
        windows: &ConsoleWindows,
    ) -> Result<Observation<UIElement>, AutomationError> {
        let mut observation = Observation::default();

        if let Some(report) = windows
            .main_window
            .locator(downloader::report_window())
            .locator(downloader::report_close_button())
            .await?
        {
            observation.report_close = report.find().await?;
            if observation.report_close.is_some() {
                return Ok(observation);
            }
        }

        observation.login_window = windows
            .main_window
            .locator(downloader::login_window())
            .find()
            .await?;
        if observation.login_window.is_some() {
            return Ok(observation);
        }

        observation.progress = windows
            .console
            .locator(downloader::download_status())
            .find()
            .await?;
        Ok(observation)
    }

    /// Poll once per [`POLL_INTERVAL`] until the collection report appears,
    /// logging in whenever the login dialog shows up.
    ///
    /// Fails with `LoginExhausted` when the dialog shows up again after
    /// `login_retry_limit` logins, and with `DownloadTimeout` once
    /// `timeout_in_minutes` have passed.
    #[instrument(skip(self, windows))]
    pub async fn wait_for_download_to_complete(
        &self,
        windows: &ConsoleWindows,
        login_retry_limit: u32,
        timeout_in_minutes: u64,
    ) -> Result<(), AutomationError> {
        // None when the timeout is too far out for the clock to represent
        let deadline = Instant::now()
            .checked_add(Duration::from_secs(timeout_in_minutes.saturating_mul(60)));
        let mut login_attempts = 0;
        let mut progress_ticks = 0u64;

        while deadline.map_or(true, |deadline| Instant::now() < deadline) {
            let observation = self.observe(windows).await?;
            match next_action(observation, login_attempts, login_retry_limit) {
                NextAction::CloseReport(close) => {
                    info!(progress_ticks, login_attempts, "Collection report shown, closing it");
                    return close.click().await;
                }
                NextAction::GiveUpLogin => {
                    warn!(login_attempts, "Login dialog is still showing");
                    return Err(AutomationError::LoginExhausted {
                        attempts: login_attempts,
                    });
                }
                NextAction::Login(login_window) => {
                    debug!(attempt = login_attempts + 1, "Login dialog shown, logging in");
                    self.handle_login_window(&login_window).await?;
                    login_attempts += 1;
                }
                NextAction::InProgress => {
                    progress_ticks += 1;
                    debug!(progress_ticks, "Download in progress");
                }
                NextAction::Idle => {}
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        warn!(progress_ticks, login_attempts, "Gave up waiting for the download");
        Err(AutomationError::DownloadTimeout {
            minutes: timeout_in_minutes,
        })
    }

    /// Fill in and submit the DataLink login dialog. No retries here, the
    /// poll loop decides whether another attempt is allowed.
    pub async fn handle_login_window(&self, login_window: &UIElement) -> Result<(), AutomationError> {
        debug!("Finding login controls");
        let user_id = login_window.locator(downloader::login_user_id()).find().await?;
        let password = login_window
            .locator(downloader::login_password())
            .find()
            .await?;
        let login_button = login_window.locator(downloader::login_button()).find().await?;

        let user_id = user_id
            .ok_or_else(|| AutomationError::ElementNotFound("login user id field".to_string()))?;
        let password = password
            .ok_or_else(|| AutomationError::ElementNotFound("login password field".to_string()))?;
        let login_button = login_button
            .ok_or_else(|| AutomationError::ElementNotFound("login button".to_string()))?;

        debug!("Entering user id");
        user_id.click().await?;
        user_id.clear().await?;
        user_id.send_keys(&self.credentials.user_id).await?;

        debug!("Entering password");
        password.click().await?;
        password.clear().await?;
        password.send_keys(&self.credentials.password).await?;

        debug!("Clicking login button");
        login_button.click().await
    }
}
