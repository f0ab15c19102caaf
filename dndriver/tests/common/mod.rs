#![allow(dead_code)]

use dndriver::selector::downloader;
use dndriver::{
    AutomationEngine, AutomationError, Connector, Credentials, DownloadOrchestrator, ElementId,
    Selector, SessionOptions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the Downloader shows during one poll tick
#[derive(Debug, Clone, Copy, Default)]
pub struct Screen {
    pub report: bool,
    pub login: bool,
    pub progress: bool,
}

pub const NOTHING: Screen = Screen {
    report: false,
    login: false,
    progress: false,
};
pub const REPORT: Screen = Screen {
    report: true,
    login: false,
    progress: false,
};
pub const LOGIN: Screen = Screen {
    report: false,
    login: true,
    progress: false,
};
pub const PROGRESS: Screen = Screen {
    report: false,
    login: false,
    progress: true,
};
pub const EVERYTHING: Screen = Screen {
    report: true,
    login: true,
    progress: true,
};

#[derive(Debug)]
pub struct UiState {
    pub main_window: bool,
    pub console_visible: bool,
    pub console_toggle_works: bool,
    pub button_visible: bool,
    pub tab_present: bool,
    pub user_field: bool,
    pub password_field: bool,
    pub login_button: bool,
    /// Screens per tick; the last one repeats forever
    pub screens: Vec<Screen>,
    /// Make every lookup fail as if the endpoint went away
    pub broken_transport: bool,
    pub close_fails: bool,

    pub ticks: usize,
    pub actions: Vec<String>,
    pub closes: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            main_window: true,
            console_visible: true,
            console_toggle_works: true,
            button_visible: true,
            tab_present: true,
            user_field: true,
            password_field: true,
            login_button: true,
            screens: vec![NOTHING],
            broken_transport: false,
            close_fails: false,
            ticks: 0,
            actions: Vec::new(),
            closes: 0,
        }
    }
}

impl UiState {
    fn screen(&self) -> Screen {
        if self.ticks == 0 {
            return NOTHING;
        }
        let index = (self.ticks - 1).min(self.screens.len().saturating_sub(1));
        self.screens.get(index).copied().unwrap_or_default()
    }
}

/// In-memory stand-in for a WinAppDriver session on the Downloader.
/// A new poll tick starts with every lookup of the collection report.
#[derive(Default)]
pub struct ScriptedEngine {
    pub state: Mutex<UiState>,
}

impl ScriptedEngine {
    pub fn new(state: UiState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
        })
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    pub fn count(&self, action: &str) -> usize {
        self.actions().iter().filter(|a| a.as_str() == action).count()
    }

    pub fn ticks(&self) -> usize {
        self.state.lock().unwrap().ticks
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }
}

#[async_trait::async_trait]
impl AutomationEngine for ScriptedEngine {
    async fn find_element(
        &self,
        selector: &Selector,
        root: Option<&str>,
    ) -> Result<Option<ElementId>, AutomationError> {
        let mut state = self.state.lock().unwrap();
        if state.broken_transport {
            return Err(AutomationError::Connection("connection reset".to_string()));
        }

        let hit = |present: bool, id: &str| present.then(|| id.to_string());
        let found = match (selector, root) {
            (Selector::Name(n), None) if n == downloader::MAIN_WINDOW => {
                hit(state.main_window, "main")
            }
            (Selector::Name(n), Some("main")) if n == downloader::CONSOLE => {
                hit(state.console_visible, "console")
            }
            (Selector::Name(n), Some("console")) if n == downloader::DOWNLOAD_BUTTON => {
                hit(state.button_visible, "button")
            }
            (Selector::Name(n), Some("console")) if n == downloader::DOWNLOAD_TAB => {
                hit(state.tab_present, "tab")
            }
            (Selector::Name(n), Some("main")) if n == downloader::REPORT_WINDOW => {
                state.ticks += 1;
                hit(state.screen().report, "report")
            }
            (Selector::Name(n), Some("report")) if n == downloader::REPORT_CLOSE_BUTTON => {
                hit(true, "close")
            }
            (Selector::Name(n), Some("main")) if n == downloader::LOGIN_WINDOW => {
                hit(state.screen().login, "login")
            }
            (Selector::Path(p), Some("login")) if p == downloader::LOGIN_USER_ID => {
                hit(state.user_field, "user")
            }
            (Selector::Path(p), Some("login")) if p == downloader::LOGIN_PASSWORD => {
                hit(state.password_field, "password")
            }
            (Selector::Path(p), Some("login")) if p == downloader::LOGIN_BUTTON => {
                hit(state.login_button, "login-button")
            }
            (Selector::ClassName(c), Some("console")) if c == downloader::DOWNLOAD_STATUS => {
                hit(state.screen().progress, "status")
            }
            _ => None,
        };
        Ok(found)
    }

    async fn click(&self, element: &str) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        if element == "tab" {
            state.button_visible = true;
        }
        state.actions.push(format!("click:{element}"));
        Ok(())
    }

    async fn clear(&self, element: &str) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(format!("clear:{element}"));
        Ok(())
    }

    async fn send_keys(&self, element: &str, text: &str) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        if element == "main" && text == downloader::CONSOLE_TOGGLE_KEYS {
            state.console_visible = state.console_toggle_works;
            state.actions.push("keys:main:ctrl+d".to_string());
        } else {
            state.actions.push(format!("keys:{element}:{text}"));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        state.closes += 1;
        if state.close_fails {
            return Err(AutomationError::Connection("session already gone".to_string()));
        }
        Ok(())
    }
}

pub struct ScriptedConnector {
    pub engine: Arc<ScriptedEngine>,
    pub opens: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new(engine: Arc<ScriptedEngine>) -> Arc<Self> {
        Arc::new(Self {
            engine,
            opens: AtomicUsize::new(0),
        })
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Connector for ScriptedConnector {
    async fn open(
        &self,
        _options: &SessionOptions,
    ) -> Result<Arc<dyn AutomationEngine>, AutomationError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(self.engine.clone())
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("2-1765849", "s3cret")
}

/// A connected orchestrator over a scripted Downloader
pub async fn connected(
    state: UiState,
) -> (DownloadOrchestrator, Arc<ScriptedEngine>, Arc<ScriptedConnector>) {
    let engine = ScriptedEngine::new(state);
    let connector = ScriptedConnector::new(engine.clone());
    let mut orchestrator =
        DownloadOrchestrator::new(connector.clone(), r"C:\Downloader.exe", credentials());
    orchestrator
        .connect(
            std::time::Duration::from_secs(30),
            std::time::Duration::from_secs(60),
        )
        .await
        .expect("scripted connect never fails");
    (orchestrator, engine, connector)
}
