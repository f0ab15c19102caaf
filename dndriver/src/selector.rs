/// Represents ways to locate a UI element through the remote endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by display name. Fastest lookup, preferred whenever the name is unique.
    Name(String),
    /// Select by control class name
    ClassName(String),
    /// Select using XPath-like query, e.g. `//Edit[@AutomationId="txtUsername"]`
    Path(String),
    /// Select by native automation id (`AutomationId` on Windows)
    NativeId(String),
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl Selector {
    /// The locator strategy and value sent to the endpoint.
    pub fn strategy(&self) -> Option<(&'static str, &str)> {
        match self {
            Selector::Name(v) => Some(("name", v)),
            Selector::ClassName(v) => Some(("class name", v)),
            Selector::Path(v) => Some(("xpath", v)),
            Selector::NativeId(v) => Some(("accessibility id", v)),
            Selector::Invalid(_) => None,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Name(v) => write!(f, "name:{v}"),
            Selector::ClassName(v) => write!(f, "classname:{v}"),
            Selector::Path(v) => write!(f, "{v}"),
            Selector::NativeId(v) => write!(f, "nativeid:{v}"),
            Selector::Invalid(reason) => write!(f, "<invalid: {reason}>"),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        let s = s.trim();
        let lower = s.to_lowercase();
        match s {
            _ if lower.starts_with("name:") => Selector::Name(s[5..].trim().to_string()),
            _ if lower.starts_with("classname:") => {
                Selector::ClassName(s["classname:".len()..].trim().to_string())
            }
            _ if lower.starts_with("nativeid:") => {
                Selector::NativeId(s["nativeid:".len()..].trim().to_string())
            }
            _ if s.starts_with('/') => Selector::Path(s.to_string()),
            _ => Selector::Invalid(format!(
                "Unknown selector format: \"{s}\". Use prefixes like 'name:', 'classname:', 'nativeid:', or a '/' path."
            )),
        }
    }
}

/// Named elements of the Downloader UI.
///
/// Names are resolved with [`Selector::Name`] wherever possible, paths are slow
/// and only used for the login controls whose names are not unique.
pub mod downloader {
    use super::Selector;

    pub const MAIN_WINDOW: &str = "DownLoader";
    pub const CONSOLE: &str = "DownLoader Console";
    pub const DOWNLOAD_BUTTON: &str = "Download...";
    // the other tab is "Convert"
    pub const DOWNLOAD_TAB: &str = "Download";
    pub const LOGIN_WINDOW: &str = "DataLink Login";
    pub const LOGIN_USER_ID: &str = r#"//Edit[@AutomationId="txtUsername"]"#;
    pub const LOGIN_PASSWORD: &str = r#"//Edit[@AutomationId="pwdPassword"]"#;
    pub const LOGIN_BUTTON: &str = r#"//Button[@Name="Login"]"#;
    pub const DOWNLOAD_STATUS: &str = "DownloadStatusControl";
    pub const REPORT_WINDOW: &str = "Collection Report";
    pub const REPORT_CLOSE_BUTTON: &str = "Close";

    /// Ctrl+D toggles the console; the trailing NULL key releases the modifier.
    pub const CONSOLE_TOGGLE_KEYS: &str = "\u{E009}d\u{E000}";

    pub fn main_window() -> Selector {
        Selector::Name(MAIN_WINDOW.to_string())
    }

    pub fn console() -> Selector {
        Selector::Name(CONSOLE.to_string())
    }

    pub fn download_button() -> Selector {
        Selector::Name(DOWNLOAD_BUTTON.to_string())
    }

    pub fn download_tab() -> Selector {
        Selector::Name(DOWNLOAD_TAB.to_string())
    }

    pub fn login_window() -> Selector {
        Selector::Name(LOGIN_WINDOW.to_string())
    }

    pub fn login_user_id() -> Selector {
        Selector::Path(LOGIN_USER_ID.to_string())
    }

    pub fn login_password() -> Selector {
        Selector::Path(LOGIN_PASSWORD.to_string())
    }

    pub fn login_button() -> Selector {
        Selector::Path(LOGIN_BUTTON.to_string())
    }

    pub fn download_status() -> Selector {
        Selector::ClassName(DOWNLOAD_STATUS.to_string())
    }

    pub fn report_window() -> Selector {
        Selector::Name(REPORT_WINDOW.to_string())
    }

    pub fn report_close_button() -> Selector {
        Selector::Name(REPORT_CLOSE_BUTTON.to_string())
    }
}
