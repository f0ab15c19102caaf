//! Decision step of the completion wait.
//!
//! After the Download button is clicked the Downloader may show a login
//! dialog, a progress control, or the collection report (which pops up by
//! itself once everything is fetched). Each poll tick gathers what is on
//! screen into an [`Observation`] and [`next_action`] decides what to do,
//! with no I/O or clock involved.

/// What one poll tick saw. `E` is the element handle type.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<E> {
    /// Close button of the collection report
    pub report_close: Option<E>,
    pub login_window: Option<E>,
    pub progress: Option<E>,
}

impl<E> Default for Observation<E> {
    fn default() -> Self {
        Self {
            report_close: None,
            login_window: None,
            progress: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextAction<E> {
    /// Click the report's close button and finish successfully
    CloseReport(E),
    /// Fill in and submit the login dialog, then keep polling
    Login(E),
    /// Login dialog is up again but the attempt budget is spent
    GiveUpLogin,
    /// Download is running
    InProgress,
    /// Nothing recognizable on screen, keep polling
    Idle,
}

/// Pick the action for one tick. Priority is fixed: report, login, progress.
///
/// The attempt budget is checked before any login is made, so a limit of 0
/// gives up on the first sighting of the dialog.
pub fn next_action<E>(
    observation: Observation<E>,
    login_attempts: u32,
    login_retry_limit: u32,
) -> NextAction<E> {
    if let Some(close) = observation.report_close {
        return NextAction::CloseReport(close);
    }
    if let Some(login) = observation.login_window {
        if login_attempts >= login_retry_limit {
            return NextAction::GiveUpLogin;
        }
        return NextAction::Login(login);
    }
    if observation.progress.is_some() {
        return NextAction::InProgress;
    }
    NextAction::Idle
}
