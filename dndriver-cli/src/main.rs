//! dndriver CLI
//!
//! Runs one Downloader session end to end and reports the outcome through
//! the exit code (0 success, 1 failure).
//!
//! Usage:
//!   dndriver --user 2-1234567 --password ****
//!   dndriver --server http://10.0.0.5:4723 --path "C:\Downloader\Downloader.exe" --user ... --password ...
//!   dndriver --server-exe "C:\Program Files (x86)\Windows Application Driver\WinAppDriver.exe" --user ... --password ...

use anyhow::{Context, Result};
use clap::Parser;
use dndriver::config::{
    DEFAULT_APP_PATH, DEFAULT_DOWNLOAD_TIMEOUT_MINUTES, DEFAULT_ENDPOINT, DEFAULT_LOGIN_RETRY,
};
use dndriver::{AutomationServer, Credentials, DownloadOrchestrator, DriverConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

mod logging;

/// Time a freshly started automation server gets before the first session request
const SERVER_STARTUP_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(
    name = "dndriver",
    author,
    version,
    about = "Drive the Downloader through WinAppDriver: log in, download, close the collection report"
)]
struct Args {
    /// WinAppDriver endpoint
    #[arg(long, env = "DNDRIVER_SERVER", default_value = DEFAULT_ENDPOINT)]
    server: String,

    /// Full path of Downloader.exe on the automated machine
    #[arg(long, env = "DNDRIVER_PATH", default_value = DEFAULT_APP_PATH)]
    path: PathBuf,

    /// WinAppDriver executable to start when it is not already running.
    /// A server started here is stopped again before exit.
    #[arg(long, env = "DNDRIVER_SERVER_EXE")]
    server_exe: Option<PathBuf>,

    /// Argument passed to a server started through --server-exe (repeatable)
    #[arg(long = "server-arg", allow_hyphen_values = true)]
    server_args: Vec<String>,

    /// DataLink user id
    #[arg(long, env = "DNDRIVER_USER")]
    user: String,

    /// DataLink password
    #[arg(long, env = "DNDRIVER_PASSWORD", hide_env_values = true)]
    password: String,

    /// How many times to fill in the login dialog
    #[arg(long = "login-retry", alias = "loginRetry", default_value_t = DEFAULT_LOGIN_RETRY)]
    login_retry: u32,

    /// Minutes to wait for the download to finish
    #[arg(
        long = "download-timeout",
        alias = "downloadTimeout",
        default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_MINUTES
    )]
    download_timeout: u64,

    /// Seconds WinAppDriver waits for the Downloader window (0 = endpoint default)
    #[arg(long = "launch-timeout", alias = "launchTimeout", default_value_t = 60)]
    launch_timeout: u64,

    /// Seconds allowed for each automation call (0 = no limit)
    #[arg(long = "command-timeout", default_value_t = 60)]
    command_timeout: u64,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, env = "DNDRIVER_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn driver_config(&self) -> DriverConfig {
        let mut config = DriverConfig::new(Credentials::new(&self.user, &self.password));
        config.endpoint = self.server.clone();
        config.app_path = self.path.clone();
        config.login_retry_limit = self.login_retry;
        config.download_timeout_minutes = self.download_timeout;
        config.launch_timeout = Duration::from_secs(self.launch_timeout);
        config.command_timeout = Duration::from_secs(self.command_timeout);
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let _log_guard = match logging::init_logging(args.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!("dndriver started");
    match run(&args).await {
        Ok(()) => {
            info!("dndriver completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("dndriver failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let config = args.driver_config();
    info!(
        endpoint = %config.endpoint,
        app = %config.app_path.display(),
        login_retry = config.login_retry_limit,
        download_timeout_minutes = config.download_timeout_minutes,
        "Configuration loaded"
    );

    let server = match &args.server_exe {
        Some(exe) => {
            let server = AutomationServer::ensure_running(exe, &args.server_args)
                .context("Failed to start the automation server")?;
            if server.launched() {
                tokio::time::sleep(SERVER_STARTUP_GRACE).await;
            }
            Some(server)
        }
        None => None,
    };

    let result = drive(DownloadOrchestrator::from_config(&config), &config).await;

    if let Some(server) = server {
        server.shutdown().await;
    }
    result
}

/// Connect, download, and close the session whatever happened in between.
async fn drive(mut orchestrator: DownloadOrchestrator, config: &DriverConfig) -> Result<()> {
    let result = async {
        orchestrator
            .connect(config.launch_timeout, config.command_timeout)
            .await
            .with_context(|| format!("Failed to open a session on {}", config.endpoint))?;
        orchestrator
            .download(config.login_retry_limit, config.download_timeout_minutes)
            .await
            .context("Download did not complete")?;
        Ok::<(), anyhow::Error>(())
    }
    .await;

    orchestrator.disconnect().await;
    result
}
