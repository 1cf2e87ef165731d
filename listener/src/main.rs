//! Deploy Listener - Entry Point
//!
//! One invocation is one tick of an external scheduler: check every
//! configured application once, notify, exit.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

use deploy_listener::app::state::AppState;
use deploy_listener::filesys::file::File;
use deploy_listener::logs::{init_logging, LogOptions};
use deploy_listener::storage::settings::{Settings, SETTINGS_PATH_VAR};
use deploy_listener::utils::version_info;

use tracing::{error, info};

const DEFAULT_SETTINGS_FILE: &str = "settings.json";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to render version: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    // Retrieve the settings file
    let settings_path = cli_args
        .get("settings")
        .cloned()
        .or_else(|| env::var(SETTINGS_PATH_VAR).ok())
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let settings = match Settings::load(&File::new(&settings_path)).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let _log_guard = match init_logging(LogOptions::from(&settings)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    info!(
        "Deploy listener {} ({}) starting with {}",
        version.version, version.git_hash, settings_path
    );

    let dry_run = cli_args.contains_key("dry-run");
    let state = match AppState::init(&settings, dry_run).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match state.listener.run_once(&state.app_ids).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
