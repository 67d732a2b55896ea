//! Session setup and initialization

use crate::api::{ApiClient, IncomeApi};
use crate::environment::Environment;
use crate::events::Event;
use crate::runtime::{ApiCommand, start_api_runtime};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Session data for both TUI and headless modes
pub struct SessionData {
    /// Event receiver for background API events
    pub event_receiver: mpsc::Receiver<Event>,
    /// Command sender into the API runtime
    pub command_sender: mpsc::Sender<ApiCommand>,
    /// Join handles for background tasks
    pub join_handles: Vec<JoinHandle<()>>,
    /// Shutdown sender to stop all background tasks
    pub shutdown_sender: broadcast::Sender<()>,
    /// Service base URL (for display)
    pub base_url: String,
}

/// Sets up a client session.
///
/// This function handles the common setup required for both TUI and headless
/// modes:
/// 1. Builds the HTTP client for the resolved environment
/// 2. Sets up the shutdown channel
/// 3. Starts the background API runtime
/// 4. Returns session data for mode-specific handling
pub fn setup_session(environment: Environment) -> Result<SessionData, Box<dyn Error>> {
    let api = Arc::new(ApiClient::new(environment));
    let base_url = api.base_url();

    let (shutdown_sender, _) = broadcast::channel(1);
    let (event_receiver, command_sender, runtime_handle) =
        start_api_runtime(api, shutdown_sender.subscribe());

    Ok(SessionData {
        event_receiver,
        command_sender,
        join_handles: vec![runtime_handle],
        shutdown_sender,
        base_url,
    })
}
