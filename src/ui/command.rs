//! Typed commands from views to the shell.

use crate::runtime::ApiCommand;
use crate::ui::app::View;

/// A request a view hands back to the shell's event loop.
///
/// Views never mutate shell state or talk to the service themselves; their key
/// handlers return one of these and the shell, the single state writer,
/// executes it.
#[derive(Debug, Clone)]
pub enum ViewCommand {
    /// Switch to the given view.
    Navigate(View),
    /// Re-fetch the dashboard snapshot.
    Refresh,
    /// Forward a request to the API runtime.
    Api(ApiCommand),
    /// Exit the application.
    Quit,
}
