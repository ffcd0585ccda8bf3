//! User interface components.
//!
//! Two cooperating pieces:
//! - [`shell`]: the persistent main window (configuration, capture buttons,
//!   question/response panes, request dispatch)
//! - [`selector`]: the transient fullscreen overlay for area selection
//!
//! Supporting submodules:
//! - [`selection`]: pure drag geometry and the selection state machine
//! - [`rendering`]: overlay drawing helpers
//! - [`state`]: worker events delivered back to the UI thread

pub mod rendering;
pub mod selection;
pub mod selector;
pub mod shell;
pub mod state;

pub use selector::AreaSelector;
pub use shell::ShellApp;

use crate::capture::ScreenCapturer;
use crate::config::AppConfig;
use crate::error::Result;

/// Launches the main window; returns when the user closes it.
pub fn run_shell(config: AppConfig, capturer: ScreenCapturer, monitor: usize) -> Result<()> {
    shell::run(config, capturer, monitor)
}
