//! Askshot core library.
//!
//! Askshot captures a screenshot (the whole screen or a user-selected
//! region), pairs it with a question, and sends both to one of three
//! multimodal AI services — OpenAI, Google Gemini or Anthropic Claude —
//! displaying the answer in the app window.
//!
//! # Module structure
//!
//! - [`capture`]: monitor enumeration and full-screen grabs
//! - [`config`]: credential and provider-selection persistence
//! - [`error`]: error types and result alias
//! - [`image_processing`]: cropping, PNG/base64 encoding, on-disk saves
//! - [`provider`]: the three HTTP clients behind one [`provider::VisionClient`] trait
//! - [`ui`]: the main window and the area-selection overlay
//!
//! # Quick start
//!
//! ```ignore
//! use askshot_core::Askshot;
//!
//! let app = Askshot::new()?;
//! app.run(0)?;
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod image_processing;
pub mod provider;
pub mod ui;

pub use capture::ScreenCapturer;
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use provider::{Provider, VisionClient};

/// Facade over the subsystems: loads configuration, initializes capture and
/// launches the GUI.
pub struct Askshot {
    config: AppConfig,
    capturer: ScreenCapturer,
}

impl Askshot {
    /// Loads configuration (file, then environment fallback) and detects
    /// monitors.
    ///
    /// # Errors
    ///
    /// Returns an error if screen capture initialization fails, e.g. no
    /// display is available.
    pub fn new() -> Result<Self> {
        let config = AppConfig::load();
        let capturer = ScreenCapturer::new()?;
        Ok(Self { config, capturer })
    }

    /// Creates an instance with a pre-built configuration.
    pub fn with_config(config: AppConfig) -> Result<Self> {
        let capturer = ScreenCapturer::new()?;
        Ok(Self { config, capturer })
    }

    /// Human-readable monitor descriptions.
    pub fn list_monitors(&self) -> Vec<String> {
        self.capturer.list_monitors()
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Mutable access to the configuration, for overrides before [`run`].
    ///
    /// [`run`]: Askshot::run
    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// Launches the main window, capturing from the given monitor.
    ///
    /// Blocks until the window closes.
    pub fn run(self, monitor: usize) -> Result<()> {
        ui::run_shell(self.config, self.capturer, monitor)
    }
}

/// Loads `.env` files if present. Call once at startup.
pub fn init() {
    let _ = dotenvy::dotenv();
}
