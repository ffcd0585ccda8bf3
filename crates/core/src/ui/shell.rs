//! The main application window.
//!
//! Owns the persistent configuration, the current captured image and the
//! dispatch of ask requests. Provider calls run on a worker thread with a
//! single-threaded tokio runtime; results come back over an mpsc channel and
//! are applied here on the UI thread.

use super::selector::AreaSelector;
use super::state::RequestEvent;
use crate::capture::ScreenCapturer;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::image_processing::{self, CaptureMode};
use crate::provider::{self, Provider};
use eframe::egui;
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::{Duration, Instant};

const WINDOW_SIZE: [f32; 2] = [520.0, 760.0];
const PREVIEW_MAX: (u32, u32) = (240, 180);
/// Delay between minimizing the shell and grabbing the snapshot, so the
/// window has actually left the screen.
const AREA_CAPTURE_SETTLE: Duration = Duration::from_millis(400);

const READY_STATUS: &str = "Ready to capture and analyze screenshots";
const DEFAULT_QUESTION: &str = "What do you see in this screenshot?";

/// Checks that an ask action can be dispatched: credential, image, question,
/// in that order. Runs before any worker thread is spawned.
pub(crate) fn validate_ask(config: &AppConfig, has_image: bool, question: &str) -> Result<()> {
    let provider = config.selected;
    if !config.has_credential(provider) {
        return Err(AppError::MissingCredential(provider.label().to_string()));
    }
    if !has_image {
        return Err(AppError::missing_input(
            "Capture or load an image first",
        ));
    }
    if question.trim().is_empty() {
        return Err(AppError::missing_input("Enter a question first"));
    }
    Ok(())
}

pub struct ShellApp {
    config: AppConfig,
    capturer: ScreenCapturer,
    monitor: usize,

    // Captured image state. Workers clone the Arc at dispatch time, so a
    // later capture replacing this field never touches in-flight bytes.
    image: Option<Arc<DynamicImage>>,
    image_path: Option<PathBuf>,
    preview: Option<egui::TextureHandle>,

    question: String,
    response: String,
    status: String,
    modal_error: Option<String>,

    // Area capture flow
    selector: Option<AreaSelector>,
    pending_area: Option<Instant>,

    // Worker channel
    rx: Receiver<RequestEvent>,
    tx: Sender<RequestEvent>,
    busy: bool,

    markdown_cache: CommonMarkCache,
}

impl ShellApp {
    pub fn new(config: AppConfig, capturer: ScreenCapturer, monitor: usize) -> Self {
        let (tx, rx) = channel();
        Self {
            config,
            capturer,
            monitor,
            image: None,
            image_path: None,
            preview: None,
            question: DEFAULT_QUESTION.to_string(),
            response: String::new(),
            status: READY_STATUS.to_string(),
            modal_error: None,
            selector: None,
            pending_area: None,
            rx,
            tx,
            busy: false,
            markdown_cache: CommonMarkCache::default(),
        }
    }

    fn show_error(&mut self, message: impl Into<String>) {
        self.modal_error = Some(message.into());
    }

    /// Replaces the current image and rebuilds the preview texture.
    fn set_image(&mut self, ctx: &egui::Context, image: DynamicImage, path: Option<PathBuf>) {
        let (w, h) = image_processing::fit_preview(
            image.width(),
            image.height(),
            PREVIEW_MAX.0,
            PREVIEW_MAX.1,
        );
        let thumb = image.thumbnail_exact(w, h).to_rgba8();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [w as usize, h as usize],
            thumb.as_flat_samples().as_slice(),
        );
        self.preview = Some(ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR));

        self.image = Some(Arc::new(image));
        self.image_path = path;
    }

    fn capture_full_screen(&mut self, ctx: &egui::Context) {
        self.status = "Capturing full screen...".to_string();
        match self.capturer.capture_monitor(self.monitor) {
            Ok(image) => match image_processing::save_capture(&image, CaptureMode::FullScreen) {
                Ok(path) => {
                    self.status = format!("Screenshot saved: {}", path.display());
                    self.set_image(ctx, image, Some(path));
                }
                Err(e) => {
                    self.set_image(ctx, image, None);
                    self.show_error(format!("Failed to save screenshot: {}", e));
                    self.status = "Screenshot capture failed".to_string();
                }
            },
            Err(e) => {
                self.show_error(format!("Failed to capture screenshot: {}", e));
                self.status = "Screenshot capture failed".to_string();
            }
        }
    }

    /// Hides the shell and schedules the snapshot grab for after the window
    /// has settled off-screen.
    fn begin_area_capture(&mut self, ctx: &egui::Context) {
        self.pending_area = Some(Instant::now());
        self.status = "Select an area...".to_string();
        ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
    }

    fn restore_window(&self, ctx: &egui::Context) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(false));
        ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
    }

    /// Grabs the snapshot and opens the overlay once the settle delay has
    /// passed. Snapshot failure aborts before any overlay exists.
    fn poll_pending_area(&mut self, ctx: &egui::Context) {
        let Some(since) = self.pending_area else { return };

        if since.elapsed() < AREA_CAPTURE_SETTLE {
            ctx.request_repaint_after(Duration::from_millis(50));
            return;
        }
        self.pending_area = None;

        match self.capturer.capture_monitor(self.monitor) {
            Ok(snapshot) => {
                self.selector = Some(AreaSelector::new(Arc::new(snapshot)));
            }
            Err(e) => {
                self.restore_window(ctx);
                self.show_error(format!("Area capture failed: {}", e));
                self.status = "Area selection failed".to_string();
            }
        }
    }

    /// Drives the overlay while it is open; applies its outcome when closed.
    fn poll_selector(&mut self, ctx: &egui::Context) {
        let Some(selector) = self.selector.as_mut() else {
            return;
        };

        selector.show(ctx);
        if !selector.is_closed() {
            return;
        }

        let Some(mut finished) = self.selector.take() else {
            return;
        };
        self.restore_window(ctx);

        match finished.take_crop() {
            Some(cropped) => self.on_area_selected(ctx, cropped),
            None => self.status = "Selection cancelled".to_string(),
        }
    }

    fn on_area_selected(&mut self, ctx: &egui::Context, cropped: DynamicImage) {
        match image_processing::save_capture(&cropped, CaptureMode::Area) {
            Ok(path) => {
                self.status = format!("Area screenshot saved: {}", path.display());
                self.set_image(ctx, cropped, Some(path));
            }
            Err(e) => {
                self.set_image(ctx, cropped, None);
                self.show_error(format!("Failed to process area selection: {}", e));
                self.status = "Area selection failed".to_string();
            }
        }
    }

    fn load_image(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select Image")
            .add_filter("Image files", &["png", "jpg", "jpeg", "bmp", "gif"])
            .pick_file()
        else {
            return;
        };

        match image::open(&path) {
            Ok(image) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.status = format!("Image loaded: {}", name);
                self.set_image(ctx, image, Some(path));
            }
            Err(e) => self.show_error(format!("Failed to load image: {}", e)),
        }
    }

    fn save_keys(&mut self) {
        self.config.openai_key = self.config.openai_key.trim().to_string();
        self.config.gemini_key = self.config.gemini_key.trim().to_string();
        self.config.claude_key = self.config.claude_key.trim().to_string();

        match self.config.save() {
            Ok(()) => self.status = "All API keys saved".to_string(),
            Err(e) => self.show_error(format!("Failed to save configuration: {}", e)),
        }
    }

    /// Validates and dispatches the current question to the selected
    /// provider on a worker thread.
    fn ask(&mut self) {
        if let Err(e) = validate_ask(&self.config, self.image.is_some(), &self.question) {
            self.show_error(e.to_string());
            return;
        }

        // Reference captured at dispatch time; later captures replace the
        // shell's Arc without affecting this one.
        let Some(image) = self.image.clone() else {
            return;
        };
        let provider = self.config.selected;
        let credential = self.config.credential(provider).to_string();
        let question = self.question.trim().to_string();
        let tx = self.tx.clone();

        self.busy = true;
        self.status = format!("Sending to {}...", provider.label());

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();

            let rt = match runtime {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = tx.send(RequestEvent::Failed(format!(
                        "Failed to create async runtime: {}",
                        e
                    )));
                    return;
                }
            };

            rt.block_on(async {
                let image_b64 = match image_processing::encode_png_base64(&image) {
                    Ok(b64) => b64,
                    Err(e) => {
                        let _ = tx.send(RequestEvent::Failed(format!(
                            "Failed to encode image: {}",
                            e
                        )));
                        return;
                    }
                };

                let client = match provider::client_for(provider, &credential) {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(RequestEvent::Failed(format!(
                            "Client initialization failed: {}",
                            e
                        )));
                        return;
                    }
                };

                match client.ask(&image_b64, &question).await {
                    Ok(answer) => {
                        let _ = tx.send(RequestEvent::Completed { provider, answer });
                    }
                    Err(e) => {
                        let _ = tx.send(RequestEvent::Failed(format!("Request failed: {}", e)));
                    }
                }
            });
        });
    }

    /// Applies worker results on the UI thread. Last event wins.
    fn process_request_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                RequestEvent::Completed { provider, answer } => {
                    self.response = answer;
                    self.status = format!("Response received from {}", provider.label());
                    self.busy = false;
                    ctx.request_repaint();
                }
                RequestEvent::Failed(message) => {
                    log::warn!("request failed: {}", message);
                    self.show_error(message);
                    self.status = "Request failed".to_string();
                    self.busy = false;
                    ctx.request_repaint();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Rendering

    fn render_provider_card(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("AI service").strong());
            for provider in Provider::ALL {
                let changed = ui
                    .radio_value(&mut self.config.selected, provider, provider.label())
                    .changed();
                if changed && let Err(e) = self.config.save() {
                    log::warn!("failed to persist provider selection: {}", e);
                }
            }
        });
    }

    fn render_keys_card(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("API keys").strong());
            egui::Grid::new("api_keys").num_columns(2).show(ui, |ui| {
                for provider in Provider::ALL {
                    ui.label(format!("{}:", provider.label()));
                    ui.add(
                        egui::TextEdit::singleline(self.config.credential_mut(provider))
                            .password(true)
                            .desired_width(280.0),
                    );
                    ui.end_row();
                }
            });
            if ui.button("Save keys").clicked() {
                self.save_keys();
            }
        });
    }

    fn render_capture_card(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("Screenshot").strong());
            ui.horizontal(|ui| {
                if ui.button("Full screen").clicked() {
                    self.capture_full_screen(ctx);
                }
                if ui.button("Select area").clicked() {
                    self.begin_area_capture(ctx);
                }
                if ui.button("Load image…").clicked() {
                    self.load_image(ctx);
                }
            });

            match &self.preview {
                Some(texture) => {
                    ui.image((texture.id(), texture.size_vec2()));
                    if let Some(path) = &self.image_path {
                        ui.small(path.display().to_string());
                    }
                }
                None => {
                    ui.add_space(10.0);
                    ui.label("No screenshot captured\nClick a button above to capture");
                    ui.add_space(10.0);
                }
            }
        });
    }

    fn render_question_card(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("Ask AI").strong());
            ui.add(
                egui::TextEdit::multiline(&mut self.question)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui| {
                if ui.button("Ask").clicked() {
                    self.ask();
                }
                if self.busy {
                    ui.spinner();
                    ui.label("Waiting for response...");
                }
            });
        });
    }

    fn render_response_card(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("AI response").strong());
            egui::ScrollArea::vertical()
                .id_salt("response_scroll")
                .max_height(240.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    if self.response.is_empty() {
                        ui.weak("The answer will appear here.");
                    } else {
                        CommonMarkViewer::new().show(ui, &mut self.markdown_cache, &self.response);
                    }
                });
            if !self.response.is_empty() && ui.button("Copy").clicked() {
                match arboard::Clipboard::new() {
                    Ok(mut clipboard) => {
                        if let Err(e) = clipboard.set_text(self.response.clone()) {
                            log::warn!("failed to copy to clipboard: {}", e);
                        }
                    }
                    Err(e) => log::warn!("could not access clipboard: {}", e),
                }
            }
        });
    }

    fn render_error_modal(&mut self, ctx: &egui::Context) {
        let Some(message) = self.modal_error.clone() else {
            return;
        };

        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.modal_error = None;
                }
            });
    }
}

impl eframe::App for ShellApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.process_request_events(ctx);
        self.poll_pending_area(ctx);
        self.poll_selector(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Askshot");
                        ui.weak("Multi-AI screenshot assistant");
                    });
                    ui.add_space(8.0);

                    self.render_provider_card(ui);
                    self.render_keys_card(ui);
                    self.render_capture_card(ui, ctx);
                    self.render_question_card(ui);
                    self.render_response_card(ui);

                    ui.separator();
                    ui.label(&self.status);
                });
        });

        self.render_error_modal(ctx);
    }
}

/// Launches the main window and blocks until it is closed.
pub fn run(config: AppConfig, capturer: ScreenCapturer, monitor: usize) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_always_on_top(),
        ..Default::default()
    };

    eframe::run_native(
        "Askshot",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(ShellApp::new(config, capturer, monitor)) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))
}
