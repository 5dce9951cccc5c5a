// SPDX-License-Identifier: MPL-2.0
//! Terminal front end: wires the session controller, the gallery and the
//! notification queue to a line-based command prompt.
//!
//! Session commands are spawned so that a slow camera or upload never blocks
//! the prompt; their results come back as [`Message::Completed`] and the
//! session's own broadcast drives the notifications.

mod message;
mod subscription;
mod update;
pub mod view;

pub use message::{Command, Flags, Message, ParseCommandError};

use crate::application::port::{FrameCapturer, GalleryQuery, MediaSource, UploadClient};
use crate::application::query::GalleryBrowser;
use crate::application::session::{SessionController, SessionOptions};
use crate::config::{self, Config};
use crate::diagnostics::{DiagnosticsCollector, WarningType};
use crate::i18n::I18n;
use crate::infrastructure::{
    FfmpegCameraSource, GraphqlGalleryClient, HttpUploadClient, JpegFrameCapturer,
};
use crate::test_utils::{FakeGallery, FakeMediaSource, FakeUploadClient};
use crate::ui::notifications::{self, Notification};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// How often notification expiry and diagnostics draining run.
const TICK_PERIOD: Duration = Duration::from_millis(500);

/// Owner used by `--simulate` when none is configured.
const SIMULATED_OWNER: &str = "simulated";

/// Root state of the command loop.
pub struct App<M, C, U, G> {
    session: SessionController<M, C, U>,
    gallery_client: G,
    browser: GalleryBrowser,
    notifications: notifications::Manager,
    i18n: I18n,
    diagnostics: DiagnosticsCollector,
    owner: Option<String>,
    start_enabled: bool,
    tx: mpsc::UnboundedSender<Message>,
    rx: Option<mpsc::UnboundedReceiver<Message>>,
}

impl<M, C, U, G> App<M, C, U, G>
where
    M: MediaSource,
    C: FrameCapturer,
    U: UploadClient,
    G: GalleryQuery,
{
    /// Builds the front end around an already configured session.
    ///
    /// `diagnostics` must be the collector whose handle the session logs to.
    pub fn new(
        session: SessionController<M, C, U>,
        gallery_client: G,
        config: &Config,
        i18n: I18n,
        diagnostics: DiagnosticsCollector,
        owner: Option<String>,
    ) -> Self {
        let handle = diagnostics.handle();
        let mut notifications = notifications::Manager::new();
        notifications.set_diagnostics(handle.clone());
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            session,
            gallery_client,
            browser: GalleryBrowser::new(config.gallery.gateway_url.clone())
                .with_diagnostics(handle),
            notifications,
            i18n,
            diagnostics,
            owner: owner.filter(|owner| !owner.trim().is_empty()),
            start_enabled: config.camera.start_enabled,
            tx,
            rx: Some(rx),
        }
    }

    /// Queues a notification shown before the first prompt.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Runs the prompt until `quit` or end of input, then shuts the session down.
    pub async fn run(mut self) -> crate::error::Result<()> {
        let Some(mut rx) = self.rx.take() else {
            return Ok(());
        };

        let input = subscription::input_lines(self.tx.clone());
        let events = subscription::session_events(self.session.subscribe(), self.tx.clone());
        let ticks = subscription::ticks(self.tx.clone(), TICK_PERIOD);

        println!("{}", self.i18n.tr("help-intro"));
        if self.start_enabled {
            self.spawn_session(Command::EnableCamera);
        }
        self.print_notifications();
        self.print_prompt();

        while let Some(message) = rx.recv().await {
            let prompt_after = matches!(message, Message::Input(_));
            let keep_running = self.update(message).await;
            let announced = self.print_notifications();
            if !keep_running {
                break;
            }
            if prompt_after || announced {
                self.print_prompt();
            }
        }

        input.abort();
        ticks.abort();
        self.session.shutdown().await;
        events.abort();
        self.diagnostics.process_pending();
        Ok(())
    }

    fn print_prompt(&self) {
        print!("{}", view::prompt(&self.session.snapshot()));
        let _ = std::io::stdout().flush();
    }

    /// Prints notifications not shown yet. Returns whether any were printed.
    fn print_notifications(&mut self) -> bool {
        let fresh = self.notifications.announce();
        if fresh.is_empty() {
            return false;
        }
        println!();
        for notification in &fresh {
            println!("{}", notifications::render(notification, &self.i18n));
        }
        true
    }
}

/// Loads settings, picks the collaborators and runs the prompt.
pub async fn run(flags: Flags) -> crate::error::Result<()> {
    let (config, config_warning) = config::load();
    let i18n = I18n::new(flags.lang.clone(), &config);
    let diagnostics = DiagnosticsCollector::new(config.buffer_capacity());

    let options = SessionOptions {
        constraints: config.capture_constraints(),
        diagnostics: Some(diagnostics.handle()),
    };
    let owner = flags.owner.clone().or_else(|| config.gallery.owner.clone());
    let warning = config_warning.map(|key| {
        Notification::warning(key).with_warning_type(WarningType::ConfigurationIssue)
    });
    let capturer = JpegFrameCapturer::new(config.jpeg_quality());

    if flags.simulate {
        let session = SessionController::with_options(
            FakeMediaSource::new(),
            capturer,
            FakeUploadClient::new(),
            options,
        );
        let owner = owner.or_else(|| Some(SIMULATED_OWNER.to_string()));
        let app = App::new(
            session,
            FakeGallery::default(),
            &config,
            i18n,
            diagnostics,
            owner,
        );
        return start(app, warning).await;
    }

    let session = SessionController::with_options(
        FfmpegCameraSource::new(config.camera_devices()),
        capturer,
        HttpUploadClient::new(config.upload_settings())?,
        options,
    );
    let gallery = GraphqlGalleryClient::new(config.gallery_settings())?;
    let app = App::new(session, gallery, &config, i18n, diagnostics, owner);
    start(app, warning).await
}

async fn start<M, C, U, G>(
    mut app: App<M, C, U, G>,
    warning: Option<Notification>,
) -> crate::error::Result<()>
where
    M: MediaSource,
    C: FrameCapturer,
    U: UploadClient,
    G: GalleryQuery,
{
    if let Some(warning) = warning {
        app.notify(warning);
    }
    app.run().await
}
