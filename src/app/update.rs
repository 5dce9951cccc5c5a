// SPDX-License-Identifier: MPL-2.0
//! Message handling for the command loop.

use super::message::{Command, Message, ParseCommandError};
use super::{view, App};
use crate::application::port::{FrameCapturer, GalleryQuery, MediaSource, UploadClient};
use crate::application::session::SessionEvent;
use crate::diagnostics::{ErrorType, UserAction, WarningType};
use crate::domain::session::{ErrorKind, View};
use crate::i18n::I18n;
use crate::ui::notifications::{self, Notification};
use std::time::Duration;

/// How long the beta notice stays visible.
const BETA_NOTICE_DURATION: Duration = Duration::from_secs(10);

/// Maps a session event to the notification announcing it, if any.
pub(super) fn notification_for_event(event: &SessionEvent, i18n: &I18n) -> Option<Notification> {
    let notification = match event {
        SessionEvent::CameraEnabled => {
            Notification::info("notification-beta-notice").auto_dismiss(BETA_NOTICE_DURATION)
        }
        SessionEvent::CameraDisabled => Notification::info("notification-camera-off"),
        SessionEvent::StreamAcquired { facing, .. } => Notification::info("notification-camera-live")
            .with_arg("facing", view::facing_label(*facing, i18n)),
        SessionEvent::AcquisitionFailed(info)
        | SessionEvent::CaptureFailed(info)
        | SessionEvent::UploadFailed(info) => {
            let error_type = match info.kind() {
                ErrorKind::Acquisition => ErrorType::AcquisitionError,
                ErrorKind::Capture => ErrorType::CaptureError,
                ErrorKind::Upload => ErrorType::UploadError,
            };
            Notification::error(info.message_key()).with_error_type(error_type)
        }
        SessionEvent::Captured { width, height, .. } => Notification::info("notification-captured")
            .with_arg("width", width.to_string())
            .with_arg("height", height.to_string()),
        SessionEvent::ReviewCancelled => Notification::info("notification-review-cancelled"),
        SessionEvent::UploadStarted => Notification::info("notification-upload-started"),
        SessionEvent::UploadSucceeded(receipt) => {
            Notification::success("notification-upload-success").with_arg("id", receipt.id())
        }
        SessionEvent::FacingChanged(facing) => Notification::info("notification-facing-changed")
            .with_arg("facing", view::facing_label(*facing, i18n)),
        SessionEvent::StreamReleased { .. }
        | SessionEvent::GalleryOpened
        | SessionEvent::GalleryClosed
        | SessionEvent::ErrorDismissed
        | SessionEvent::ShutDown => return None,
    };
    Some(notification)
}

impl<M, C, U, G> App<M, C, U, G>
where
    M: MediaSource,
    C: FrameCapturer,
    U: UploadClient,
    G: GalleryQuery,
{
    /// Handles one message. Returns `false` when the loop should stop.
    pub(super) async fn update(&mut self, message: Message) -> bool {
        match message {
            Message::Input(Ok(command)) => self.execute(command).await,
            Message::Input(Err(ParseCommandError::Empty)) => true,
            Message::Input(Err(err)) => {
                let detail = match &err {
                    ParseCommandError::Unknown(word) => word.clone(),
                    ParseCommandError::MissingArgument(command) => (*command).to_string(),
                    ParseCommandError::Empty => String::new(),
                };
                println!(
                    "{}",
                    self.i18n
                        .tr_with_args(err.i18n_key(), &[("command", detail.into())])
                );
                true
            }
            Message::InputClosed => false,
            Message::Session(event) => {
                if let Some(notification) = notification_for_event(&event, &self.i18n) {
                    self.notifications.push(notification);
                }
                true
            }
            Message::Completed { command, accepted } => {
                if !accepted {
                    self.ignored(&command);
                }
                true
            }
            Message::Tick => {
                self.notifications.tick();
                self.diagnostics.process_pending();
                true
            }
        }
    }

    async fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::EnableCamera
            | Command::DisableCamera
            | Command::SwitchFacing
            | Command::Capture
            | Command::CancelReview
            | Command::Upload => self.spawn_session(command),
            Command::OpenGallery => self.open_gallery().await,
            Command::Back => self.back(),
            Command::OpenItem(id) => self.open_item(id),
            Command::DismissError => {
                let session = self.session.dismiss_error();
                let shown = self.notifications.dismiss_errors();
                if !session && shown == 0 {
                    self.ignored(&Command::DismissError);
                }
            }
            Command::Status => {
                print!("{}", view::status(&self.session.snapshot(), &self.i18n));
                for notification in self.notifications.shown() {
                    println!("  {}", notifications::render(notification, &self.i18n));
                }
            }
            Command::ExportDiagnostics => self.export_diagnostics(),
            Command::Help => print!("{}", view::help(&self.i18n)),
            Command::Quit => return false,
        }
        true
    }

    /// Runs a session command in the background and reports its result.
    pub(super) fn spawn_session(&self, command: Command) {
        let session = self.session.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let accepted = match &command {
                Command::EnableCamera => session.enable_camera().await,
                Command::DisableCamera => session.disable_camera().await,
                Command::SwitchFacing => session.switch_facing().await,
                Command::Capture => session.capture().await,
                Command::CancelReview => session.cancel_review().await,
                Command::Upload => session.begin_upload().await,
                Command::Back => session.close_gallery().await,
                _ => false,
            };
            let _ = tx.send(Message::Completed { command, accepted });
        });
    }

    async fn open_gallery(&mut self) {
        self.session.open_gallery().await;
        if self.session.snapshot().view != View::Gallery {
            self.ignored(&Command::OpenGallery);
            return;
        }

        let Some(owner) = self.owner.clone() else {
            self.notifications.push(
                Notification::warning("notification-gallery-no-owner")
                    .with_warning_type(WarningType::ConfigurationIssue),
            );
            return;
        };

        println!("{}", self.i18n.tr("gallery-loading"));
        self.browser.load(&self.gallery_client, &owner).await;
        print!("{}", view::gallery(&self.browser, &self.i18n));
    }

    fn back(&mut self) {
        if self.browser.back() {
            print!("{}", view::gallery(&self.browser, &self.i18n));
        } else if self.session.snapshot().view == View::Gallery {
            self.browser.reset();
            self.spawn_session(Command::Back);
        } else {
            self.ignored(&Command::Back);
        }
    }

    fn open_item(&mut self, id: String) {
        if self.session.snapshot().view != View::Gallery {
            self.ignored(&Command::OpenItem(id));
            return;
        }
        if !self.browser.select(&id) {
            self.notifications
                .push(Notification::info("notification-gallery-unknown-item").with_arg("id", id));
            return;
        }
        if let Some(item) = self.browser.selected() {
            print!("{}", view::expanded(item, &self.i18n));
        }
    }

    fn export_diagnostics(&mut self) {
        self.diagnostics.handle().log_action(UserAction::ExportDiagnostics);
        self.diagnostics.process_pending();
        let notification = match self.diagnostics.export_to_default_location() {
            Ok(path) => Notification::success("notification-diagnostics-exported")
                .with_arg("path", path.display().to_string()),
            Err(err) => {
                eprintln!("[ERROR] Diagnostics export failed: {err}");
                Notification::error("error-export-diagnostics").with_error_type(ErrorType::IoError)
            }
        };
        self.notifications.push(notification);
    }

    fn ignored(&mut self, command: &Command) {
        self.notifications.push(
            Notification::info("notification-command-ignored")
                .with_arg("command", command.keyword()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::Receipt;
    use crate::application::session::SessionController;
    use crate::config::Config;
    use crate::diagnostics::DiagnosticsCollector;
    use crate::domain::diagnostics::BufferCapacity;
    use crate::domain::session::{ErrorInfo, Facing, SessionPhase};
    use crate::test_utils::{FakeCapturer, FakeGallery, FakeMediaSource, FakeUploadClient};
    use crate::ui::notifications::Severity;

    type TestApp = App<FakeMediaSource, FakeCapturer, FakeUploadClient, FakeGallery>;

    fn i18n() -> I18n {
        I18n::new(Some("en-US".to_string()), &Config::default())
    }

    fn app(gallery: FakeGallery, owner: Option<&str>) -> TestApp {
        let session = SessionController::new(
            FakeMediaSource::new(),
            FakeCapturer::new(),
            FakeUploadClient::new(),
        );
        App::new(
            session,
            gallery,
            &Config::default(),
            i18n(),
            DiagnosticsCollector::new(BufferCapacity::default()),
            owner.map(str::to_string),
        )
    }

    /// Feeds completion messages back until `command` has reported.
    async fn complete(app: &mut TestApp, rx: &mut tokio::sync::mpsc::UnboundedReceiver<Message>) {
        while let Some(message) = rx.recv().await {
            let done = matches!(message, Message::Completed { .. });
            app.update(message).await;
            if done {
                return;
            }
        }
    }

    fn announced_keys(app: &mut TestApp) -> Vec<String> {
        app.notifications
            .announce()
            .iter()
            .map(|n| n.message_key().to_string())
            .collect()
    }

    #[test]
    fn session_errors_become_error_notifications() {
        let info = ErrorInfo::new(ErrorKind::Upload, "Upload failed", "error-upload-network");
        let notification =
            notification_for_event(&SessionEvent::UploadFailed(info), &i18n()).expect("shown");

        assert_eq!(notification.severity(), Severity::Error);
        assert_eq!(notification.message_key(), "error-upload-network");
        assert_eq!(notification.error_type(), Some(ErrorType::UploadError));
    }

    #[test]
    fn upload_success_carries_transaction_id() {
        let notification = notification_for_event(
            &SessionEvent::UploadSucceeded(Receipt::new("tx7")),
            &i18n(),
        )
        .expect("shown");

        assert_eq!(notification.severity(), Severity::Success);
        assert_eq!(
            notification.message_args(),
            &[("id".to_string(), "tx7".to_string())]
        );
    }

    #[test]
    fn facing_change_is_localized() {
        let notification =
            notification_for_event(&SessionEvent::FacingChanged(Facing::Front), &i18n())
                .expect("shown");
        assert_eq!(
            notification.message_args(),
            &[("facing".to_string(), "front".to_string())]
        );
    }

    #[test]
    fn bookkeeping_events_are_silent() {
        assert!(notification_for_event(&SessionEvent::ShutDown, &i18n()).is_none());
        assert!(notification_for_event(&SessionEvent::GalleryOpened, &i18n()).is_none());
    }

    #[tokio::test]
    async fn capture_command_runs_in_background() {
        let mut app = app(FakeGallery::default(), None);
        let mut rx = app.rx.take().expect("receiver");

        assert!(app.update(Message::Input(Ok(Command::EnableCamera))).await);
        complete(&mut app, &mut rx).await;
        assert!(app.update(Message::Input(Ok(Command::Capture))).await);
        complete(&mut app, &mut rx).await;

        assert_eq!(app.session.snapshot().phase(), SessionPhase::Reviewing);
        assert!(announced_keys(&mut app).is_empty());
    }

    #[tokio::test]
    async fn refused_command_is_reported() {
        let mut app = app(FakeGallery::default(), None);
        let mut rx = app.rx.take().expect("receiver");

        app.update(Message::Input(Ok(Command::Upload))).await;
        complete(&mut app, &mut rx).await;

        assert_eq!(announced_keys(&mut app), ["notification-command-ignored"]);
    }

    #[tokio::test]
    async fn gallery_without_owner_warns() {
        let gallery = FakeGallery::with_ids(["tx1"]);
        let mut app = app(gallery.clone(), None);

        app.update(Message::Input(Ok(Command::OpenGallery))).await;

        assert_eq!(app.session.snapshot().view, View::Gallery);
        assert_eq!(announced_keys(&mut app), ["notification-gallery-no-owner"]);
        assert!(gallery.queried_owners().is_empty());
    }

    #[tokio::test]
    async fn gallery_open_and_back_navigation() {
        let gallery = FakeGallery::with_ids(["tx1", "tx2"]);
        let mut app = app(gallery.clone(), Some("wallet"));
        let mut rx = app.rx.take().expect("receiver");

        app.update(Message::Input(Ok(Command::OpenGallery))).await;
        assert_eq!(gallery.queried_owners(), ["wallet"]);
        assert_eq!(app.browser.items().len(), 2);

        app.update(Message::Input(Ok(Command::OpenItem("tx2".into())))).await;
        assert_eq!(app.browser.selected().map(|item| item.id.as_str()), Some("tx2"));

        app.update(Message::Input(Ok(Command::OpenItem("nope".into())))).await;
        assert_eq!(announced_keys(&mut app), ["notification-gallery-unknown-item"]);

        // First back leaves the expanded image, the second leaves the gallery.
        app.update(Message::Input(Ok(Command::Back))).await;
        assert!(app.browser.selected().is_none());
        assert_eq!(app.session.snapshot().view, View::Gallery);

        app.update(Message::Input(Ok(Command::Back))).await;
        complete(&mut app, &mut rx).await;
        assert_eq!(app.session.snapshot().view, View::Capture);
    }

    #[tokio::test]
    async fn open_outside_gallery_is_ignored() {
        let mut app = app(FakeGallery::with_ids(["tx1"]), Some("wallet"));

        app.update(Message::Input(Ok(Command::OpenItem("tx1".into())))).await;

        assert!(app.browser.selected().is_none());
        assert_eq!(announced_keys(&mut app), ["notification-command-ignored"]);
    }

    #[tokio::test]
    async fn dismiss_clears_error_toasts() {
        let mut app = app(FakeGallery::default(), None);
        app.notifications.push(Notification::info("notification-upload-started"));
        app.notifications.push(Notification::error("error-upload-network"));
        app.notifications.announce();

        app.update(Message::Input(Ok(Command::DismissError))).await;

        assert_eq!(app.notifications.shown_count(), 1);
        assert!(app.notifications.shown().all(|n| n.severity() != Severity::Error));
        assert!(announced_keys(&mut app).is_empty());

        app.update(Message::Input(Ok(Command::DismissError))).await;
        assert_eq!(announced_keys(&mut app), ["notification-command-ignored"]);
    }

    #[tokio::test]
    async fn quit_and_closed_input_stop_the_loop() {
        let mut app = app(FakeGallery::default(), None);
        assert!(!app.update(Message::Input(Ok(Command::Quit))).await);
        assert!(!app.update(Message::InputClosed).await);
        assert!(app.update(Message::Input(Err(ParseCommandError::Empty))).await);
    }

    #[tokio::test]
    async fn session_events_queue_notifications() {
        let mut app = app(FakeGallery::default(), None);

        app.update(Message::Session(SessionEvent::UploadStarted)).await;
        app.update(Message::Session(SessionEvent::UploadSucceeded(Receipt::new("tx1"))))
            .await;
        assert!(app.notifications.has_notifications());

        assert_eq!(
            announced_keys(&mut app),
            ["notification-upload-started", "notification-upload-success"]
        );
    }
}
