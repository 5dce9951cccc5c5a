// SPDX-License-Identifier: MPL-2.0
//! A single user notification and its severity.

use crate::diagnostics::{ErrorType, WarningType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-unique notification id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

impl NotificationId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// How important a notification is. Decides its label and how long it stays
/// listed under `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    /// Stays until dismissed.
    Error,
}

impl Severity {
    /// Localization key of the `[label]` prefix.
    #[must_use]
    pub fn label_key(self) -> &'static str {
        match self {
            Severity::Success => "severity-success",
            Severity::Info => "severity-info",
            Severity::Warning => "severity-warning",
            Severity::Error => "severity-error",
        }
    }

    /// Default lifetime; `None` means until dismissed.
    #[must_use]
    pub fn lifetime(self) -> Option<Duration> {
        match self {
            Severity::Success | Severity::Info => Some(Duration::from_secs(3)),
            Severity::Warning => Some(Duration::from_secs(5)),
            Severity::Error => None,
        }
    }
}

/// A localized message waiting to be printed, or listed until it expires.
///
/// The text is resolved at render time from `message_key` and the string
/// arguments, so a notification can be rendered in any locale.
#[derive(Debug, Clone)]
pub struct Notification {
    id: NotificationId,
    severity: Severity,
    message_key: String,
    args: Vec<(String, String)>,
    raised_at: Instant,
    lifetime: Option<Duration>,
    warning_type: Option<WarningType>,
    error_type: Option<ErrorType>,
}

impl Notification {
    pub fn new(severity: Severity, message_key: impl Into<String>) -> Self {
        Self {
            id: NotificationId::next(),
            severity,
            message_key: message_key.into(),
            args: Vec::new(),
            raised_at: Instant::now(),
            lifetime: severity.lifetime(),
            warning_type: None,
            error_type: None,
        }
    }

    pub fn success(message_key: impl Into<String>) -> Self {
        Self::new(Severity::Success, message_key)
    }

    pub fn info(message_key: impl Into<String>) -> Self {
        Self::new(Severity::Info, message_key)
    }

    pub fn warning(message_key: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message_key)
    }

    pub fn error(message_key: impl Into<String>) -> Self {
        Self::new(Severity::Error, message_key)
    }

    /// Adds a Fluent argument.
    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    /// Overrides the severity's lifetime, errors included.
    #[must_use]
    pub fn auto_dismiss(mut self, after: Duration) -> Self {
        self.lifetime = Some(after);
        self
    }

    /// Category logged to diagnostics for a warning.
    #[must_use]
    pub fn with_warning_type(mut self, warning_type: WarningType) -> Self {
        self.warning_type = Some(warning_type);
        self
    }

    /// Category logged to diagnostics for an error.
    #[must_use]
    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    #[must_use]
    pub fn id(&self) -> NotificationId {
        self.id
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn message_key(&self) -> &str {
        &self.message_key
    }

    #[must_use]
    pub fn message_args(&self) -> &[(String, String)] {
        &self.args
    }

    #[must_use]
    pub fn warning_type(&self) -> Option<WarningType> {
        self.warning_type
    }

    #[must_use]
    pub fn error_type(&self) -> Option<ErrorType> {
        self.error_type
    }

    /// Whether the lifetime has run out at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.lifetime
            .is_some_and(|lifetime| now.saturating_duration_since(self.raised_at) >= lifetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(Notification::info("a").id(), Notification::info("a").id());
    }

    #[test]
    fn errors_never_expire_by_default() {
        let n = Notification::error("error-camera-busy");
        let much_later = Instant::now() + Duration::from_secs(3600);
        assert!(!n.is_expired(much_later));
    }

    #[test]
    fn lifetime_follows_severity_unless_overridden() {
        let info = Notification::info("notification-captured");
        let now = Instant::now();
        assert!(!info.is_expired(now));
        assert!(info.is_expired(now + Duration::from_secs(3)));

        let notice = Notification::info("notification-beta-notice").auto_dismiss(Duration::from_secs(10));
        assert!(!notice.is_expired(now + Duration::from_secs(5)));

        let error = Notification::error("x").auto_dismiss(Duration::ZERO);
        assert!(error.is_expired(Instant::now()));
    }

    #[test]
    fn args_keep_insertion_order() {
        let n = Notification::info("notification-captured")
            .with_arg("width", "640")
            .with_arg("height", "480");
        let names: Vec<&str> = n.message_args().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["width", "height"]);
    }

    #[test]
    fn diagnostic_categories_are_optional() {
        let n = Notification::warning("w").with_warning_type(WarningType::ConfigurationIssue);
        assert_eq!(n.warning_type(), Some(WarningType::ConfigurationIssue));
        assert_eq!(n.error_type(), None);
    }
}
