// SPDX-License-Identifier: MPL-2.0
//! Notification queue for a line-based front end.
//!
//! New notifications wait in `pending` until the front end prints them with
//! [`Manager::announce`]. Printed ones stay in `shown`, listed by `status`,
//! until they expire or are dismissed.

use super::notification::{Notification, NotificationId, Severity};
use crate::diagnostics::{DiagnosticsHandle, ErrorEvent, ErrorType, WarningEvent, WarningType};
use std::collections::VecDeque;
use std::time::Instant;

/// Most notifications kept in `shown`; the oldest non-error goes first.
const MAX_SHOWN: usize = 5;

#[derive(Debug, Default)]
pub struct Manager {
    pending: VecDeque<Notification>,
    /// Oldest first.
    shown: Vec<Notification>,
    diagnostics: Option<DiagnosticsHandle>,
}

impl Manager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings and errors pushed from now on are also logged here.
    pub fn set_diagnostics(&mut self, handle: DiagnosticsHandle) {
        self.diagnostics = Some(handle);
    }

    /// Queues a notification for the next [`announce`](Self::announce).
    pub fn push(&mut self, notification: Notification) {
        self.log(&notification);
        self.pending.push_back(notification);
    }

    fn log(&self, notification: &Notification) {
        let Some(handle) = &self.diagnostics else {
            return;
        };
        let key = notification.message_key();
        match notification.severity() {
            Severity::Warning => handle.log_warning(
                WarningEvent::new(notification.warning_type().unwrap_or(WarningType::Other), key)
                    .with_source("notifications"),
            ),
            Severity::Error => handle.log_error(
                ErrorEvent::new(notification.error_type().unwrap_or(ErrorType::Other), key)
                    .with_code(key)
                    .with_source("notifications"),
            ),
            Severity::Success | Severity::Info => {}
        }
    }

    /// Takes every pending notification, oldest first, and keeps it listed.
    pub fn announce(&mut self) -> Vec<Notification> {
        let fresh: Vec<Notification> = self.pending.drain(..).collect();
        self.shown.extend(fresh.iter().cloned());
        while self.shown.len() > MAX_SHOWN {
            let victim = self
                .shown
                .iter()
                .position(|n| n.severity() != Severity::Error)
                .unwrap_or(0);
            self.shown.remove(victim);
        }
        fresh
    }

    /// Drops listed notifications whose lifetime ran out.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.shown.retain(|n| !n.is_expired(now));
    }

    /// Removes one notification, printed or not.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.total();
        self.pending.retain(|n| n.id() != id);
        self.shown.retain(|n| n.id() != id);
        self.total() != before
    }

    /// Removes every error. Returns how many were removed.
    pub fn dismiss_errors(&mut self) -> usize {
        let before = self.total();
        self.pending.retain(|n| n.severity() != Severity::Error);
        self.shown.retain(|n| n.severity() != Severity::Error);
        before - self.total()
    }

    /// Printed notifications still listed, oldest first.
    pub fn shown(&self) -> impl Iterator<Item = &Notification> {
        self.shown.iter()
    }

    #[must_use]
    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn has_notifications(&self) -> bool {
        self.total() > 0
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.shown.clear();
    }

    fn total(&self) -> usize {
        self.pending.len() + self.shown.len()
    }
}
