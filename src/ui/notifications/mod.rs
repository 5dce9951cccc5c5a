// SPDX-License-Identifier: MPL-2.0
//! Notification system for user feedback.
//!
//! Notifications inform users about outcomes (capture, upload, errors)
//! without blocking the command prompt.
//!
//! # Components
//!
//! - [`Notification`] - Localized message with a [`Severity`] and lifetime
//! - [`Manager`] - Pending queue, printed list, expiry and dismissal
//! - [`render`] - Single-line terminal rendering
//!
//! # Usage
//!
//! ```ignore
//! use snappy::ui::notifications::{Manager, Notification};
//!
//! let mut manager = Manager::new();
//! manager.push(Notification::success("notification-upload-success").with_arg("id", "tx1"));
//!
//! for notification in manager.announce() {
//!     println!("{}", render(&notification, &i18n));
//! }
//! ```
//!
//! Success and info notifications stay listed for 3s, warnings for 5s,
//! errors until dismissed.

mod manager;
mod notification;
mod render;

pub use manager::Manager;
pub use notification::{Notification, NotificationId, Severity};
pub use render::render;
