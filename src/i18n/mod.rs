// SPDX-License-Identifier: MPL-2.0
//! Fluent translations for prompts, status lines and notifications.
//!
//! `.ftl` files under `assets/i18n/` are embedded at build time. The locale
//! comes from `--lang`, then the settings file, then the system, and falls
//! back to [`DEFAULT_LOCALE`]. Missing keys render as the key itself.

pub mod fluent;

pub use fluent::{I18n, DEFAULT_LOCALE};
