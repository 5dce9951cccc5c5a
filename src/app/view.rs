// SPDX-License-Identifier: MPL-2.0
//! Text rendering of the session, the gallery and the help screen.

use crate::application::query::{GalleryBrowser, GalleryItem, GalleryStatus, INDEXING_DELAY_NOTE_KEY};
use crate::application::session::SessionSnapshot;
use crate::domain::session::{Facing, SessionPhase};
use crate::i18n::I18n;
use std::fmt::Write;

/// Commands listed by `help`, in display order.
const HELP_COMMANDS: &[&str] = &[
    "on",
    "off",
    "switch",
    "capture",
    "cancel",
    "upload",
    "gallery",
    "open",
    "back",
    "dismiss",
    "status",
    "export-diagnostics",
    "quit",
];

/// Localization key of a phase name.
#[must_use]
pub fn phase_key(phase: SessionPhase) -> String {
    format!("status-phase-{}", phase.as_str())
}

/// Localized camera name.
#[must_use]
pub fn facing_label(facing: Facing, i18n: &I18n) -> String {
    i18n.tr(&format!("facing-{}", facing.as_str()))
}

/// Prompt showing the current phase.
#[must_use]
pub fn prompt(snapshot: &SessionSnapshot) -> String {
    format!("snappy [{}]> ", snapshot.phase())
}

/// Multi-line session summary printed by `status`.
#[must_use]
pub fn status(snapshot: &SessionSnapshot, i18n: &I18n) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", i18n.tr(&phase_key(snapshot.phase())));
    let _ = writeln!(
        out,
        "  {}",
        i18n.tr_with_args(
            "status-facing",
            &[("facing", facing_label(snapshot.facing, i18n).into())]
        )
    );

    if snapshot.acquiring {
        let _ = writeln!(out, "  {}", i18n.tr("status-acquiring"));
    }

    if let Some(image) = &snapshot.captured {
        let _ = writeln!(
            out,
            "  {}",
            i18n.tr_with_args(
                "status-captured",
                &[
                    ("width", image.width().into()),
                    ("height", image.height().into()),
                    ("size", image.len().into()),
                    ("digest", image.short_digest().into()),
                ]
            )
        );
    }

    if let Some(receipt) = &snapshot.last_receipt {
        let _ = writeln!(
            out,
            "  {}",
            i18n.tr_with_args("status-last-upload", &[("id", receipt.id().into())])
        );
    }

    if let Some(error) = &snapshot.error {
        let _ = writeln!(
            out,
            "  {}",
            i18n.tr_with_args("status-error", &[("message", i18n.tr(error.message_key()).into())])
        );
    }

    out
}

/// Gallery list (or the loading / failure state).
#[must_use]
pub fn gallery(browser: &GalleryBrowser, i18n: &I18n) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", i18n.tr("gallery-title"));
    let _ = writeln!(out, "{}", i18n.tr(INDEXING_DELAY_NOTE_KEY));

    match browser.status() {
        GalleryStatus::NotLoaded => {}
        GalleryStatus::Loading => {
            let _ = writeln!(out, "{}", i18n.tr("gallery-loading"));
        }
        GalleryStatus::Failed(err) => {
            let _ = writeln!(out, "{}", i18n.tr(err.i18n_key()));
        }
        GalleryStatus::Loaded(items) if items.is_empty() => {
            let _ = writeln!(out, "{}", i18n.tr("gallery-empty"));
        }
        GalleryStatus::Loaded(items) => {
            for (index, item) in items.iter().enumerate() {
                let _ = writeln!(out, "  {:>3}. {}", index + 1, item.id);
            }
            let _ = writeln!(out, "{}", i18n.tr("gallery-open-hint"));
        }
    }

    out
}

/// Expanded view of one uploaded image.
#[must_use]
pub fn expanded(item: &GalleryItem, i18n: &I18n) -> String {
    format!(
        "{}\n  {}\n{}\n",
        i18n.tr_with_args("gallery-expanded", &[("id", item.id.as_str().into())]),
        item.url,
        i18n.tr("gallery-back-hint")
    )
}

/// Command reference.
#[must_use]
pub fn help(i18n: &I18n) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", i18n.tr("help-title"));
    for command in HELP_COMMANDS {
        let _ = writeln!(out, "  {:<20} {}", command, i18n.tr(&format!("help-{command}")));
    }
    out
}
