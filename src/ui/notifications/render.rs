// SPDX-License-Identifier: MPL-2.0
//! Plain-text rendering of notifications for the terminal.

use super::notification::Notification;
use crate::i18n::I18n;
use fluent_bundle::FluentValue;

/// Renders `notification` as a single line, `[label] message`.
#[must_use]
pub fn render(notification: &Notification, i18n: &I18n) -> String {
    let args: Vec<(&str, FluentValue<'_>)> = notification
        .message_args()
        .iter()
        .map(|(name, value)| (name.as_str(), FluentValue::from(value.as_str())))
        .collect();

    let message = if args.is_empty() {
        i18n.tr(notification.message_key())
    } else {
        i18n.tr_with_args(notification.message_key(), &args)
    };

    format!("[{}] {}", i18n.tr(notification.severity().label_key()), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn renders_label_and_interpolated_message() {
        let i18n = I18n::new(Some("en-US".to_string()), &Config::default());
        let notification = Notification::success("notification-upload-success").with_arg("id", "tx9");

        assert_eq!(render(&notification, &i18n), "[ok] Uploaded! Transaction tx9");
    }

    #[test]
    fn renders_error_without_args() {
        let i18n = I18n::new(Some("en-US".to_string()), &Config::default());
        let notification = Notification::error("error-camera-not-found");

        assert_eq!(render(&notification, &i18n), "[error] No camera was found.");
    }
}
