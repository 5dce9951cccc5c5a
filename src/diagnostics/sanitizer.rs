// SPDX-License-Identifier: MPL-2.0
//! Scrubbing of free text before it enters the diagnostics buffer.

use std::sync::LazyLock;

use regex::Regex;

/// Characters that end a path or URL embedded in a message.
const STOP: &str = r#"[^\s"'()\[\]]+"#;

/// Replacement rules, applied in order. URLs go first so their path part is
/// not reported as a file path.
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    let path_roots = [r"/home/", r"/Users/", r"/tmp/", r"/var/", r"~/", r"[A-Za-z]:\\", r"\\\\"];
    let paths = path_roots
        .iter()
        .map(|root| format!("{root}{STOP}"))
        .collect::<Vec<_>>()
        .join("|");

    [
        (format!("https?://{STOP}"), "<url>"),
        (paths, "<path>"),
        // Wallet addresses and transaction ids are 43 base64url characters.
        (r"\b[A-Za-z0-9_-]{43}\b".to_string(), "<address>"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| match Regex::new(&pattern) {
        Ok(regex) => Some((regex, replacement)),
        Err(err) => {
            eprintln!("[diagnostics] invalid sanitizer pattern: {err}");
            None
        }
    })
    .collect()
});

/// Replaces user paths, URLs and wallet addresses with placeholders.
///
/// ```
/// use snappy::diagnostics::sanitize_message;
///
/// assert_eq!(
///     sanitize_message("Failed to open /home/user/.config/snappy/settings.toml"),
///     "Failed to open <path>"
/// );
/// assert_eq!(
///     sanitize_message("POST https://bridge.example/upload?key=abc failed"),
///     "POST <url> failed"
/// );
/// ```
#[must_use]
pub fn sanitize_message(message: &str) -> String {
    RULES
        .iter()
        .fold(message.to_owned(), |text, (regex, replacement)| {
            regex.replace_all(&text, *replacement).into_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::sanitize_message;

    #[test]
    fn all_rules_compile() {
        assert_eq!(super::RULES.len(), 3);
    }

    #[test]
    fn user_paths_are_hidden() {
        assert_eq!(
            sanitize_message("Failed to open /home/user/photos/image.jpg"),
            "Failed to open <path>"
        );
        assert_eq!(
            sanitize_message("Cannot read C:\\Users\\name\\settings.toml"),
            "Cannot read <path>"
        );
        assert_eq!(
            sanitize_message("File \"/tmp/snappy/report.json\" not found"),
            "File \"<path>\" not found"
        );
    }

    #[test]
    fn device_nodes_are_kept() {
        let msg = "/dev/video0: Device or resource busy";
        assert_eq!(sanitize_message(msg), msg);
    }

    #[test]
    fn urls_are_hidden_whole() {
        assert_eq!(
            sanitize_message("error sending request for url (https://bridge.local:8080/upload?token=x)"),
            "error sending request for url (<url>)"
        );
    }

    #[test]
    fn wallet_addresses_are_hidden() {
        assert_eq!(
            sanitize_message("no uploads for owner vLRHFqCw1uHu75xqB4fCDW-QxpkpJxBtFD9g4QYUbfw"),
            "no uploads for owner <address>"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize_message("Invalid argument"), "Invalid argument");
        assert_eq!(sanitize_message(""), "");
    }
}
