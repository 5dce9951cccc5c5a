// SPDX-License-Identifier: MPL-2.0
use std::fmt;

use crate::application::port::{AcquisitionError, GalleryError, UploadError};
use crate::diagnostics::ExportError;

/// Errors surfaced outside the session controller.
///
/// The controller itself never returns these; collaborator failures become
/// `ErrorInfo` there. This type covers start-up, configuration and the
/// terminal front end.
#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Camera(AcquisitionError),
    Upload(UploadError),
    Gallery(GalleryError),
    Export(String),
}

impl Error {
    /// Returns the i18n message key for this error.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            Error::Io(_) => "error-io",
            Error::Config(_) => "error-config",
            Error::Camera(e) => e.i18n_key(),
            Error::Upload(e) => e.i18n_key(),
            Error::Gallery(e) => e.i18n_key(),
            Error::Export(_) => "error-export-diagnostics",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Camera(e) => write!(f, "Camera Error: {}", e),
            Error::Upload(e) => write!(f, "Upload Error: {}", e),
            Error::Gallery(e) => write!(f, "Gallery Error: {}", e),
            Error::Export(e) => write!(f, "Export Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<AcquisitionError> for Error {
    fn from(err: AcquisitionError) -> Self {
        Error::Camera(err)
    }
}

impl From<UploadError> for Error {
    fn from(err: UploadError) -> Self {
        Error::Upload(err)
    }
}

impl From<GalleryError> for Error {
    fn from(err: GalleryError) -> Self {
        Error::Gallery(err)
    }
}

impl From<ExportError> for Error {
    fn from(err: ExportError) -> Self {
        Error::Export(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn toml_parse_error_becomes_config_error() {
        let parse: std::result::Result<toml::Table, _> = toml::from_str("not = [valid");
        let err: Error = parse.expect_err("invalid toml").into();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.i18n_key(), "error-config");
    }

    #[test]
    fn collaborator_errors_keep_their_keys() {
        let err: Error = AcquisitionError::PermissionDenied.into();
        assert_eq!(err.i18n_key(), "error-camera-permission-denied");

        let err: Error = UploadError::NotConfigured.into();
        assert_eq!(err.i18n_key(), "error-upload-not-configured");
        assert!(err.to_string().starts_with("Upload Error:"));
    }

    #[test]
    fn export_error_is_flattened_to_text() {
        let err: Error = ExportError::Io(std::io::Error::other("read-only")).into();
        match err {
            Error::Export(message) => assert!(message.contains("read-only")),
            _ => panic!("expected Export variant"),
        }
    }
}
