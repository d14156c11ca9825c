//! Error types for the OGC client libraries.

use thiserror::Error;

/// Result type alias using OgcError.
pub type OgcResult<T> = Result<T, OgcError>;

/// Primary error type for capabilities parsing, request building and fetching.
///
/// Absent optional elements (bounding boxes, dates, styles, abstracts, legends)
/// are never reported through this type; readers return `None` or an empty
/// collection for those.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OgcError {
    // === Document Errors ===
    #[error("Malformed capabilities document: {0}")]
    MalformedCapabilities(String),

    #[error("Unsupported {service} version: {version}")]
    UnsupportedVersion { service: String, version: String },

    #[error("Unable to determine a supported service: {0}")]
    UnsupportedService(String),

    #[error("Service returned an exception: {0}")]
    ServiceException(String),

    // === Lookup Errors ===
    #[error("layer \"{0}\" does not exist")]
    LayerNotFound(String),

    #[error("Operation not advertised in capabilities: {0}")]
    OperationNotFound(String),

    #[error("No extent available for layer: {0}")]
    MissingExtent(String),

    // === Request Errors ===
    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("Invalid URL \"{url}\": {message}")]
    InvalidUrl { url: String, message: String },

    // === Network Errors ===
    #[error("Request to \"{url}\" failed: {message}")]
    Network { url: String, message: String },

    #[error("Request to \"{url}\" returned status {status}")]
    HttpStatus { url: String, status: u16 },
}

impl OgcError {
    /// Get the closest OGC exception code for this error.
    pub fn ogc_exception_code(&self) -> &'static str {
        match self {
            OgcError::LayerNotFound(_) => "LayerNotDefined",
            OgcError::InvalidBbox(_) => "InvalidBBox",
            OgcError::UnsupportedVersion { .. } => "VersionNegotiationFailed",
            OgcError::OperationNotFound(_) => "OperationNotSupported",
            OgcError::MissingExtent(_) => "MissingParameterValue",
            _ => "NoApplicableCode",
        }
    }

    /// Whether the error came from the transport rather than from the document.
    pub fn is_network(&self) -> bool {
        matches!(self, OgcError::Network { .. } | OgcError::HttpStatus { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_codes() {
        assert_eq!(
            OgcError::LayerNotFound("a".into()).ogc_exception_code(),
            "LayerNotDefined"
        );
        assert_eq!(
            OgcError::InvalidBbox("x".into()).ogc_exception_code(),
            "InvalidBBox"
        );
        assert_eq!(
            OgcError::MalformedCapabilities("x".into()).ogc_exception_code(),
            "NoApplicableCode"
        );
    }

    #[test]
    fn test_layer_not_found_message() {
        let err = OgcError::LayerNotFound("geonode:rivers".into());
        assert_eq!(err.to_string(), "layer \"geonode:rivers\" does not exist");
    }

    #[test]
    fn test_is_network() {
        let err = OgcError::HttpStatus {
            url: "https://example.org/wms".into(),
            status: 500,
        };
        assert!(err.is_network());
        assert!(!OgcError::LayerNotFound("a".into()).is_network());
    }
}
