//! Error types for placeholder detection, erasure and filling.
//!
//! Most failures in the pipeline are local: a line that cannot be
//! reconstructed is skipped, a hit that cannot be redacted is painted over,
//! a font that cannot be used falls through to the next candidate. The
//! variants below are what those local steps report before the pipeline
//! records and recovers from them.

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while processing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Pattern or geometry reconstruction failed for one line
    #[error("Detection failed on page {page}, line {line}: {reason}")]
    Detection {
        /// Page index
        page: usize,
        /// Line index within the page
        line: usize,
        /// Reason for the failure
        reason: String,
    },

    /// Rasterization or redaction failed for one hit
    #[error("Erase failed on page {page}: {reason}")]
    Erase {
        /// Page index
        page: usize,
        /// Reason for the failure
        reason: String,
    },

    /// No usable font was found
    #[error("Font resolution failed: {0}")]
    FontResolution(String),

    /// Auto-fit could not produce a size
    #[error("Fit error: {0}")]
    Fit(String),

    /// The document engine reported a failure
    #[error("Document engine error: {0}")]
    Engine(String),

    /// Font program could not be parsed or used
    #[error("Font error: {0}")]
    Font(String),

    /// Page index past the end of the document
    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// Requested page
        page: usize,
        /// Number of pages in the document
        count: usize,
    },

    /// Configuration value rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_error_message() {
        let err = Error::Detection {
            page: 2,
            line: 7,
            reason: "no geometry".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("page 2"));
        assert!(msg.contains("line 7"));
        assert!(msg.contains("no geometry"));
    }

    #[test]
    fn test_page_out_of_range_message() {
        let err = Error::PageOutOfRange { page: 5, count: 1 };
        assert_eq!(format!("{}", err), "Page 5 out of range (document has 1 pages)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.ttf");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(format!("{}", err).contains("missing.ttf"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
