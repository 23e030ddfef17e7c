use thiserror::Error;

/// Errors raised while opening a matrix, reading tiles or normalising assembly order.
///
/// Every variant is terminal for the request that produced it.
#[derive(Error, Debug)]
pub enum HictError {
    /// The resolution is not one of those discovered when the matrix was opened
    #[error("Unknown resolution: {resolution}")]
    UnknownResolution { resolution: u64 },

    /// A stripe index is outside the stripe grid of that resolution
    #[error("Block ({row}, {col}) out of range at resolution {resolution}: {stripes} stripes per axis")]
    CoordinateOutOfRange {
        row: u64,
        col: u64,
        resolution: u64,
        stripes: u64,
    },

    /// The store lacks a dataset, or it cannot be opened
    #[error("Dataset {path} unavailable: {reason}")]
    DatasetUnavailable { path: String, reason: String },

    /// A read returned fewer elements than requested
    #[error("Short read from {path}: expected {expected} elements, got {actual}")]
    ShortRead {
        path: String,
        expected: usize,
        actual: usize,
    },

    /// Stored block data contradicts the layout
    #[error("Malformed block: {message}")]
    MalformedBlock { message: String },

    /// Dense slot index past the first dimension of the dense dataset
    #[error("Dense slot {slot} out of range: {slots} slots stored")]
    SlotOutOfRange { slot: u64, slots: u64 },

    /// The same resolution was listed twice
    #[error("Duplicate resolution: {resolution}")]
    DuplicateResolution { resolution: u64 },

    #[error("Invalid ATU: {message}")]
    InvalidAtu { message: String },

    #[error("Range {start}-{end} out of bounds: {total} bins in assembly")]
    RangeOutOfBounds { start: u64, end: u64, total: u64 },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HictError>;

impl HictError {
    pub fn unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DatasetUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedBlock {
            message: message.into(),
        }
    }

    pub fn invalid_atu(message: impl Into<String>) -> Self {
        Self::InvalidAtu {
            message: message.into(),
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = HictError::UnknownResolution { resolution: 5000 };
        assert_eq!(err.to_string(), "Unknown resolution: 5000");

        let err = HictError::ShortRead {
            path: "/resolutions/10/treap_coo/block_vals".to_string(),
            expected: 4,
            actual: 2,
        };
        assert!(err.to_string().contains("expected 4 elements, got 2"));

        let err = HictError::parse(3, "bad strand");
        assert_eq!(err.to_string(), "Parse error at line 3: bad strand");
    }
}
