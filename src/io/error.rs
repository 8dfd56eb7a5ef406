//! Error types for mosaic pipeline operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all mosaic pipeline operations
#[derive(Debug)]
pub enum MosaicError {
    /// Failed to load an image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a rendered image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// No tiles available for rendering
    ///
    /// The catalog scan admitted zero images, so there is nothing to
    /// choose from when filling mosaic cells.
    EmptyCatalog {
        /// Tile directory that was scanned
        path: PathBuf,
    },

    /// A persisted row strip does not match the expected mosaic geometry
    StripMismatch {
        /// Path to the offending strip file
        path: PathBuf,
        /// Expected (width, height) in pixels
        expected: (u32, u32),
        /// Actual (width, height) in pixels
        actual: (u32, u32),
    },

    /// Pipeline parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Numerical or internal computation produced an invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::EmptyCatalog { path } => {
                write!(
                    f,
                    "No tiles available: '{}' contains no admissible RGB images",
                    path.display()
                )
            }
            Self::StripMismatch {
                path,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Row strip '{}' is {}x{} but the mosaic expects {}x{}",
                    path.display(),
                    actual.0,
                    actual.1,
                    expected.0,
                    expected.1
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for mosaic pipeline results
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> MosaicError {
    MosaicError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_display_names_directory() {
        let err = MosaicError::EmptyCatalog {
            path: PathBuf::from("tiles"),
        };
        let text = err.to_string();
        assert!(text.contains("No tiles available"));
        assert!(text.contains("tiles"));
    }

    #[test]
    fn test_strip_mismatch_display_shows_both_geometries() {
        let err = MosaicError::StripMismatch {
            path: PathBuf::from("tmp/3.png"),
            expected: (64, 16),
            actual: (64, 8),
        };
        let text = err.to_string();
        assert!(text.contains("64x8"));
        assert!(text.contains("64x16"));
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let err = invalid_parameter("max_workers", &0, &"must be at least one");
        match err {
            MosaicError::InvalidParameter { parameter, .. } => {
                assert_eq!(parameter, "max_workers");
            }
            _ => unreachable!("Expected InvalidParameter error type"),
        }
    }
}
