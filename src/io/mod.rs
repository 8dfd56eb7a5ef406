//! Input/output operations and pipeline orchestration
//!
//! This module contains the outward-facing surfaces of the renderer:
//! - Command-line interface and job orchestration
//! - Source image and tile decoding
//! - Error types and progress reporting

/// Command-line interface and end-to-end job orchestration
pub mod cli;
/// Pipeline constants and configuration defaults
pub mod configuration;
/// Error types and result alias
pub mod error;
/// Image decoding helpers for the source image and candidate tiles
pub mod image;
/// Progress reporting for the scan, render, and assembly phases
pub mod progress;
