//! Common types and utilities for the wpfa analyzer.
//!
//! This crate provides foundational types used across all wpfa crates:
//! - Source spans and locations (`Span`, `FileId`, `Location`)
//! - Diagnostic message catalogue and formatting
//! - Cooperative cancellation (`CancellationToken`, `Cancelled`)
//! - Analyzer limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{FileId, Location, Span};

// Diagnostic catalogue, formatting and the emitted Diagnostic type
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage, format_message};

// Cooperative cancellation
pub mod cancellation;
pub use cancellation::{CancellationToken, Cancelled};

// Centralized limits and thresholds
pub mod limits;
