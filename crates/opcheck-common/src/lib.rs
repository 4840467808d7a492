//! Common types and utilities for the opcheck analyzer.
//!
//! This crate provides foundational types used across all opcheck crates:
//! - Source spans (`Span`)
//! - Diagnostic types, descriptors and message formatting
//! - Line/column mapping for rendering locations
//! - Analyzer limits and pre-allocation thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Diagnostics produced by rules and consumed by reporters
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticDescriptor, DiagnosticRelatedInformation, RuleCategory, Severity,
};

// Position types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Centralized limits and thresholds
pub mod limits;
