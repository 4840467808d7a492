//! Centralized limits and thresholds for the analyzer.

// =============================================================================
// Capacity Limits
// =============================================================================

/// Maximum number of operations pre-allocated for a single arena.
///
/// Units deserialized from untrusted input may claim huge node counts; the
/// arena never reserves more than this up front.
pub const MAX_OPERATION_PREALLOC: usize = 1_000_000;

/// Initial capacity of the explicit stack used by body traversal.
///
/// Traversal is iterative, so this only avoids early reallocations; it does
/// not bound tree depth.
pub const TRAVERSAL_STACK_CAPACITY: usize = 64;

/// Initial capacity for a body's diagnostic buffer.
pub const BODY_DIAGNOSTICS_CAPACITY: usize = 4;
