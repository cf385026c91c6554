//! Centralized limits and thresholds for the analyzer.
//!
//! The engine only matches local structure. These limits bound how far a rule may
//! follow symbol references before it gives up and treats the node as inapplicable.
//!
//! # Categories
//!
//! - **Indirection limits**: how many reference hops the resolver and tracer follow
//! - **Walk limits**: guards against malformed or cyclic host data

// =============================================================================
// Indirection Limits
// =============================================================================

/// Maximum number of cached-field hops when resolving a property name argument.
///
/// `nameof(Bar)` and `"Bar"` resolve directly. A read of a `static readonly`
/// field whose initializer is one of those forms resolves through one hop.
/// A field initialized from another cached field is `Unresolved`.
///
/// ```csharp
/// private static readonly PropertyChangedEventArgs BarArgs = new PropertyChangedEventArgs(nameof(Bar));
/// this.PropertyChanged?.Invoke(this, BarArgs); // resolves to "Bar"
/// ```
pub const MAX_NAME_INDIRECTION: u32 = 1;

/// Maximum number of helper-method hops from a setter to a raise site.
///
/// Calling a raiser (`OnPropertyChanged(...)`, including raisers that forward to
/// another raiser overload) is a raise site, not a hop. Entering an instance helper
/// such as `UpdateBar()` whose body calls the raiser is one hop. A raise that would
/// need a further hop is treated as unconfirmed and accepted.
pub const MAX_RAISER_HOPS: u32 = 1;

// =============================================================================
// Walk Limits
// =============================================================================

/// Maximum number of base types visited when walking an inheritance chain.
///
/// Host symbol tables are expected to be acyclic; this bounds the walk if one
/// is not.
pub const MAX_BASE_TYPE_DEPTH: usize = 64;

/// Maximum depth when descending expression and statement trees.
pub const MAX_TREE_WALK_DEPTH: u32 = 256;

/// Number of visited nodes between cancellation checks during a file walk.
pub const CANCELLATION_CHECK_INTERVAL: usize = 64;
