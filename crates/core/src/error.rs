/// Result alias that carries the custom [`TimeFreqError`] type.
pub type Result<T> = std::result::Result<T, TimeFreqError>;

/// Common error type for the core crate.
///
/// Every validation failure is surfaced synchronously at the boundary of the
/// operation that would introduce the bad state; no container is left
/// partially mutated after an error. Callers handle recovery at a higher
/// layer.
#[derive(Debug, thiserror::Error)]
pub enum TimeFreqError {
    /// An input buffer, appended row, or epoch array disagrees with the
    /// established shape or spacing.
    #[error("shape mismatch: {0}")]
    Shape(String),
    /// A slice or index selection the containers cannot honour, such as a
    /// negative start or a non-uniform index array.
    #[error("invalid index: {0}")]
    InvalidIndex(String),
    /// A key, epoch, rate, or spacing argument that is not a usable finite
    /// scalar where one is structurally required.
    #[error("invalid scalar: {0}")]
    InvalidScalar(String),
    /// A shape-dependent accessor was invoked on a container that has
    /// received no rows yet.
    #[error("container is empty: {0} requires at least one row")]
    EmptyContainer(&'static str),
}
