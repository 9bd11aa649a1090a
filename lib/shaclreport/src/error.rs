//! Error types for report rendering.

use std::io;

/// Error returned by the report walker.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Writing to the output sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A `sh:detail` chain loops back onto one of its ancestors.
    ///
    /// A well-formed validation report is a finite tree; a cycle means the
    /// report graph is malformed and rendering it would never terminate.
    #[error("malformed validation report: cyclic sh:detail chain through {node}")]
    CyclicDetails {
        /// The first result node seen twice on the recursion path.
        node: String,
    },
}
