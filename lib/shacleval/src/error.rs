//! Error types for shape parsing and validation.

use oxrdf::NamedOrBlankNode;

/// Error raised while reading a shapes graph or running validation.
///
/// Any of these means the engine could not complete validation; they are
/// distinct from constraint violations, which are reported through the
/// validation report.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShaclError {
    /// A shape declares a property path this engine does not support.
    #[error("unsupported property path on shape {shape}: only plain predicate paths are supported")]
    UnsupportedPath {
        /// The shape carrying the path.
        shape: NamedOrBlankNode,
    },

    /// A cardinality parameter is not a non-negative integer.
    #[error("invalid cardinality for shape {shape}: {value}")]
    InvalidCardinality {
        /// The shape carrying the parameter.
        shape: NamedOrBlankNode,
        /// The offending lexical value.
        value: String,
    },

    /// An `sh:in` or `sh:or` RDF list is malformed or cyclic.
    #[error("malformed RDF list on shape {shape}")]
    MalformedList {
        /// The shape carrying the list.
        shape: NamedOrBlankNode,
    },

    /// An `sh:pattern` regular expression failed to compile.
    #[error("invalid sh:pattern regex '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// The regex engine's diagnostic.
        message: String,
    },

    /// An `sh:nodeKind` value is not one of the six SHACL node kinds.
    #[error("unknown sh:nodeKind {value} on shape {shape}")]
    UnknownNodeKind {
        /// The shape carrying the parameter.
        shape: NamedOrBlankNode,
        /// The offending value.
        value: String,
    },

    /// An `sh:node` or `sh:or` member references a shape that does not exist
    /// in the shapes graph.
    #[error("shape {shape} references undefined shape {referenced}")]
    UndefinedShape {
        /// The referring shape.
        shape: NamedOrBlankNode,
        /// The missing reference.
        referenced: NamedOrBlankNode,
    },

    /// Shape references nest deeper than the recursion limit, which in
    /// practice means the shapes graph is cyclic.
    #[error("shape recursion limit ({limit}) exceeded; the shapes graph is likely cyclic")]
    RecursionLimit {
        /// The configured limit.
        limit: usize,
    },
}
