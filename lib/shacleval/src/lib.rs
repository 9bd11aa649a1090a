#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]

mod error;
mod infer;
mod report;
mod shapes;
mod validator;

pub use error::ShaclError;
pub use infer::{materialize, InferenceMode};
pub use report::{ValidationReport, ValidationResult};
pub use shapes::{Constraint, NodeKind, Shape, ShapesGraph, Target};
pub use validator::{ShaclValidator, MAX_SHAPE_RECURSION};

use oxrdf::Graph;

/// Validates a data graph against a shapes graph.
///
/// The ontology graph, when given, is layered into the data before
/// checking, and the inference mode's entailed triples are materialized
/// on top. Returns `Err` when the shapes graph cannot be evaluated;
/// constraint violations are reported through the [`ValidationReport`].
pub fn validate(
    data: &Graph,
    shapes: &Graph,
    ontology: Option<&Graph>,
    inference: InferenceMode,
) -> Result<ValidationReport, ShaclError> {
    let validator = ShaclValidator::new(shapes)?;
    if ontology.is_none() && inference == InferenceMode::None {
        return validator.validate(data);
    }
    let mut working = Graph::new();
    working.extend(data);
    if let Some(ontology) = ontology {
        working.extend(ontology);
    }
    materialize(&mut working, inference);
    validator.validate(&working)
}
