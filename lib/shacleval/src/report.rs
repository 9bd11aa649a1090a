//! Validation outcome and its RDF rendition.

use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, Graph, Literal, NamedNode, NamedOrBlankNode, Term};
use shaclreport::vocab::shacl;

/// One constraint check outcome.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// The node that was checked.
    pub focus_node: Term,
    /// The property path, when the check came from a property shape.
    pub result_path: Option<NamedNode>,
    /// The specific offending value, when there is one.
    pub value: Option<Term>,
    /// The shape that produced the result.
    pub source_shape: NamedOrBlankNode,
    /// The constraint component that produced the result.
    pub source_constraint_component: NamedNode,
    /// Human-readable description.
    pub result_message: String,
    /// `sh:Violation`, `sh:Warning` or `sh:Info`.
    pub result_severity: NamedNode,
    /// Nested results explaining this one (`sh:node`, `sh:or` branches).
    pub details: Vec<ValidationResult>,
}

/// The outcome of validating a data graph against a shapes graph.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    conforms: bool,
    results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub(crate) fn new() -> Self {
        Self {
            conforms: true,
            results: Vec::new(),
        }
    }

    /// Whether the data graph conforms. Only `sh:Violation` results count
    /// against conformance; warnings and infos are reported but do not
    /// change it.
    pub fn conforms(&self) -> bool {
        self.conforms
    }

    /// The top-level results, in the order they were produced.
    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub(crate) fn add_result(&mut self, result: ValidationResult) {
        if result.result_severity == shacl::VIOLATION.into_owned() {
            self.conforms = false;
        }
        self.results.push(result);
    }

    /// Renders the report as a standard SHACL validation-report graph.
    pub fn to_graph(&self) -> Graph {
        let mut graph = Graph::new();
        let report = BlankNode::default();
        graph.insert(&oxrdf::Triple::new(
            report.clone(),
            rdf::TYPE.into_owned(),
            shacl::VALIDATION_REPORT.into_owned(),
        ));
        graph.insert(&oxrdf::Triple::new(
            report.clone(),
            shacl::CONFORMS.into_owned(),
            Literal::new_typed_literal(
                if self.conforms { "true" } else { "false" },
                xsd::BOOLEAN.into_owned(),
            ),
        ));
        for result in &self.results {
            let node = emit(&mut graph, result);
            graph.insert(&oxrdf::Triple::new(
                report.clone(),
                shacl::RESULT.into_owned(),
                Term::from(node),
            ));
        }
        graph
    }
}

fn emit(graph: &mut Graph, result: &ValidationResult) -> NamedOrBlankNode {
    let node: NamedOrBlankNode = BlankNode::default().into();
    let mut insert = |predicate: oxrdf::NamedNodeRef<'_>, object: Term| {
        graph.insert(&oxrdf::Triple::new(
            node.clone(),
            predicate.into_owned(),
            object,
        ));
    };
    insert(rdf::TYPE, shacl::VALIDATION_RESULT.into_owned().into());
    insert(shacl::FOCUS_NODE, result.focus_node.clone());
    insert(shacl::RESULT_SEVERITY, result.result_severity.clone().into());
    insert(shacl::SOURCE_SHAPE, Term::from(result.source_shape.clone()));
    insert(
        shacl::SOURCE_CONSTRAINT_COMPONENT,
        result.source_constraint_component.clone().into(),
    );
    insert(
        shacl::RESULT_MESSAGE,
        Literal::new_simple_literal(&result.result_message).into(),
    );
    if let Some(path) = &result.result_path {
        insert(shacl::RESULT_PATH, path.clone().into());
    }
    if let Some(value) = &result.value {
        insert(shacl::VALUE, value.clone());
    }
    for detail in &result.details {
        let child = emit(graph, detail);
        graph.insert(&oxrdf::Triple::new(
            node.clone(),
            shacl::DETAIL.into_owned(),
            Term::from(child),
        ));
    }
    node
}
