//! Constraint evaluation.

use crate::error::ShaclError;
use crate::report::{ValidationReport, ValidationResult};
use crate::shapes::{Constraint, Shape, ShapesGraph, Target};
use oxrdf::vocab::rdf;
use oxrdf::{Graph, NamedNode, NamedOrBlankNode, Term, TermRef};
use rustc_hash::FxHashSet;
use shaclreport::vocab::shacl;

/// Nesting depth after which shape references are treated as cyclic.
pub const MAX_SHAPE_RECURSION: usize = 32;

/// A reusable validator over one shapes graph.
pub struct ShaclValidator {
    shapes: ShapesGraph,
}

impl ShaclValidator {
    /// Parses the shapes graph. Fails on shape declarations the engine
    /// cannot evaluate.
    pub fn new(shapes: &Graph) -> Result<Self, ShaclError> {
        Ok(Self {
            shapes: ShapesGraph::from_graph(shapes)?,
        })
    }

    /// The parsed shapes.
    pub fn shapes(&self) -> &ShapesGraph {
        &self.shapes
    }

    /// Checks the data graph against every targeted shape.
    pub fn validate(&self, data: &Graph) -> Result<ValidationReport, ShaclError> {
        let mut report = ValidationReport::new();
        for id in self.shapes.targeted() {
            let shape = self
                .shapes
                .get(id)
                .expect("targeted shapes are always parsed");
            if shape.deactivated {
                continue;
            }
            for focus in self.focus_nodes(data, shape) {
                for result in self.check_shape(data, shape, &focus, 0)? {
                    report.add_result(result);
                }
            }
        }
        Ok(report)
    }

    fn focus_nodes(&self, data: &Graph, shape: &Shape) -> Vec<Term> {
        let mut nodes: Vec<Term> = Vec::new();
        let mut seen = FxHashSet::default();
        let mut push = |term: Term, seen: &mut FxHashSet<Term>| {
            if seen.insert(term.clone()) {
                nodes.push(term);
            }
        };
        for target in &shape.targets {
            match target {
                Target::Class(class) => {
                    for subject in data.subjects_for_predicate_object(rdf::TYPE, class.as_ref()) {
                        push(subject_term(subject), &mut seen);
                    }
                }
                Target::Node(node) => push(node.clone(), &mut seen),
                Target::SubjectsOf(predicate) => {
                    for triple in data.triples_for_predicate(predicate.as_ref()) {
                        push(subject_term(triple.subject), &mut seen);
                    }
                }
                Target::ObjectsOf(predicate) => {
                    for triple in data.triples_for_predicate(predicate.as_ref()) {
                        push(triple.object.into_owned(), &mut seen);
                    }
                }
            }
        }
        nodes.sort_unstable_by_key(ToString::to_string);
        nodes
    }

    /// Evaluates one shape against one focus node, returning the results.
    fn check_shape(
        &self,
        data: &Graph,
        shape: &Shape,
        focus: &Term,
        depth: usize,
    ) -> Result<Vec<ValidationResult>, ShaclError> {
        if depth > MAX_SHAPE_RECURSION {
            return Err(ShaclError::RecursionLimit {
                limit: MAX_SHAPE_RECURSION,
            });
        }
        if shape.deactivated {
            return Ok(Vec::new());
        }

        let values = match &shape.path {
            Some(predicate) => path_values(data, focus, predicate),
            None => vec![focus.clone()],
        };

        let mut results = Vec::new();

        if let Some(min) = shape.min_count {
            if (values.len() as u64) < min {
                let path = path_text(shape);
                results.push(self.result(
                    shape,
                    focus,
                    None,
                    shacl::MIN_COUNT_CONSTRAINT_COMPONENT.into_owned(),
                    format!("Less than {min} values on {focus}->{path}"),
                ));
            }
        }
        if let Some(max) = shape.max_count {
            if values.len() as u64 > max {
                let path = path_text(shape);
                results.push(self.result(
                    shape,
                    focus,
                    None,
                    shacl::MAX_COUNT_CONSTRAINT_COMPONENT.into_owned(),
                    format!("More than {max} values on {focus}->{path}"),
                ));
            }
        }

        for constraint in &shape.constraints {
            match constraint {
                Constraint::HasValue(required) => {
                    if !values.contains(required) {
                        results.push(self.result(
                            shape,
                            focus,
                            None,
                            shacl::HAS_VALUE_CONSTRAINT_COMPONENT.into_owned(),
                            format!("Missing expected value {required}"),
                        ));
                    }
                }
                other => {
                    for value in &values {
                        results.extend(self.check_value(data, shape, focus, value, other, depth)?);
                    }
                }
            }
        }

        for property in &shape.properties {
            let property = self.resolve(shape, property)?;
            results.extend(self.check_shape(data, property, focus, depth + 1)?);
        }

        Ok(results)
    }

    fn check_value(
        &self,
        data: &Graph,
        shape: &Shape,
        focus: &Term,
        value: &Term,
        constraint: &Constraint,
        depth: usize,
    ) -> Result<Vec<ValidationResult>, ShaclError> {
        let mut results = Vec::new();
        match constraint {
            Constraint::Class(class) => {
                if !has_type(data, value, class) {
                    results.push(self.value_result(
                        shape,
                        focus,
                        value,
                        shacl::CLASS_CONSTRAINT_COMPONENT.into_owned(),
                        format!("Value does not have class {class}"),
                    ));
                }
            }
            Constraint::Datatype(datatype) => {
                let ok = matches!(value, Term::Literal(l) if l.datatype() == datatype.as_ref());
                if !ok {
                    results.push(self.value_result(
                        shape,
                        focus,
                        value,
                        shacl::DATATYPE_CONSTRAINT_COMPONENT.into_owned(),
                        format!("Value does not have datatype {datatype}"),
                    ));
                }
            }
            Constraint::NodeKind(kind) => {
                if !kind.matches(value) {
                    results.push(self.value_result(
                        shape,
                        focus,
                        value,
                        shacl::NODE_KIND_CONSTRAINT_COMPONENT.into_owned(),
                        format!("Value is not of node kind {}", kind.iri()),
                    ));
                }
            }
            Constraint::Pattern { regex, source } => {
                let text = match value {
                    Term::Literal(l) => Some(l.value().to_owned()),
                    Term::NamedNode(n) => Some(n.as_str().to_owned()),
                    // Blank nodes never match a pattern.
                    _ => None,
                };
                if !text.is_some_and(|text| regex.is_match(&text)) {
                    results.push(self.value_result(
                        shape,
                        focus,
                        value,
                        shacl::PATTERN_CONSTRAINT_COMPONENT.into_owned(),
                        format!("Value does not match pattern \"{source}\""),
                    ));
                }
            }
            Constraint::In(allowed) => {
                if !allowed.contains(value) {
                    results.push(self.value_result(
                        shape,
                        focus,
                        value,
                        shacl::IN_CONSTRAINT_COMPONENT.into_owned(),
                        format!("Value is not one of the {} allowed values", allowed.len()),
                    ));
                }
            }
            Constraint::Node(reference) => {
                let referenced = self.resolve(shape, reference)?;
                let failures = self.check_shape(data, referenced, value, depth + 1)?;
                if !failures.is_empty() {
                    let mut result = self.value_result(
                        shape,
                        focus,
                        value,
                        shacl::NODE_CONSTRAINT_COMPONENT.into_owned(),
                        format!("Value does not conform to shape {reference}"),
                    );
                    result.details = failures;
                    results.push(result);
                }
            }
            Constraint::Or(branches) => {
                let mut failures = Vec::new();
                let mut conforms = false;
                for branch in branches {
                    let branch = self.resolve(shape, branch)?;
                    let branch_failures = self.check_shape(data, branch, value, depth + 1)?;
                    if branch_failures.is_empty() {
                        conforms = true;
                        break;
                    }
                    failures.extend(branch_failures);
                }
                if !conforms {
                    let mut result = self.value_result(
                        shape,
                        focus,
                        value,
                        shacl::OR_CONSTRAINT_COMPONENT.into_owned(),
                        format!("Value does not conform to any of {} alternatives", branches.len()),
                    );
                    result.details = failures;
                    results.push(result);
                }
            }
            // Cardinality and sh:hasValue are handled at the value-set level.
            Constraint::HasValue(_) => {}
        }
        Ok(results)
    }

    fn resolve<'a>(
        &'a self,
        owner: &Shape,
        reference: &NamedOrBlankNode,
    ) -> Result<&'a Shape, ShaclError> {
        self.shapes
            .get(reference)
            .ok_or_else(|| ShaclError::UndefinedShape {
                shape: owner.id.clone(),
                referenced: reference.clone(),
            })
    }

    fn result(
        &self,
        shape: &Shape,
        focus: &Term,
        value: Option<&Term>,
        component: NamedNode,
        default_message: String,
    ) -> ValidationResult {
        ValidationResult {
            focus_node: focus.clone(),
            result_path: shape.path.clone(),
            value: value.cloned(),
            source_shape: shape.id.clone(),
            source_constraint_component: component,
            result_message: shape.message.clone().unwrap_or(default_message),
            result_severity: shape.severity.clone(),
            details: Vec::new(),
        }
    }

    fn value_result(
        &self,
        shape: &Shape,
        focus: &Term,
        value: &Term,
        component: NamedNode,
        default_message: String,
    ) -> ValidationResult {
        self.result(shape, focus, Some(value), component, default_message)
    }
}

fn path_values(data: &Graph, focus: &Term, predicate: &NamedNode) -> Vec<Term> {
    let subject = match focus {
        Term::NamedNode(n) => NamedOrBlankNode::from(n.clone()),
        Term::BlankNode(b) => NamedOrBlankNode::from(b.clone()),
        // Literals have no outgoing triples.
        _ => return Vec::new(),
    };
    data.objects_for_subject_predicate(subject.as_ref(), predicate.as_ref())
        .map(TermRef::into_owned)
        .collect()
}

fn has_type(data: &Graph, value: &Term, class: &NamedNode) -> bool {
    let subject = match value {
        Term::NamedNode(n) => NamedOrBlankNode::from(n.clone()),
        Term::BlankNode(b) => NamedOrBlankNode::from(b.clone()),
        Term::Literal(l) => {
            // Literals of the matching datatype are instances of it.
            return l.datatype() == class.as_ref();
        }
    };
    data.objects_for_subject_predicate(subject.as_ref(), rdf::TYPE)
        .any(|t| t == TermRef::NamedNode(class.as_ref()))
}

fn subject_term(subject: oxrdf::NamedOrBlankNodeRef<'_>) -> Term {
    subject.into_owned().into()
}

fn path_text(shape: &Shape) -> String {
    shape
        .path
        .as_ref()
        .map_or_else(|| shape.id.to_string(), |p| p.to_string())
}
