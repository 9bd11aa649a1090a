//! Shape model and shapes-graph parsing.

use crate::error::ShaclError;
use oxrdf::vocab::rdf;
use oxrdf::{Graph, NamedNode, NamedOrBlankNode, Term, TermRef};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use shaclreport::vocab::shacl;
use shaclreport::GraphQueryExt;

/// How a shape selects its focus nodes.
#[derive(Debug, Clone)]
pub enum Target {
    /// All instances of the class.
    Class(NamedNode),
    /// One explicit node.
    Node(Term),
    /// All subjects of triples with the predicate.
    SubjectsOf(NamedNode),
    /// All objects of triples with the predicate.
    ObjectsOf(NamedNode),
}

/// The six SHACL node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Iri,
    Literal,
    BlankNode,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKind {
    fn from_named(value: TermRef<'_>) -> Option<Self> {
        let TermRef::NamedNode(value) = value else {
            return None;
        };
        if value == shacl::IRI {
            Some(Self::Iri)
        } else if value == shacl::LITERAL {
            Some(Self::Literal)
        } else if value == shacl::BLANK_NODE {
            Some(Self::BlankNode)
        } else if value == shacl::BLANK_NODE_OR_IRI {
            Some(Self::BlankNodeOrIri)
        } else if value == shacl::BLANK_NODE_OR_LITERAL {
            Some(Self::BlankNodeOrLiteral)
        } else if value == shacl::IRI_OR_LITERAL {
            Some(Self::IriOrLiteral)
        } else {
            None
        }
    }

    /// Checks a term against this node kind.
    pub fn matches(self, term: &Term) -> bool {
        match term {
            Term::NamedNode(_) => matches!(
                self,
                Self::Iri | Self::BlankNodeOrIri | Self::IriOrLiteral
            ),
            Term::BlankNode(_) => matches!(
                self,
                Self::BlankNode | Self::BlankNodeOrIri | Self::BlankNodeOrLiteral
            ),
            Term::Literal(_) => matches!(
                self,
                Self::Literal | Self::BlankNodeOrLiteral | Self::IriOrLiteral
            ),
        }
    }

    /// The IRI naming this node kind.
    pub fn iri(self) -> NamedNode {
        match self {
            Self::Iri => shacl::IRI.into_owned(),
            Self::Literal => shacl::LITERAL.into_owned(),
            Self::BlankNode => shacl::BLANK_NODE.into_owned(),
            Self::BlankNodeOrIri => shacl::BLANK_NODE_OR_IRI.into_owned(),
            Self::BlankNodeOrLiteral => shacl::BLANK_NODE_OR_LITERAL.into_owned(),
            Self::IriOrLiteral => shacl::IRI_OR_LITERAL.into_owned(),
        }
    }
}

/// A value-level constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// `sh:class`: values must be instances of the class.
    Class(NamedNode),
    /// `sh:datatype`: literal values must carry the datatype.
    Datatype(NamedNode),
    /// `sh:nodeKind`.
    NodeKind(NodeKind),
    /// `sh:hasValue`: the value set must contain the term.
    HasValue(Term),
    /// `sh:in`: every value must be one of the listed terms.
    In(Vec<Term>),
    /// `sh:pattern` (+ `sh:flags`).
    Pattern {
        /// Compiled expression, flags folded in.
        regex: Regex,
        /// Original pattern source, for messages.
        source: String,
    },
    /// `sh:node`: values must conform to the referenced shape.
    Node(NamedOrBlankNode),
    /// `sh:or`: values must conform to at least one listed shape.
    Or(Vec<NamedOrBlankNode>),
}

/// A parsed shape: a node shape, or a property shape when `path` is set.
#[derive(Debug, Clone)]
pub struct Shape {
    /// The shape's node in the shapes graph.
    pub id: NamedOrBlankNode,
    /// Focus-node selectors.
    pub targets: Vec<Target>,
    /// Predicate path; `None` for node shapes.
    pub path: Option<NamedNode>,
    /// Minimum cardinality.
    pub min_count: Option<u64>,
    /// Maximum cardinality.
    pub max_count: Option<u64>,
    /// Result severity, `sh:Violation` unless overridden.
    pub severity: NamedNode,
    /// Message override for every constraint of this shape.
    pub message: Option<String>,
    /// Deactivated shapes produce no results.
    pub deactivated: bool,
    /// Value-level constraints.
    pub constraints: Vec<Constraint>,
    /// Attached property shapes (`sh:property`).
    pub properties: Vec<NamedOrBlankNode>,
}

/// All shapes parsed out of a shapes graph.
#[derive(Debug, Clone, Default)]
pub struct ShapesGraph {
    shapes: FxHashMap<NamedOrBlankNode, Shape>,
    targeted: Vec<NamedOrBlankNode>,
}

impl ShapesGraph {
    /// Parses every shape reachable from the graph's shape declarations:
    /// nodes typed `sh:NodeShape`/`sh:PropertyShape`, nodes carrying a
    /// target, `sh:property` objects, and anything they reference through
    /// `sh:node` or `sh:or`.
    pub fn from_graph(graph: &Graph) -> Result<Self, ShaclError> {
        let mut pending: Vec<NamedOrBlankNode> = Vec::new();
        let mut seen = FxHashSet::default();

        for class in [shacl::NODE_SHAPE, shacl::PROPERTY_SHAPE] {
            for subject in graph.subjects_for_predicate_object(rdf::TYPE, class) {
                enqueue(Some(subject.into_owned()), &mut pending, &mut seen);
            }
        }
        for target in [
            shacl::TARGET_CLASS,
            shacl::TARGET_NODE,
            shacl::TARGET_SUBJECTS_OF,
            shacl::TARGET_OBJECTS_OF,
        ] {
            for triple in graph.triples_for_predicate(target) {
                enqueue(Some(triple.subject.into_owned()), &mut pending, &mut seen);
            }
        }
        for triple in graph.triples_for_predicate(shacl::PROPERTY) {
            enqueue(term_id(triple.object.into_owned()), &mut pending, &mut seen);
        }

        let mut shapes = FxHashMap::default();
        while let Some(id) = pending.pop() {
            let (shape, references) = parse_shape(graph, id.clone())?;
            for reference in references {
                enqueue(Some(reference), &mut pending, &mut seen);
            }
            shapes.insert(id, shape);
        }

        let mut targeted: Vec<NamedOrBlankNode> = shapes
            .values()
            .filter(|shape| !shape.targets.is_empty())
            .map(|shape| shape.id.clone())
            .collect();
        targeted.sort_unstable_by_key(ToString::to_string);

        Ok(Self { shapes, targeted })
    }

    /// Looks a shape up by its node.
    pub fn get(&self, id: &NamedOrBlankNode) -> Option<&Shape> {
        self.shapes.get(id)
    }

    /// Shapes with at least one target, in stable order.
    pub fn targeted(&self) -> &[NamedOrBlankNode] {
        &self.targeted
    }

    /// The number of parsed shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Checks whether no shape was found.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn enqueue(
    id: Option<NamedOrBlankNode>,
    pending: &mut Vec<NamedOrBlankNode>,
    seen: &mut FxHashSet<NamedOrBlankNode>,
) {
    if let Some(id) = id {
        if seen.insert(id.clone()) {
            pending.push(id);
        }
    }
}

fn term_id(term: Term) -> Option<NamedOrBlankNode> {
    match term {
        Term::NamedNode(n) => Some(n.into()),
        Term::BlankNode(b) => Some(b.into()),
        _ => None,
    }
}

fn parse_shape(
    graph: &Graph,
    id: NamedOrBlankNode,
) -> Result<(Shape, Vec<NamedOrBlankNode>), ShaclError> {
    let mut references = Vec::new();

    let mut targets = Vec::new();
    for term in graph.all_objects(&id, shacl::TARGET_CLASS) {
        if let Term::NamedNode(class) = term {
            targets.push(Target::Class(class));
        }
    }
    for term in graph.all_objects(&id, shacl::TARGET_NODE) {
        targets.push(Target::Node(term));
    }
    for term in graph.all_objects(&id, shacl::TARGET_SUBJECTS_OF) {
        if let Term::NamedNode(predicate) = term {
            targets.push(Target::SubjectsOf(predicate));
        }
    }
    for term in graph.all_objects(&id, shacl::TARGET_OBJECTS_OF) {
        if let Term::NamedNode(predicate) = term {
            targets.push(Target::ObjectsOf(predicate));
        }
    }

    let path = match graph.first_object(&id, shacl::PATH) {
        None => None,
        Some(TermRef::NamedNode(predicate)) => Some(predicate.into_owned()),
        Some(_) => return Err(ShaclError::UnsupportedPath { shape: id }),
    };

    let min_count = parse_cardinality(graph, &id, shacl::MIN_COUNT)?;
    let max_count = parse_cardinality(graph, &id, shacl::MAX_COUNT)?;

    let severity = match graph.first_object(&id, shacl::SEVERITY) {
        Some(TermRef::NamedNode(severity)) => severity.into_owned(),
        _ => shacl::VIOLATION.into_owned(),
    };
    let message = match graph.first_object(&id, shacl::MESSAGE) {
        Some(TermRef::Literal(message)) => Some(message.value().to_owned()),
        _ => None,
    };
    let deactivated = matches!(
        graph.first_object(&id, shacl::DEACTIVATED),
        Some(TermRef::Literal(flag)) if flag.value() == "true" || flag.value() == "1"
    );

    let mut constraints = Vec::new();
    for term in graph.all_objects(&id, shacl::CLASS) {
        if let Term::NamedNode(class) = term {
            constraints.push(Constraint::Class(class));
        }
    }
    for term in graph.all_objects(&id, shacl::DATATYPE) {
        if let Term::NamedNode(datatype) = term {
            constraints.push(Constraint::Datatype(datatype));
        }
    }
    if let Some(kind) = graph.first_object(&id, shacl::NODE_KIND) {
        let node_kind = NodeKind::from_named(kind).ok_or_else(|| ShaclError::UnknownNodeKind {
            shape: id.clone(),
            value: kind.to_string(),
        })?;
        constraints.push(Constraint::NodeKind(node_kind));
    }
    for term in graph.all_objects(&id, shacl::HAS_VALUE) {
        constraints.push(Constraint::HasValue(term));
    }
    if let Some(head) = graph.first_object(&id, shacl::IN) {
        constraints.push(Constraint::In(parse_list(graph, head.into_owned(), &id)?));
    }
    if let Some(TermRef::Literal(pattern)) = graph.first_object(&id, shacl::PATTERN) {
        constraints.push(compile_pattern(graph, &id, pattern.value())?);
    }
    for term in graph.all_objects(&id, shacl::NODE) {
        if let Some(reference) = term_id(term) {
            references.push(reference.clone());
            constraints.push(Constraint::Node(reference));
        }
    }
    if let Some(head) = graph.first_object(&id, shacl::OR) {
        let members: Vec<NamedOrBlankNode> = parse_list(graph, head.into_owned(), &id)?
            .into_iter()
            .filter_map(term_id)
            .collect();
        references.extend(members.iter().cloned());
        constraints.push(Constraint::Or(members));
    }

    let properties: Vec<NamedOrBlankNode> = graph
        .all_objects(&id, shacl::PROPERTY)
        .into_iter()
        .filter_map(term_id)
        .collect();
    references.extend(properties.iter().cloned());

    Ok((
        Shape {
            id,
            targets,
            path,
            min_count,
            max_count,
            severity,
            message,
            deactivated,
            constraints,
            properties,
        },
        references,
    ))
}

fn parse_cardinality(
    graph: &Graph,
    id: &NamedOrBlankNode,
    parameter: oxrdf::NamedNodeRef<'_>,
) -> Result<Option<u64>, ShaclError> {
    match graph.first_object(id, parameter) {
        None => Ok(None),
        Some(TermRef::Literal(count)) => {
            count
                .value()
                .parse()
                .map(Some)
                .map_err(|_| ShaclError::InvalidCardinality {
                    shape: id.clone(),
                    value: count.value().to_owned(),
                })
        }
        Some(other) => Err(ShaclError::InvalidCardinality {
            shape: id.clone(),
            value: other.to_string(),
        }),
    }
}

fn compile_pattern(
    graph: &Graph,
    id: &NamedOrBlankNode,
    pattern: &str,
) -> Result<Constraint, ShaclError> {
    let mut source = String::new();
    if let Some(TermRef::Literal(flags)) = graph.first_object(id, shacl::FLAGS) {
        // Only flags the regex crate understands are carried over.
        let inline: String = flags
            .value()
            .chars()
            .filter(|flag| matches!(flag, 'i' | 'm' | 's' | 'x'))
            .collect();
        if !inline.is_empty() {
            source = format!("(?{inline})");
        }
    }
    source.push_str(pattern);
    let regex = Regex::new(&source).map_err(|e| ShaclError::InvalidPattern {
        pattern: pattern.to_owned(),
        message: e.to_string(),
    })?;
    Ok(Constraint::Pattern {
        regex,
        source: pattern.to_owned(),
    })
}

fn parse_list(
    graph: &Graph,
    head: Term,
    owner: &NamedOrBlankNode,
) -> Result<Vec<Term>, ShaclError> {
    let mut members = Vec::new();
    let mut visited = FxHashSet::default();
    let mut current = head;
    loop {
        if current == rdf::NIL.into() {
            return Ok(members);
        }
        let Some(node) = term_id(current) else {
            return Err(ShaclError::MalformedList {
                shape: owner.clone(),
            });
        };
        if !visited.insert(node.clone()) {
            return Err(ShaclError::MalformedList {
                shape: owner.clone(),
            });
        }
        let first = graph
            .first_object(&node, rdf::FIRST)
            .ok_or_else(|| ShaclError::MalformedList {
                shape: owner.clone(),
            })?;
        members.push(first.into_owned());
        current = graph
            .first_object(&node, rdf::REST)
            .ok_or_else(|| ShaclError::MalformedList {
                shape: owner.clone(),
            })?
            .into_owned();
    }
}
