//! Pre-validation inferencing.
//!
//! SHACL validation is defined over the data graph as given; SPDX shape
//! graphs however lean on class and property hierarchies from the model,
//! so entailed triples can be materialized into the data graph before
//! checking. Two rule sets are available, a plain RDFS one and a small
//! OWL-RL subset, each applied to fixpoint.

use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{Graph, NamedNodeRef, Triple, TripleRef};
use std::fmt;

const OWL_INVERSE_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#inverseOf");
const OWL_SYMMETRIC_PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#SymmetricProperty");
const OWL_TRANSITIVE_PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#TransitiveProperty");

/// Which entailment rules to materialize before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceMode {
    /// Validate the data graph as given.
    #[default]
    None,
    /// RDFS subclass, subproperty, domain and range rules.
    Rdfs,
    /// OWL-RL property rules (inverse, symmetric, transitive).
    OwlRl,
    /// Both rule sets together.
    Both,
}

impl InferenceMode {
    fn rdfs(self) -> bool {
        matches!(self, Self::Rdfs | Self::Both)
    }

    fn owl_rl(self) -> bool {
        matches!(self, Self::OwlRl | Self::Both)
    }
}

impl fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Rdfs => "rdfs",
            Self::OwlRl => "owlrl",
            Self::Both => "both",
        })
    }
}

/// Extends the graph with the entailed triples for the mode, to fixpoint.
pub fn materialize(graph: &mut Graph, mode: InferenceMode) {
    if mode == InferenceMode::None {
        return;
    }
    loop {
        let mut entailed: Vec<Triple> = Vec::new();
        if mode.rdfs() {
            apply_rdfs(graph, &mut entailed);
        }
        if mode.owl_rl() {
            apply_owl_rl(graph, &mut entailed);
        }
        let mut changed = false;
        for triple in entailed {
            changed |= graph.insert(&triple);
        }
        if !changed {
            return;
        }
    }
}

fn apply_rdfs(graph: &Graph, entailed: &mut Vec<Triple>) {
    // subClassOf transitivity.
    for t in graph.triples_for_predicate(rdfs::SUB_CLASS_OF) {
        let Some(class) = term_as_node(t.object.into_owned()) else {
            continue;
        };
        for upper in graph.objects_for_subject_predicate(class.as_ref(), rdfs::SUB_CLASS_OF) {
            entailed.push(Triple::new(
                t.subject.into_owned(),
                rdfs::SUB_CLASS_OF.into_owned(),
                upper.into_owned(),
            ));
        }
    }
    // Type propagation along subClassOf.
    for t in graph.triples_for_predicate(rdf::TYPE) {
        let Some(class) = term_as_node(t.object.into_owned()) else {
            continue;
        };
        for upper in graph.objects_for_subject_predicate(class.as_ref(), rdfs::SUB_CLASS_OF) {
            entailed.push(Triple::new(
                t.subject.into_owned(),
                rdf::TYPE.into_owned(),
                upper.into_owned(),
            ));
        }
    }
    // subPropertyOf propagation: every assertion with a subproperty is
    // also an assertion with its superproperties.
    for sub in graph.triples_for_predicate(rdfs::SUB_PROPERTY_OF) {
        let TripleRef {
            subject: oxrdf::NamedOrBlankNodeRef::NamedNode(property),
            object: oxrdf::TermRef::NamedNode(super_property),
            ..
        } = sub
        else {
            continue;
        };
        for t in graph.triples_for_predicate(property) {
            entailed.push(Triple::new(
                t.subject.into_owned(),
                super_property.into_owned(),
                t.object.into_owned(),
            ));
        }
    }
    // Domain and range typing.
    for decl in graph.triples_for_predicate(rdfs::DOMAIN) {
        let TripleRef {
            subject: oxrdf::NamedOrBlankNodeRef::NamedNode(property),
            object: class,
            ..
        } = decl
        else {
            continue;
        };
        for t in graph.triples_for_predicate(property) {
            entailed.push(Triple::new(
                t.subject.into_owned(),
                rdf::TYPE.into_owned(),
                class.into_owned(),
            ));
        }
    }
    for decl in graph.triples_for_predicate(rdfs::RANGE) {
        let TripleRef {
            subject: oxrdf::NamedOrBlankNodeRef::NamedNode(property),
            object: class,
            ..
        } = decl
        else {
            continue;
        };
        for t in graph.triples_for_predicate(property) {
            if let Some(object) = term_as_node(t.object.into_owned()) {
                entailed.push(Triple::new(object, rdf::TYPE.into_owned(), class.into_owned()));
            }
        }
    }
}

fn apply_owl_rl(graph: &Graph, entailed: &mut Vec<Triple>) {
    // inverseOf, both directions.
    for decl in graph.triples_for_predicate(OWL_INVERSE_OF) {
        let TripleRef {
            subject: oxrdf::NamedOrBlankNodeRef::NamedNode(forward),
            object: oxrdf::TermRef::NamedNode(backward),
            ..
        } = decl
        else {
            continue;
        };
        for (from, to) in [(forward, backward), (backward, forward)] {
            for t in graph.triples_for_predicate(from) {
                if let Some(object) = term_as_node(t.object.into_owned()) {
                    entailed.push(Triple::new(
                        object,
                        to.into_owned(),
                        subject_term(t.subject),
                    ));
                }
            }
        }
    }
    // Symmetric properties.
    for decl in graph.subjects_for_predicate_object(rdf::TYPE, OWL_SYMMETRIC_PROPERTY) {
        let oxrdf::NamedOrBlankNodeRef::NamedNode(property) = decl else {
            continue;
        };
        for t in graph.triples_for_predicate(property) {
            if let Some(object) = term_as_node(t.object.into_owned()) {
                entailed.push(Triple::new(
                    object,
                    property.into_owned(),
                    subject_term(t.subject),
                ));
            }
        }
    }
    // Transitive properties.
    for decl in graph.subjects_for_predicate_object(rdf::TYPE, OWL_TRANSITIVE_PROPERTY) {
        let oxrdf::NamedOrBlankNodeRef::NamedNode(property) = decl else {
            continue;
        };
        for t in graph.triples_for_predicate(property) {
            let Some(middle) = term_as_node(t.object.into_owned()) else {
                continue;
            };
            for next in graph.objects_for_subject_predicate(middle.as_ref(), property) {
                entailed.push(Triple::new(
                    t.subject.into_owned(),
                    property.into_owned(),
                    next.into_owned(),
                ));
            }
        }
    }
}

fn subject_term(subject: oxrdf::NamedOrBlankNodeRef<'_>) -> oxrdf::Term {
    subject.into_owned().into()
}

fn term_as_node(term: oxrdf::Term) -> Option<oxrdf::NamedOrBlankNode> {
    match term {
        oxrdf::Term::NamedNode(n) => Some(n.into()),
        oxrdf::Term::BlankNode(b) => Some(b.into()),
        _ => None,
    }
}
