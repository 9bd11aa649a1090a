//! Narrow lookup capabilities over an [`oxrdf::Graph`].
//!
//! The report walker only ever needs two query shapes: the unique object of
//! a `(subject, predicate)` pair for scalar fields, and every object of a
//! pair for `sh:detail` children. Keeping them explicit avoids threading the
//! full graph query surface through the formatter.

use oxrdf::{Graph, NamedNodeRef, NamedOrBlankNode, Term, TermRef};

/// Scalar and multi-valued object lookups over a graph.
pub trait GraphQueryExt {
    /// Returns the first object of the `(subject, predicate)` pair, if any.
    ///
    /// When several objects exist, which one is returned is decided by the
    /// graph's internal iteration order.
    fn first_object<'a>(
        &'a self,
        subject: &NamedOrBlankNode,
        predicate: NamedNodeRef<'_>,
    ) -> Option<TermRef<'a>>;

    /// Returns every object of the `(subject, predicate)` pair.
    fn all_objects(&self, subject: &NamedOrBlankNode, predicate: NamedNodeRef<'_>) -> Vec<Term>;
}

impl GraphQueryExt for Graph {
    fn first_object<'a>(
        &'a self,
        subject: &NamedOrBlankNode,
        predicate: NamedNodeRef<'_>,
    ) -> Option<TermRef<'a>> {
        self.object_for_subject_predicate(subject.as_ref(), predicate)
    }

    fn all_objects(&self, subject: &NamedOrBlankNode, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        self.objects_for_subject_predicate(subject.as_ref(), predicate)
            .map(TermRef::into_owned)
            .collect()
    }
}
