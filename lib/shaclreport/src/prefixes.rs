//! Namespace shortening for display.

use oxrdf::TermRef;
use std::collections::BTreeMap;

/// A mapping from full namespace URIs to their short `prefix:` form.
///
/// Built once from a data graph's declared prefixes and used to shorten
/// every printed value. Substitution is plain substring replacement, so it
/// also applies to URIs embedded in longer strings such as messages.
///
/// Shortening is idempotent: once a namespace URI has been replaced by its
/// `prefix:` form, no known full URI remains in the value.
#[derive(Debug, Clone, Default)]
pub struct PrefixMap {
    // Keyed by namespace URI. Iterated in reverse lexicographic order so
    // that the longest of two nested namespaces wins.
    by_namespace: BTreeMap<String, String>,
}

impl PrefixMap {
    /// Creates an empty map. `shorten` is then the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map from `(prefix, namespace URI)` bindings, as yielded by
    /// the parsers' `prefixes()` iterators.
    pub fn from_bindings<'a>(bindings: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut map = Self::new();
        for (prefix, namespace) in bindings {
            map.insert(prefix, namespace);
        }
        map
    }

    /// Adds a `prefix` → `namespace` binding.
    pub fn insert(&mut self, prefix: &str, namespace: &str) {
        self.by_namespace
            .insert(namespace.to_owned(), format!("{prefix}:"));
    }

    /// Returns the number of known namespaces.
    pub fn len(&self) -> usize {
        self.by_namespace.len()
    }

    /// Checks whether no namespace is known.
    pub fn is_empty(&self) -> bool {
        self.by_namespace.is_empty()
    }

    /// Replaces every occurrence of every known namespace URI in `value`
    /// with its `prefix:` form. Values without a known URI pass through
    /// unchanged.
    pub fn shorten(&self, value: &str) -> String {
        let mut shortened = value.to_owned();
        for (namespace, prefix) in self.by_namespace.iter().rev() {
            if shortened.contains(namespace.as_str()) {
                shortened = shortened.replace(namespace.as_str(), prefix);
            }
        }
        shortened
    }

    /// Renders an optional term for display and shortens it.
    ///
    /// IRIs display without angle brackets, literals as their lexical form,
    /// blank nodes with a `_:` marker. An absent term displays as the empty
    /// string rather than failing.
    pub fn display_term(&self, term: Option<TermRef<'_>>) -> String {
        let Some(term) = term else {
            return String::new();
        };
        self.shorten(&raw_term_text(term))
    }
}

fn raw_term_text(term: TermRef<'_>) -> String {
    match term {
        TermRef::NamedNode(n) => n.as_str().to_owned(),
        TermRef::BlankNode(b) => format!("_:{}", b.as_str()),
        TermRef::Literal(l) => l.value().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode};

    fn spdx_map() -> PrefixMap {
        PrefixMap::from_bindings([
            ("sh", "http://www.w3.org/ns/shacl#"),
            ("spdx", "https://spdx.org/rdf/3.0.1/terms/Core/"),
        ])
    }

    #[test]
    fn shortens_known_namespace() {
        let map = spdx_map();
        assert_eq!(
            map.shorten("http://www.w3.org/ns/shacl#Violation"),
            "sh:Violation"
        );
    }

    #[test]
    fn shortens_all_occurrences_inside_longer_strings() {
        let map = spdx_map();
        let message = "Expected https://spdx.org/rdf/3.0.1/terms/Core/Agent, \
                       got https://spdx.org/rdf/3.0.1/terms/Core/Tool";
        let shortened = map.shorten(message);
        assert_eq!(shortened.matches("spdx:").count(), 2);
        assert!(!shortened.contains("https://spdx.org/"));
    }

    #[test]
    fn unknown_namespace_passes_through() {
        let map = spdx_map();
        assert_eq!(
            map.shorten("http://example.com/unrelated"),
            "http://example.com/unrelated"
        );
    }

    #[test]
    fn shortening_is_idempotent() {
        let map = spdx_map();
        let once = map.shorten("http://www.w3.org/ns/shacl#minCount");
        let twice = map.shorten(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn longest_nested_namespace_wins() {
        let map = PrefixMap::from_bindings([
            ("ex", "http://example.com/"),
            ("sub", "http://example.com/sub/"),
        ]);
        assert_eq!(map.shorten("http://example.com/sub/thing"), "sub:thing");
    }

    #[test]
    fn absent_term_displays_empty() {
        let map = spdx_map();
        assert_eq!(map.display_term(None), "");
    }

    #[test]
    fn literal_terms_display_their_lexical_form() {
        let map = spdx_map();
        let literal = Literal::new_simple_literal("Missing property");
        assert_eq!(
            map.display_term(Some(literal.as_ref().into())),
            "Missing property"
        );
    }

    #[test]
    fn iri_terms_display_shortened() {
        let map = spdx_map();
        let iri = NamedNode::new("http://www.w3.org/ns/shacl#Warning").unwrap();
        assert_eq!(map.display_term(Some(iri.as_ref().into())), "sh:Warning");
    }
}
