//! The validation-report walker and formatter.
//!
//! Renders the result nodes of a SHACL validation-report graph as indented,
//! separator-delimited text blocks, recursing into `sh:detail` children.
//! The report graph is read-only for the walker; the only side effect is
//! writing to the given sink.

use crate::error::RenderError;
use crate::prefixes::PrefixMap;
use crate::query::GraphQueryExt;
use crate::vocab::shacl;
use oxrdf::vocab::rdf;
use oxrdf::{Graph, NamedOrBlankNode, NamedOrBlankNodeRef, Term};
use std::io::Write;

/// Indentation added per `sh:detail` nesting level.
pub const INDENT_STEP: usize = 4;

/// Width of the dashed line between result blocks.
pub const SEPARATOR_WIDTH: usize = 100;

/// Returns the top-level result nodes of a report graph, sorted by their
/// string form for stable output.
///
/// A top-level result is a subject typed `sh:ValidationResult` that is not
/// the object of any `sh:detail` triple. Detail children are rendered under
/// their parent instead.
pub fn top_level_results(report: &Graph) -> Vec<NamedOrBlankNode> {
    let mut results: Vec<NamedOrBlankNode> = report
        .subjects_for_predicate_object(rdf::TYPE, shacl::VALIDATION_RESULT)
        .map(NamedOrBlankNodeRef::into_owned)
        .filter(|node| {
            report
                .subjects_for_predicate_object(shacl::DETAIL, &Term::from(node.clone()))
                .next()
                .is_none()
        })
        .collect();
    results.sort_unstable_by_key(ToString::to_string);
    results
}

/// Renders every top-level result of the report graph to `out` and returns
/// the total number of results rendered, nested details included.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &Graph,
    prefixes: &PrefixMap,
) -> Result<usize, RenderError> {
    write_results(out, report, &top_level_results(report), prefixes, 0)
}

/// Renders the given result nodes at the given indentation and returns the
/// number of results rendered, nested details included.
///
/// Fails with [`RenderError::CyclicDetails`] if a `sh:detail` chain loops
/// back onto one of its ancestors.
pub fn write_results<W: Write>(
    out: &mut W,
    report: &Graph,
    results: &[NamedOrBlankNode],
    prefixes: &PrefixMap,
    indent: usize,
) -> Result<usize, RenderError> {
    let mut ancestors = Vec::new();
    walk(out, report, results, prefixes, indent, &mut ancestors)
}

fn walk<W: Write>(
    out: &mut W,
    report: &Graph,
    results: &[NamedOrBlankNode],
    prefixes: &PrefixMap,
    indent: usize,
    ancestors: &mut Vec<NamedOrBlankNode>,
) -> Result<usize, RenderError> {
    let mut count = 0;
    let pad = " ".repeat(indent);
    for result in results {
        if ancestors.contains(result) {
            return Err(RenderError::CyclicDetails {
                node: result.to_string(),
            });
        }

        let severity = prefixes.display_term(report.first_object(result, shacl::RESULT_SEVERITY));
        let source_shape = prefixes.display_term(report.first_object(result, shacl::SOURCE_SHAPE));
        let focus_node = prefixes.display_term(report.first_object(result, shacl::FOCUS_NODE));
        let value_node = prefixes.display_term(report.first_object(result, shacl::VALUE));
        let result_path = prefixes.display_term(report.first_object(result, shacl::RESULT_PATH));
        let message = prefixes.display_term(report.first_object(result, shacl::RESULT_MESSAGE));

        count += 1;
        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        if indent > 0 {
            // The label sits at the parent's indentation.
            writeln!(out, "{}Details:", " ".repeat(indent - INDENT_STEP))?;
        }
        writeln!(out, "{pad}Severity: {severity}")?;
        writeln!(out, "{pad}Source Shape: {source_shape}")?;
        writeln!(out, "{pad}Focus Node: {focus_node}")?;
        writeln!(out, "{pad}Value Node: {value_node}")?;
        writeln!(out, "{pad}Result Path: {result_path}")?;
        writeln!(out, "{pad}Message: {message}")?;

        let details: Vec<NamedOrBlankNode> = report
            .all_objects(result, shacl::DETAIL)
            .into_iter()
            .filter_map(|term| match term {
                Term::NamedNode(n) => Some(n.into()),
                Term::BlankNode(b) => Some(b.into()),
                _ => None,
            })
            .collect();
        if !details.is_empty() {
            ancestors.push(result.clone());
            count += walk(out, report, &details, prefixes, indent + INDENT_STEP, ancestors)?;
            ancestors.pop();
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, Literal, NamedNode, Triple};

    fn named(suffix: &str) -> NamedNode {
        NamedNode::new(format!("http://example.com/{suffix}")).unwrap()
    }

    fn insert_result(graph: &mut Graph, node: &BlankNode, focus: &NamedNode) {
        graph.insert(&Triple::new(
            node.clone(),
            rdf::TYPE,
            shacl::VALIDATION_RESULT,
        ));
        graph.insert(&Triple::new(
            node.clone(),
            shacl::RESULT_SEVERITY,
            shacl::VIOLATION,
        ));
        graph.insert(&Triple::new(node.clone(), shacl::FOCUS_NODE, focus.clone()));
        graph.insert(&Triple::new(
            node.clone(),
            shacl::RESULT_MESSAGE,
            Literal::new_simple_literal("constraint violated"),
        ));
    }

    fn link_detail(graph: &mut Graph, parent: &BlankNode, child: &BlankNode) {
        graph.insert(&Triple::new(parent.clone(), shacl::DETAIL, child.clone()));
    }

    fn render(graph: &Graph) -> (usize, String) {
        let mut out = Vec::new();
        let count = write_report(&mut out, graph, &PrefixMap::new()).unwrap();
        (count, String::from_utf8(out).unwrap())
    }

    #[test]
    fn empty_report_renders_nothing() {
        let (count, text) = render(&Graph::new());
        assert_eq!(count, 0);
        assert!(text.is_empty());
    }

    #[test]
    fn count_matches_tree_size() {
        // Two roots; the first has two details, one of which has a child.
        let mut graph = Graph::new();
        let focus = named("subject");
        let (a, b) = (BlankNode::default(), BlankNode::default());
        let (a1, a2, a1x) = (
            BlankNode::default(),
            BlankNode::default(),
            BlankNode::default(),
        );
        for node in [&a, &b, &a1, &a2, &a1x] {
            insert_result(&mut graph, node, &focus);
        }
        link_detail(&mut graph, &a, &a1);
        link_detail(&mut graph, &a, &a2);
        link_detail(&mut graph, &a1, &a1x);

        let (count, _) = render(&graph);
        assert_eq!(count, 5);
    }

    #[test]
    fn detail_children_are_not_top_level() {
        let mut graph = Graph::new();
        let focus = named("subject");
        let (parent, child) = (BlankNode::default(), BlankNode::default());
        insert_result(&mut graph, &parent, &focus);
        insert_result(&mut graph, &child, &focus);
        link_detail(&mut graph, &parent, &child);

        assert_eq!(top_level_results(&graph).len(), 1);
    }

    #[test]
    fn indentation_grows_by_four_per_depth() {
        let mut graph = Graph::new();
        let focus = named("subject");
        let (root, child, grandchild) =
            (BlankNode::default(), BlankNode::default(), BlankNode::default());
        for node in [&root, &child, &grandchild] {
            insert_result(&mut graph, node, &focus);
        }
        link_detail(&mut graph, &root, &child);
        link_detail(&mut graph, &child, &grandchild);

        let (count, text) = render(&graph);
        assert_eq!(count, 3);
        assert!(text.contains("\nSeverity: "));
        assert!(text.contains("\n    Severity: "));
        assert!(text.contains("\n        Severity: "));
        // Depth-1 label at the root's indentation, depth-2 at its parent's.
        assert!(text.contains("\nDetails:\n    Severity: "));
        assert!(text.contains("\n    Details:\n        Severity: "));
    }

    #[test]
    fn absent_fields_render_blank() {
        let mut graph = Graph::new();
        let lonely = BlankNode::default();
        graph.insert(&Triple::new(
            lonely.clone(),
            rdf::TYPE,
            shacl::VALIDATION_RESULT,
        ));

        let (count, text) = render(&graph);
        assert_eq!(count, 1);
        assert!(text.contains("Severity: \n"));
        assert!(text.contains("Focus Node: \n"));
    }

    #[test]
    fn fields_are_prefix_shortened() {
        let mut graph = Graph::new();
        let focus = named("subject");
        let result = BlankNode::default();
        insert_result(&mut graph, &result, &focus);

        let prefixes = PrefixMap::from_bindings([
            ("sh", shacl::NAMESPACE),
            ("ex", "http://example.com/"),
        ]);
        let mut out = Vec::new();
        write_report(&mut out, &graph, &prefixes).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Severity: sh:Violation"));
        assert!(text.contains("Focus Node: ex:subject"));
    }

    #[test]
    fn cyclic_detail_chain_is_an_error() {
        let mut graph = Graph::new();
        let focus = named("subject");
        let (a, b) = (BlankNode::default(), BlankNode::default());
        insert_result(&mut graph, &a, &focus);
        insert_result(&mut graph, &b, &focus);
        link_detail(&mut graph, &a, &b);
        link_detail(&mut graph, &b, &a);

        let mut out = Vec::new();
        // Both nodes are detail objects, so pass them explicitly.
        let roots = vec![NamedOrBlankNode::from(a)];
        let err = write_results(&mut out, &graph, &roots, &PrefixMap::new(), 0).unwrap_err();
        assert!(matches!(err, RenderError::CyclicDetails { .. }));
    }

    #[test]
    fn shared_detail_node_in_two_branches_is_counted_twice() {
        let mut graph = Graph::new();
        let focus = named("subject");
        let (root, left, right, shared) = (
            BlankNode::default(),
            BlankNode::default(),
            BlankNode::default(),
            BlankNode::default(),
        );
        for node in [&root, &left, &right, &shared] {
            insert_result(&mut graph, node, &focus);
        }
        link_detail(&mut graph, &root, &left);
        link_detail(&mut graph, &root, &right);
        link_detail(&mut graph, &left, &shared);
        link_detail(&mut graph, &right, &shared);

        let (count, _) = render(&graph);
        assert_eq!(count, 5);
    }
}
