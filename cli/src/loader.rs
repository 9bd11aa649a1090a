//! Input loading: local files, HTTP(S) fetching and Turtle/JSON-LD parsing.

use anyhow::{bail, Context};
use oxhttp::model::header::ACCEPT;
use oxhttp::model::Request;
use oxjsonld::JsonLdParser;
use oxrdf::{Graph, TripleRef};
use oxttl::{TurtleParser, TurtleSerializer};
use shaclreport::PrefixMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
const HTTP_REDIRECTION_LIMIT: usize = 5;

/// Reads a model source that can be either an HTTP(S) URL or a local path.
pub fn read_model_source(source: &str) -> anyhow::Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source)
    } else {
        read_file(Path::new(source))
    }
}

/// Reads a local file into a string.
pub fn read_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn fetch(url: &str) -> anyhow::Result<String> {
    let client = oxhttp::Client::new()
        .with_global_timeout(HTTP_TIMEOUT)
        .with_redirection_limit(HTTP_REDIRECTION_LIMIT)
        .with_user_agent(concat!("spdxrdf/", env!("CARGO_PKG_VERSION")))?;
    let request = Request::builder()
        .uri(url)
        .header(ACCEPT, "text/turtle")
        .body(())
        .with_context(|| format!("Invalid URL {url}"))?;
    let response = client
        .request(request)
        .with_context(|| format!("Failed to fetch {url}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("Error {status} returned by {url}");
    }
    Ok(response.into_body().to_string()?)
}

/// Parses the concatenation of the given Turtle documents into one graph,
/// also returning the prefix bindings the parser saw.
pub fn parse_turtle(parts: &[&str]) -> anyhow::Result<(Graph, PrefixMap)> {
    let text = parts.concat();
    let mut parser = TurtleParser::new().for_reader(text.as_bytes());
    let mut graph = Graph::new();
    for triple in &mut parser {
        graph.insert(&triple?);
    }
    let mut prefixes = PrefixMap::new();
    for (prefix, iri) in parser.prefixes() {
        prefixes.insert(&prefix.to_string(), &iri.to_string());
    }
    Ok((graph, prefixes))
}

/// Converts a JSON-LD document to Turtle, keeping the prefix bindings
/// declared in its context.
pub fn jsonld_to_turtle(path: &Path) -> anyhow::Result<String> {
    let file = fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut parser = JsonLdParser::new().for_reader(file);

    // The first quad has to be read before the context prefixes are known.
    let first = parser.next();
    let mut serializer = TurtleSerializer::new();
    for (prefix, iri) in parser.prefixes() {
        serializer = serializer
            .with_prefix(prefix.to_string(), iri.to_string())
            .with_context(|| format!("Invalid IRI for prefix {prefix}: {iri}"))?;
    }

    let mut writer = serializer.for_writer(Vec::new());
    for quad in first.into_iter().chain(&mut parser) {
        let quad = quad.with_context(|| format!("Failed to parse {}", path.display()))?;
        writer.serialize_triple(TripleRef::new(
            quad.subject.as_ref(),
            quad.predicate.as_ref(),
            quad.object.as_ref(),
        ))?;
    }
    let turtle = writer.finish()?;
    Ok(String::from_utf8(turtle)?)
}
