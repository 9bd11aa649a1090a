#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod highlight;
mod loader;

use crate::cli::{Args, Command, InferenceArg};
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use oxrdf::vocab::rdf;
use oxrdf::{Graph, NamedOrBlankNode, NamedOrBlankNodeRef, Term};
use shacleval::InferenceMode;
use shaclreport::vocab::shacl;
use shaclreport::{write_report, GraphQueryExt, PrefixMap, SEPARATOR_WIDTH};
use std::io::{self, stdout, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    match Args::parse().command {
        Command::Convert { file } => {
            convert(&file)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate {
            model,
            shapes,
            data,
            prefixes,
            inference,
        } => validate(&model, &shapes, &data, &prefixes, inference.into()),
        Command::Check { shapes, data } => check(&shapes, &data),
    }
}

fn convert(file: &Path) -> anyhow::Result<()> {
    let turtle = loader::jsonld_to_turtle(file)?;
    println!("{}", highlight::highlight_turtle(&turtle));
    Ok(())
}

fn validate(
    model: &str,
    shapes: &Path,
    data: &Path,
    prefixes: &Path,
    inference: InferenceMode,
) -> anyhow::Result<ExitCode> {
    let prefixes_text = loader::read_file(prefixes)?;
    let model_text = loader::read_model_source(model)?;
    let shapes_text = loader::read_file(shapes)?;
    let data_text = loader::read_file(data)?;

    // Each graph is parsed together with the shared prefix declarations,
    // mirroring how the inputs are written.
    let (model_graph, _) = loader::parse_turtle(&[&model_text, &prefixes_text])
        .with_context(|| format!("Failed to parse model {model}"))?;
    let (shapes_graph, _) = loader::parse_turtle(&[&model_text, &shapes_text, &prefixes_text])
        .with_context(|| format!("Failed to parse shapes {}", shapes.display()))?;
    let (data_graph, prefix_map) = loader::parse_turtle(&[&data_text, &prefixes_text])
        .with_context(|| format!("Failed to parse data {}", data.display()))?;
    debug!(
        model = model_graph.len(),
        shapes = shapes_graph.len(),
        data = data_graph.len(),
        "graphs loaded"
    );

    if inference != InferenceMode::None {
        let banner = format!("# # #    Will perform pre-inferencing of type: {inference}   # # #");
        let frame = "#".repeat(banner.len());
        println!("{}", frame.yellow());
        println!("{}", banner.yellow());
        println!("{}", frame.yellow());
    }

    match shacleval::validate(&data_graph, &shapes_graph, Some(&model_graph), inference) {
        Ok(report) => {
            if report.conforms() {
                // Conformance alone decides; warning and info results do
                // not get printed.
                println!("{}", "No SHACL violations found!".green());
                return Ok(ExitCode::SUCCESS);
            }
            let report_graph = report.to_graph();
            let mut out = stdout().lock();
            let count = write_report(&mut out, &report_graph, &prefix_map)?;
            writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
            drop(out);
            println!("{}", format!("Found {count} SHACL violations!").red());
            // Findings are a reporting outcome, not a failure of the run.
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", "SHACL validation failed!".red());
            println!("{}", format!("Error message: {e}").yellow());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn check(shapes: &Path, data: &Path) -> anyhow::Result<ExitCode> {
    let model_text = loader::read_model_source(cli::SPDX_MODEL_URL)?;
    let shapes_text = loader::read_file(shapes)?;
    let data_text = loader::read_file(data)?;

    let (shapes_graph, _) = loader::parse_turtle(&[&model_text, &shapes_text])
        .with_context(|| format!("Failed to parse shapes {}", shapes.display()))?;
    let (data_graph, _) = loader::parse_turtle(&[&data_text])
        .with_context(|| format!("Failed to parse data {}", data.display()))?;

    match shacleval::validate(&data_graph, &shapes_graph, None, InferenceMode::None) {
        Ok(report) => {
            write_flat_results(&mut stdout().lock(), &report.to_graph(), &data_graph)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", "SHACL validation failed!".red());
            println!("{}", format!("Error message: {e}").yellow());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Prints one separator-delimited block per validation result, details
/// included, without nesting. Each block names the blank-node parent of the
/// focus node when the data graph has one.
fn write_flat_results<W: Write>(
    out: &mut W,
    report: &Graph,
    data: &Graph,
) -> io::Result<()> {
    let raw = PrefixMap::new();
    let mut results: Vec<NamedOrBlankNode> = report
        .subjects_for_predicate_object(rdf::TYPE, shacl::VALIDATION_RESULT)
        .map(NamedOrBlankNodeRef::into_owned)
        .collect();
    results.sort_unstable_by_key(ToString::to_string);

    for result in &results {
        let severity = strip_shacl_namespace(
            &raw.display_term(report.first_object(result, shacl::RESULT_SEVERITY)),
        );
        let constraint = strip_shacl_namespace(
            &raw.display_term(report.first_object(result, shacl::SOURCE_CONSTRAINT_COMPONENT)),
        );
        let message = raw.display_term(report.first_object(result, shacl::RESULT_MESSAGE));
        let value = raw.display_term(report.first_object(result, shacl::VALUE));
        let path = raw.display_term(report.first_object(result, shacl::RESULT_PATH));
        let focus = report
            .first_object(result, shacl::FOCUS_NODE)
            .map(|t| t.into_owned());

        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        writeln!(out, "{severity} message: {message}")?;
        writeln!(out, "Violation constraint: {constraint}")?;
        writeln!(out, "Violation value: {value}")?;
        writeln!(out, "Property path: {path}")?;
        writeln!(
            out,
            "Focus node: {}",
            raw.display_term(focus.as_ref().map(Term::as_ref))
        )?;
        if let Some(parent) = focus.as_ref().and_then(|focus| parent_node(data, focus)) {
            writeln!(out, "BlankNode parent: {parent}")?;
        }
        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    }
    Ok(())
}

/// Finds a subject referring to the node, preferring the lexicographically
/// smallest so repeated runs print the same parent.
fn parent_node(data: &Graph, focus: &Term) -> Option<String> {
    data.triples_for_object(focus.as_ref())
        .map(|triple| match triple.subject {
            NamedOrBlankNodeRef::NamedNode(n) => n.as_str().to_owned(),
            NamedOrBlankNodeRef::BlankNode(b) => format!("_:{}", b.as_str()),
        })
        .min()
}

fn strip_shacl_namespace(text: &str) -> String {
    text.strip_prefix(shacl::NAMESPACE).unwrap_or(text).to_owned()
}

impl From<InferenceArg> for InferenceMode {
    fn from(arg: InferenceArg) -> Self {
        match arg {
            InferenceArg::None => Self::None,
            InferenceArg::Rdfs => Self::Rdfs,
            InferenceArg::Owlrl => Self::OwlRl,
            InferenceArg::Both => Self::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic_in_result_fn)]

    use super::*;
    use anyhow::Result;
    use assert_cmd::Command;
    use assert_fs::prelude::*;
    use assert_fs::NamedTempFile;
    use oxttl::TurtleParser;
    use predicates::prelude::*;

    fn cli_command() -> Result<Command> {
        let mut command = Command::cargo_bin("spdxrdf")?;
        command.env("NO_COLOR", "1");
        Ok(command)
    }

    fn turtle_file(name: &str, content: &str) -> Result<NamedTempFile> {
        let file = NamedTempFile::new(name)?;
        file.write_str(content)?;
        Ok(file)
    }

    const PREFIXES: &str = "@prefix sh: <http://www.w3.org/ns/shacl#> .\n\
                            @prefix ex: <http://example.com/> .\n\
                            @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\n";

    const PERSON_SHAPES: &str = "\
        ex:PersonShape a sh:NodeShape ;\n\
          sh:targetClass ex:Person ;\n\
          sh:property [\n\
            sh:path ex:name ;\n\
            sh:minCount 1 ;\n\
            sh:datatype xsd:string ;\n\
          ] .\n";

    fn validate_fixture(data: &str) -> Result<(NamedTempFile, NamedTempFile, NamedTempFile, NamedTempFile)> {
        Ok((
            turtle_file("model.ttl", "")?,
            turtle_file("shapes.ttl", &format!("{PREFIXES}{PERSON_SHAPES}"))?,
            turtle_file("data.ttl", &format!("{PREFIXES}{data}"))?,
            turtle_file("prefixes.ttl", PREFIXES)?,
        ))
    }

    fn validate_args(
        command: &mut Command,
        fixture: &(NamedTempFile, NamedTempFile, NamedTempFile, NamedTempFile),
    ) {
        command
            .arg("validate")
            .arg("--model")
            .arg(fixture.0.path())
            .arg("--shapes")
            .arg(fixture.1.path())
            .arg("--data")
            .arg(fixture.2.path())
            .arg("--prefixes")
            .arg(fixture.3.path());
    }

    #[test]
    fn cli_help() -> Result<()> {
        cli_command()?
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::starts_with("SPDX RDF command line toolkit"));
        Ok(())
    }

    #[test]
    fn cli_convert_jsonld_to_turtle() -> Result<()> {
        let input = NamedTempFile::new("input.json")?;
        input.write_str(
            r#"{
                "@context": {"ex": "http://example.com/"},
                "@id": "ex:alice",
                "@type": "ex:Person"
            }"#,
        )?;
        cli_command()?
            .arg("convert")
            .arg(input.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("@prefix ex: <http://example.com/> ."))
            .stdout(predicate::str::contains("ex:alice a ex:Person"));
        Ok(())
    }

    #[test]
    fn cli_convert_missing_file_fails() -> Result<()> {
        cli_command()?
            .arg("convert")
            .arg("no-such-file.json")
            .assert()
            .failure()
            .stderr(predicate::str::contains("no-such-file.json"));
        Ok(())
    }

    #[test]
    fn cli_validate_clean_data() -> Result<()> {
        let fixture = validate_fixture("ex:alice a ex:Person ; ex:name \"Alice\" .\n")?;
        let mut command = cli_command()?;
        validate_args(&mut command, &fixture);
        command
            .assert()
            .success()
            .stdout(predicate::str::contains("No SHACL violations found!"));
        Ok(())
    }

    #[test]
    fn cli_validate_single_violation() -> Result<()> {
        let fixture = validate_fixture("ex:bob a ex:Person .\n")?;
        let mut command = cli_command()?;
        validate_args(&mut command, &fixture);
        command
            .assert()
            .success()
            .stdout(predicate::str::contains("Severity: sh:Violation"))
            .stdout(predicate::str::contains("Focus Node: ex:bob"))
            .stdout(predicate::str::contains("Result Path: ex:name"))
            .stdout(predicate::str::contains("Found 1 SHACL violations!"));
        Ok(())
    }

    #[test]
    fn cli_validate_nested_details_are_indented_and_counted() -> Result<()> {
        let shapes = format!(
            "{PREFIXES}\
             ex:ThingShape a sh:NodeShape ;\n\
               sh:targetClass ex:Thing ;\n\
               sh:property [\n\
                 sh:path ex:value ;\n\
                 sh:or ( [ sh:datatype xsd:string ] [ sh:datatype xsd:integer ] ) ;\n\
               ] .\n"
        );
        let fixture = (
            turtle_file("model.ttl", "")?,
            turtle_file("shapes.ttl", &shapes)?,
            turtle_file("data.ttl", &format!("{PREFIXES}ex:t a ex:Thing ; ex:value 1.5 .\n"))?,
            turtle_file("prefixes.ttl", PREFIXES)?,
        );
        let mut command = cli_command()?;
        validate_args(&mut command, &fixture);
        command
            .assert()
            .success()
            .stdout(predicate::str::contains("\nDetails:\n    Severity: sh:Violation"))
            .stdout(predicate::str::contains("Found 3 SHACL violations!"));
        Ok(())
    }

    #[test]
    fn cli_validate_warning_results_do_not_break_conformance() -> Result<()> {
        let shapes = format!(
            "{PREFIXES}\
             ex:PersonShape a sh:NodeShape ;\n\
               sh:targetClass ex:Person ;\n\
               sh:property [\n\
                 sh:path ex:name ;\n\
                 sh:minCount 1 ;\n\
                 sh:severity sh:Warning ;\n\
               ] .\n"
        );
        let fixture = (
            turtle_file("model.ttl", "")?,
            turtle_file("shapes.ttl", &shapes)?,
            turtle_file("data.ttl", &format!("{PREFIXES}ex:bob a ex:Person .\n"))?,
            turtle_file("prefixes.ttl", PREFIXES)?,
        );
        let mut command = cli_command()?;
        validate_args(&mut command, &fixture);
        command
            .assert()
            .success()
            .stdout(predicate::str::contains("No SHACL violations found!"))
            .stdout(predicate::str::contains("Severity:").not())
            .stdout(predicate::str::contains("Found").not());
        Ok(())
    }

    #[test]
    fn cli_validate_unsupported_path_is_an_engine_failure() -> Result<()> {
        let shapes = format!(
            "{PREFIXES}\
             ex:BadShape a sh:PropertyShape ;\n\
               sh:path [ sh:inversePath ex:parent ] .\n"
        );
        let fixture = (
            turtle_file("model.ttl", "")?,
            turtle_file("shapes.ttl", &shapes)?,
            turtle_file("data.ttl", &format!("{PREFIXES}ex:a a ex:Thing .\n"))?,
            turtle_file("prefixes.ttl", PREFIXES)?,
        );
        let mut command = cli_command()?;
        validate_args(&mut command, &fixture);
        command
            .assert()
            .failure()
            .stdout(predicate::str::contains("SHACL validation failed!"))
            .stdout(predicate::str::contains("Error message: "))
            .stdout(predicate::str::contains("SHACL violations").not());
        Ok(())
    }

    #[test]
    fn cli_validate_inference_banner() -> Result<()> {
        let fixture = validate_fixture("ex:alice a ex:Person ; ex:name \"Alice\" .\n")?;
        let mut command = cli_command()?;
        validate_args(&mut command, &fixture);
        command
            .arg("--inference")
            .arg("rdfs")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Will perform pre-inferencing of type: rdfs",
            ));
        Ok(())
    }

    #[test]
    fn cli_validate_unreachable_model_url_fails() -> Result<()> {
        let fixture = validate_fixture("ex:alice a ex:Person .\n")?;
        cli_command()?
            .arg("validate")
            .arg("--model")
            .arg("http://127.0.0.1:9/spdx-model.ttl")
            .arg("--shapes")
            .arg(fixture.1.path())
            .arg("--data")
            .arg(fixture.2.path())
            .arg("--prefixes")
            .arg(fixture.3.path())
            .assert()
            .failure()
            .stdout(predicate::str::contains("SHACL violations").not());
        Ok(())
    }

    #[test]
    fn cli_validate_missing_data_file_fails() -> Result<()> {
        let fixture = validate_fixture("ex:alice a ex:Person .\n")?;
        cli_command()?
            .arg("validate")
            .arg("--model")
            .arg(fixture.0.path())
            .arg("--shapes")
            .arg(fixture.1.path())
            .arg("--data")
            .arg("no-such-data.ttl")
            .arg("--prefixes")
            .arg(fixture.3.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("no-such-data.ttl"));
        Ok(())
    }

    fn parse(text: &str) -> Graph {
        TurtleParser::new()
            .for_reader(text.as_bytes())
            .collect::<Result<Graph, _>>()
            .unwrap()
    }

    #[test]
    fn flat_blocks_name_the_blank_node_parent() -> Result<()> {
        let data = parse(&format!(
            "{PREFIXES}ex:pkg ex:creationInfo ex:info .\nex:info a ex:CreationInfo .\n"
        ));
        let shapes = parse(&format!(
            "{PREFIXES}\
             ex:Shape a sh:NodeShape ;\n\
               sh:targetClass ex:CreationInfo ;\n\
               sh:property [ sh:path ex:created ; sh:minCount 1 ] .\n"
        ));
        let report = shacleval::validate(&data, &shapes, None, InferenceMode::None)?;
        assert!(!report.conforms());

        let mut out = Vec::new();
        write_flat_results(&mut out, &report.to_graph(), &data)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("Violation message: "));
        assert!(text.contains("Violation constraint: MinCountConstraintComponent"));
        assert!(text.contains("Focus node: http://example.com/info"));
        assert!(text.contains("BlankNode parent: http://example.com/pkg"));
        Ok(())
    }

    #[test]
    fn flat_severity_line_uses_the_bare_severity_name() -> Result<()> {
        let data = parse(&format!("{PREFIXES}ex:bob a ex:Person .\n"));
        let shapes = parse(&format!("{PREFIXES}{PERSON_SHAPES}"));
        let report = shacleval::validate(&data, &shapes, None, InferenceMode::None)?;

        let mut out = Vec::new();
        write_flat_results(&mut out, &report.to_graph(), &data)?;
        let text = String::from_utf8(out)?;
        assert!(text.starts_with(&"-".repeat(SEPARATOR_WIDTH)));
        assert!(text.contains("\nViolation message: "));
        assert!(!text.contains("http://www.w3.org/ns/shacl#Violation message"));
        Ok(())
    }
}
