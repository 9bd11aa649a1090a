use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

/// The published SPDX 3.0.1 model in Turtle.
pub const SPDX_MODEL_URL: &str = "https://spdx.github.io/spdx-spec/v3.0.1/rdf/spdx-model.ttl";

#[derive(Parser)]
#[command(about, version, name = "spdxrdf")]
/// SPDX RDF command line toolkit
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a JSON-LD document to Turtle on stdout
    ///
    /// The output is syntax highlighted when stdout is a terminal.
    Convert {
        /// JSON-LD file to convert
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
    /// Validate SPDX data against SHACL shapes and walk the report
    ///
    /// The model, shapes and data graphs are each parsed together with the
    /// prefixes file, so the inputs can use the shared prefix declarations
    /// without repeating them.
    Validate {
        /// URL of or path to the SPDX model in Turtle
        #[arg(short, long, default_value = SPDX_MODEL_URL, value_hint = ValueHint::Url)]
        model: String,
        /// Path to the SHACL shapes
        #[arg(short, long, default_value = "shapes.ttl", value_hint = ValueHint::FilePath)]
        shapes: PathBuf,
        /// Path to the data to validate
        #[arg(short, long, default_value = "data.ttl", value_hint = ValueHint::FilePath)]
        data: PathBuf,
        /// Path to shared prefix declarations
        #[arg(short, long, default_value = "prefixes.ttl", value_hint = ValueHint::FilePath)]
        prefixes: PathBuf,
        /// Entailment rules to materialize before validation
        #[arg(short, long, value_enum, default_value = "none")]
        inference: InferenceArg,
    },
    /// Validate data against shapes and print one block per result
    ///
    /// The published SPDX model is always layered under the given shapes
    /// before validation.
    Check {
        /// Path to the SHACL shapes
        #[arg(short, long, default_value = "shapes.ttl", value_hint = ValueHint::FilePath)]
        shapes: PathBuf,
        /// Path to the data to validate
        #[arg(short, long, default_value = "data.ttl", value_hint = ValueHint::FilePath)]
        data: PathBuf,
    },
}

/// Pre-inferencing mode.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InferenceArg {
    /// Validate the data as given
    None,
    /// RDFS entailment
    Rdfs,
    /// OWL-RL entailment
    Owlrl,
    /// RDFS and OWL-RL together
    Both,
}
