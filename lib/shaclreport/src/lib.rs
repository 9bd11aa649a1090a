#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]

mod error;
mod prefixes;
mod query;
mod render;
pub mod vocab;

pub use error::RenderError;
pub use prefixes::PrefixMap;
pub use query::GraphQueryExt;
pub use render::{top_level_results, write_report, write_results, INDENT_STEP, SEPARATOR_WIDTH};
