//! Per-file work: read, parse and extract class tokens

pub mod extractor;
pub mod parser;

pub use extractor::{extract_class_tokens, extract_from_tree, split_class_value, TokenStream};
pub use parser::DocumentParser;

use crate::error::DocumentError;
use std::path::Path;

/// Read, parse and extract one file
///
/// The parse tree lives only for the duration of this call.
pub fn extract_file(parser: &DocumentParser, path: &Path) -> Result<TokenStream, DocumentError> {
    let html = parser.parse_file(path)?;
    Ok(extract_from_tree(&html))
}
