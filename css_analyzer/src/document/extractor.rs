//! Class token extraction from a parsed element tree

use crate::config::constants::document::CLASS_ATTRIBUTE;
use scraper::Html;

/// Class tokens of one document in traversal order
///
/// Elements are visited in pre-order and attributes in source order.
/// Duplicates are kept; deduplication happens in the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<String>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: &str) {
        self.tokens.push(token.to_string());
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tokens
    }
}

impl IntoIterator for TokenStream {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

/// Split a `class` value on runs of ASCII whitespace, dropping empty fields
pub fn split_class_value(value: &str) -> impl Iterator<Item = &str> {
    value.split_ascii_whitespace()
}

/// Collect class tokens from every element of a parsed document
pub fn extract_from_tree(html: &Html) -> TokenStream {
    let mut stream = TokenStream::new();

    for node in html.tree.root().descendants() {
        let Some(element) = node.value().as_element() else {
            continue;
        };

        for (name, value) in element.attrs() {
            if name == CLASS_ATTRIBUTE {
                for token in split_class_value(value) {
                    stream.push(token);
                }
            }
        }
    }

    stream
}

/// Parse and extract an in-memory document
pub fn extract_class_tokens(source: &str) -> TokenStream {
    extract_from_tree(&Html::parse_document(source))
}
