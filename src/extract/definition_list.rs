//! Definition-list extraction: the i-th `dt` of a `dl` pairs with its i-th `dd`.

use super::{Extractor, RawPair};
use crate::dom::Document;

#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionListExtractor;

impl Extractor for DefinitionListExtractor {
    fn name(&self) -> &'static str {
        "definition_list"
    }

    fn extract(&self, document: &Document, _source_url: &str) -> Vec<RawPair> {
        let mut pairs = Vec::new();
        for list in document.elements_named(&["dl"]) {
            let terms = list.descendants_named(&["dt"]);
            let definitions = list.descendants_named(&["dd"]);
            pairs.extend(
                terms
                    .iter()
                    .zip(definitions.iter())
                    .map(|(term, definition)| RawPair::new(&term.text(), &definition.text())),
            );
        }
        pairs
    }
}
