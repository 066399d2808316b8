//! Table extraction: first cell is the question, second cell the answer.

use super::{Extractor, RawPair};
use crate::dom::Document;

#[derive(Debug, Clone, Copy, Default)]
pub struct TableExtractor;

impl Extractor for TableExtractor {
    fn name(&self) -> &'static str {
        "table"
    }

    fn extract(&self, document: &Document, _source_url: &str) -> Vec<RawPair> {
        let mut pairs = Vec::new();
        for table in document.elements_named(&["table"]) {
            for row in table.descendants_named(&["tr"]) {
                let cells = row.descendants_named(&["td", "th"]);
                if let [question, answer, ..] = cells.as_slice() {
                    pairs.push(RawPair::new(&question.text(), &answer.text()));
                }
            }
        }
        pairs
    }
}
