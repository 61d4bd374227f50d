//! Simple Darwin Core parsing.
//!
//! The occurrence API answers with a `SimpleDarwinRecordSet` document. Every
//! `SimpleDarwinRecord` element becomes one [`OccurrenceRecord`], keyed by the
//! local names of its direct children.

use roxmltree::{Document, Node};

use crate::error::Result;
use crate::types::OccurrenceRecord;
use crate::xml::{element_children, find_namespaced, get_raw_text, get_tag_name};

/// Namespace of the Simple Darwin Core record elements.
pub const SIMPLE_DARWIN_CORE_NS: &str = "http://rs.tdwg.org/dwc/xsd/simpledarwincore/";

/// Local name of a record element.
pub const RECORD_TAG: &str = "SimpleDarwinRecord";

/// Parse occurrence records, failing on malformed XML.
pub fn try_parse_records(xml: &str) -> Result<Vec<OccurrenceRecord>> {
    let doc = Document::parse(xml)?;
    Ok(find_namespaced(&doc, SIMPLE_DARWIN_CORE_NS, RECORD_TAG)
        .map(record_from_node)
        .collect())
}

/// Parse occurrence records, treating malformed XML as an empty response.
///
/// The parse error is logged at `warn` level and an empty list is returned.
pub fn parse_records(xml: &str) -> Vec<OccurrenceRecord> {
    try_parse_records(xml).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not parse occurrence XML, treating as empty");
        Vec::new()
    })
}

fn record_from_node(node: Node<'_, '_>) -> OccurrenceRecord {
    element_children(node)
        .map(|child| (get_tag_name(child), get_raw_text(child)))
        .collect()
}
