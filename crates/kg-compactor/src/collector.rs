//! Term collection pass: every distinct literal that the encoder will emit.

use std::collections::BTreeSet;

use kg_core::{Graph, Result, ValueFold};
use tracing::debug;

use crate::codebook::CodeTable;

/// Fold that records every key and leaf term it is handed.
struct TermSink<'a> {
    terms: &'a mut BTreeSet<String>,
}

impl TermSink<'_> {
    fn add(&mut self, term: &str) {
        if !self.terms.contains(term) {
            self.terms.insert(term.to_string());
        }
    }
}

impl ValueFold for TermSink<'_> {
    type Output = ();

    fn scalar(&mut self, term: &str) -> Result<()> {
        self.add(term);
        Ok(())
    }

    fn key(&mut self, key: &str) -> Result<()> {
        self.add(key);
        Ok(())
    }

    fn sequence(&mut self, _items: Vec<()>) -> Result<()> {
        Ok(())
    }

    fn mapping(&mut self, _entries: Vec<((), ())>) -> Result<()> {
        Ok(())
    }
}

/// Collect identifiers, attribute keys, leaf values and link fields.
///
/// The identifier key itself is not collected: it never appears in the body.
pub fn collect_terms(graph: &Graph) -> Result<BTreeSet<String>> {
    let mut terms = BTreeSet::new();
    let mut sink = TermSink { terms: &mut terms };
    for node in &graph.nodes {
        sink.add(&node.id);
        for (key, value) in &node.attributes {
            sink.add(key);
            value.fold(&mut sink)?;
        }
    }
    for link in &graph.links {
        sink.add(&link.source);
        sink.add(&link.relation);
        sink.add(&link.target);
    }
    debug!(nodes = graph.nodes.len(), links = graph.links.len(), terms = terms.len(), "collected terms");
    Ok(terms)
}

/// Collect and rank all terms of `graph`.
pub fn build_code_table(graph: &Graph, prefix: char) -> Result<CodeTable> {
    Ok(CodeTable::from_terms(collect_terms(graph)?, prefix))
}
