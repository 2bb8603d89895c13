//! Encoding pass: replace every term with its code and lay out the text artifact.

use kg_core::{AttrValue, CodecConfig, Graph, Link, Node, Result, ValueFold};
use tracing::{debug, trace};

use crate::codebook::{instructions, CodeTable};

/// Fold that renders a value with codes in place of terms.
struct CodeWriter<'a> {
    table: &'a CodeTable,
}

impl ValueFold for CodeWriter<'_> {
    type Output = String;

    fn scalar(&mut self, term: &str) -> Result<String> {
        Ok(self.table.code(term)?.to_string())
    }

    fn key(&mut self, key: &str) -> Result<String> {
        Ok(self.table.code(key)?.to_string())
    }

    fn sequence(&mut self, items: Vec<String>) -> Result<String> {
        Ok(format!("[{}]", items.join(",")))
    }

    fn mapping(&mut self, entries: Vec<(String, String)>) -> Result<String> {
        let pairs: Vec<String> = entries.into_iter().map(|(k, v)| format!("{k}:{v}")).collect();
        Ok(format!("{{{}}}", pairs.join(",")))
    }
}

pub fn encode_value(value: &AttrValue, table: &CodeTable) -> Result<String> {
    value.fold(&mut CodeWriter { table })
}

/// `N|<id>|<key>=<value> <key>=<value> ...`
pub fn encode_node(node: &Node, table: &CodeTable) -> Result<String> {
    let id = table.code(&node.id)?;
    let attrs = node
        .attributes
        .iter()
        .map(|(key, value)| -> Result<String> {
            Ok(format!("{}={}", table.code(key)?, encode_value(value, table)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("N|{id}|{}", attrs.join(" ")))
}

/// `L|<source>|<relation>|<target>`
pub fn encode_link(link: &Link, table: &CodeTable) -> Result<String> {
    Ok(format!(
        "L|{}|{}|{}",
        table.code(&link.source)?,
        table.code(&link.relation)?,
        table.code(&link.target)?
    ))
}

/// Render the full artifact: header, codebook, node lines, link lines.
///
/// Nothing is returned unless every term resolves.
pub fn encode(graph: &Graph, table: &CodeTable, config: &CodecConfig) -> Result<String> {
    let mut lines: Vec<String> = Vec::with_capacity(
        instructions().len() + table.len() + graph.nodes.len() + graph.links.len(),
    );
    if config.include_instructions {
        lines.extend(instructions().iter().map(|l| l.to_string()));
    }
    lines.extend(table.render());
    for node in &graph.nodes {
        let line = encode_node(node, table)?;
        trace!(line = %line, "node");
        lines.push(line);
    }
    for link in &graph.links {
        lines.push(encode_link(link, table)?);
    }
    debug!(lines = lines.len(), codes = table.len(), "encoded graph");
    Ok(lines.join("\n"))
}
