//! Reconstruction of a graph from the compressed text artifact.

use std::collections::HashMap;

use kg_core::{AttrValue, CodecConfig, Graph, KgError, Link, Node, Result};
use tracing::debug;

use crate::codebook::parse_codebook_line;

/// Graph recovered from an artifact. Scalar values come back as strings.
#[derive(Debug, Clone)]
pub struct DecodedGraph {
    pub graph: Graph,
    /// code -> term, as read from the codebook.
    pub codebook: HashMap<String, String>,
}

fn malformed(line: usize, reason: impl Into<String>) -> KgError {
    KgError::MalformedLine { line, reason: reason.into() }
}

fn resolve<'t>(table: &'t HashMap<String, String>, code: &str, line: usize) -> Result<&'t str> {
    table
        .get(code)
        .map(String::as_str)
        .ok_or_else(|| KgError::UnknownCode { code: code.to_string(), line })
}

/// Read the codebook entries, skipping every other line.
pub fn read_codebook(input: &str, prefix: char) -> Result<HashMap<String, String>> {
    let mut table = HashMap::new();
    for (i, raw) in input.lines().enumerate() {
        let Some((code, term)) = parse_codebook_line(raw, prefix) else {
            continue;
        };
        if table.insert(code.clone(), term).is_some() {
            return Err(KgError::DuplicateCode { code, line: i + 1 });
        }
    }
    Ok(table)
}

pub fn decode(input: &str, config: &CodecConfig) -> Result<DecodedGraph> {
    let codebook = read_codebook(input, config.code_prefix)?;
    let mut graph = Graph::new();

    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        if raw.trim().is_empty() || raw.starts_with('#') {
            continue;
        }
        if let Some(rest) = raw.strip_prefix("N|") {
            graph.nodes.push(decode_node(rest, &codebook, line)?);
        } else if let Some(rest) = raw.strip_prefix("L|") {
            graph.links.push(decode_link(rest, &codebook, line)?);
        } else {
            return Err(malformed(line, "expected a comment, node or link line"));
        }
    }

    debug!(nodes = graph.nodes.len(), links = graph.links.len(), codes = codebook.len(), "decoded graph");
    Ok(DecodedGraph { graph, codebook })
}

fn decode_node(rest: &str, table: &HashMap<String, String>, line: usize) -> Result<Node> {
    let (id_code, attrs) = rest
        .split_once('|')
        .ok_or_else(|| malformed(line, "node line needs an attribute section"))?;
    let mut node = Node::new(resolve(table, id_code, line)?);
    for pair in attrs.split_whitespace() {
        let (key_code, value) = pair
            .split_once('=')
            .ok_or_else(|| malformed(line, format!("attribute {pair:?} has no '='")))?;
        let key = resolve(table, key_code, line)?.to_string();
        let value = ValueParser { src: value, pos: 0, line, table }.parse()?;
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn decode_link(rest: &str, table: &HashMap<String, String>, line: usize) -> Result<Link> {
    let parts: Vec<&str> = rest.split('|').collect();
    let [source, relation, target] = parts.as_slice() else {
        return Err(malformed(line, format!("link line has {} fields, expected 3", parts.len())));
    };
    Ok(Link::new(
        resolve(table, source, line)?,
        resolve(table, relation, line)?,
        resolve(table, target, line)?,
    ))
}

/// Recursive-descent parser for `CODE | [VAL,...] | {CODE:VAL,...}`.
struct ValueParser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    table: &'a HashMap<String, String>,
}

impl<'a> ValueParser<'a> {
    fn parse(mut self) -> Result<AttrValue> {
        let value = self.value()?;
        if self.pos != self.src.len() {
            return Err(malformed(
                self.line,
                format!("trailing input {:?} after value", &self.src[self.pos..]),
            ));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn value(&mut self) -> Result<AttrValue> {
        match self.peek() {
            Some('[') => {
                self.bump();
                let mut items = Vec::new();
                if self.peek() == Some(']') {
                    self.bump();
                    return Ok(AttrValue::Sequence(items));
                }
                loop {
                    items.push(self.value()?);
                    match self.bump() {
                        Some(',') => continue,
                        Some(']') => break,
                        other => {
                            return Err(malformed(self.line, format!("expected ',' or ']', found {other:?}")))
                        }
                    }
                }
                Ok(AttrValue::Sequence(items))
            }
            Some('{') => {
                self.bump();
                let mut entries = Vec::new();
                if self.peek() == Some('}') {
                    self.bump();
                    return Ok(AttrValue::Mapping(entries));
                }
                loop {
                    let code = self.code()?;
                    let key = resolve(self.table, code, self.line)?.to_string();
                    if self.bump() != Some(':') {
                        return Err(malformed(self.line, format!("expected ':' after key {code:?}")));
                    }
                    entries.push((key, self.value()?));
                    match self.bump() {
                        Some(',') => continue,
                        Some('}') => break,
                        other => {
                            return Err(malformed(self.line, format!("expected ',' or '}}', found {other:?}")))
                        }
                    }
                }
                Ok(AttrValue::Mapping(entries))
            }
            Some(_) => {
                let code = self.code()?;
                Ok(AttrValue::string(resolve(self.table, code, self.line)?))
            }
            None => Err(malformed(self.line, "unexpected end of value")),
        }
    }

    fn code(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, ',' | ':' | '[' | ']' | '{' | '}') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            return Err(malformed(self.line, format!("expected a code at offset {start}")));
        }
        Ok(&self.src[start..self.pos])
    }
}
