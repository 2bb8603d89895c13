//! JSON boundary: `{"graph": {"nodes": [...], "links": [...]}}` <-> [`Graph`].
//!
//! An empty `graph_key` means the document itself holds `nodes` and `links`.

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::CodecConfig;
use crate::error::{KgError, Result};
use crate::types::{AttrValue, Graph, Link, Node, Scalar};

impl Graph {
    pub fn from_json_str(input: &str, config: &CodecConfig) -> Result<Self> {
        let doc: Value = serde_json::from_str(input)?;
        Self::from_json_value(&doc, config)
    }

    pub fn from_json_value(doc: &Value, config: &CodecConfig) -> Result<Self> {
        let graph = if config.graph_key.is_empty() {
            doc
        } else {
            doc.get(&config.graph_key).ok_or_else(|| KgError::MissingField {
                field: config.graph_key.clone(),
                context: "document".into(),
            })?
        };
        let graph = graph
            .as_object()
            .ok_or_else(|| KgError::InvalidShape("graph is not an object".into()))?;

        let nodes = array_field(graph, &config.nodes_key)?
            .iter()
            .enumerate()
            .map(|(i, v)| node_from_json(i, v, config))
            .collect::<Result<Vec<_>>>()?;
        let links = array_field(graph, &config.links_key)?
            .iter()
            .enumerate()
            .map(|(i, v)| link_from_json(i, v, config))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { nodes, links })
    }

    pub fn to_json_value(&self, config: &CodecConfig) -> Value {
        let nodes = self
            .nodes
            .iter()
            .map(|node| {
                let mut obj = Map::new();
                obj.insert(config.id_field.clone(), Value::String(node.id.clone()));
                for (key, value) in &node.attributes {
                    obj.insert(key.clone(), attr_to_json(value));
                }
                Value::Object(obj)
            })
            .collect();
        let links = self
            .links
            .iter()
            .map(|link| {
                let mut obj = Map::new();
                obj.insert(config.source_field.clone(), Value::String(link.source.clone()));
                obj.insert(config.relation_field.clone(), Value::String(link.relation.clone()));
                obj.insert(config.target_field.clone(), Value::String(link.target.clone()));
                Value::Object(obj)
            })
            .collect();

        let mut graph = Map::new();
        graph.insert(config.nodes_key.clone(), Value::Array(nodes));
        graph.insert(config.links_key.clone(), Value::Array(links));
        if config.graph_key.is_empty() {
            return Value::Object(graph);
        }
        let mut doc = Map::new();
        doc.insert(config.graph_key.clone(), Value::Object(graph));
        Value::Object(doc)
    }

    pub fn to_json_string(&self, config: &CodecConfig) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json_value(config))?)
    }
}

impl From<&Value> for AttrValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect())
            }
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n.clone())),
            Value::String(s) => Self::string(s.clone()),
        }
    }
}

fn scalar_from_json(value: &Value) -> Option<Scalar> {
    match value {
        Value::Null => Some(Scalar::Null),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => Some(Scalar::Number(n.clone())),
        Value::String(s) => Some(Scalar::String(s.clone())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn attr_to_json(value: &AttrValue) -> Value {
    match value {
        AttrValue::Scalar(Scalar::Null) => Value::Null,
        AttrValue::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
        AttrValue::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
        AttrValue::Scalar(Scalar::String(s)) => Value::String(s.clone()),
        AttrValue::Sequence(items) => Value::Array(items.iter().map(attr_to_json).collect()),
        AttrValue::Mapping(entries) => Value::Object(
            entries.iter().map(|(k, v)| (k.clone(), attr_to_json(v))).collect(),
        ),
    }
}

fn array_field<'a>(graph: &'a Map<String, Value>, key: &str) -> Result<&'a Vec<Value>> {
    graph
        .get(key)
        .ok_or_else(|| KgError::MissingField { field: key.into(), context: "graph".into() })?
        .as_array()
        .ok_or_else(|| KgError::InvalidShape(format!("`{key}` is not an array")))
}

/// Identifier and link endpoints must be scalars; they are stringified.
fn scalar_field(obj: &Map<String, Value>, field: &str, context: &str) -> Result<String> {
    let value = obj.get(field).ok_or_else(|| KgError::MissingField {
        field: field.into(),
        context: context.into(),
    })?;
    scalar_from_json(value)
        .map(|s| s.term().into_owned())
        .ok_or_else(|| KgError::InvalidShape(format!("`{field}` in {context} is not a scalar")))
}

fn node_from_json(index: usize, value: &Value, config: &CodecConfig) -> Result<Node> {
    let context = format!("node {index}");
    let obj = value
        .as_object()
        .ok_or_else(|| KgError::InvalidShape(format!("{context} is not an object")))?;
    let id = scalar_field(obj, &config.id_field, &context)?;
    let attributes = obj
        .iter()
        .filter(|(k, _)| **k != config.id_field)
        .map(|(k, v)| (k.clone(), AttrValue::from(v)))
        .collect();
    Ok(Node { id, attributes })
}

fn link_from_json(index: usize, value: &Value, config: &CodecConfig) -> Result<Link> {
    let context = format!("link {index}");
    let obj = value
        .as_object()
        .ok_or_else(|| KgError::InvalidShape(format!("{context} is not an object")))?;
    let link = Link {
        source: scalar_field(obj, &config.source_field, &context)?,
        relation: scalar_field(obj, &config.relation_field, &context)?,
        target: scalar_field(obj, &config.target_field, &context)?,
    };
    let extra = obj.len().saturating_sub(3);
    if extra > 0 {
        warn!(link = index, extra, "ignoring extra link fields");
    }
    Ok(link)
}
