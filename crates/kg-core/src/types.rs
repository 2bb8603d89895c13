use std::borrow::Cow;

use serde_json::Number;

use crate::error::Result;

/// Leaf attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// String form used as the term for this value.
    ///
    /// Distinct values with the same rendering (`1` and `"1"`) share a term.
    pub fn term(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed("null"),
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::String(s) => Cow::Borrowed(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Attribute value: a scalar, a sequence, or an ordered mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Scalar(Scalar),
    Sequence(Vec<AttrValue>),
    Mapping(Vec<(String, AttrValue)>),
}

impl AttrValue {
    pub fn string(s: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(s.into()))
    }

    /// Walk the value bottom-up, handing every key, leaf and container to `folder`.
    ///
    /// Both codec passes go through here so they always visit the same tokens.
    pub fn fold<F: ValueFold>(&self, folder: &mut F) -> Result<F::Output> {
        match self {
            Self::Scalar(s) => folder.scalar(&s.term()),
            Self::Sequence(items) => {
                let folded = items
                    .iter()
                    .map(|item| item.fold(folder))
                    .collect::<Result<Vec<_>>>()?;
                folder.sequence(folded)
            }
            Self::Mapping(entries) => {
                let mut folded = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let k = folder.key(key)?;
                    let v = value.fold(folder)?;
                    folded.push((k, v));
                }
                folder.mapping(folded)
            }
        }
    }

    /// Same value with every scalar replaced by its string form.
    pub fn coerced(&self) -> Self {
        match self {
            Self::Scalar(s) => Self::string(s.term().into_owned()),
            Self::Sequence(items) => Self::Sequence(items.iter().map(Self::coerced).collect()),
            Self::Mapping(entries) => Self::Mapping(
                entries.iter().map(|(k, v)| (k.clone(), v.coerced())).collect(),
            ),
        }
    }
}

/// Callbacks for [`AttrValue::fold`].
pub trait ValueFold {
    type Output;

    /// A leaf, already coerced to its term.
    fn scalar(&mut self, term: &str) -> Result<Self::Output>;

    /// A mapping key.
    fn key(&mut self, key: &str) -> Result<Self::Output>;

    fn sequence(&mut self, items: Vec<Self::Output>) -> Result<Self::Output>;

    fn mapping(&mut self, entries: Vec<(Self::Output, Self::Output)>) -> Result<Self::Output>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    /// Every attribute except the identifier, in source order.
    pub attributes: Vec<(String, AttrValue)>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), attributes: Vec::new() }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.push((key.into(), value));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub source: String,
    pub relation: String,
    pub target: String,
}

impl Link {
    pub fn new(
        source: impl Into<String>,
        relation: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            relation: relation.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Copy of the graph with all scalar attribute values stringified,
    /// i.e. what a decoder can give back.
    pub fn coerced(&self) -> Self {
        Self {
            nodes: self
                .nodes
                .iter()
                .map(|n| Node {
                    id: n.id.clone(),
                    attributes: n.attributes.iter().map(|(k, v)| (k.clone(), v.coerced())).collect(),
                })
                .collect(),
            links: self.links.clone(),
        }
    }
}
