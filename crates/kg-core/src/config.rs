use serde::{Deserialize, Serialize};

use crate::error::{KgError, Result};

/// Characters with a fixed meaning in the compressed line grammar.
pub const RESERVED_CHARS: &[char] = &['|', '#', ':', '=', '[', ']', '{', '}', ','];

/// Field names and code format shared by the encoder and decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub code_prefix: char,
    pub id_field: String,
    pub source_field: String,
    pub relation_field: String,
    pub target_field: String,
    pub graph_key: String,
    pub nodes_key: String,
    pub links_key: String,
    /// Emit the explanatory comment block ahead of the codebook.
    pub include_instructions: bool,
}

impl CodecConfig {
    pub fn with_code_prefix(mut self, prefix: char) -> Self {
        self.code_prefix = prefix;
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn with_link_fields(
        mut self,
        source: impl Into<String>,
        relation: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.source_field = source.into();
        self.relation_field = relation.into();
        self.target_field = target.into();
        self
    }

    pub fn with_instructions(mut self, include: bool) -> Self {
        self.include_instructions = include;
        self
    }

    /// Reject settings that would make the output ambiguous to parse.
    pub fn validate(&self) -> Result<()> {
        let p = self.code_prefix;
        if p.is_ascii_digit() || p.is_whitespace() || RESERVED_CHARS.contains(&p) {
            return Err(KgError::InvalidConfig(format!(
                "code prefix {p:?} collides with the line grammar"
            )));
        }
        for (name, value) in [
            ("id_field", &self.id_field),
            ("source_field", &self.source_field),
            ("relation_field", &self.relation_field),
            ("target_field", &self.target_field),
            ("nodes_key", &self.nodes_key),
            ("links_key", &self.links_key),
        ] {
            if value.is_empty() {
                return Err(KgError::InvalidConfig(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            code_prefix: 'T',
            id_field: "id".into(),
            source_field: "source".into(),
            relation_field: "relation".into(),
            target_field: "target".into(),
            graph_key: "graph".into(),
            nodes_key: "nodes".into(),
            links_key: "links".into(),
            include_instructions: true,
        }
    }
}
