//! Compaction pipeline: collect -> encode, with size statistics.

use kg_core::{CodecConfig, Graph, Result};
use tracing::debug;

use crate::codebook::CodeTable;
use crate::collector::build_code_table;
use crate::decoder::{decode, DecodedGraph};
use crate::encoder::encode;

/// Compaction result with statistics.
#[derive(Debug, Clone)]
pub struct CompactionResult {
    pub output: String,
    pub code_table: CodeTable,
    pub node_count: usize,
    pub link_count: usize,
    /// Length of the JSON the graph came from (or would serialize to).
    pub original_len: usize,
    pub compressed_len: usize,
    pub reduction_pct: f64,
}

impl CompactionResult {
    pub fn term_count(&self) -> usize {
        self.code_table.len()
    }

    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 { return 1.0; }
        self.compressed_len as f64 / self.original_len as f64
    }
}

/// The main graph compactor.
#[derive(Debug, Clone, Default)]
pub struct GraphCompactor {
    config: CodecConfig,
}

impl GraphCompactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compress an in-memory graph. `original_len` is its compact JSON size.
    pub fn compress(&self, graph: &Graph) -> Result<CompactionResult> {
        let original_len = graph.to_json_string(&self.config)?.len();
        self.run(graph, original_len)
    }

    /// Parse a `{"graph": {...}}` document and compress it.
    pub fn compress_json(&self, input: &str) -> Result<CompactionResult> {
        let graph = Graph::from_json_str(input, &self.config)?;
        self.run(&graph, input.len())
    }

    /// Rebuild the graph from a compressed artifact.
    pub fn decompress(&self, text: &str) -> Result<DecodedGraph> {
        decode(text, &self.config)
    }

    fn run(&self, graph: &Graph, original_len: usize) -> Result<CompactionResult> {
        let code_table = build_code_table(graph, self.config.code_prefix)?;
        let output = encode(graph, &code_table, &self.config)?;

        let compressed_len = output.len();
        let reduction = if original_len > 0 {
            (original_len as f64 - compressed_len as f64) / original_len as f64 * 100.0
        } else {
            0.0
        };
        debug!(original_len, compressed_len, reduction, "compacted graph");

        Ok(CompactionResult {
            output,
            code_table,
            node_count: graph.nodes.len(),
            link_count: graph.links.len(),
            original_len,
            compressed_len,
            reduction_pct: reduction,
        })
    }
}
