//! Retrieval query engine

use std::sync::Arc;
use tracing::debug;

use docqa_core::{QaTemplate, QueryResult, Result, RetrievalLlm, SourceNode};

use crate::index::VectorIndex;

/// Answer returned when retrieval finds nothing to synthesize from
pub const EMPTY_RESPONSE: &str = "Empty Response";

/// Answers questions against one index snapshot: retrieve, fill the template,
/// then synthesize with the retrieval LLM.
#[derive(Debug, Clone)]
pub struct RetrievalQueryEngine {
    index: Arc<VectorIndex>,
    llm: RetrievalLlm,
    template: QaTemplate,
    top_k: usize,
}

impl RetrievalQueryEngine {
    pub fn new(index: Arc<VectorIndex>, llm: RetrievalLlm, template: QaTemplate, top_k: usize) -> Self {
        Self {
            index,
            llm,
            template,
            top_k,
        }
    }

    pub async fn query(&self, question: &str) -> Result<QueryResult> {
        let source_nodes = self.index.retrieve(question, self.top_k).await?;
        debug!("Retrieved {} nodes for top_k={}", source_nodes.len(), self.top_k);

        if source_nodes.is_empty() {
            return Ok(QueryResult {
                response: EMPTY_RESPONSE.to_string(),
                source_nodes,
            });
        }

        let context = build_context(&source_nodes);
        let prompt = self.template.format(&context, question);
        let response = self.llm.answer(&prompt).await?;

        Ok(QueryResult {
            response,
            source_nodes,
        })
    }

    pub fn template(&self) -> QaTemplate {
        self.template
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

/// Join retrieved passages into the context block, best first
pub fn build_context(nodes: &[SourceNode]) -> String {
    nodes
        .iter()
        .map(|node| node.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}
