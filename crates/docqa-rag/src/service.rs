//! Index service: owns the current index and routes queries

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use docqa_core::{
    EmbeddingModel, Error, IndexingConfig, IndexingResult, LLMProvider, QaTemplate, QueryResult,
    Result, RetrievalLlm,
};

use crate::account::{build_account_prompt, normalize_account_summary};
use crate::engine::RetrievalQueryEngine;
use crate::index::VectorIndex;
use crate::loader::DocumentLoader;
use crate::splitter::TextSplitter;

/// Passages retrieved per question when the caller does not say
pub const DEFAULT_TOP_K: usize = 3;

/// A question and how to answer it
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub question: String,
    pub top_k: usize,
    pub template: QaTemplate,
    pub use_retrieval: bool,
}

impl QueryParams {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: DEFAULT_TOP_K,
            template: QaTemplate::Default,
            use_retrieval: true,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_template(mut self, template: QaTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_retrieval(mut self, use_retrieval: bool) -> Self {
        self.use_retrieval = use_retrieval;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(Error::InvalidInput("Question must not be empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidInput("top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Snapshot of what is currently indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStatus {
    pub indexed: bool,
    pub documents: usize,
    pub nodes: usize,
}

/// Builds indexes from uploaded documents and answers questions against the
/// current one.
///
/// The current index is swapped as a whole: builds happen outside the lock, so
/// a concurrent query sees either the previous index or the new one.
pub struct IndexService {
    llm: Arc<dyn LLMProvider>,
    retrieval_llm: RetrievalLlm,
    embed_model: Arc<dyn EmbeddingModel>,
    loader: DocumentLoader,
    splitter: TextSplitter,
    batch_size: usize,
    index: RwLock<Option<Arc<VectorIndex>>>,
}

impl IndexService {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        embed_model: Arc<dyn EmbeddingModel>,
        config: &IndexingConfig,
    ) -> Result<Self> {
        let splitter = TextSplitter::from_config(config)?;
        let retrieval_llm = RetrievalLlm::new(llm.clone());

        Ok(Self {
            llm,
            retrieval_llm,
            embed_model,
            loader: DocumentLoader::new(),
            splitter,
            batch_size: config.batch_size.max(1),
            index: RwLock::new(None),
        })
    }

    /// Answer retrieval queries through `retrieval_llm` instead of the
    /// adapter derived from `llm`
    pub fn with_retrieval_llm(mut self, retrieval_llm: RetrievalLlm) -> Self {
        self.retrieval_llm = retrieval_llm;
        self
    }

    /// Build a fresh index from `directory`, or an empty one for `None`, and
    /// make it current. On failure the previous index stays in place.
    pub async fn create_index(&self, directory: Option<&Path>) -> Result<IndexingResult> {
        let index = match directory {
            Some(dir) => {
                let documents = self.load(dir.to_path_buf()).await?;
                VectorIndex::from_documents(
                    &documents,
                    self.embed_model.clone(),
                    &self.splitter,
                    self.batch_size,
                )
                .await?
            }
            None => VectorIndex::empty(self.embed_model.clone()),
        };

        let documents_processed = index.document_count();
        *self.index.write().await = Some(Arc::new(index));

        info!("Index replaced: {} documents processed", documents_processed);
        Ok(IndexingResult::success(documents_processed))
    }

    async fn load(&self, directory: PathBuf) -> Result<Vec<docqa_core::Document>> {
        let loader = self.loader.clone();
        tokio::task::spawn_blocking(move || loader.load_documents(&directory))
            .await
            .map_err(|e| Error::DocumentLoader(format!("Document loading task failed: {}", e)))?
    }

    /// Answer a question, with or without retrieval
    pub async fn query(&self, params: QueryParams) -> Result<QueryResult> {
        params.validate()?;

        if !params.use_retrieval {
            debug!("Answering without retrieval using the {} template", params.template);
            let prompt = params.template.format("", &params.question);
            let response = self.llm.complete(&prompt).await?;
            return Ok(QueryResult::direct(response));
        }

        let index = self.current_index().await.ok_or(Error::NotIndexed)?;
        if index.is_empty() {
            return Err(Error::NotIndexed);
        }

        let engine = RetrievalQueryEngine::new(
            index,
            self.retrieval_llm.clone(),
            params.template,
            params.top_k,
        );
        engine.query(&params.question).await
    }

    /// Like [`IndexService::query`], with the template given by name
    pub async fn query_with_template_name(
        &self,
        question: &str,
        top_k: Option<usize>,
        template_name: Option<&str>,
        use_retrieval: bool,
    ) -> Result<QueryResult> {
        let template = match template_name {
            Some(name) => name.parse()?,
            None => QaTemplate::Default,
        };

        let params = QueryParams::new(question)
            .with_top_k(top_k.unwrap_or(DEFAULT_TOP_K))
            .with_template(template)
            .with_retrieval(use_retrieval);
        self.query(params).await
    }

    /// Summarize spending from raw transaction records
    pub async fn query_account(&self, transactions: &[Value]) -> Result<String> {
        let prompt = build_account_prompt(transactions)?;
        let response = self.llm.complete(&prompt).await?;
        Ok(normalize_account_summary(&response))
    }

    /// Names of the available QA templates, in registration order
    pub fn templates(&self) -> Vec<&'static str> {
        QaTemplate::names()
    }

    pub async fn index_status(&self) -> IndexStatus {
        match self.current_index().await {
            Some(index) => IndexStatus {
                indexed: true,
                documents: index.document_count(),
                nodes: index.node_count(),
            },
            None => IndexStatus {
                indexed: false,
                documents: 0,
                nodes: 0,
            },
        }
    }

    async fn current_index(&self) -> Option<Arc<VectorIndex>> {
        self.index.read().await.clone()
    }
}

impl std::fmt::Debug for IndexService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexService")
            .field("llm", &self.llm.provider())
            .field("embed_model", &self.embed_model.model_name())
            .field("splitter", &self.splitter)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
