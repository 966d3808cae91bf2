//! The clustering engine boundary.
//!
//! The clustering algorithm itself lives outside this crate. An engine reads a
//! document (tokens, primary NER tags, entity mentions) and writes coref
//! mentions and chains back into it. Engines may keep process-wide state such
//! as cached lexical resources, so they are shared through an explicitly
//! injected, explicitly locked [`SharedEngine`] handle instead of a global.

use crate::sync::{self, Mutex, MutexGuard};
use crate::{Error, Result};
use coreflink_core::{CorefChain, CorefMention, Document, MentionPosition};
use std::fmt;
use std::sync::Arc;

/// A coreference clustering engine.
pub trait ClusteringEngine: Send {
    /// Cluster the document's mentions, writing `coref_mentions` and
    /// `coref_chains` (and, if the engine owns them, the index maps).
    fn cluster(&mut self, document: &mut Document) -> Result<()>;

    /// Engine name, used in logs and error messages.
    fn name(&self) -> &'static str {
        "unknown"
    }
}

// =============================================================================
// SharedEngine
// =============================================================================

/// Handle to an engine shared between callers.
///
/// Cloning shares the same engine. Each engine call holds the lock for
/// exactly its own duration, so calls from different documents never
/// overlap inside the engine.
pub struct SharedEngine<E> {
    inner: Arc<Mutex<E>>,
}

impl<E: ClusteringEngine> SharedEngine<E> {
    /// Wrap an engine.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Block until the engine is free and take it.
    pub fn lock(&self) -> MutexGuard<'_, E> {
        sync::lock(&self.inner)
    }

    /// Take the engine only if nobody else holds it.
    pub fn try_lock(&self) -> Result<MutexGuard<'_, E>> {
        sync::try_lock(&self.inner)
    }
}

impl<E> Clone for SharedEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for SharedEngine<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEngine")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}

// =============================================================================
// PrecomputedEngine
// =============================================================================

/// Accepts the clusters a document already carries.
///
/// For documents clustered upstream (e.g. loaded from JSON). If chains are
/// present but the coref mention list is not, the list is filled from the
/// chain members so mention lookups by ID work.
///
/// Chains are checked first: a member filed under another cluster, or with
/// an inverted span, fails the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecomputedEngine;

impl PrecomputedEngine {
    fn check_chain(chain: &CorefChain) -> coreflink_core::Result<()> {
        for m in &chain.mentions {
            if m.cluster_id != chain.cluster_id {
                return Err(coreflink_core::Error::invalid_input(format!(
                    "mention {} has cluster {} but sits in chain {}",
                    m.mention_id, m.cluster_id, chain.cluster_id
                )));
            }
            let p = m.position;
            MentionPosition::try_new(p.sentence, p.start, p.end)?;
        }
        Ok(())
    }
}

impl ClusteringEngine for PrecomputedEngine {
    fn cluster(&mut self, document: &mut Document) -> Result<()> {
        for chain in document.coref_chains.iter().flat_map(|c| c.values().flatten()) {
            Self::check_chain(chain)?;
        }
        if document.coref_mentions.is_some() {
            return Ok(());
        }
        let Some(chains) = document.coref_chains.as_ref() else {
            return Ok(());
        };
        let mentions: Vec<CorefMention> = chains
            .values()
            .flatten()
            .flat_map(|c| c.mentions.iter().cloned())
            .collect();
        log::debug!("filled {} coref mentions from chains", mentions.len());
        document.coref_mentions = Some(mentions);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "precomputed"
    }
}

// =============================================================================
// MockEngine
// =============================================================================

/// Engine test double.
///
/// Writes preset mentions and chains, or fails with a preset message. Records
/// the primary NER tags it saw on each call.
///
/// ```rust
/// use coreflink::engine::{ClusteringEngine, MockEngine};
/// use coreflink_core::Document;
///
/// let mut engine = MockEngine::new("mock").failing("model not loaded");
/// let mut doc = Document::new();
/// assert!(engine.cluster(&mut doc).is_err());
/// assert_eq!(engine.calls(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    name: &'static str,
    mentions: Vec<CorefMention>,
    chains: Vec<CorefChain>,
    failure: Option<String>,
    write_before_failing: bool,
    calls: usize,
    seen_tags: Vec<Vec<Option<String>>>,
}

impl MockEngine {
    /// Create a mock engine that writes nothing and succeeds.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Coref mentions to write.
    #[must_use]
    pub fn with_mentions(mut self, mentions: Vec<CorefMention>) -> Self {
        self.mentions = mentions;
        self
    }

    /// Chains to write.
    #[must_use]
    pub fn with_chains(mut self, chains: Vec<CorefChain>) -> Self {
        self.chains = chains;
        self
    }

    /// Fail every call with `message`.
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// When failing, write the preset output first (a mid-run failure).
    #[must_use]
    pub fn writes_before_failing(mut self) -> Self {
        self.write_before_failing = true;
        self
    }

    /// Number of `cluster` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Primary NER tags observed on each call, flattened across sentences.
    #[must_use]
    pub fn seen_tags(&self) -> &[Vec<Option<String>>] {
        &self.seen_tags
    }

    fn write(&self, document: &mut Document) {
        if !self.mentions.is_empty() {
            document.coref_mentions = Some(self.mentions.clone());
        }
        if !self.chains.is_empty() {
            document.coref_chains = Some(
                self.chains
                    .iter()
                    .map(|c| (c.cluster_id, Some(c.clone())))
                    .collect(),
            );
        }
    }
}

impl ClusteringEngine for MockEngine {
    fn cluster(&mut self, document: &mut Document) -> Result<()> {
        self.calls += 1;
        self.seen_tags.push(
            document
                .sentences
                .iter()
                .flatten()
                .flat_map(|s| s.tokens.iter().flatten())
                .map(|t| t.ner.clone())
                .collect(),
        );

        match &self.failure {
            Some(message) => {
                if self.write_before_failing {
                    self.write(document);
                }
                Err(Error::engine(self.name, message.clone()))
            }
            None => {
                self.write(document);
                Ok(())
            }
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
