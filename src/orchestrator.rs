//! Per-document annotation run.
//!
//! ```text
//! Init -> PreconditionsChecked -> GranularitySwitched -> EngineInvoked
//!      -> ResultsMapped -> GranularityRestored -> Done
//!
//! Init -> Skipped                          (document has no sentences)
//! EngineInvoked -> Error -> GranularityRestored -> Err(..)
//! GranularitySwitched -> GranularityRestored -> Err(EngineBusy)   (try_annotate)
//! ```
//!
//! Token tags are switched through a [`GranularityGuard`], so they are
//! restored exactly once whether the run succeeds, the engine fails, or the
//! engine panics. The engine lock is held only around the engine call.
//!
//! Canonical indices are staged while the whole document is resolved and
//! committed afterwards. A failed run commits nothing, and the document's
//! coref mentions and chains are rolled back to what they were before the
//! engine ran.

use crate::bridge::MentionIndexBridge;
use crate::config::CorefLinkConfig;
use crate::engine::{ClusteringEngine, SharedEngine};
use crate::granularity::GranularityGuard;
use crate::links::links_for;
use crate::resolver::CanonicalMentionResolver;
use crate::{Error, Result};
use coreflink_core::{Document, Link};
use serde::Serialize;

/// Where an annotation run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnnotationState {
    /// Nothing done yet.
    Init,
    /// The document has sentences to work on.
    PreconditionsChecked,
    /// Token tags switched to the configured granularity.
    GranularitySwitched,
    /// The clustering engine returned.
    EngineInvoked,
    /// Canonical indices committed and links derived.
    ResultsMapped,
    /// Token tags restored.
    GranularityRestored,
    /// Finished.
    Done,
    /// Finished without running: no sentences.
    Skipped,
    /// The clustering engine failed.
    Error,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    /// `Done`, or `Skipped` when the document had no sentences.
    pub state: AnnotationState,
    /// Engine name; `None` when the engine was not invoked.
    pub engine: Option<String>,
    /// Entity mentions that received a canonical index in this run.
    pub annotated: usize,
    /// Entity mentions that lacked one and still lack one.
    pub unresolved: usize,
    /// Chain links, if configured.
    pub links: Vec<Link>,
}

impl AnnotationReport {
    fn skipped() -> Self {
        Self {
            state: AnnotationState::Skipped,
            engine: None,
            annotated: 0,
            unresolved: 0,
            links: Vec::new(),
        }
    }

    /// Check if the run short-circuited.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.state == AnnotationState::Skipped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acquire {
    Block,
    Try,
}

/// Runs the clustering engine over documents and attaches canonical mentions.
///
/// # Example
///
/// ```rust
/// use coreflink::{AnnotationOrchestrator, CorefLinkConfig, MockEngine, SharedEngine};
/// use coreflink_core::Document;
///
/// let orchestrator = AnnotationOrchestrator::new(
///     SharedEngine::new(MockEngine::new("mock")),
///     CorefLinkConfig::default(),
/// );
///
/// // No sentences: nothing to do, not an error.
/// let report = orchestrator.annotate(&mut Document::new()).unwrap();
/// assert!(report.is_skipped());
/// ```
#[derive(Debug, Clone)]
pub struct AnnotationOrchestrator<E> {
    engine: SharedEngine<E>,
    config: CorefLinkConfig,
    resolver: CanonicalMentionResolver,
}

impl<E: ClusteringEngine> AnnotationOrchestrator<E> {
    /// Create an orchestrator around a shared engine.
    #[must_use]
    pub fn new(engine: SharedEngine<E>, config: CorefLinkConfig) -> Self {
        Self {
            engine,
            config,
            resolver: CanonicalMentionResolver,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CorefLinkConfig {
        &self.config
    }

    /// The shared engine handle.
    #[must_use]
    pub fn engine(&self) -> &SharedEngine<E> {
        &self.engine
    }

    /// Annotate one document, waiting for the engine if another caller holds it.
    pub fn annotate(&self, document: &mut Document) -> Result<AnnotationReport> {
        self.run(document, Acquire::Block)
    }

    /// Annotate one document, failing with [`Error::EngineBusy`] instead of
    /// waiting. Token tags are restored before the error is returned.
    pub fn try_annotate(&self, document: &mut Document) -> Result<AnnotationReport> {
        self.run(document, Acquire::Try)
    }

    /// Annotate documents independently, one result per document.
    ///
    /// With the `parallel` feature documents are processed on the rayon pool;
    /// engine calls are still serialized by the shared lock.
    pub fn annotate_all(&self, documents: &mut [Document]) -> Vec<Result<AnnotationReport>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            documents.par_iter_mut().map(|d| self.annotate(d)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            documents.iter_mut().map(|d| self.annotate(d)).collect()
        }
    }

    fn run(&self, document: &mut Document, acquire: Acquire) -> Result<AnnotationReport> {
        let label = document.id.clone().unwrap_or_else(|| "<unnamed>".to_string());
        self.run_traced(document, acquire, &mut Progress::new(label))
    }

    fn run_traced(
        &self,
        document: &mut Document,
        acquire: Acquire,
        progress: &mut Progress,
    ) -> Result<AnnotationReport> {
        if document.sentences.is_none() {
            progress.advance(AnnotationState::Skipped);
            return Ok(AnnotationReport::skipped());
        }
        progress.advance(AnnotationState::PreconditionsChecked);
        log::debug!("document {}: {} tokens", progress.label, document.token_count());

        let outcome = {
            let mut guard = GranularityGuard::new(document, self.config.granularity);
            progress.advance(AnnotationState::GranularitySwitched);
            let outcome = self.cluster_and_map(&mut guard, progress, acquire);
            drop(guard);
            progress.advance(AnnotationState::GranularityRestored);
            outcome
        };

        match outcome {
            Ok(report) => {
                progress.advance(AnnotationState::Done);
                Ok(report)
            }
            Err(e) => {
                log::warn!("document {}: annotation failed: {}", progress.label, e);
                Err(e)
            }
        }
    }

    /// Everything that happens while tags are switched.
    fn cluster_and_map(
        &self,
        document: &mut Document,
        progress: &mut Progress,
        acquire: Acquire,
    ) -> Result<AnnotationReport> {
        let saved_mentions = document.coref_mentions.clone();
        let saved_chains = document.coref_chains.clone();

        let (engine_name, result) = {
            let mut engine = match acquire {
                Acquire::Block => self.engine.lock(),
                Acquire::Try => self.engine.try_lock()?,
            };
            let name = engine.name();
            (name, engine.cluster(document))
        };

        progress.advance(AnnotationState::EngineInvoked);
        if let Err(e) = result {
            progress.advance(AnnotationState::Error);
            document.coref_mentions = saved_mentions;
            document.coref_chains = saved_chains;
            return Err(match e {
                e @ Error::Engine { .. } => e,
                other => Error::engine(engine_name, other.to_string()),
            });
        }

        if self.config.remove_singletons {
            if let Some(chains) = document.coref_chains.as_mut() {
                chains.retain(|_, chain| {
                    chain
                        .as_ref()
                        .map_or(false, |c| !c.is_empty() && !c.is_singleton())
                });
            }
        }

        let (annotated, unresolved) = self.map_canonical(document);
        let links = if self.config.compute_links {
            links_for(document)
        } else {
            Vec::new()
        };
        progress.advance(AnnotationState::ResultsMapped);
        log::info!(
            "document {}: {} canonical mentions attached, {} unresolved, {} links",
            progress.label,
            annotated,
            unresolved,
            links.len()
        );

        Ok(AnnotationReport {
            state: AnnotationState::Done,
            engine: Some(engine_name.to_string()),
            annotated,
            unresolved,
            links,
        })
    }

    /// Resolve every unannotated entity mention, then commit all at once.
    fn map_canonical(&self, document: &mut Document) -> (usize, usize) {
        let view: &Document = document;
        if MentionIndexBridge::for_document(view).is_empty() {
            log::debug!("no usable index bridge entries; no mention can be resolved");
        }
        let staged: Vec<(usize, Option<usize>)> = match view.entity_mentions.as_ref() {
            None => return (0, 0),
            Some(mentions) => mentions
                .iter()
                .enumerate()
                .filter(|(_, m)| m.canonical_index().is_none())
                .map(|(i, m)| {
                    let canonical = self
                        .resolver
                        .resolve_candidate(m, view)
                        .map(|c| c.canonical_index());
                    (i, canonical)
                })
                .collect(),
        };

        let mut annotated = 0usize;
        let mut unresolved = 0usize;
        if let Some(mentions) = document.entity_mentions.as_mut() {
            for (i, canonical) in staged {
                let committed = match (mentions.get_mut(i), canonical) {
                    (Some(mention), Some(index)) => mention.set_canonical_index(index),
                    _ => false,
                };
                if committed {
                    annotated += 1;
                } else {
                    unresolved += 1;
                }
            }
        }
        (annotated, unresolved)
    }
}

/// States a run has passed through.
struct Progress {
    label: String,
    state: AnnotationState,
    history: Vec<AnnotationState>,
}

impl Progress {
    fn new(label: String) -> Self {
        Self {
            label,
            state: AnnotationState::Init,
            history: vec![AnnotationState::Init],
        }
    }

    fn advance(&mut self, next: AnnotationState) {
        log::debug!("document {}: {:?} -> {:?}", self.label, self.state, next);
        self.state = next;
        self.history.push(next);
    }
}
