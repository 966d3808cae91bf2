//! # coreflink
//!
//! Canonical mentions and chain links on top of a coreference clustering engine.
//!
//! Given entity mentions from an NER pipeline, clusters from an external
//! coreference engine, and the (partial) index maps between the two mention
//! families, coreflink:
//!
//! - picks one **canonical entity mention** per cluster (longest surface text)
//!   and attaches its index to every coreferent entity mention,
//! - derives **links**: (representative, member) position pairs for each chain,
//! - wraps the engine call in a **granularity switch** that shows the engine
//!   fine or coarse NER tags and always restores the original ones.
//!
//! Missing or partial collaborator data never produces an error. The only
//! failure a caller sees is the engine's, reported once after token tags are
//! restored.
//!
//! ## Quick Start
//!
//! ```rust
//! use coreflink::prelude::*;
//! use coreflink_core::{CorefChain, CorefMention, Document, EntityMention, MentionPosition, Sentence, Token};
//!
//! let john = CorefMention::new(100, 1, MentionPosition::new(0, 0, 1));
//! let smith = CorefMention::new(101, 1, MentionPosition::new(1, 0, 2));
//! let engine = MockEngine::new("mock")
//!     .with_mentions(vec![john.clone(), smith.clone()])
//!     .with_chains(vec![CorefChain::new(1, vec![john.clone(), smith]).with_representative(john)]);
//!
//! let mut doc = Document::new()
//!     .with_sentences(vec![
//!         Sentence::new(vec![Token::new("John")]),
//!         Sentence::new(vec![Token::new("John"), Token::new("Smith")]),
//!     ])
//!     .with_entity_mentions(vec![
//!         EntityMention::new(0, "John", MentionPosition::new(0, 0, 1)),
//!         EntityMention::new(1, "John Smith", MentionPosition::new(1, 0, 2)),
//!     ])
//!     .with_entity_to_coref([(0, Some(100)), (1, Some(101))].into_iter().collect())
//!     .with_coref_to_entity([(100, Some(0)), (101, Some(1))].into_iter().collect());
//!
//! let orchestrator = AnnotationOrchestrator::new(SharedEngine::new(engine), CorefLinkConfig::default());
//! let report = orchestrator.annotate(&mut doc)?;
//!
//! assert_eq!(report.annotated, 2);
//! assert_eq!(doc.entity_mention(0).and_then(|m| m.canonical_index()), Some(1));
//! # Ok::<(), coreflink::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): the `coreflink` binary
//! - `fast-lock`: `parking_lot` mutex for the shared engine
//! - `parallel`: `annotate_all` on the rayon pool

#![warn(missing_docs)]

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod granularity;
pub mod links;
pub mod orchestrator;
pub mod resolver;
pub mod sync;

pub use bridge::MentionIndexBridge;
pub use config::CorefLinkConfig;
pub use engine::{ClusteringEngine, MockEngine, PrecomputedEngine, SharedEngine};
pub use error::{Error, Result};
pub use granularity::{GranularityGuard, NerGranularity};
pub use links::{chain_links, get_links, links_for};
pub use orchestrator::{AnnotationOrchestrator, AnnotationReport, AnnotationState};
pub use resolver::CanonicalMentionResolver;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    pub use crate::config::CorefLinkConfig;
    pub use crate::engine::{ClusteringEngine, MockEngine, PrecomputedEngine, SharedEngine};
    pub use crate::error::{Error, Result};
    pub use crate::granularity::NerGranularity;
    pub use crate::links::{get_links, links_for};
    pub use crate::orchestrator::{AnnotationOrchestrator, AnnotationReport, AnnotationState};
    pub use crate::resolver::CanonicalMentionResolver;
}
