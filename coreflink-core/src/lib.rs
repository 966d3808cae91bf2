//! # coreflink-core
//!
//! Core types for coreflink: the per-document data model shared by the
//! resolution engine and any clustering engine plugged into it.
//!
//! This crate provides:
//! - **Document structure**: `Document`, `Sentence`, `Token`
//! - **Mentions**: `EntityMention` (NER pipeline), `CorefMention` (clustering engine)
//! - **Chains**: `CorefChain`, `MentionPosition`, `Link`
//!
//! Every collection a collaborator may leave unpopulated is an `Option`.
//! Consumers treat `None`, missing keys, and `None` values the same way:
//! as absent.

pub mod document;
pub mod error;
pub mod mention;

pub use document::{ChainMap, CorefToEntityMap, Document, EntityToCorefMap, Sentence, Token};
pub use error::{Error, Result};
pub use mention::{
    ClusterId, CorefChain, CorefMention, CorefMentionId, EntityMention, Link, MentionPosition,
};
