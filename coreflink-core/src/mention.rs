//! Mention, chain, and link types.
//!
//! # Terminology
//!
//! - **Entity mention**: a span proposed by the NER/mention pipeline, identified
//!   by a stable per-document index
//! - **Coref mention**: a span produced by the clustering engine, identified by
//!   its own mention ID and tagged with a cluster ID
//! - **Chain**: all coref mentions sharing one cluster ID, plus the
//!   representative mention the engine designated for it
//! - **Link**: an oriented (representative, member) pair of positions
//!
//! # Example
//!
//! ```rust
//! use coreflink_core::{CorefChain, CorefMention, MentionPosition};
//!
//! // "John Smith arrived. He sat down."
//! let john = CorefMention::new(100, 1, MentionPosition::new(0, 0, 2)).with_text("John Smith");
//! let he = CorefMention::new(101, 1, MentionPosition::new(1, 0, 1)).with_text("He");
//!
//! let chain = CorefChain::new(1, vec![john.clone(), he]).with_representative(john);
//! assert_eq!(chain.len(), 2);
//! assert_eq!(chain.representative_position(), Some(MentionPosition::new(0, 0, 2)));
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the clustering engine assigns to each coref mention.
pub type CorefMentionId = u64;

/// Identifier the clustering engine assigns to each chain.
pub type ClusterId = u64;

// =============================================================================
// MentionPosition
// =============================================================================

/// Textual position of a mention: sentence number plus a token range.
///
/// Positions compare by value. Two mentions at the same position are the
/// same place in the text even when they are distinct objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MentionPosition {
    /// Sentence number within the document.
    pub sentence: usize,
    /// First token of the mention.
    pub start: usize,
    /// Token end of the mention (exclusive).
    pub end: usize,
}

impl MentionPosition {
    /// Create a position without validation.
    #[must_use]
    pub const fn new(sentence: usize, start: usize, end: usize) -> Self {
        Self {
            sentence,
            start,
            end,
        }
    }

    /// Create a position, rejecting ranges whose end precedes their start.
    pub fn try_new(sentence: usize, start: usize, end: usize) -> Result<Self> {
        if end < start {
            return Err(Error::invalid_position(format!(
                "end {} precedes start {} in sentence {}",
                end, start, sentence
            )));
        }
        Ok(Self::new(sentence, start, end))
    }

    /// Number of tokens covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the range covers no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<(usize, usize, usize)> for MentionPosition {
    fn from((sentence, start, end): (usize, usize, usize)) -> Self {
        Self::new(sentence, start, end)
    }
}

impl fmt::Display for MentionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.sentence, self.start, self.end)
    }
}

// =============================================================================
// EntityMention
// =============================================================================

/// A mention proposed by the upstream NER/mention pipeline.
///
/// Read-only to coreflink except for `canonical_index`, which is attached at
/// most once and never overwritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Stable per-document index. `None` when upstream never assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Surface text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// NER label, if the pipeline supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// Span of the mention.
    pub position: MentionPosition,
    /// Index of the canonical entity mention for this mention's cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    canonical_index: Option<usize>,
}

impl EntityMention {
    /// Create an entity mention with an index and surface text.
    #[must_use]
    pub fn new(index: usize, text: impl Into<String>, position: MentionPosition) -> Self {
        Self {
            index: Some(index),
            text: Some(text.into()),
            entity_type: None,
            position,
            canonical_index: None,
        }
    }

    /// Create an entity mention that upstream left without index or text.
    #[must_use]
    pub fn bare(position: MentionPosition) -> Self {
        Self {
            index: None,
            text: None,
            entity_type: None,
            position,
            canonical_index: None,
        }
    }

    /// Attach an NER label.
    #[must_use]
    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Canonical entity mention index, if one has been attached.
    #[must_use]
    pub fn canonical_index(&self) -> Option<usize> {
        self.canonical_index
    }

    /// Attach the canonical index unless one is already present.
    ///
    /// Returns `true` if the value was written.
    pub fn set_canonical_index(&mut self, index: usize) -> bool {
        if self.canonical_index.is_some() {
            return false;
        }
        self.canonical_index = Some(index);
        true
    }

    /// Surface text, treating an empty string as absent.
    #[must_use]
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Length of the surface text in characters (0 when absent).
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.as_deref().map_or(0, |t| t.chars().count())
    }
}

// =============================================================================
// CorefMention
// =============================================================================

/// A mention produced by the clustering engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefMention {
    /// Mention ID, unique per document.
    pub mention_id: CorefMentionId,
    /// Cluster this mention was assigned to.
    pub cluster_id: ClusterId,
    /// Where the mention sits in the text.
    pub position: MentionPosition,
    /// Surface text, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CorefMention {
    /// Create a coref mention.
    #[must_use]
    pub fn new(
        mention_id: CorefMentionId,
        cluster_id: ClusterId,
        position: MentionPosition,
    ) -> Self {
        Self {
            mention_id,
            cluster_id,
            position,
            text: None,
        }
    }

    /// Attach surface text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl fmt::Display for CorefMention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "#{} \"{}\" {}", self.mention_id, text, self.position),
            None => write!(f, "#{} {}", self.mention_id, self.position),
        }
    }
}

// =============================================================================
// CorefChain
// =============================================================================

/// All coref mentions sharing one cluster ID.
///
/// Member order is the order the engine supplied and is preserved; canonical
/// mention selection breaks ties by it. The representative is opaque: it is
/// whatever the engine designated and is never derived here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefChain {
    /// Cluster identifier.
    pub cluster_id: ClusterId,
    /// Members in engine order.
    pub mentions: Vec<CorefMention>,
    /// Representative designated by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representative: Option<CorefMention>,
}

impl CorefChain {
    /// Create a chain with no designated representative.
    #[must_use]
    pub fn new(cluster_id: ClusterId, mentions: Vec<CorefMention>) -> Self {
        Self {
            cluster_id,
            mentions,
            representative: None,
        }
    }

    /// Designate the representative mention.
    #[must_use]
    pub fn with_representative(mut self, representative: CorefMention) -> Self {
        self.representative = Some(representative);
        self
    }

    /// Position of the representative mention, if one was designated.
    #[must_use]
    pub fn representative_position(&self) -> Option<MentionPosition> {
        self.representative.as_ref().map(|m| m.position)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// Check if the chain has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Check if the chain has exactly one member.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.mentions.len() == 1
    }
}

impl fmt::Display for CorefChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self.mentions.iter().map(ToString::to_string).collect();
        write!(f, "cluster {} [{}]", self.cluster_id, members.join(", "))
    }
}

// =============================================================================
// Link
// =============================================================================

/// Oriented pair: the chain's representative position, then a member position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    /// Representative position.
    pub representative: MentionPosition,
    /// Member position. Never equal to `representative`.
    pub member: MentionPosition,
}

impl Link {
    /// Create a link.
    #[must_use]
    pub const fn new(representative: MentionPosition, member: MentionPosition) -> Self {
        Self {
            representative,
            member,
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.representative, self.member)
    }
}
