//! Canonical entity mention selection.
//!
//! For one entity mention, walk entity index → coref mention → cluster →
//! every member of the cluster → back to entity mentions, and pick the
//! candidate with the longest surface text.
//!
//! # Tie-break order
//!
//! Candidates are visited in **chain member order** (the order the engine
//! listed the cluster's mentions). A candidate replaces the current winner
//! only when its text is strictly longer in characters, so among
//! equal-length texts the first one reached in chain order wins. The same
//! input always yields the same winner.
//!
//! # Example
//!
//! ```rust
//! use coreflink::resolver::CanonicalMentionResolver;
//! use coreflink_core::{CorefChain, CorefMention, Document, EntityMention, MentionPosition};
//!
//! let john = CorefMention::new(100, 1, MentionPosition::new(0, 0, 1));
//! let smith = CorefMention::new(101, 1, MentionPosition::new(1, 0, 2));
//! let doc = Document::new()
//!     .with_entity_mentions(vec![
//!         EntityMention::new(0, "John", MentionPosition::new(0, 0, 1)),
//!         EntityMention::new(1, "John Smith", MentionPosition::new(1, 0, 2)),
//!     ])
//!     .with_coref_mentions(vec![john.clone(), smith.clone()])
//!     .with_chains(vec![CorefChain::new(1, vec![john.clone(), smith]).with_representative(john)])
//!     .with_entity_to_coref([(0, Some(100)), (1, Some(101))].into_iter().collect())
//!     .with_coref_to_entity([(100, Some(0)), (101, Some(1))].into_iter().collect());
//!
//! let origin = doc.entity_mention(0).unwrap();
//! let winner = CanonicalMentionResolver.resolve(origin, &doc).unwrap();
//! assert_eq!(winner.text.as_deref(), Some("John Smith"));
//! ```

use crate::bridge::MentionIndexBridge;
use coreflink_core::{Document, EntityMention};

/// A resolved canonical mention and where it sits in the document's
/// entity mention list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Position in `Document::entity_mentions`.
    pub list_index: usize,
    /// The mention itself.
    pub mention: &'a EntityMention,
}

impl Candidate<'_> {
    /// Index to record as the canonical index: the mention's own stable
    /// index, or its list position when upstream left that unset.
    #[must_use]
    pub fn canonical_index(&self) -> usize {
        self.mention.index.unwrap_or(self.list_index)
    }
}

/// Selects the longest-text entity mention coreferent with a given one.
///
/// Stateless. Missing indices, maps, mentions, or chains at any step make
/// the result `None`; nothing here returns an error or panics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalMentionResolver;

impl CanonicalMentionResolver {
    /// Canonical mention for `mention`, or `None` when it cannot be reached.
    ///
    /// `mention` itself may win if its text is the longest in its cluster.
    #[must_use]
    pub fn resolve<'a>(
        &self,
        mention: &EntityMention,
        document: &'a Document,
    ) -> Option<&'a EntityMention> {
        self.resolve_candidate(mention, document).map(|c| c.mention)
    }

    /// Like [`resolve`](Self::resolve), also reporting the winner's list position.
    #[must_use]
    pub fn resolve_candidate<'a>(
        &self,
        mention: &EntityMention,
        document: &'a Document,
    ) -> Option<Candidate<'a>> {
        let bridge = MentionIndexBridge::for_document(document);

        let entity_index = mention.index?;
        let coref_id = bridge.coref_id(entity_index)?;
        let coref_mention = document.coref_mention(coref_id)?;
        let chain = document.chain(coref_mention.cluster_id)?;

        let mut best: Option<Candidate<'a>> = None;
        let mut best_len = 0usize;
        for member in &chain.mentions {
            let Some(list_index) = bridge.entity_index(member.mention_id) else {
                continue;
            };
            let Some(candidate) = document.entity_mention(list_index) else {
                continue;
            };
            let Some(text) = candidate.non_empty_text() else {
                continue;
            };
            let len = text.chars().count();
            if len > best_len {
                best_len = len;
                best = Some(Candidate {
                    list_index,
                    mention: candidate,
                });
            }
        }

        if best.is_none() {
            log::debug!(
                "no canonical candidate for entity mention {} (cluster {})",
                entity_index,
                coref_mention.cluster_id
            );
        }
        best
    }
}
