//! Per-document structure: sentences, tokens, and the collections
//! upstream collaborators attach to a document.

use crate::mention::{ClusterId, CorefChain, CorefMention, CorefMentionId, EntityMention};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Entity mention index → coref mention ID. Partial; values may be `None`.
pub type EntityToCorefMap = HashMap<usize, Option<CorefMentionId>>;

/// Coref mention ID → entity mention index. Partial; values may be `None`.
pub type CorefToEntityMap = HashMap<CorefMentionId, Option<usize>>;

/// Cluster ID → chain. Ordered by cluster ID; entries may be `None`.
pub type ChainMap = BTreeMap<ClusterId, Option<CorefChain>>;

// =============================================================================
// Token / Sentence
// =============================================================================

/// A token with its primary NER tag and two alternate granularities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Word form.
    pub word: String,
    /// Primary NER tag, the one the clustering engine reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ner: Option<String>,
    /// Fine-grained NER tag (e.g. `CITY`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fine_grained_ner: Option<String>,
    /// Coarse NER tag (e.g. `LOCATION`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coarse_ner: Option<String>,
}

impl Token {
    /// Create a token with no tags.
    #[must_use]
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Self::default()
        }
    }

    /// Set the primary NER tag.
    #[must_use]
    pub fn with_ner(mut self, tag: impl Into<String>) -> Self {
        self.ner = Some(tag.into());
        self
    }

    /// Set the fine-grained NER tag.
    #[must_use]
    pub fn with_fine(mut self, tag: impl Into<String>) -> Self {
        self.fine_grained_ner = Some(tag.into());
        self
    }

    /// Set the coarse NER tag.
    #[must_use]
    pub fn with_coarse(mut self, tag: impl Into<String>) -> Self {
        self.coarse_ner = Some(tag.into());
        self
    }
}

/// A sentence. The token list may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Tokens in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<Token>>,
}

impl Sentence {
    /// Create a sentence from tokens.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: Some(tokens),
        }
    }

    /// Create a sentence whose token list was never populated.
    #[must_use]
    pub fn without_tokens() -> Self {
        Self { tokens: None }
    }
}

// =============================================================================
// Document
// =============================================================================

/// A document and everything upstream attached to it.
///
/// Every collection is optional because collaborators populate them
/// independently. Lookups on this type never panic: missing collections,
/// missing keys, and `None` entries all come back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Sentences in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentences: Option<Vec<Sentence>>,
    /// Entity mentions from the NER/mention pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_mentions: Option<Vec<EntityMention>>,
    /// Mentions produced by the clustering engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coref_mentions: Option<Vec<CorefMention>>,
    /// Chains produced by the clustering engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coref_chains: Option<ChainMap>,
    /// Entity mention index → coref mention ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_to_coref: Option<EntityToCorefMap>,
    /// Coref mention ID → entity mention index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coref_to_entity: Option<CorefToEntityMap>,
}

impl Document {
    /// Create an empty document (no sentences).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the sentences.
    #[must_use]
    pub fn with_sentences(mut self, sentences: Vec<Sentence>) -> Self {
        self.sentences = Some(sentences);
        self
    }

    /// Set the entity mentions.
    #[must_use]
    pub fn with_entity_mentions(mut self, mentions: Vec<EntityMention>) -> Self {
        self.entity_mentions = Some(mentions);
        self
    }

    /// Set the coref mentions.
    #[must_use]
    pub fn with_coref_mentions(mut self, mentions: Vec<CorefMention>) -> Self {
        self.coref_mentions = Some(mentions);
        self
    }

    /// Set the chains, keyed by their cluster IDs.
    #[must_use]
    pub fn with_chains(mut self, chains: Vec<CorefChain>) -> Self {
        self.coref_chains = Some(
            chains
                .into_iter()
                .map(|c| (c.cluster_id, Some(c)))
                .collect(),
        );
        self
    }

    /// Set the entity → coref index map.
    #[must_use]
    pub fn with_entity_to_coref(mut self, map: EntityToCorefMap) -> Self {
        self.entity_to_coref = Some(map);
        self
    }

    /// Set the coref → entity index map.
    #[must_use]
    pub fn with_coref_to_entity(mut self, map: CorefToEntityMap) -> Self {
        self.coref_to_entity = Some(map);
        self
    }

    /// Entity mention at a list position.
    #[must_use]
    pub fn entity_mention(&self, index: usize) -> Option<&EntityMention> {
        self.entity_mentions.as_ref()?.get(index)
    }

    /// First coref mention carrying `mention_id`.
    #[must_use]
    pub fn coref_mention(&self, mention_id: CorefMentionId) -> Option<&CorefMention> {
        self.coref_mentions
            .as_ref()?
            .iter()
            .find(|m| m.mention_id == mention_id)
    }

    /// Chain for a cluster ID. `None` entries read as absent.
    #[must_use]
    pub fn chain(&self, cluster_id: ClusterId) -> Option<&CorefChain> {
        self.coref_chains.as_ref()?.get(&cluster_id)?.as_ref()
    }

    /// Total number of tokens across sentences that have token lists.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.sentences.as_ref().map_or(0, |sentences| {
            sentences
                .iter()
                .filter_map(|s| s.tokens.as_ref())
                .map(Vec::len)
                .sum()
        })
    }
}
