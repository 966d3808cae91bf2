//! Temporary NER tag granularity switch.
//!
//! Some clustering engines read the primary NER tag of each token but work
//! best with a different granularity than the one the NER stage wrote. Before
//! the engine runs, the primary tag of every token is overwritten from its
//! fine-grained or coarse alternate; afterwards the original primary tags are
//! put back.
//!
//! Restoration uses a per-token snapshot taken before the switch, not a second
//! forward switch, so it is exact even when the primary tag disagreed with
//! both alternates. [`GranularityGuard`] restores on drop, which covers every
//! exit path of the scope holding it.

use coreflink_core::{Document, Token};
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// Which NER tag the clustering engine should see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NerGranularity {
    /// Copy `fine_grained_ner` into `ner`.
    Fine,
    /// Copy `coarse_ner` into `ner`.
    Coarse,
    /// Leave `ner` as it is.
    #[default]
    Default,
}

impl NerGranularity {
    /// Parse a granularity name. Case-insensitive; anything unrecognized is
    /// [`NerGranularity::Default`].
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "fine" => Self::Fine,
            "coarse" => Self::Coarse,
            _ => Self::Default,
        }
    }

    /// The alternate tag this granularity copies from, if any.
    fn alternate(self, token: &Token) -> Option<&String> {
        match self {
            Self::Fine => token.fine_grained_ner.as_ref(),
            Self::Coarse => token.coarse_ner.as_ref(),
            Self::Default => None,
        }
    }
}

impl FromStr for NerGranularity {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl fmt::Display for NerGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fine => "fine",
            Self::Coarse => "coarse",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}

impl<'de> Deserialize<'de> for NerGranularity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&s))
    }
}

// =============================================================================
// Snapshot / switch
// =============================================================================

/// Primary NER tags as they were before a switch.
///
/// One entry per sentence; `None` where the sentence had no token list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSnapshot {
    sentences: Vec<Option<Vec<Option<String>>>>,
}

impl TagSnapshot {
    fn capture(document: &Document) -> Self {
        let sentences = document
            .sentences
            .iter()
            .flatten()
            .map(|s| {
                s.tokens
                    .as_ref()
                    .map(|tokens| tokens.iter().map(|t| t.ner.clone()).collect())
            })
            .collect();
        Self { sentences }
    }

    /// Write the captured primary tags back.
    pub fn restore(self, document: &mut Document) {
        let Some(sentences) = document.sentences.as_mut() else {
            return;
        };
        for (sentence, saved) in sentences.iter_mut().zip(self.sentences) {
            let (Some(tokens), Some(saved)) = (sentence.tokens.as_mut(), saved) else {
                continue;
            };
            if tokens.len() != saved.len() {
                log::warn!(
                    "token count changed during annotation ({} -> {}), restoring overlap only",
                    saved.len(),
                    tokens.len()
                );
            }
            for (token, ner) in tokens.iter_mut().zip(saved) {
                token.ner = ner;
            }
        }
    }
}

/// Overwrite each token's primary tag from the alternate `granularity`
/// selects, returning what was there before.
///
/// Tokens whose alternate is missing keep their primary tag. Missing
/// sentence or token lists are skipped. `Default` changes nothing, but the
/// snapshot is still taken so later writes to `ner` can be undone.
pub fn apply(document: &mut Document, granularity: NerGranularity) -> TagSnapshot {
    let snapshot = TagSnapshot::capture(document);
    if granularity == NerGranularity::Default {
        return snapshot;
    }

    let mut switched = 0usize;
    for sentence in document.sentences.iter_mut().flatten() {
        for token in sentence.tokens.iter_mut().flatten() {
            if let Some(tag) = granularity.alternate(token).cloned() {
                token.ner = Some(tag);
                switched += 1;
            }
        }
    }
    log::debug!("switched {} token tags to {} granularity", switched, granularity);
    snapshot
}

// =============================================================================
// Guard
// =============================================================================

/// Holds a document with its tags switched; restores them when dropped.
///
/// ```rust
/// use coreflink::granularity::{GranularityGuard, NerGranularity};
/// use coreflink_core::{Document, Sentence, Token};
///
/// let mut doc = Document::new().with_sentences(vec![Sentence::new(vec![
///     Token::new("Paris").with_ner("LOCATION").with_fine("CITY"),
/// ])]);
///
/// {
///     let guard = GranularityGuard::new(&mut doc, NerGranularity::Fine);
///     let tokens = guard.sentences.as_ref().unwrap()[0].tokens.as_ref().unwrap();
///     assert_eq!(tokens[0].ner.as_deref(), Some("CITY"));
/// }
///
/// let tokens = doc.sentences.as_ref().unwrap()[0].tokens.as_ref().unwrap();
/// assert_eq!(tokens[0].ner.as_deref(), Some("LOCATION"));
/// ```
pub struct GranularityGuard<'a> {
    document: &'a mut Document,
    snapshot: Option<TagSnapshot>,
}

impl<'a> GranularityGuard<'a> {
    /// Switch `document` to `granularity` until the guard is dropped.
    pub fn new(document: &'a mut Document, granularity: NerGranularity) -> Self {
        let snapshot = apply(document, granularity);
        Self {
            document,
            snapshot: Some(snapshot),
        }
    }
}

impl Deref for GranularityGuard<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        self.document
    }
}

impl DerefMut for GranularityGuard<'_> {
    fn deref_mut(&mut self) -> &mut Document {
        self.document
    }
}

impl Drop for GranularityGuard<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            snapshot.restore(self.document);
            log::debug!("restored original token tags");
        }
    }
}
