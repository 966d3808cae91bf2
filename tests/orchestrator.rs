//! End-to-end annotation runs: engine → canonical mentions → links,
//! including failure and restoration behaviour.

use coreflink::prelude::*;
use coreflink_core::{
    CorefChain, CorefMention, Document, EntityMention, Link, MentionPosition, Sentence, Token,
};
use std::panic::{self, AssertUnwindSafe};

fn pos(s: usize, b: usize, e: usize) -> MentionPosition {
    MentionPosition::new(s, b, e)
}

/// "John met Mary. John Smith thanked her."
fn document() -> Document {
    Document::new()
        .with_id("news-1")
        .with_sentences(vec![
            Sentence::new(vec![
                Token::new("John").with_ner("PERSON").with_fine("PER_FIRST"),
                Token::new("met").with_ner("O"),
                Token::new("Mary")
                    .with_ner("PERSON")
                    .with_fine("PER_FIRST")
                    .with_coarse("PER"),
                Token::new("."),
            ]),
            Sentence::new(vec![
                Token::new("John").with_ner("B-PERSON").with_coarse("PER"),
                Token::new("Smith").with_ner("I-PERSON"),
                Token::new("thanked").with_ner("O"),
                Token::new("her").with_ner("O"),
                Token::new("."),
            ]),
        ])
        .with_entity_mentions(vec![
            EntityMention::new(0, "John", pos(0, 0, 1)).with_type("PERSON"),
            EntityMention::new(1, "Mary", pos(0, 2, 3)).with_type("PERSON"),
            EntityMention::new(2, "John Smith", pos(1, 0, 2)).with_type("PERSON"),
            EntityMention::new(3, "her", pos(1, 3, 4)),
        ])
        .with_entity_to_coref(
            [(0, Some(100)), (1, Some(200)), (2, Some(101)), (3, Some(201))]
                .into_iter()
                .collect(),
        )
        .with_coref_to_entity(
            [(100, Some(0)), (200, Some(1)), (101, Some(2)), (201, Some(3))]
                .into_iter()
                .collect(),
        )
}

fn engine() -> MockEngine {
    let john = CorefMention::new(100, 1, pos(0, 0, 1)).with_text("John");
    let john_smith = CorefMention::new(101, 1, pos(1, 0, 2)).with_text("John Smith");
    let mary = CorefMention::new(200, 2, pos(0, 2, 3)).with_text("Mary");
    let her = CorefMention::new(201, 2, pos(1, 3, 4)).with_text("her");
    MockEngine::new("mock")
        .with_mentions(vec![john.clone(), mary.clone(), john_smith.clone(), her.clone()])
        .with_chains(vec![
            CorefChain::new(1, vec![john.clone(), john_smith]).with_representative(john),
            CorefChain::new(2, vec![mary.clone(), her]).with_representative(mary),
        ])
}

fn tags(doc: &Document) -> Vec<Option<String>> {
    doc.sentences
        .iter()
        .flatten()
        .flat_map(|s| s.tokens.iter().flatten())
        .map(|t| t.ner.clone())
        .collect()
}

fn canonical(doc: &Document) -> Vec<Option<usize>> {
    doc.entity_mentions
        .iter()
        .flatten()
        .map(EntityMention::canonical_index)
        .collect()
}

#[test]
fn canonical_mentions_are_longest_in_cluster() {
    let o = AnnotationOrchestrator::new(SharedEngine::new(engine()), CorefLinkConfig::default());
    let mut doc = document();
    let report = o.annotate(&mut doc).unwrap();

    assert_eq!(report.state, AnnotationState::Done);
    assert_eq!(report.engine.as_deref(), Some("mock"));
    assert_eq!(report.annotated, 4);
    assert_eq!(canonical(&doc), vec![Some(2), Some(1), Some(2), Some(1)]);
    assert_eq!(
        report.links,
        vec![
            Link::new(pos(0, 0, 1), pos(1, 0, 2)),
            Link::new(pos(0, 2, 3), pos(1, 3, 4)),
        ]
    );
}

#[test]
fn resolve_john_to_john_smith() {
    let mut doc = document();
    engine().cluster(&mut doc).unwrap();
    let john = doc.entity_mention(0).unwrap();
    let winner = CanonicalMentionResolver.resolve(john, &doc).unwrap();
    assert_eq!(winner.index, Some(2));
    assert_eq!(winner.text.as_deref(), Some("John Smith"));
}

#[test]
fn rerun_does_not_clobber() {
    let o = AnnotationOrchestrator::new(SharedEngine::new(engine()), CorefLinkConfig::default());
    let mut doc = document();
    o.annotate(&mut doc).unwrap();
    let first = canonical(&doc);

    // Upstream changes its mind about "her"; existing annotations stay.
    doc.coref_to_entity
        .as_mut()
        .unwrap()
        .insert(200, Some(3));
    let report = o.annotate(&mut doc).unwrap();

    assert_eq!(report.annotated, 0);
    assert_eq!(canonical(&doc), first);
}

#[test]
fn preexisting_annotation_is_kept() {
    let o = AnnotationOrchestrator::new(SharedEngine::new(engine()), CorefLinkConfig::default());
    let mut doc = document();
    if let Some(ms) = doc.entity_mentions.as_mut() {
        ms[0].set_canonical_index(0);
    }
    let report = o.annotate(&mut doc).unwrap();
    assert_eq!(report.annotated, 3);
    assert_eq!(canonical(&doc)[0], Some(0));
}

#[test]
fn tags_restored_after_success() {
    for granularity in [NerGranularity::Fine, NerGranularity::Coarse, NerGranularity::Default] {
        let shared = SharedEngine::new(engine());
        let o = AnnotationOrchestrator::new(
            shared.clone(),
            CorefLinkConfig::default().with_granularity(granularity),
        );
        let mut doc = document();
        let before = tags(&doc);
        o.annotate(&mut doc).unwrap();
        assert_eq!(tags(&doc), before, "granularity {}", granularity);
    }
}

/// Overwrites every primary tag before clustering; panics on its first call
/// when `panic_once` is set.
struct Retagger {
    inner: MockEngine,
    panic_once: bool,
}

impl Retagger {
    fn new() -> Self {
        Self {
            inner: engine(),
            panic_once: false,
        }
    }

    fn panicking_once() -> Self {
        Self {
            inner: engine(),
            panic_once: true,
        }
    }
}

impl ClusteringEngine for Retagger {
    fn cluster(&mut self, document: &mut Document) -> Result<()> {
        for sentence in document.sentences.iter_mut().flatten() {
            for token in sentence.tokens.iter_mut().flatten() {
                token.ner = Some("ENGINE".into());
            }
        }
        if std::mem::take(&mut self.panic_once) {
            panic!("engine crashed");
        }
        self.inner.cluster(document)
    }

    fn name(&self) -> &'static str {
        "retagger"
    }
}

#[test]
fn engine_retagging_undone_at_every_granularity() {
    for granularity in [NerGranularity::Default, NerGranularity::Fine, NerGranularity::Coarse] {
        let o = AnnotationOrchestrator::new(
            SharedEngine::new(Retagger::new()),
            CorefLinkConfig::default().with_granularity(granularity),
        );
        let mut doc = document();
        o.annotate(&mut doc).unwrap();
        assert_eq!(tags(&doc), tags(&document()), "granularity {}", granularity);
        assert_eq!(canonical(&doc), vec![Some(2), Some(1), Some(2), Some(1)]);
    }
}

#[test]
fn engine_panic_restores_tags_and_engine_stays_usable() {
    let shared = SharedEngine::new(Retagger::panicking_once());
    let o = AnnotationOrchestrator::new(
        shared.clone(),
        CorefLinkConfig::default().with_granularity(NerGranularity::Fine),
    );
    let mut doc = document();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| o.annotate(&mut doc)));
    assert!(outcome.is_err());
    assert_eq!(tags(&doc), tags(&document()));
    assert!(canonical(&doc).iter().all(Option::is_none));

    let report = o.annotate(&mut doc).unwrap();
    assert_eq!(report.state, AnnotationState::Done);
    assert_eq!(tags(&doc), tags(&document()));
    assert_eq!(canonical(&doc), vec![Some(2), Some(1), Some(2), Some(1)]);
}

#[test]
fn engine_sees_coarse_tags() {
    let shared = SharedEngine::new(engine());
    let o = AnnotationOrchestrator::new(
        shared.clone(),
        CorefLinkConfig::default().with_granularity(NerGranularity::Coarse),
    );
    let mut doc = document();
    o.annotate(&mut doc).unwrap();

    let engine = shared.lock();
    let seen = &engine.seen_tags()[0];
    // "Mary" has a coarse tag; "met" does not and keeps its own.
    assert_eq!(seen[2].as_deref(), Some("PER"));
    assert_eq!(seen[1].as_deref(), Some("O"));
    // Second-sentence "John": primary differs from both alternates.
    assert_eq!(seen[4].as_deref(), Some("PER"));
}

#[test]
fn engine_failure_restores_and_commits_nothing() {
    let o = AnnotationOrchestrator::new(
        SharedEngine::new(engine().failing("dictionary not loaded").writes_before_failing()),
        CorefLinkConfig::default().with_granularity(NerGranularity::Fine),
    );
    let mut doc = document();
    let before = tags(&doc);

    let err = o.annotate(&mut doc).unwrap_err();
    assert!(err.is_engine_failure());
    assert!(err.to_string().contains("dictionary not loaded"));
    assert_eq!(tags(&doc), before);
    assert!(canonical(&doc).iter().all(Option::is_none));
    assert!(doc.coref_chains.is_none());
    assert_eq!(doc, document());
}

#[test]
fn engine_failure_reported_once_per_call() {
    let shared = SharedEngine::new(engine().failing("boom"));
    let o = AnnotationOrchestrator::new(shared.clone(), CorefLinkConfig::default());
    let mut doc = document();
    assert!(o.annotate(&mut doc).is_err());
    assert!(o.annotate(&mut doc).is_err());
    assert_eq!(shared.lock().calls(), 2);
}

#[test]
fn non_engine_error_is_wrapped() {
    struct Broken;
    impl ClusteringEngine for Broken {
        fn cluster(&mut self, _document: &mut Document) -> Result<()> {
            Err(Error::config("missing model path"))
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    let o = AnnotationOrchestrator::new(SharedEngine::new(Broken), CorefLinkConfig::default());
    let err = o.annotate(&mut document()).unwrap_err();
    match err {
        Error::Engine { engine, message } => {
            assert_eq!(engine, "broken");
            assert!(message.contains("missing model path"));
        }
        other => panic!("expected engine failure, got {:?}", other),
    }
}

#[test]
fn precomputed_engine_uses_document_chains() {
    let mut doc = document();
    let mut clustered = document();
    engine().cluster(&mut clustered).unwrap();
    doc.coref_chains = clustered.coref_chains;

    let o = AnnotationOrchestrator::new(
        SharedEngine::new(PrecomputedEngine),
        CorefLinkConfig::default(),
    );
    let report = o.annotate(&mut doc).unwrap();
    assert_eq!(report.annotated, 4);
    assert_eq!(canonical(&doc), vec![Some(2), Some(1), Some(2), Some(1)]);
}

#[test]
fn precomputed_engine_rejects_misfiled_member() {
    let mut doc = document();
    let stray = CorefMention::new(300, 9, pos(0, 0, 1));
    doc.coref_chains = Some([(1, Some(CorefChain::new(1, vec![stray])))].into_iter().collect());

    let o = AnnotationOrchestrator::new(
        SharedEngine::new(PrecomputedEngine),
        CorefLinkConfig::default(),
    );
    let before = doc.clone();
    let err = o.annotate(&mut doc).unwrap_err();
    match err {
        Error::Engine { engine, message } => {
            assert_eq!(engine, "precomputed");
            assert!(message.contains("cluster 9"));
        }
        other => panic!("expected engine failure, got {:?}", other),
    }
    assert_eq!(doc, before);
}

#[test]
fn annotate_all_is_per_document() {
    let shared = SharedEngine::new(engine());
    let o = AnnotationOrchestrator::new(shared.clone(), CorefLinkConfig::default());
    let mut docs = vec![document(), Document::new(), document()];
    let results = o.annotate_all(&mut docs);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().annotated, 4);
    assert!(results[1].as_ref().unwrap().is_skipped());
    assert_eq!(results[2].as_ref().unwrap().annotated, 4);
    assert_eq!(shared.lock().calls(), 2);
}
