//! Integration tests for the coreflink CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DOCUMENT: &str = r#"{
  "id": "cli-doc",
  "sentences": [
    {"tokens": [
      {"word": "John", "ner": "PERSON", "fine_grained_ner": "PER_FIRST"},
      {"word": "Smith", "ner": "PERSON"},
      {"word": "said", "ner": "O"},
      {"word": "he", "ner": "O"}
    ]}
  ],
  "entity_mentions": [
    {"index": 0, "text": "John Smith", "position": {"sentence": 0, "start": 0, "end": 2}},
    {"index": 1, "text": "he", "position": {"sentence": 0, "start": 3, "end": 4}}
  ],
  "coref_chains": {
    "7": {
      "cluster_id": 7,
      "mentions": [
        {"mention_id": 10, "cluster_id": 7, "position": {"sentence": 0, "start": 0, "end": 2}},
        {"mention_id": 11, "cluster_id": 7, "position": {"sentence": 0, "start": 3, "end": 4}}
      ],
      "representative": {"mention_id": 10, "cluster_id": 7, "position": {"sentence": 0, "start": 0, "end": 2}}
    }
  },
  "entity_to_coref": {"0": 10, "1": 11},
  "coref_to_entity": {"10": 0, "11": null}
}"#;

fn setup_document(content: &str) -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("doc.json");
    fs::write(&path, content).expect("Failed to write document");
    (dir, path.to_string_lossy().to_string())
}

#[test]
fn test_annotate_attaches_canonical_index() {
    let (_dir, path) = setup_document(DOCUMENT);
    let output = Command::cargo_bin("coreflink")
        .unwrap()
        .args(["annotate", &path, "--granularity", "fine"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let mentions = &value["document"]["entity_mentions"];
    assert_eq!(mentions[0]["canonical_index"], 0);
    // The reverse entry for "he" is null, so "John Smith" is the only candidate.
    assert_eq!(mentions[1]["canonical_index"], 0);
    assert_eq!(value["report"]["state"], "Done");
    // Tags restored in the output.
    assert_eq!(value["document"]["sentences"][0]["tokens"][0]["ner"], "PERSON");
}

#[test]
fn test_annotate_from_stdin_without_links() {
    Command::cargo_bin("coreflink")
        .unwrap()
        .args(["annotate", "-", "--no-links"])
        .write_stdin(DOCUMENT)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"links\":[]"));
}

#[test]
fn test_annotate_skips_document_without_sentences() {
    let (_dir, path) = setup_document(r#"{"entity_mentions": []}"#);
    Command::cargo_bin("coreflink")
        .unwrap()
        .args(["annotate", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped"));
}

#[test]
fn test_links_command() {
    let (_dir, path) = setup_document(DOCUMENT);
    Command::cargo_bin("coreflink")
        .unwrap()
        .args(["links", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("(0,0,2) -> (0,3,4)"));
}

#[test]
fn test_invalid_json_fails() {
    let (_dir, path) = setup_document("{ not json");
    Command::cargo_bin("coreflink")
        .unwrap()
        .args(["annotate", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid document JSON"));
}

#[test]
fn test_missing_file_fails() {
    Command::cargo_bin("coreflink")
        .unwrap()
        .args(["links", "/nonexistent/doc.json"])
        .assert()
        .failure();
}
