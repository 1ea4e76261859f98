//! Cached hash code declarations.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eqprobe::{FailureKind, Inspect, Suppress, Verifier};

fn content_hash(title: &str, body: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    title.hash(&mut hasher);
    body.hash(&mut hasher);
    hasher.finish()
}

/// Stores its content hash; zero means "not yet computed".
#[derive(Debug, Clone, Inspect)]
struct Document {
    title: String,
    body: String,
    cache: u64,
}

impl Document {
    fn new(title: &str, body: &str) -> Self {
        let cache = content_hash(title, body);
        Document { title: title.to_string(), body: body.to_string(), cache }
    }

    fn calculate(&self) -> u64 {
        content_hash(&self.title, &self.body)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.body == other.body
    }
}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let cached = if self.cache != 0 { self.cache } else { self.calculate() };
        cached.hash(state);
    }
}

/// Same storage, but the hash never consults the cache.
#[derive(Debug, Clone, Inspect)]
struct ForgetfulDocument {
    title: String,
    body: String,
    cache: u64,
}

impl PartialEq for ForgetfulDocument {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.body == other.body
    }
}

impl Hash for ForgetfulDocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        content_hash(&self.title, &self.body).hash(state);
    }
}

fn document_verifier() -> Verifier<Document> {
    Verifier::<Document>::new().with_cached_hash(
        "cache",
        |d| d.cache,
        |d, value| d.cache = value,
        Document::calculate,
    )
}

#[test]
fn coherent_cached_hash_passes() {
    document_verifier().with_cached_hash_example(Document::new("title", "body")).assert_valid();
}

#[test]
fn missing_example_is_a_setup_error() {
    let result = document_verifier().verify();
    let error = result.setup_error().expect("expected a setup error");
    assert!(error.to_string().contains("example"));
}

#[test]
fn missing_example_can_be_suppressed() {
    document_verifier().suppress(Suppress::NoCachedHashExample).assert_valid();
}

#[test]
fn unknown_cache_field_is_a_setup_error() {
    let result = Verifier::<Document>::new()
        .with_cached_hash("cachd", |d| d.cache, |d, v| d.cache = v, Document::calculate)
        .suppress(Suppress::NoCachedHashExample)
        .verify();
    let error = result.setup_error().expect("expected a setup error");
    assert!(error.to_string().contains("cachd"));
}

#[test]
fn hash_ignoring_the_cache_is_reported() {
    let result = Verifier::<ForgetfulDocument>::new()
        .with_cached_hash(
            "cache",
            |d| d.cache,
            |d, value| d.cache = value,
            |d| content_hash(&d.title, &d.body),
        )
        .suppress(Suppress::NoCachedHashExample)
        .verify();
    let diagnosis = result.diagnosis().expect("expected a contract failure");
    assert_eq!(diagnosis.kind, FailureKind::CachedHash);
    assert!(diagnosis.explanation.contains("ignores"));
}
