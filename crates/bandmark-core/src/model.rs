//! Core data model types for bandmark.
//!
//! Answer keys, learner responses, and the test metadata that ties them
//! together.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;

/// The test module a key belongs to. Selects the band conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestModule {
    AcademicReading,
    GeneralReading,
    Listening,
}

impl fmt::Display for TestModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestModule::AcademicReading => write!(f, "academic-reading"),
            TestModule::GeneralReading => write!(f, "general-reading"),
            TestModule::Listening => write!(f, "listening"),
        }
    }
}

impl FromStr for TestModule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "academic-reading" | "academic" | "reading" => Ok(TestModule::AcademicReading),
            "general-reading" | "general-training" | "general" | "gt" => {
                Ok(TestModule::GeneralReading)
            }
            "listening" => Ok(TestModule::Listening),
            other => Err(format!("unknown test module: {other}")),
        }
    }
}

/// How a question's canonical answer is shaped, and therefore how it is
/// matched and scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerKind {
    /// A single acceptable answer.
    Singleton { value: String },
    /// Any one of several acceptable answers.
    Alternatives { values: Vec<String> },
    /// One box of two that jointly hold an unordered two-letter set.
    UnorderedPair { partner: String, values: Vec<String> },
    /// "Choose N letters": one point per correct selection.
    MultiSelect { values: Vec<String> },
}

impl AnswerKind {
    /// Build a text answer, splitting `a/b/c` into alternatives.
    pub fn from_text(text: &str) -> Self {
        if text.contains('/') {
            AnswerKind::Alternatives {
                values: text.split('/').map(|s| s.trim().to_string()).collect(),
            }
        } else {
            AnswerKind::Singleton {
                value: text.to_string(),
            }
        }
    }

    /// The authored canonical values, in authoring order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            AnswerKind::Singleton { value } => vec![value.as_str()],
            AnswerKind::Alternatives { values }
            | AnswerKind::UnorderedPair { values, .. }
            | AnswerKind::MultiSelect { values } => values.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerKind::Singleton { value } => write!(f, "{value}"),
            AnswerKind::Alternatives { values } => write!(f, "{}", values.join(" / ")),
            AnswerKind::UnorderedPair { values, .. } => {
                write!(f, "{} (either order)", values.join(" + "))
            }
            AnswerKind::MultiSelect { values } => write!(f, "{}", values.join(", ")),
        }
    }
}

/// The canonical answer for one question id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    /// Question number, or a fused group id such as `"33&34&35"`.
    pub id: String,
    /// The canonical answer and its matching mode.
    #[serde(flatten)]
    pub kind: AnswerKind,
}

impl AnswerKeyEntry {
    pub fn new(id: impl Into<String>, kind: AnswerKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Question numbers covered by this entry (`"33&34&35"` → 3 parts).
    pub fn parts(&self) -> Vec<&str> {
        self.id.split('&').map(str::trim).collect()
    }
}

/// An ordered, immutable answer key with id lookup.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    entries: Vec<AnswerKeyEntry>,
    index: HashMap<String, usize>,
}

impl AnswerKey {
    /// Build a key from entries in authoring order.
    pub fn new(entries: Vec<AnswerKeyEntry>) -> Result<Self, KeyError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(KeyError::EmptyId);
            }
            if index.insert(entry.id.clone(), i).is_some() {
                return Err(KeyError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(Self { entries, index })
    }

    pub fn get(&self, id: &str) -> Option<&AnswerKeyEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[AnswerKeyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A learner's response to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// Typed text, or a single chosen letter.
    Text(String),
    /// Option letters ticked for a multi-select question.
    Selection(Vec<String>),
}

impl Response {
    /// The response as a single text answer.
    ///
    /// A selection only counts as text when exactly one option was chosen.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Response::Text(text) => Some(text.as_str()),
            Response::Selection(items) if items.len() == 1 => Some(items[0].as_str()),
            Response::Selection(_) => None,
        }
    }

    /// The response as a list of selected options.
    ///
    /// Text is split on commas so that `"B, D"` selects two options.
    pub fn selections(&self) -> Vec<&str> {
        match self {
            Response::Text(text) => text.split(',').map(str::trim).collect(),
            Response::Selection(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Text(text) => write!(f, "{text}"),
            Response::Selection(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl From<&str> for Response {
    fn from(text: &str) -> Self {
        Response::Text(text.to_string())
    }
}

impl From<String> for Response {
    fn from(text: String) -> Self {
        Response::Text(text)
    }
}

impl From<Vec<&str>> for Response {
    fn from(items: Vec<&str>) -> Self {
        Response::Selection(items.into_iter().map(String::from).collect())
    }
}

/// Every response a learner has given, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(HashMap<String, Response>);

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Response> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, response: impl Into<Response>) {
        self.0.insert(id.into(), response.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<Response> {
        self.0.remove(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Response)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Response>> FromIterator<(K, V)> for AnswerSheet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Descriptive metadata for one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestInfo {
    /// Unique identifier for this test.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Source book, e.g. "Cambridge 15".
    #[serde(default)]
    pub book: String,
    /// Which module this test belongs to.
    pub module: TestModule,
    /// Test number within the book.
    #[serde(default)]
    pub test_number: Option<u32>,
    /// Time allowed, in minutes.
    #[serde(default)]
    pub time_limit_minutes: Option<u64>,
}

/// A test's metadata together with its answer key.
#[derive(Debug, Clone)]
pub struct TestDefinition {
    pub info: TestInfo,
    pub key: AnswerKey,
}
