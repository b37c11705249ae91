//! TOML answer key and answer sheet loading.
//!
//! Loads tests from TOML files and directories, and checks answer keys for
//! authoring mistakes.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::KeyError;
use crate::matcher::canonical_options;
use crate::model::{
    AnswerKey, AnswerKeyEntry, AnswerKind, AnswerSheet, TestDefinition, TestInfo, TestModule,
};

/// Intermediate TOML structure for test files.
#[derive(Debug, Deserialize)]
struct TomlTestFile {
    test: TomlTestHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlTestHeader {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    book: String,
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    test_number: Option<u32>,
    #[serde(default)]
    time_limit_minutes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    alternatives: Option<Vec<String>>,
    #[serde(default)]
    pair: Option<Vec<String>>,
    #[serde(default)]
    partner: Option<String>,
    #[serde(default)]
    select: Option<Vec<String>>,
}

impl TomlQuestion {
    fn into_entry(self) -> Result<AnswerKeyEntry, KeyError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(KeyError::EmptyId);
        }

        let given: Vec<&str> = [
            ("answer", self.answer.is_some()),
            ("alternatives", self.alternatives.is_some()),
            ("pair", self.pair.is_some()),
            ("select", self.select.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();
        if given.len() > 1 {
            return Err(KeyError::ConflictingAnswer {
                id,
                fields: given.join(", "),
            });
        }

        let kind = if let Some(answer) = self.answer {
            AnswerKind::from_text(&answer)
        } else if let Some(values) = self.alternatives {
            AnswerKind::Alternatives { values }
        } else if let Some(values) = self.pair {
            let partner = self
                .partner
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .ok_or_else(|| KeyError::MissingPartner(id.clone()))?;
            if partner == id {
                return Err(KeyError::SelfPartner(id));
            }
            AnswerKind::UnorderedPair { partner, values }
        } else if let Some(values) = self.select {
            AnswerKind::MultiSelect { values }
        } else {
            return Err(KeyError::MissingAnswer(id));
        };

        Ok(AnswerKeyEntry::new(id, kind))
    }
}

/// Parse a single TOML file into a `TestDefinition`.
///
/// Keys without a `module` fall back to `default_module`.
pub fn parse_test(path: &Path, default_module: TestModule) -> Result<TestDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer key file: {}", path.display()))?;

    parse_test_str(&content, path, default_module)
}

/// Parse a TOML string into a `TestDefinition` (useful for testing).
pub fn parse_test_str(
    content: &str,
    source_path: &Path,
    default_module: TestModule,
) -> Result<TestDefinition> {
    let parsed: TomlTestFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let module = match &parsed.test.module {
        Some(m) => m.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?,
        None => default_module,
    };

    let entries = parsed
        .questions
        .into_iter()
        .map(TomlQuestion::into_entry)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid answer key: {}", source_path.display()))?;
    let key = AnswerKey::new(entries)
        .with_context(|| format!("invalid answer key: {}", source_path.display()))?;

    let title = parsed.test.title.unwrap_or_else(|| parsed.test.id.clone());

    Ok(TestDefinition {
        info: TestInfo {
            id: parsed.test.id,
            title,
            book: parsed.test.book,
            module,
            test_number: parsed.test.test_number,
            time_limit_minutes: parsed.test.time_limit_minutes,
        },
        key,
    })
}

/// Recursively load all `.toml` test files from a directory.
pub fn load_test_directory(dir: &Path, default_module: TestModule) -> Result<Vec<TestDefinition>> {
    let mut tests = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            tests.extend(load_test_directory(&path, default_module)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_test(&path, default_module) {
                Ok(test) => tests.push(test),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(tests)
}

/// Load a test file, or every test file under a directory.
pub fn load_tests(path: &Path, default_module: TestModule) -> Result<Vec<TestDefinition>> {
    if path.is_dir() {
        load_test_directory(path, default_module)
    } else {
        Ok(vec![parse_test(path, default_module)?])
    }
}

#[derive(Debug, Deserialize)]
struct SheetFile {
    answers: AnswerSheet,
}

/// Load an answer sheet from a `.toml` or `.json` file with an `answers` table.
pub fn parse_answer_sheet(path: &Path) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;

    let file: SheetFile = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?
    };

    Ok(file.answers)
}

/// A warning from answer key validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate an answer key for authoring mistakes that make questions
/// unsatisfiable or mis-scored.
pub fn validate_test(test: &TestDefinition) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let key = &test.key;

    if key.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "answer key has no questions".into(),
        });
    }

    for entry in key.entries() {
        let id = entry.id.as_str();
        let authored = entry.kind.values();
        let options = canonical_options(&entry.kind);

        // Unsatisfiable or partially blank canonical answers
        if options.is_empty() {
            warnings.push(ValidationWarning::question(
                id,
                "canonical answer is empty; nobody can get this question right",
            ));
        } else if options.len() < authored.len() {
            warnings.push(ValidationWarning::question(
                id,
                "canonical answer contains blank or duplicate options",
            ));
        }

        match &entry.kind {
            AnswerKind::UnorderedPair { partner, values } => {
                if values.len() != 2 {
                    warnings.push(ValidationWarning::question(
                        id,
                        format!("pair should have exactly 2 values, found {}", values.len()),
                    ));
                }
                match key.get(partner) {
                    None => warnings.push(ValidationWarning::question(
                        id,
                        format!("pair partner '{partner}' is not in the answer key"),
                    )),
                    Some(other) => match &other.kind {
                        AnswerKind::UnorderedPair {
                            partner: back,
                            values: other_values,
                        } => {
                            if back != id {
                                warnings.push(ValidationWarning::question(
                                    id,
                                    format!("pair partner '{partner}' points to '{back}' instead"),
                                ));
                            } else if canonical_options(&other.kind)
                                .iter()
                                .collect::<HashSet<_>>()
                                != options.iter().collect::<HashSet<_>>()
                            {
                                warnings.push(ValidationWarning::question(
                                    id,
                                    format!(
                                        "pair values differ from partner '{partner}' ({} vs {})",
                                        values.join(", "),
                                        other_values.join(", ")
                                    ),
                                ));
                            }
                        }
                        _ => warnings.push(ValidationWarning::question(
                            id,
                            format!("pair partner '{partner}' is not a paired question"),
                        )),
                    },
                }
            }
            AnswerKind::MultiSelect { .. } => {
                let parts = entry.parts();
                if parts.len() > 1 && parts.len() != options.len() {
                    warnings.push(ValidationWarning::question(
                        id,
                        format!(
                            "group covers {} questions but selects {} letters",
                            parts.len(),
                            options.len()
                        ),
                    ));
                }
            }
            AnswerKind::Singleton { .. } | AnswerKind::Alternatives { .. } => {}
        }
    }

    // Question numbers claimed by more than one entry
    let mut owners: HashMap<&str, &str> = HashMap::new();
    for entry in key.entries() {
        for part in entry.parts() {
            if let Some(previous) = owners.insert(part, entry.id.as_str()) {
                if previous != entry.id {
                    warnings.push(ValidationWarning::question(
                        &entry.id,
                        format!("question {part} is also covered by '{previous}'"),
                    ));
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[test]
id = "c15-t1-reading"
title = "Cambridge 15 Test 1"
book = "Cambridge 15"
module = "academic-reading"
test_number = 1
time_limit_minutes = 60

[[questions]]
id = "1"
answer = "FALSE"

[[questions]]
id = "2"
answer = "4/four sides"

[[questions]]
id = "3"
alternatives = ["24/7"]

[[questions]]
id = "10"
pair = ["D", "E"]
partner = "11"

[[questions]]
id = "11"
pair = ["D", "E"]
partner = "10"

[[questions]]
id = "33&34&35"
select = ["B", "D", "F"]
"#;

    fn parse(toml: &str) -> Result<TestDefinition> {
        parse_test_str(toml, &PathBuf::from("test.toml"), TestModule::AcademicReading)
    }

    #[test]
    fn parse_valid_toml() {
        let test = parse(VALID_TOML).unwrap();
        assert_eq!(test.info.id, "c15-t1-reading");
        assert_eq!(test.info.module, TestModule::AcademicReading);
        assert_eq!(test.info.time_limit_minutes, Some(60));
        assert_eq!(test.key.len(), 6);
        assert_eq!(
            test.key.get("2").unwrap().kind,
            AnswerKind::Alternatives {
                values: vec!["4".into(), "four sides".into()]
            }
        );
        assert_eq!(test.key.get("3").unwrap().kind.values(), vec!["24/7"]);
        assert!(matches!(
            test.key.get("10").unwrap().kind,
            AnswerKind::UnorderedPair { ref partner, .. } if partner == "11"
        ));
        assert!(validate_test(&test).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[test]
id = "minimal"

[[questions]]
id = "1"
answer = "TRUE"
"#;
        let test = parse(toml).unwrap();
        assert_eq!(test.info.title, "minimal");
        assert_eq!(test.info.module, TestModule::AcademicReading);
        assert!(test.info.time_limit_minutes.is_none());
    }

    #[test]
    fn parse_rejects_structural_errors() {
        let conflicting = r#"
[test]
id = "bad"

[[questions]]
id = "1"
answer = "A"
select = ["A", "B"]
"#;
        let err = parse(conflicting).unwrap_err();
        assert!(format!("{err:#}").contains("conflicting answer fields"));

        let no_partner = r#"
[test]
id = "bad"

[[questions]]
id = "10"
pair = ["D", "E"]
"#;
        let err = parse(no_partner).unwrap_err();
        assert!(format!("{err:#}").contains("requires a `partner`"));

        let duplicate = r#"
[test]
id = "bad"

[[questions]]
id = "1"
answer = "A"

[[questions]]
id = "1"
answer = "B"
"#;
        let err = parse(duplicate).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate question id"));

        let empty = r#"
[test]
id = "bad"

[[questions]]
id = "1"
"#;
        assert!(parse(empty).is_err());
    }

    #[test]
    fn missing_module_uses_default() {
        let toml = "[test]\nid = \"l1\"\n";
        let test = parse_test_str(toml, &PathBuf::from("l1.toml"), TestModule::Listening).unwrap();
        assert_eq!(test.info.module, TestModule::Listening);
    }

    #[test]
    fn parse_unknown_module() {
        let toml = r#"
[test]
id = "w"
module = "writing"
"#;
        assert!(parse(toml).is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse(bad).is_err());
    }

    #[test]
    fn validate_authoring_mistakes() {
        let toml = r#"
[test]
id = "smells"

[[questions]]
id = "1"
answer = ""

[[questions]]
id = "2"
answer = "colour//color"

[[questions]]
id = "10"
pair = ["D", "E"]
partner = "11"

[[questions]]
id = "11"
pair = ["D", "F"]
partner = "10"

[[questions]]
id = "12"
pair = ["A", "B", "C"]
partner = "99"

[[questions]]
id = "33&34&35"
select = ["B", "D"]

[[questions]]
id = "35"
answer = "x"

[[questions]]
id = "21&22"
select = ["B", "b", "D"]
"#;
        let test = parse(toml).unwrap();
        let warnings = validate_test(&test);
        let has = |id: &str, text: &str| {
            warnings
                .iter()
                .any(|w| w.question_id.as_deref() == Some(id) && w.message.contains(text))
        };
        assert!(has("1", "nobody can get this question right"));
        assert!(has("2", "blank or duplicate"));
        assert!(has("10", "differ from partner"));
        assert!(has("12", "exactly 2 values"));
        assert!(has("12", "not in the answer key"));
        assert!(has("33&34&35", "covers 3 questions but selects 2"));
        assert!(has("35", "also covered by '33&34&35'"));
        assert!(has("21&22", "blank or duplicate"));
        assert!(!has("21&22", "covers"));
    }

    #[test]
    fn validate_empty_key() {
        let test = parse("[test]\nid = \"empty\"\n").unwrap();
        let warnings = validate_test(&test);
        assert!(warnings.iter().any(|w| w.message.contains("no questions")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/broken.toml"), "not toml {").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let tests = load_test_directory(dir.path(), TestModule::AcademicReading).unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].info.id, "c15-t1-reading");
    }

    #[test]
    fn answer_sheet_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("answers.toml");
        std::fs::write(
            &toml_path,
            "[answers]\n\"1\" = \"false\"\n\"33&34&35\" = [\"B\", \"G\"]\n",
        )
        .unwrap();
        let sheet = parse_answer_sheet(&toml_path).unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.get("33&34&35").unwrap().selections(), vec!["B", "G"]);

        let json_path = dir.path().join("answers.json");
        std::fs::write(&json_path, r#"{"answers": {"10": "D", "11": "E"}}"#).unwrap();
        let sheet = parse_answer_sheet(&json_path).unwrap();
        assert_eq!(sheet.get("11").unwrap().as_text(), Some("E"));
    }
}
