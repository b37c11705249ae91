//! The `bandmark validate` command.

use std::path::PathBuf;

use anyhow::Result;

use bandmark_core::config::load_config;
use bandmark_core::model::AnswerSheet;
use bandmark_core::parser;
use bandmark_core::scorer::Scorer;

pub fn execute(key_path: PathBuf) -> Result<()> {
    let config = load_config()?;
    let tests = parser::load_tests(&key_path, config.default_module)?;
    if tests.is_empty() {
        anyhow::bail!("no answer keys found in {}", key_path.display());
    }

    let mut total_warnings = 0;

    for test in &tests {
        let total = Scorer::for_test(test)
            .score(&AnswerSheet::new(), &test.key)
            .total_questions;
        println!(
            "Test: {} [{}] ({} questions)",
            test.info.title, test.info.module, total
        );

        let warnings = parser::validate_test(test);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All answer keys valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
