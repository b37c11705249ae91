//! The `bandmark init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create bandmark.toml
    if std::path::Path::new("bandmark.toml").exists() {
        println!("bandmark.toml already exists, skipping.");
    } else {
        std::fs::write("bandmark.toml", SAMPLE_CONFIG)?;
        println!("Created bandmark.toml");
    }

    // Create example answer key and sheet; sheets live apart from keys so
    // `validate --key answer-keys` only sees tests
    std::fs::create_dir_all("answer-keys")?;
    std::fs::create_dir_all("answer-sheets")?;
    for (path, content) in [
        ("answer-keys/example.toml", EXAMPLE_KEY),
        ("answer-sheets/example.toml", EXAMPLE_ANSWERS),
    ] {
        let path = std::path::Path::new(path);
        if path.exists() {
            println!("{} already exists, skipping.", path.display());
        } else {
            std::fs::write(path, content)?;
            println!("Created {}", path.display());
        }
    }

    println!("\nNext steps:");
    println!("  1. Run: bandmark validate --key answer-keys");
    println!(
        "  2. Run: bandmark score --key answer-keys/example.toml \
         --answers answer-sheets/example.toml --review"
    );
    println!("  3. Run: bandmark take --key answer-keys/example.toml --record");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# bandmark configuration

default_module = "academic-reading"
time_limit_minutes = 60
history_path = "./bandmark-results/history.jsonl"
output_dir = "./bandmark-results"
"#;

const EXAMPLE_KEY: &str = r#"[test]
id = "example"
title = "Example Reading Test"
module = "academic-reading"
time_limit_minutes = 20

[[questions]]
id = "1"
answer = "TRUE"

[[questions]]
id = "2"
answer = "NOT GIVEN"

[[questions]]
id = "3"
answer = "4/four"

[[questions]]
id = "4"
answer = "the printing press"

[[questions]]
id = "5"
pair = ["B", "E"]
partner = "6"

[[questions]]
id = "6"
pair = ["B", "E"]
partner = "5"

[[questions]]
id = "7&8&9"
select = ["A", "C", "F"]
"#;

const EXAMPLE_ANSWERS: &str = r#"[answers]
"1" = "true"
"2" = "false"
"3" = "Four"
"4" = "Printing press."
"5" = "e"
"6" = "B"
"7&8&9" = ["C", "A", "D"]
"#;
