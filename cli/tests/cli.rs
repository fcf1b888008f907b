use anyhow::Result;
use assert_cmd::Command;
use assert_fs::NamedTempFile;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::{Value, json};

const DEFINITIONS: &str = r#"[
    {"concept": 1, "root": {"node": "DefinitionRoot", "children": [
        {"node": "NecessarySet", "children": [
            {"node": "And", "children": [
                {"node": "ConceptReference", "concept": 2},
                {"node": "Role", "role_type": 10, "children": [{"node": "ConceptReference", "concept": 3}]}
            ]}
        ]}
    ]}},
    {"concept": 2, "root": {"node": "DefinitionRoot", "children": [
        {"node": "NecessarySet", "children": [{"node": "ConceptReference", "concept": 100}]}
    ]}},
    {"concept": 10, "root": {"node": "DefinitionRoot", "children": [
        {"node": "PropertySet", "children": [
            {"node": "And", "children": [
                {"node": "ConceptReference", "concept": 11},
                {"node": "ConceptReference", "concept": "transitive"}
            ]}
        ]}
    ]}}
]"#;

fn cli_command() -> Result<Command> {
    Ok(Command::cargo_bin("oxclassify")?)
}

fn definitions_file(content: &str) -> Result<NamedTempFile> {
    let file = NamedTempFile::new("definitions.json")?;
    file.write_str(content)?;
    Ok(file)
}

fn entry<'a>(results: &'a Value, concept: u64) -> Option<&'a Value> {
    results["taxonomy"]
        .as_array()?
        .iter()
        .find(|entry| entry["concept"] == concept)
}

#[test]
fn cli_help() -> Result<()> {
    cli_command()?
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn cli_classify() -> Result<()> {
    let input = definitions_file(DEFINITIONS)?;
    let output = cli_command()?
        .arg("classify")
        .arg("--file")
        .arg(input.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let results = serde_json::from_slice::<Value>(&output)?;
    assert_eq!(entry(&results, 1).unwrap()["parents"], json!([2]));
    assert_eq!(entry(&results, 2).unwrap()["parents"], json!([100]));
    assert_eq!(entry(&results, 10).unwrap()["parents"], json!([11]));
    assert_eq!(results["summary"]["incomplete"], json!(false));
    assert!(results.get("inferred").is_none());
    Ok(())
}

#[test]
fn cli_classify_formal_with_inferred() -> Result<()> {
    let input = definitions_file(DEFINITIONS)?;
    let output = NamedTempFile::new("results.json")?;
    cli_command()?
        .arg("classify")
        .arg("--file")
        .arg(input.path())
        .arg("--backend")
        .arg("formal")
        .arg("--threads")
        .arg("1")
        .arg("--inferred")
        .arg("--output")
        .arg(output.path())
        .assert()
        .success()
        .stdout("");
    let results = serde_json::from_str::<Value>(&std::fs::read_to_string(output.path())?)?;
    assert_eq!(entry(&results, 1).unwrap()["parents"], json!([2]));
    let inferred = results["inferred"].as_array().unwrap();
    assert!(
        inferred
            .iter()
            .any(|definition| definition["concept"] == 1)
    );
    Ok(())
}

#[test]
fn cli_incremental() -> Result<()> {
    let input = definitions_file(DEFINITIONS)?;
    let changes = NamedTempFile::new("changes.json")?;
    changes.write_str(
        r#"{
            "deleted": [2],
            "updated": [{"concept": 1, "root": {"node": "DefinitionRoot", "children": [
                {"node": "NecessarySet", "children": [{"node": "ConceptReference", "concept": 100}]}
            ]}}]
        }"#,
    )?;
    let output = cli_command()?
        .arg("incremental")
        .arg("--file")
        .arg(input.path())
        .arg("--changes")
        .arg(changes.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let results = serde_json::from_slice::<Value>(&output)?;
    assert_eq!(entry(&results, 1).unwrap()["parents"], json!([100]));
    assert!(entry(&results, 2).is_none());
    Ok(())
}

#[test]
fn cli_reports_the_failing_concept() -> Result<()> {
    let input = definitions_file(
        r#"[{"concept": 3, "root": {"node": "DefinitionRoot", "children": [
            {"node": "NecessarySet", "children": [
                {"node": "Or", "children": [
                    {"node": "ConceptReference", "concept": 1},
                    {"node": "ConceptReference", "concept": 2}
                ]}
            ]}
        ]}}]"#,
    )?;
    cli_command()?
        .arg("classify")
        .arg("--file")
        .arg(input.path())
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("concept 3"));
    Ok(())
}

#[test]
fn cli_invalid_json() -> Result<()> {
    let input = definitions_file(r#"[{"concept": 1, "root": {"node": "Unknown"}}]"#)?;
    cli_command()?
        .arg("classify")
        .arg("--file")
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON"));
    Ok(())
}

#[test]
fn cli_json_logs() -> Result<()> {
    let input = definitions_file(DEFINITIONS)?;
    cli_command()?
        .arg("classify")
        .arg("--file")
        .arg(input.path())
        .arg("--log-format")
        .arg("json")
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""level":"INFO""#));
    Ok(())
}
