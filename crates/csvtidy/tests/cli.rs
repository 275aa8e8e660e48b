use std::fs;
use std::process::Command;

use anyhow::Result;
use serde_json::Value;

fn csvtidy() -> Command {
    Command::new(env!("CARGO_BIN_EXE_csvtidy"))
}

fn fixture(name: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../csvtidy-core/tests/data")
        .join(name);
    fs::read(path).expect("read fixture")
}

#[test]
fn clean_writes_output_next_to_input() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("contacts.csv");
    fs::write(&input, fixture("contacts.csv"))?;
    let report_path = dir.path().join("report.json");

    let output = csvtidy()
        .arg("clean")
        .arg(&input)
        .args(["--format", "signup=date", "--format", "active=boolean"])
        .arg("--report-json")
        .arg(&report_path)
        .output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let cleaned = fs::read_to_string(dir.path().join("contacts_clean.csv"))?;
    assert!(cleaned.starts_with("name,email,signup,age,active\nAna Silva,"));
    assert_eq!(cleaned.lines().count(), 5);

    let report: Value = serde_json::from_slice(&fs::read(&report_path)?)?;
    assert_eq!(report["totalRows"], 6);
    assert_eq!(report["duplicatesRemoved"], 2);
    assert_eq!(report["finalRows"], 4);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("finalRows"));
    assert!(stdout.contains("Cleaned data written to"));
    Ok(())
}

#[test]
fn clean_honours_explicit_output_and_disabled_passes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("dups.csv");
    fs::write(&input, "k;v\na;1\na;1\n")?;
    let target = dir.path().join("out.csv");

    let status = csvtidy()
        .arg("clean")
        .arg(&input)
        .arg("-o")
        .arg(&target)
        .arg("--no-remove-duplicates")
        .status()?;
    assert!(status.success());
    assert_eq!(fs::read_to_string(&target)?, "k;v\na;1\na;1\n");
    assert!(!dir.path().join("dups_clean.csv").exists());
    Ok(())
}

#[test]
fn clean_reads_a_config_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("people.csv");
    fs::write(&input, "name,age\nana,\nbo,7\n")?;
    let config = dir.path().join("csvtidy.toml");
    fs::write(
        &config,
        "[options]\nnullPolicy = \"dropRow\"\ncaseRule = \"title\"\n",
    )?;

    let status = csvtidy()
        .arg("clean")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .status()?;
    assert!(status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("people_clean.csv"))?,
        "name,age\nBo,7\n"
    );
    Ok(())
}

#[test]
fn clean_fails_on_unparseable_input() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("broken.csv");
    fs::write(&input, "a,b\n\"never closed,1\n")?;

    let output = csvtidy().arg("clean").arg(&input).output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("never closed"));
    assert!(!dir.path().join("broken_clean.csv").exists());
    Ok(())
}

#[test]
fn inspect_prints_dialect_and_preview() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("contacts.csv");
    fs::write(&input, fixture("contacts.csv"))?;

    let output = csvtidy().arg("inspect").arg(&input).output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Delimiter: ,"));
    assert!(stdout.contains("Columns:   5"));
    assert!(stdout.contains("Rows:      6"));
    assert!(stdout.contains("... 1 more rows"));
    Ok(())
}
