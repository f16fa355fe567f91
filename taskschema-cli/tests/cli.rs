use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn command(home: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_taskschema"))
        .args(args)
        .env("HOME", home)
        .env_remove("USERPROFILE")
        .env_remove("RUST_LOG")
        .env_remove("TASKSCHEMA_MODE")
        .env_remove("TASKSCHEMA_PRETTY")
        .env_remove("TASKSCHEMA_LOG")
        .current_dir(home)
        .output()
        .with_context(|| format!("running taskschema with args {:?}", args))
}

fn run_cli(home: &Path, args: &[&str]) -> Result<Value> {
    let output = command(home, args)?;
    if !output.status.success() {
        anyhow::bail!(
            "taskschema command {:?} failed (status={})\nstdout:\n{}\nstderr:\n{}",
            args,
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    serde_json::from_slice(&output.stdout).context("parsing taskschema output")
}

fn write_json(dir: &Path, name: &str, value: &Value) -> Result<String> {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(value)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path
        .to_str()
        .context("fixture path is not valid UTF-8")?
        .to_string())
}

fn event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "day": {"type": "string", "format": "date"},
            "speakers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"name": {"type": "string"}, "photo": {"type": "string"}}
                }
            }
        }
    })
}

#[test]
fn cli_classify() -> Result<()> {
    let dir = tempfile::tempdir().context("creating temp dir")?;
    let schema = write_json(dir.path(), "schema.json", &event_schema())?;

    let day = run_cli(dir.path(), &["classify", &schema, "--path", "day"])?;
    assert_eq!(day, json!("date"));

    let root = run_cli(dir.path(), &["classify", &schema])?;
    assert_eq!(root, json!("object"));

    let value = write_json(dir.path(), "value.json", &json!(42))?;
    let missing = run_cli(
        dir.path(),
        &["classify", &schema, "--path", "count", "--value", &value],
    )?;
    assert_eq!(missing, json!("number"));
    Ok(())
}

#[test]
fn cli_set_type_then_synthesize() -> Result<()> {
    let dir = tempfile::tempdir().context("creating temp dir")?;
    let schema = write_json(dir.path(), "schema.json", &event_schema())?;

    let edited = run_cli(
        dir.path(),
        &["set-type", &schema, "speakers.0.photo", "image"],
    )?;
    assert_eq!(
        edited["properties"]["speakers"]["items"]["properties"]["photo"],
        json!({"$ref": "#/$defs/Image"})
    );
    assert!(edited["$defs"]["Image"].is_object());

    let edited_path = write_json(dir.path(), "edited.json", &edited)?;
    let value = run_cli(dir.path(), &["synthesize", &edited_path, "--mode", "example"])?;
    assert_eq!(value["title"], json!("this is a string"));
    assert_eq!(value["day"], json!("2024-01-01"));
    assert_eq!(
        value["speakers"][0]["photo"],
        json!({
            "content_type": "this is a string",
            "data": "this is a string",
            "url": "this is a string"
        })
    );
    Ok(())
}

#[test]
fn cli_merge() -> Result<()> {
    let dir = tempfile::tempdir().context("creating temp dir")?;
    let old = write_json(dir.path(), "old.json", &event_schema())?;
    let new = write_json(
        dir.path(),
        "new.json",
        &json!({"properties": {"venue": {"type": "string"}}, "required": ["venue"]}),
    )?;

    let merged = run_cli(dir.path(), &["merge", &old, &new])?;
    let keys: Vec<_> = merged["properties"]
        .as_object()
        .context("merged schema has no properties")?
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec!["title", "day", "speakers", "venue"]);
    assert_eq!(merged["required"], json!(["venue"]));
    assert_eq!(merged["type"], json!("object"));
    Ok(())
}

#[test]
fn cli_schema_path_and_reset() -> Result<()> {
    let dir = tempfile::tempdir().context("creating temp dir")?;

    let path = run_cli(dir.path(), &["schema-path", "speakers.0.name"])?;
    assert_eq!(path, json!("properties.speakers.items.properties.name"));

    let value = write_json(
        dir.path(),
        "value.json",
        &json!({"title": "Launch", "count": 3, "tags": ["a"], "open": true}),
    )?;
    let reset = run_cli(dir.path(), &["--compact", "reset", &value])?;
    assert_eq!(
        reset,
        json!({"title": "", "count": 0, "tags": [], "open": false})
    );
    Ok(())
}

#[test]
fn cli_config_file_sets_default_mode() -> Result<()> {
    let dir = tempfile::tempdir().context("creating temp dir")?;
    let schema = write_json(dir.path(), "schema.json", &event_schema())?;
    let config = dir.path().join("taskschema.toml");
    fs::write(&config, "mode = \"void\"\npretty = false\n").context("writing config")?;
    let config = config.to_str().context("config path is not valid UTF-8")?;

    let output = command(dir.path(), &["--config", config, "synthesize", &schema])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.trim().lines().count(), 1);

    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(value["title"], json!(""));
    assert_eq!(value["speakers"][0]["name"], json!(""));
    Ok(())
}

#[test]
fn cli_reports_errors() -> Result<()> {
    let dir = tempfile::tempdir().context("creating temp dir")?;
    let missing = dir.path().join("missing.json");
    let missing = missing.to_str().context("path is not valid UTF-8")?;

    let output = command(dir.path(), &["merge", missing, missing])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.json"), "stderr was: {}", stderr);

    let schema = write_json(dir.path(), "schema.json", &event_schema())?;
    let output = command(dir.path(), &["set-type", &schema, "title", "picture"])?;
    assert!(!output.status.success());
    Ok(())
}
