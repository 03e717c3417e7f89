use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vigil_base::{Object, ValueKind};
use vigil_cli::{bootstrap, create_object, describe_types, load_declarations, render_objects};
use vigil_model::{Host, Service};

#[test]
fn types_lists_model_classes() {
    let registry = bootstrap().unwrap();
    let summaries = describe_types(&registry);

    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Checkable", "Host", "Object", "Service"]);

    let host = summaries.iter().find(|s| s.name == "Host").unwrap();
    assert_eq!(host.base.as_deref(), Some("Checkable"));
    assert!(!host.is_abstract);
    assert_eq!(host.fields[0].name, "retries");
    assert_eq!(host.fields[0].kind, ValueKind::Integer);

    let checkable = summaries.iter().find(|s| s.name == "Checkable").unwrap();
    assert!(checkable.is_abstract);
}

#[test]
fn type_summary_serializes_abstract_flag() {
    let registry = bootstrap().unwrap();
    let json = serde_json::to_value(describe_types(&registry)).unwrap();
    assert_eq!(json[0]["name"], "Checkable");
    assert_eq!(json[0]["abstract"], true);
    assert_eq!(json[1]["fields"][0]["kind"], "integer");
}

#[test]
fn create_prints_default_object() {
    let registry = bootstrap().unwrap();
    let json = create_object(&registry, "Service").unwrap();
    assert_eq!(json["type"], "Service");
    assert_eq!(json["fields"]["max_check_attempts"], 3);
    assert_eq!(json["fields"]["host"], serde_json::Value::Null);
}

#[test]
fn create_unknown_type_fails_with_name() {
    let registry = bootstrap().unwrap();
    let err = create_object(&registry, "NoSuchType").unwrap_err();
    assert!(format!("{err:#}").contains("NoSuchType"));
}

#[test]
fn load_reads_array_of_declarations() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("objects.json");
    fs::write(
        &path,
        r#"[
            {"type": "Host", "fields": {"name": "db-01", "address": "10.0.0.5"}},
            {"type": "Service", "fields": {"name": "ssh", "host": {"type": "Host"}}}
        ]"#,
    )
    .unwrap();

    let registry = bootstrap().unwrap();
    let objects = load_declarations(&registry, &path).unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(
        objects[0].get_field(Host::ADDRESS).unwrap().as_str(),
        Some("10.0.0.5")
    );
    assert_eq!(objects[1].reflection_type().name(), "Service");
    assert!(objects[1].get_field(Service::HOST).unwrap().as_object().is_some());

    let rendered = render_objects(&objects).unwrap();
    assert_eq!(rendered[1]["fields"]["host"]["type"], "Host");
}

#[test]
fn load_accepts_single_declaration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("host.json");
    fs::write(&path, r#"{"type": "Host", "fields": {"retries": 1}}"#).unwrap();

    let registry = bootstrap().unwrap();
    let objects = load_declarations(&registry, &path).unwrap();
    assert_eq!(objects.len(), 1);
}

#[test]
fn load_reports_failing_declaration_index() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"[{"type": "Host"}, {"type": "Host", "fields": {"retries": -2}}]"#,
    )
    .unwrap();

    let registry = bootstrap().unwrap();
    let err = load_declarations(&registry, &path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("declaration #1"), "{message}");
    assert!(message.contains("must not be negative"), "{message}");
}

#[test]
fn load_rejects_missing_and_malformed_files() {
    let dir = TempDir::new().unwrap();
    let registry = bootstrap().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(load_declarations(&registry, &missing).is_err());

    let scalar = dir.path().join("scalar.json");
    fs::write(&scalar, "42").unwrap();
    assert!(load_declarations(&registry, &scalar).is_err());

    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "{not json").unwrap();
    let err = load_declarations(&registry, &garbage).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}
