use airtable_export::{CsvProjector, ExportError, FieldValue, Record};
use std::fs;
use tempfile::TempDir;

fn record(raw: &str) -> Record {
    serde_json::from_str(raw).unwrap()
}

fn sample_batch() -> Vec<Record> {
    vec![
        record(r#"{"id":"r1","createdTime":"2024-01-01T00:00:00Z","fields":{"Name":"Alice","Tags":["a","b"]}}"#),
        record(r#"{"id":"r2","createdTime":"2024-01-02T00:00:00Z","fields":{"Name":"Bob"}}"#),
    ]
}

#[test]
fn test_end_to_end_example() {
    let root = TempDir::new().unwrap();
    let projector = CsvProjector::new(root.path());

    let written = projector.project(&sample_batch(), "out.csv").unwrap();

    assert_eq!(written.path, root.path().join("out.csv"));
    let content = fs::read_to_string(&written.path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        [
            "id,createdTime,Name,Tags",
            r#"r1,2024-01-01T00:00:00Z,Alice,"[""a"",""b""]""#,
            "r2,2024-01-02T00:00:00Z,Bob,",
        ]
    );
}

#[test]
fn test_header_is_union_of_all_field_keys() {
    let root = TempDir::new().unwrap();
    let records = vec![
        record(r#"{"id":"r1","createdTime":"t1","fields":{"A":1,"B":2}}"#),
        record(r#"{"id":"r2","createdTime":"t2","fields":{"B":3,"C":4}}"#),
        record(r#"{"id":"r3","createdTime":"t3","fields":{"A":5,"Last":true}}"#),
    ];

    let written = CsvProjector::new(root.path())
        .project(&records, "union.csv")
        .unwrap();
    assert_eq!(written.columns, ["A", "B", "C", "Last"]);

    let mut reader = csv::Reader::from_path(&written.path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, ["id", "createdTime", "A", "B", "C", "Last"]);

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    assert_eq!(rows[0], ["r1", "t1", "1", "2", "", ""]);
    assert_eq!(rows[1], ["r2", "t2", "", "3", "4", ""]);
    assert_eq!(rows[2], ["r3", "t3", "5", "", "", "true"]);
}

#[test]
fn test_special_characters_survive_quoting() {
    let root = TempDir::new().unwrap();
    let records = vec![record(
        r#"{"id":"r1","createdTime":"t1","fields":{"Notes":"line one\nline \"two\", done","Empty":null}}"#,
    )];

    let written = CsvProjector::new(root.path())
        .project(&records, "quoted.csv")
        .unwrap();

    let mut reader = csv::Reader::from_path(&written.path).unwrap();
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(&row[2], "line one\nline \"two\", done");
    assert_eq!(&row[3], "");
}

#[test]
fn test_nested_cells_parse_back_to_original_values() {
    let root = TempDir::new().unwrap();
    let raw_owner = r#"{"id":"usr1","profile":{"email":"a@example.com","roles":["admin",3,null]}}"#;
    let raw_tags = r#"["x",{"k":false},[1.5]]"#;
    let records = vec![record(&format!(
        r#"{{"id":"r1","createdTime":"t1","fields":{{"Owner":{raw_owner},"Tags":{raw_tags}}}}}"#
    ))];

    let written = CsvProjector::new(root.path())
        .project(&records, "nested.csv")
        .unwrap();

    let mut reader = csv::Reader::from_path(&written.path).unwrap();
    let row = reader.records().next().unwrap().unwrap();

    let owner: serde_json::Value = serde_json::from_str(&row[2]).unwrap();
    let tags: serde_json::Value = serde_json::from_str(&row[3]).unwrap();
    assert_eq!(owner, serde_json::from_str::<serde_json::Value>(raw_owner).unwrap());
    assert_eq!(tags, serde_json::from_str::<serde_json::Value>(raw_tags).unwrap());

    // The cell also re-parses into the same typed value.
    let typed: FieldValue = serde_json::from_str(&row[2]).unwrap();
    assert_eq!(typed, records[0].fields["Owner"]);
}

#[test]
fn test_repeated_projection_is_byte_identical() {
    let root = TempDir::new().unwrap();
    let projector = CsvProjector::new(root.path());
    let records = sample_batch();

    let first = projector.project(&records, "first/out.csv").unwrap();
    let second = projector.project(&records, "second/out.csv").unwrap();

    assert_eq!(fs::read(first.path).unwrap(), fs::read(second.path).unwrap());
}

#[test]
fn test_traversal_is_rejected_without_creating_anything() {
    let sandbox = TempDir::new().unwrap();
    let root = sandbox.path().join("project");
    fs::create_dir(&root).unwrap();
    let projector = CsvProjector::new(&root);

    let err = projector
        .project(&sample_batch(), "../../etc/output.csv")
        .unwrap_err();

    match err {
        ExportError::PathSafetyError { root: reported, .. } => assert_eq!(reported, root),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!sandbox.path().join("etc").exists());
    assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    assert_eq!(fs::read_dir(sandbox.path()).unwrap().count(), 1);
}

#[test]
fn test_overwrite_replaces_previous_export() {
    let root = TempDir::new().unwrap();
    let target = root.path().join("out.csv");
    fs::write(&target, "OLD_CONTENT").unwrap();

    CsvProjector::new(root.path())
        .project(&sample_batch(), "out.csv")
        .unwrap();

    let content = fs::read_to_string(&target).unwrap();
    assert!(!content.contains("OLD_CONTENT"));
    assert!(content.starts_with("id,createdTime,Name,Tags\n"));

    // No temporary siblings are left behind.
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
}
