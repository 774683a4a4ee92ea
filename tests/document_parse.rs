//! 文档解析测试：文件夹嵌套、必需字段、口令字段提升

use std::fs;

use tempfile::tempdir;

use revtrans::{DocumentParser, RevtransError};

fn wrap(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<revelationdata version=\"0.4.11\" dataversion=\"1\">{body}</revelationdata>"
    )
}

fn parse(body: &str) -> Result<revtrans::EntryList, RevtransError> {
    DocumentParser::new().load(wrap(body).as_bytes())
}

#[test]
fn nested_folders_produce_folder_path() {
    let body = r#"
        <entry type="folder">
            <name>A</name>
            <entry type="folder">
                <name>B</name>
                <entry type="website">
                    <name>E</name>
                    <updated>42</updated>
                </entry>
            </entry>
            <entry type="generic">
                <name>F</name>
                <updated>43</updated>
            </entry>
        </entry>
        <entry type="generic">
            <name>Root</name>
            <updated>44</updated>
        </entry>
    "#;

    let mut parser = DocumentParser::new();
    let entries = parser.load(wrap(body).as_bytes()).expect("parse document");

    let names: Vec<_> = entries.entries().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["E", "F", "Root"]);

    let e = &entries.entries()[0];
    assert_eq!(e.folders(), &["A", "B"]);
    assert_eq!(e.kind(), "website");
    assert_eq!(e.last_updated(), 42);

    assert_eq!(entries.entries()[1].folders(), &["A"]);
    assert!(entries.entries()[2].folders().is_empty());

    // 解析结束后文件夹栈应为空
    assert!(parser.folders().is_empty());
}

#[test]
fn secret_field_is_promoted_and_other_fields_are_kept() {
    let body = r#"
        <entry type="generic">
            <name>Mail</name>
            <description>work "mail"</description>
            <updated>1262300400</updated>
            <field id="generic-username">alice</field>
            <field id="generic-password"> s3cr&amp;t </field>
            <field id="generic-hostname">old</field>
            <field id="generic-hostname">mail.example.org</field>
        </entry>
    "#;

    let entries = parse(body).expect("parse document");
    let entry = &entries.entries()[0];

    assert_eq!(entry.secret(), Some(" s3cr&t "));
    assert_eq!(entry.description(), Some("work \"mail\""));
    assert!(entry.field("generic-password").is_none());
    assert_eq!(entry.fields().len(), 2);
    assert_eq!(
        entry.field("generic-hostname").map(|f| f.value()),
        Some("mail.example.org")
    );
}

#[test]
fn element_text_includes_descendant_text() {
    let body = r#"
        <entry type="generic">
            <name>a<b>x</b>c</name>
            <updated>12<i>34</i></updated>
            <field id="generic-password">p<![CDATA[<&>]]><em>q<u>r</u></em>s</field>
        </entry>
    "#;

    let entries = parse(body).expect("parse document");
    let entry = &entries.entries()[0];

    assert_eq!(entry.name(), "axc");
    assert_eq!(entry.last_updated(), 1234);
    assert_eq!(entry.secret(), Some("p<&>qrs"));

    let document = revtrans::document::Document::parse(wrap(body).as_bytes()).expect("parse tree");
    let name = document
        .root()
        .child("entry")
        .and_then(|entry| entry.child("name"))
        .expect("name element");
    assert_eq!(name.text(), "axc");
    assert_eq!(name.children().len(), 1);
}

#[test]
fn entry_without_secret_or_description() {
    let entries = parse(r#"<entry type="note"><name>N</name><updated>1</updated></entry>"#)
        .expect("parse document");
    let entry = &entries.entries()[0];

    assert_eq!(entry.secret(), None);
    assert_eq!(entry.description(), None);
    assert!(entry.fields().is_empty());
}

#[test]
fn entry_without_name_fails() {
    let body = r#"
        <entry type="folder">
            <name>Work</name>
            <entry type="generic"><updated>1</updated></entry>
        </entry>
    "#;

    let err = parse(body).expect_err("missing name");
    match err {
        RevtransError::MissingName { node, path } => {
            assert_eq!(node, "entry");
            assert_eq!(path, "/Work");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn folder_without_name_fails_before_children() {
    // 子条目同样缺少 type，但必须先报告文件夹缺少名字。
    let body = r#"
        <entry type="folder">
            <entry><name>child</name></entry>
        </entry>
    "#;

    let err = parse(body).expect_err("missing folder name");
    assert!(matches!(
        err,
        RevtransError::MissingName { node: "folder", ref path } if path == "/"
    ));
}

#[test]
fn untyped_entry_fails_with_folder_path() {
    let body = r#"
        <entry type="folder">
            <name>A</name>
            <entry><name>x</name><updated>1</updated></entry>
        </entry>
    "#;

    let err = parse(body).expect_err("missing type");
    assert!(matches!(err, RevtransError::MissingType { ref path } if path == "/A"));
}

#[test]
fn missing_timestamp_reports_entry_name() {
    let body = r#"
        <entry type="folder">
            <name>A</name>
            <entry type="generic"><name>x</name></entry>
        </entry>
    "#;

    let err = parse(body).expect_err("missing updated");
    assert!(matches!(err, RevtransError::MissingTimestamp { ref path } if path == "/A/x"));

    let err = parse(r#"<entry type="generic"><name>y</name></entry>"#).expect_err("root entry");
    assert!(matches!(err, RevtransError::MissingTimestamp { ref path } if path == "/y"));
}

#[test]
fn non_numeric_timestamp_is_rejected() {
    let err = parse(r#"<entry type="generic"><name>y</name><updated>yesterday</updated></entry>"#)
        .expect_err("invalid updated");
    assert!(matches!(err, RevtransError::InvalidTimestamp { ref value, .. } if value == "yesterday"));
}

#[test]
fn field_without_id_fails() {
    let body = r#"<entry type="generic"><name>y</name><updated>1</updated><field>v</field></entry>"#;

    let err = parse(body).expect_err("missing field id");
    assert!(matches!(err, RevtransError::MissingFieldId { ref path } if path == "/y"));
}

#[test]
fn parser_is_reusable_after_failure() {
    let mut parser = DocumentParser::new();

    let bad = wrap(r#"<entry type="folder"><name>A</name><entry type="x"></entry></entry>"#);
    parser.load(bad.as_bytes()).expect_err("first document fails");

    let good = wrap(r#"<entry type="generic"><name>ok</name><updated>5</updated></entry>"#);
    let entries = parser.load(good.as_bytes()).expect("second document");

    assert!(entries.entries()[0].folders().is_empty());
    assert!(parser.folders().is_empty());
}

#[test]
fn deeply_nested_folders_do_not_exhaust_the_stack() {
    let depth = 20_000;
    let mut body = String::new();
    for i in 0..depth {
        body.push_str(&format!(r#"<entry type="folder"><name>f{i}</name>"#));
    }
    body.push_str(r#"<entry type="generic"><name>deep</name><updated>1</updated></entry>"#);
    for _ in 0..depth {
        body.push_str("</entry>");
    }

    let entries = parse(&body).expect("parse deep document");
    let entry = &entries.entries()[0];
    assert_eq!(entry.folders().len(), depth);
    assert_eq!(entry.folders()[depth - 1], format!("f{}", depth - 1));
}

#[test]
fn malformed_documents_are_rejected() {
    let inputs: [&[u8]; 4] = [
        b"<revelationdata><entry></revelationdata>",
        b"<other/>",
        b"",
        b"\xff\xfe<revelationdata/>",
    ];

    for input in inputs {
        let err = DocumentParser::new().load(input).expect_err("malformed");
        assert!(matches!(err, RevtransError::MalformedDocument(_)), "input {input:?}");
    }
}

#[test]
fn plain_export_is_read_from_disk() {
    let temp_dir = tempdir().expect("create temp dir");
    let path = temp_dir.path().join("export.xml");
    fs::write(
        &path,
        wrap(r#"<entry type="generic"><name>plain</name><updated>7</updated></entry>"#),
    )
    .expect("write export");

    let entries = revtrans::read_plain(&path).expect("read plain");
    assert_eq!(entries.entries()[0].name(), "plain");
}
