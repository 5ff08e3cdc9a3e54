//! Tests for toolkit-model types.

use std::sync::Arc;

use toolkit_model::{
    DisplayRow, DisplaySection, FileDescriptor, FileKind, Module, parse_structure, row_count,
};

const STRUCTURE: &str = r#"[
    {
        "identifier": 10,
        "attachments": [{ "title": "Preparedness", "mime": "application/pdf" }],
        "directories": [
            {
                "identifier": 11,
                "attachments": [{ "title": "Assess" }],
                "directories": [
                    {
                        "identifier": 12,
                        "directories": [
                            {
                                "identifier": 13,
                                "content": "tools/13.md",
                                "metadata": { "critical_path": true },
                                "attachments": [
                                    {
                                        "title": "Market checklist",
                                        "url": "https://example.org/files/checklist.docx",
                                        "size": 20480,
                                        "mime": "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                                    }
                                ]
                            }
                        ]
                    }
                ]
            }
        ]
    },
    { "identifier": 20 }
]"#;

#[test]
fn structure_parses_full_tree() {
    let modules = parse_structure(STRUCTURE).expect("parse structure");
    assert_eq!(modules.len(), 2);
    assert_eq!(modules.iter().map(|m| m.subtree_len()).sum::<usize>(), 5);

    let tool = &modules[0].children[0].children[0].children[0];
    assert!(tool.is_critical());
    assert_eq!(tool.content.as_deref(), Some("tools/13.md"));
    assert_eq!(tool.icon(), FileKind::Document);

    let file = tool.first_attachment().expect("attachment");
    assert_eq!(file.url(), Some("https://example.org/files/checklist.docx"));
    assert_eq!(file.size(), Some(20480));
}

#[test]
fn structure_rejects_malformed_json() {
    let err = parse_structure("{ not json").expect_err("malformed json");
    assert!(matches!(err, toolkit_model::ToolkitError::Parse(_)));
}

#[test]
fn module_serializes_without_empty_fields() {
    let module = Module::new(1).with_attachment(FileDescriptor::new("Guide"));
    let json = serde_json::to_string(&module).expect("serialize module");
    assert_eq!(json, r#"{"identifier":1,"attachments":[{"title":"Guide"}]}"#);
}

#[test]
fn row_count_sums_sections() {
    let module = Arc::new(Module::new(1));
    let dataset = vec![
        DisplaySection::new(vec![
            DisplayRow::Module(Arc::clone(&module)),
            DisplayRow::Step(Arc::clone(&module)),
        ]),
        DisplaySection::new(vec![DisplayRow::Tool(module)]),
    ];
    assert_eq!(row_count(&dataset), 3);
}
