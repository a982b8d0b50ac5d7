//! Extraction Integration Tests
//!
//! Tests for recursive extraction over real H5P container shapes, and for the
//! dedup and occurrence aggregation policies.

use h5pscan::core::{collect_types_data, count_types, scan};
use h5pscan::{
    ContentRecord, DedupStore, ExtractError, Extractor, OccurrenceCounter, SchemaRegistry,
};
use serde_json::{json, Value};

fn record(nid: i64, machine_name: &str, body: &Value) -> ContentRecord {
    ContentRecord {
        nid,
        content_id: nid,
        machine_name: machine_name.to_string(),
        major_version: 1,
        minor_version: 0,
        json_content: body.to_string(),
        filtered_json_content: None,
    }
}

fn pair(library: &str, params: Value) -> Value {
    json!({"library": library, "params": params})
}

#[test]
fn test_example_scenario() {
    let registry = SchemaRegistry::new().with_rules("A", &["items.*"]).unwrap();
    let extractor = Extractor::new(&registry);
    let body = json!({"items": [
        {"library": "B 1.2", "params": {"x": 1}},
        {"library": "B 1.2", "params": {"x": 2}},
        {"notAPair": true}
    ]});

    let mut store = DedupStore::new();
    extractor.extract(&body, "A", &mut store).unwrap();
    assert_eq!(serde_json::to_value(&store).unwrap(), json!({"B 1.2": {"x": 1}}));

    let counter = count_types(&[record(1, "A", &body)], &extractor).unwrap();
    assert_eq!(counter.count("A"), 1);
    assert_eq!(counter.count("B"), 2);
    assert_eq!(counter.len(), 2);
}

#[test]
fn test_first_write_wins_across_records() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);
    let records = vec![
        record(1, "H5P.QuestionSet", &json!({"questions": [pair("Foo 1.0", json!({"first": true}))]})),
        record(2, "H5P.QuestionSet", &json!({"questions": [pair("Foo 1.0", json!({"first": false}))]})),
    ];

    let store = collect_types_data(&records, &extractor).unwrap();
    assert_eq!(store.get("Foo 1.0"), Some(&json!({"first": true})));

    // The second top-level record shares the first one's signature
    let qs = store.get("H5P.QuestionSet 1.0").unwrap();
    assert_eq!(qs["questions"][0]["params"]["first"], true);
}

#[test]
fn test_counts_are_not_deduplicated() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);
    let mc = || pair("H5P.MultiChoice 1.16", json!({"question": "?"}));
    let body = json!({"content": [
        {"content": mc()},
        {"content": pair("H5P.QuestionSet 1.17", json!({"questions": [mc(), mc()]}))}
    ]});
    let records = vec![record(1, "H5P.Column", &body)];

    let counter = count_types(&records, &extractor).unwrap();
    assert_eq!(counter.count("H5P.MultiChoice"), 3);
    assert_eq!(counter.count("H5P.QuestionSet"), 1);
    assert_eq!(counter.count("H5P.Column"), 1);

    let store = collect_types_data(&records, &extractor).unwrap();
    let multichoice: Vec<_> = store
        .iter()
        .filter(|(sig, _)| sig.machine_name() == "H5P.MultiChoice")
        .collect();
    assert_eq!(multichoice.len(), 1);
}

#[test]
fn test_deep_nesting_visits_each_level_once() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);

    let levels = 50;
    let mut params = json!({"text": "leaf"});
    for level in (1..=levels).rev() {
        params = json!({"content": [{"content": pair(&format!("H5P.Column 1.{level}"), params)}]});
    }

    let mut store = DedupStore::new();
    extractor.extract(&params, "H5P.Column", &mut store).unwrap();
    assert_eq!(store.len(), levels);
    for level in 1..=levels {
        assert!(store.contains(&format!("H5P.Column 1.{level}")));
    }

    let mut counter = OccurrenceCounter::new();
    extractor.extract(&params, "H5P.Column", &mut counter).unwrap();
    assert_eq!(counter.count("H5P.Column"), levels as u64);
}

#[test]
fn test_deep_column_record_through_collect_types_data() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);

    let levels = 50;
    let mut params = json!({"text": "leaf"});
    for level in (1..=levels).rev() {
        params = json!({"content": [{"content": pair(&format!("H5P.Column 1.{level}"), params)}]});
    }
    let records = vec![record(1, "H5P.Column", &params)];

    let store = collect_types_data(&records, &extractor).unwrap();
    // Levels 1..=50 plus the top-level "H5P.Column 1.0"
    assert_eq!(store.len(), levels + 1);
    assert!(store.contains("H5P.Column 1.50"));

    let counter = count_types(&records, &extractor).unwrap();
    assert_eq!(counter.count("H5P.Column"), levels as u64 + 1);
}

#[test]
fn test_object_encoded_list_keeps_document_order() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);
    let raw = r#"{"questions":{
        "2":{"library":"H5P.TrueFalse 1.8","params":{"seen":"first"}},
        "10":{"library":"H5P.TrueFalse 1.8","params":{"seen":"second"}}
    }}"#;
    let records = vec![ContentRecord {
        json_content: raw.to_string(),
        ..record(1, "H5P.QuestionSet", &json!({}))
    }];

    let store = collect_types_data(&records, &extractor).unwrap();
    assert_eq!(store.get("H5P.TrueFalse 1.8"), Some(&json!({"seen": "first"})));
}

#[test]
fn test_elements_without_pairs_are_skipped() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);
    let body = json!({"questions": [
        {"params": {"orphan": true}},
        {"library": "H5P.TrueFalse 1.8"},
        {"library": "", "params": {}},
        "just a string",
        pair("H5P.TrueFalse 1.8", json!({"correct": "true"}))
    ]});

    let mut store = DedupStore::new();
    extractor.extract(&body, "H5P.QuestionSet", &mut store).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("H5P.TrueFalse 1.8"), Some(&json!({"correct": "true"})));
}

#[test]
fn test_missing_container_fields_are_not_errors() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);

    // Every standard container with an empty body
    for (container, _) in registry.iter() {
        let mut store = DedupStore::new();
        extractor.extract(&json!({}), container, &mut store).unwrap();
        assert!(store.is_empty(), "{container} produced entries from an empty body");
    }
}

#[test]
fn test_schema_gap_is_raised() {
    let mut registry = SchemaRegistry::standard();
    registry.flag("H5P.BranchingScenario");
    let extractor = Extractor::new(&registry);

    let body = json!({"content": [{"content": pair("H5P.BranchingScenario 1.7", json!({}))}]});
    let mut store = DedupStore::new();
    let result = extractor.extract(&body, "H5P.Column", &mut store);

    assert_eq!(result, Err(ExtractError::schema_gap("H5P.BranchingScenario")));
}

#[test]
fn test_idempotent_types_data() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);
    let records = vec![
        record(1, "H5P.Accordion", &json!({"panels": [{"content": pair("H5P.AdvancedText 1.1", json!({"text": "a"}))}]})),
        record(2, "H5P.Agamotto", &json!({"items": [{"image": pair("H5P.Image 1.1", json!({"alt": "x"}))}]})),
    ];

    let first = collect_types_data(&records, &extractor).unwrap();
    let second = collect_types_data(&records, &extractor).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
}

#[test]
fn test_interactive_video_interactions_and_summary() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);
    let body = json!({"interactiveVideo": {
        "assets": {"interactions": [
            {"action": pair("H5P.Text 1.1", json!({"text": "note"}))},
            {"action": pair("H5P.SingleChoiceSet 1.11", json!({"choices": []}))}
        ]},
        "summary": {"task": pair("H5P.Summary 1.10", json!({"summaries": []}))}
    }});

    let mut store = DedupStore::new();
    extractor.extract(&body, "H5P.InteractiveVideo", &mut store).unwrap();
    let sigs: Vec<_> = store.iter().map(|(sig, _)| sig.as_str().to_string()).collect();
    assert_eq!(sigs, vec!["H5P.SingleChoiceSet 1.11", "H5P.Summary 1.10", "H5P.Text 1.1"]);
}

#[test]
fn test_interactive_video_without_interactions() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);
    let body = json!({"interactiveVideo": {
        "summary": {"task": pair("H5P.Summary 1.10", json!({}))}
    }});

    let mut counter = OccurrenceCounter::new();
    extractor.extract(&body, "H5P.InteractiveVideo", &mut counter).unwrap();
    assert_eq!(counter.count("H5P.Summary"), 1);
    assert_eq!(counter.total(), 1);
}

#[test]
fn test_two_level_containers() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);

    let presentation = json!({"presentation": {"slides": [
        {"elements": [
            {"action": pair("H5P.Image 1.1", json!({}))},
            {"x": 10, "y": 20}
        ]},
        {},
        {"elements": [{"action": pair("H5P.Blanks 1.14", json!({}))}]}
    ]}});
    let hotspots = json!({"hotspots": [
        {"content": [pair("H5P.Text 1.1", json!({})), {"position": 1}]},
        {"content": [pair("H5P.Video 1.6", json!({}))]}
    ]});
    let drag = json!({"question": {"task": {"elements": [
        {"type": pair("H5P.AdvancedText 1.1", json!({}))},
        {"dropZones": []}
    ]}}});

    let mut counter = OccurrenceCounter::new();
    extractor.extract(&presentation, "H5P.CoursePresentation", &mut counter).unwrap();
    extractor.extract(&hotspots, "H5P.ImageHotspots", &mut counter).unwrap();
    extractor.extract(&drag, "H5P.DragQuestion", &mut counter).unwrap();

    for name in ["H5P.Image", "H5P.Blanks", "H5P.Text", "H5P.Video", "H5P.AdvancedText"] {
        assert_eq!(counter.count(name), 1, "{name}");
    }
    assert_eq!(counter.total(), 5);
}

#[test]
fn test_documentation_tool_recurses_into_standard_page() {
    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);
    let body = json!({"pagesList": [
        pair("H5P.StandardPage 1.5", json!({"elementList": [
            pair("H5P.TextInputField 1.2", json!({"remainingChars": "left"})),
            {"helpTextLabel": "More"}
        ]})),
        pair("H5P.GoalsPage 1.5", json!({}))
    ]});
    let questionnaire = json!({"questionnaireElements": [
        {"library": pair("H5P.OpenEndedQuestion 1.0", json!({}))},
        {"requiredField": false}
    ]});

    let mut store = DedupStore::new();
    extractor.extract(&body, "H5P.DocumentationTool", &mut store).unwrap();
    extractor.extract(&questionnaire, "H5P.Questionnaire", &mut store).unwrap();

    assert!(store.contains("H5P.StandardPage 1.5"));
    assert!(store.contains("H5P.TextInputField 1.2"));
    assert!(store.contains("H5P.GoalsPage 1.5"));
    assert!(store.contains("H5P.OpenEndedQuestion 1.0"));
    assert_eq!(store.len(), 4);
}

#[test]
fn test_scan_feeds_custom_accumulator() {
    struct Visits(Vec<String>);
    impl h5pscan::Accumulator for Visits {
        fn record(&mut self, signature: &h5pscan::LibrarySignature, _: &Value) -> Result<(), ExtractError> {
            self.0.push(signature.to_string());
            Ok(())
        }
    }

    let registry = SchemaRegistry::standard();
    let extractor = Extractor::new(&registry);
    let records = vec![
        record(1, "H5P.Column", &json!({"content": [{"content": pair("H5P.Text 1.1", json!({}))}]})),
        record(2, "H5P.Image", &json!({})),
    ];

    let mut visits = Visits(Vec::new());
    scan(&records, &extractor, &mut visits).unwrap();
    assert_eq!(visits.0, vec!["H5P.Column 1.0", "H5P.Text 1.1", "H5P.Image 1.0"]);
}
