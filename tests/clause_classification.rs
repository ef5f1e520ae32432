// Clause heading sequencing over whole documents

use riders::clause::{HeadingLayout, Rejection};
use riders::{
    expand, AbbreviationDictionary, ClassifierConfig, ClauseClassifier, ClauseState, LineDecision,
    ParagraphRole, RidersConfig,
};

#[path = "integration/fixtures/mod.rs"]
mod fixtures;
use fixtures::*;

fn classifier() -> ClauseClassifier {
    ClauseClassifier::with_default_config().expect("classifier should build")
}

#[test]
fn test_sequencing_rejects_far_jump() {
    let records = classifier().classify_lines(&[
        "30. Laytime",
        "31. Demurrage",
        "99. Unrelated prose sentence with many words describing something entirely different and long",
    ]);

    assert_eq!(records[0].text, "CLAUSE 30. LAYTIME");
    assert_eq!(records[1].text, "CLAUSE 31. DEMURRAGE");
    assert_eq!(records[2].role, ParagraphRole::Body);
    assert!(!records[2].bold);
}

#[test]
fn test_gap_boundaries() {
    let classifier = classifier();
    let after_31 = ClauseState {
        expected_next_number: Some(32),
    };

    // 32 + 5 is the last accepted number below the late threshold
    assert!(matches!(classifier.step(after_31, "37. Ice").0, LineDecision::Heading { .. }));
    assert!(matches!(
        classifier.step(after_31, "38. Ice").0,
        LineDecision::Body {
            rejected: Some(Rejection::GapTooLarge { .. })
        }
    ));

    let after_89 = ClauseState {
        expected_next_number: Some(90),
    };
    assert!(matches!(classifier.step(after_89, "100. Law").0, LineDecision::Heading { .. }));
    assert!(matches!(classifier.step(after_89, "101. Law").0, LineDecision::Body { .. }));
}

#[test]
fn test_step_state_threads_through_document() {
    let classifier = classifier();
    let mut state = ClauseState::default();
    let mut headings = Vec::new();

    for line in ["1. Vessel", "Owners guarantee", "1. Again", "", "2: Cargo", "4 - Ports"] {
        let (decision, next) = classifier.step(state, line);
        if let LineDecision::Heading { heading, layout } = decision {
            headings.push(layout.heading_text(heading.number, heading.title));
        }
        state = next;
    }

    assert_eq!(headings, vec!["CLAUSE 1. VESSEL", "CLAUSE 2. CARGO", "CLAUSE 4. PORTS"]);
    assert_eq!(state.expected_next_number, Some(5));
}

#[test]
fn test_titles_opening_with_numbers() {
    let records = classifier().classify_lines(&["11. Laytime", "12. 24 Hours Notice", "13. 2nd Port", "13.5 tons"]);
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "CLAUSE 11. LAYTIME",
            "CLAUSE 12. 24 HOURS NOTICE",
            "CLAUSE 13. 2ND PORT",
            "13.5 tons"
        ]
    );
    assert!(records[..3].iter().all(|r| r.is_heading()));
    assert!(!records[3].is_heading());
}

#[test]
fn test_layout_text() {
    assert_eq!(HeadingLayout::NumberOnly.heading_text(7, ""), "CLAUSE 7");
    assert_eq!(HeadingLayout::Deleted.heading_text(7, "deleted"), "CLAUSE 7. DELETED");
    assert_eq!(HeadingLayout::Titled.heading_text(7, "Ice clause"), "CLAUSE 7. ICE CLAUSE");
    assert_eq!(HeadingLayout::NumberThenBody.heading_text(7, "long title"), "CLAUSE 7");
}

#[test]
fn test_expanded_fixture_document() {
    let dictionary: AbbreviationDictionary = RIDER_DICTIONARY.iter().copied().collect();
    let expansion = expand(RIDER_TEXT, &dictionary);
    let records = classifier().classify(expansion.into_lines());

    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, RIDER_PARAGRAPHS);

    let headings = records.iter().filter(|r| r.is_heading()).count();
    assert_eq!(headings, RIDER_HEADINGS);

    // body records keep the spans of their line
    let demurrage = &records[5];
    assert_eq!(
        demurrage.highlighted(),
        vec!["charter party", "owners / charterers", "and/or"]
    );
}

#[test]
fn test_configured_constants() {
    let config = RidersConfig::from_toml_str(
        r#"
[classifier]
max_gap = 1
prose_openers = ["regarding"]
"#,
    )
    .unwrap();
    let classifier = ClauseClassifier::new(config.classifier).unwrap();

    let records = classifier.classify_lines(&["1. Vessel", "4. Cargo", "2. Regarding the cargo", "2. If required"]);
    let roles: Vec<ParagraphRole> = records.iter().map(|r| r.role).collect();
    assert_eq!(
        roles,
        vec![
            ParagraphRole::Heading,
            ParagraphRole::Body,
            ParagraphRole::Body,
            ParagraphRole::Heading,
            ParagraphRole::Body
        ]
    );
    // "if" is no longer a prose opener but still splits the title off
    assert_eq!(records[3].text, "CLAUSE 2");
    assert_eq!(records[4].text, "If required");
}

#[test]
fn test_default_config_matches_builtin_constants() {
    let config = ClassifierConfig::default();
    assert_eq!(config.max_gap, 5);
    assert_eq!(config.late_max_gap, 10);
    assert_eq!(config.late_threshold, 90);
    assert_eq!(config.max_title_words, 30);
}
