//! Drift heuristic properties across normalizer, similarity and detector.

use pretty_assertions::assert_eq;

use drift_detect::{detect_drift, normalize, similarity, DriftConfig, DriftDetector};

#[test]
fn test_normalize_strips_punctuation_and_case() {
    assert_eq!(normalize("Hello, World!!"), vec!["hello", "world"]);
    assert_eq!(normalize(""), Vec::<String>::new());
    assert_eq!(normalize("  \t\n "), Vec::<String>::new());
}

#[test]
fn test_normalize_is_idempotent() {
    for text in ["Hello, World!!", "Q3 release_notes: v2.1 (draft)", "Ünïcödé «ok»?"] {
        let once = normalize(text).join(" ");
        let twice = normalize(&once).join(" ");
        assert_eq!(once, twice, "normalize not idempotent for {text:?}");
    }
}

#[test]
fn test_similarity_bounds_and_symmetry() {
    assert_eq!(similarity("a b c", "a b c"), 1.0);
    assert_eq!(similarity("a b", "c d"), 0.0);
    assert_eq!(similarity("", "anything"), 0.0);
    assert_eq!(similarity("", ""), 0.0);

    let pairs = [
        ("project deadline", "the deadline moved"),
        ("lunch plans", "pizza for lunch today"),
        ("release", "Release! release? RELEASE."),
    ];
    for (a, b) in pairs {
        let forward = similarity(a, b);
        assert_eq!(forward, similarity(b, a));
        assert!((0.0..=1.0).contains(&forward));
    }
}

#[test]
fn test_blank_title_never_drifts() {
    let config = DriftConfig::default();
    let window = ["totally unrelated chatter", "more random talk"];
    assert!(!detect_drift("", &window, "another unrelated comment", &config));
    assert!(!detect_drift("   ", &window, "another unrelated comment", &config));
}

#[test]
fn test_on_topic_new_message_vetoes() {
    let config = DriftConfig::default();
    let window = ["completely different", "still different", "very different"];
    assert!(!detect_drift(
        "lunch plans",
        &window,
        "lunch plans for today are pizza",
        &config
    ));
}

#[test]
fn test_off_topic_conversation_drifts() {
    let config = DriftConfig::default();
    assert!(detect_drift(
        "project deadline",
        &["totally unrelated chatter", "more random talk"],
        "another unrelated comment",
        &config
    ));
}

#[test]
fn test_blank_window_contributes_nothing() {
    let config = DriftConfig::default();
    assert!(!detect_drift(
        "project deadline",
        &[""],
        "another unrelated comment",
        &config
    ));
}

#[test]
fn test_new_message_counted_once() {
    let detector = DriftDetector::new(DriftConfig {
        min_similarity_threshold: 0.15,
        min_off_topic_messages: 3,
    });

    // One off-topic window entry plus the new message is two, not three
    let assessment = detector.evaluate("project deadline", &["random talk"], "unrelated");
    assert_eq!(assessment.off_topic_count, 2);
    assert!(!assessment.drifted);

    let assessment = detector.evaluate(
        "project deadline",
        &["random talk", "more chatter"],
        "unrelated",
    );
    assert_eq!(assessment.off_topic_count, 3);
    assert!(assessment.drifted);
}

#[test]
fn test_on_topic_window_entries_not_counted() {
    let detector = DriftDetector::default();
    let assessment = detector.evaluate(
        "project deadline",
        &["the project deadline is friday", "random talk"],
        "unrelated",
    );
    assert_eq!(assessment.off_topic_count, 2);
    assert!(assessment.drifted);
}
