//! Re-extracting serialized items is stable

use neuroverse_domain::{DumpItem, Priority, Tag};
use neuroverse_extractor::{extract_items, serialize_items};
use proptest::prelude::*;

fn tag() -> impl Strategy<Value = Tag> {
    prop::sample::select(Tag::ALL.to_vec())
}

fn priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn item() -> impl Strategy<Value = DumpItem> {
    ("\\PC{1,60}", tag(), priority())
        .prop_filter_map("blank text", |(text, tag, priority)| {
            DumpItem::new(text, tag, priority)
        })
}

/// Loosely JSON-shaped noise
fn model_output() -> impl Strategy<Value = String> {
    "[\\[\\]{}\":, a-z\n]{0,120}"
}

proptest! {
    /// Property: serialized items extract back unchanged
    #[test]
    fn test_serialized_items_round_trip(items in prop::collection::vec(item(), 0..8)) {
        let json = serialize_items(&items).unwrap();
        prop_assert_eq!(extract_items(&json), items);
    }

    /// Property: extraction is a fixed point after one pass
    #[test]
    fn test_extraction_idempotent(raw in model_output()) {
        let first = extract_items(&raw);
        let json = serialize_items(&first).unwrap();
        prop_assert_eq!(extract_items(&json), first);
    }

    /// Property: extraction never panics and never yields blank text
    #[test]
    fn test_extraction_total(raw in "\\PC{0,200}") {
        for item in extract_items(&raw) {
            prop_assert!(!item.text.trim().is_empty());
            prop_assert_eq!(item.text.trim(), item.text.as_str());
        }
    }
}

#[test]
fn test_round_trip_with_awkward_text() {
    let items = vec![
        DumpItem::new(r#"quote " and brace } and bracket ]"#, Tag::Idea, Priority::Low).unwrap(),
        DumpItem::new("back\\slash, comma", Tag::Urgent, Priority::High).unwrap(),
    ];
    let json = serialize_items(&items).unwrap();
    assert_eq!(extract_items(&json), items);
}
