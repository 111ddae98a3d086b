use riak_types::{
    AutoIndex, AutoIndexRemoval, Document, Error, IndexRemoval, IndexType, IndexValue,
    SecondaryIndex,
};
use serde_json::json;

// ── IndexType ─────────────────────────────────────────────────────

#[test]
fn index_type_parses_case_insensitively() {
    assert_eq!("int".parse::<IndexType>().unwrap(), IndexType::Int);
    assert_eq!("BIN".parse::<IndexType>().unwrap(), IndexType::Bin);
}

#[test]
fn index_type_rejects_unknown() {
    assert!(matches!(
        "float".parse::<IndexType>().unwrap_err(),
        Error::InvalidIndexType(_)
    ));
}

#[test]
fn index_name_is_lowercased_with_suffix() {
    assert_eq!(IndexType::Int.index_name("Age"), "age_int");
    assert_eq!(IndexType::Bin.index_name("email"), "email_bin");
}

#[test]
fn split_index_name_uses_last_underscore() {
    let (name, index_type) = IndexType::split_index_name("first_name_bin").unwrap();
    assert_eq!(name, "first_name");
    assert_eq!(index_type, IndexType::Bin);
}

#[test]
fn split_index_name_requires_suffix() {
    assert!(IndexType::split_index_name("plain").is_err());
    assert!(IndexType::split_index_name("_int").is_err());
    assert!(IndexType::split_index_name("age_float").is_err());
}

// ── IndexValue ────────────────────────────────────────────────────

#[test]
fn index_value_parse_int() {
    assert_eq!(IndexValue::parse(IndexType::Int, " 42 ").unwrap(), IndexValue::Int(42));
    assert!(matches!(
        IndexValue::parse(IndexType::Int, "forty").unwrap_err(),
        Error::InvalidIndexValue { .. }
    ));
}

#[test]
fn index_value_parse_bin_keeps_text() {
    assert_eq!(
        IndexValue::parse(IndexType::Bin, "a b").unwrap(),
        IndexValue::Bin("a b".to_string())
    );
}

#[test]
fn index_value_from_field() {
    assert_eq!(IndexValue::from_field(IndexType::Int, &json!(7)), Some(IndexValue::Int(7)));
    assert_eq!(IndexValue::from_field(IndexType::Int, &json!("8")), Some(IndexValue::Int(8)));
    assert_eq!(IndexValue::from_field(IndexType::Int, &json!(1.5)), None);
    assert_eq!(IndexValue::from_field(IndexType::Int, &json!("x")), None);
    assert_eq!(
        IndexValue::from_field(IndexType::Bin, &json!(12)),
        Some(IndexValue::Bin("12".to_string()))
    );
    assert_eq!(
        IndexValue::from_field(IndexType::Bin, &json!(true)),
        Some(IndexValue::Bin("true".to_string()))
    );
    assert_eq!(IndexValue::from_field(IndexType::Bin, &json!(["a"])), None);
}

#[test]
fn index_value_type_follows_variant() {
    assert_eq!(IndexValue::from(3).index_type(), IndexType::Int);
    assert_eq!(IndexValue::from("x").index_type(), IndexType::Bin);
}

// ── Descriptors ───────────────────────────────────────────────────

#[test]
fn secondary_index_lowercases_name() {
    let index = SecondaryIndex::bin("Email", "a@b.c");
    assert_eq!(index.name, "email");
    assert_eq!(index.index_name(), "email_bin");
}

#[test]
fn secondary_index_from_str() {
    let index: SecondaryIndex = "score:int:10".parse().unwrap();
    assert_eq!(index, SecondaryIndex::int("score", 10));

    let index: SecondaryIndex = "url:bin:http://x".parse().unwrap();
    assert_eq!(index, SecondaryIndex::bin("url", "http://x"));

    assert!("score:int".parse::<SecondaryIndex>().is_err());
    assert!("score:int:ten".parse::<SecondaryIndex>().is_err());
}

#[test]
fn secondary_index_display_round_trips() {
    let index = SecondaryIndex::int("score", -3);
    assert_eq!(index.to_string(), "score:int:-3");
    assert_eq!(index.to_string().parse::<SecondaryIndex>().unwrap(), index);
}

#[test]
fn auto_index_from_str() {
    assert_eq!("age:int".parse::<AutoIndex>().unwrap(), AutoIndex::int("age"));
    assert!("age".parse::<AutoIndex>().is_err());
    assert!(":int".parse::<AutoIndex>().is_err());
}

#[test]
fn auto_index_derives_from_field() {
    let doc = Document::from_value(json!({"Age": 28, "name": "John"})).unwrap();
    assert_eq!(AutoIndex::int("Age").derive(&doc), Some(SecondaryIndex::int("age", 28)));
    assert_eq!(
        AutoIndex::bin("name").derive(&doc),
        Some(SecondaryIndex::bin("name", "John"))
    );
    assert_eq!(AutoIndex::int("missing").derive(&doc), None);
    assert_eq!(AutoIndex::int("name").derive(&doc), None);
}

// ── Removal selectors ─────────────────────────────────────────────

#[test]
fn index_removal_matching() {
    let int = SecondaryIndex::int("tag", 1);
    let bin = SecondaryIndex::bin("tag", "x");
    let other = SecondaryIndex::int("other", 1);

    assert!(IndexRemoval::All.matches(&other));

    let by_name = IndexRemoval::Name("TAG".to_string());
    assert!(by_name.matches(&int) && by_name.matches(&bin) && !by_name.matches(&other));

    let by_type = IndexRemoval::NameAndType("tag".to_string(), IndexType::Bin);
    assert!(!by_type.matches(&int) && by_type.matches(&bin));

    let exact = IndexRemoval::Exact(SecondaryIndex::int("tag", 1));
    assert!(exact.matches(&int) && !exact.matches(&SecondaryIndex::int("tag", 2)));
}

#[test]
fn index_removal_lowercases_non_ascii_names() {
    let entry = SecondaryIndex::bin("ÉTAT", "ok");
    assert_eq!(entry.name, "état");

    assert!(IndexRemoval::Name("ÉTAT".to_string()).matches(&entry));
    assert!(IndexRemoval::Name("État".to_string()).matches(&entry));
    assert!(IndexRemoval::NameAndType("ÉTAT".to_string(), IndexType::Bin).matches(&entry));
    assert!(!IndexRemoval::NameAndType("ÉTAT".to_string(), IndexType::Int).matches(&entry));
}

#[test]
fn auto_index_removal_matching() {
    let age_int = AutoIndex::int("age");
    let age_bin = AutoIndex::bin("age");

    assert!(AutoIndexRemoval::All.matches(&age_int));

    let field = AutoIndexRemoval::Field("age".to_string());
    assert!(field.matches(&age_int) && field.matches(&age_bin));

    let exact = AutoIndexRemoval::Exact(AutoIndex::int("age"));
    assert!(exact.matches(&age_int) && !exact.matches(&age_bin));
}

#[test]
fn auto_index_removal_matches_field_case_exactly() {
    let lower = AutoIndex::int("age");
    let upper = AutoIndex::int("Age");

    let field = AutoIndexRemoval::Field("age".to_string());
    assert!(field.matches(&lower) && !field.matches(&upper));

    let exact = AutoIndexRemoval::Exact(AutoIndex::int("Age"));
    assert!(exact.matches(&upper) && !exact.matches(&lower));
}
