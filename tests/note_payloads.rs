use chrono::{TimeZone, Utc};
use notekeep::{parse_body, validate_create, validate_update, Note};

fn stored() -> Note {
    Note {
        id: 3,
        text: "original".into(),
        date: Utc.with_ymd_and_hms(2022, 2, 2, 2, 2, 2).unwrap(),
    }
}

#[test]
fn create_body_becomes_note_with_default_date() {
    let body = parse_body(br#"{"text": "buy milk"}"#).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 5, 5, 5, 5, 5).unwrap();

    let note = validate_create(&body).unwrap().into_note(1, now);

    assert_eq!(note.text, "buy milk");
    assert_eq!(note.date, now);
}

#[test]
fn update_body_with_only_text_keeps_date() {
    let body = parse_body(br#"{"text": "new"}"#).unwrap();
    let merged = validate_update(&body).unwrap().apply(&stored());

    assert_eq!(merged.id, 3);
    assert_eq!(merged.text, "new");
    assert_eq!(merged.date, stored().date);
}

#[test]
fn update_body_with_only_date_keeps_text() {
    let body = parse_body(br#"{"date": "2030-01-01"}"#).unwrap();
    let merged = validate_update(&body).unwrap().apply(&stored());

    assert_eq!(merged.text, "original");
    assert_eq!(merged.date, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn empty_update_body_is_a_no_op() {
    let body = parse_body(b"").unwrap();
    let changes = validate_update(&body).unwrap();

    assert!(changes.is_empty());
    assert_eq!(changes.apply(&stored()), stored());
}

#[test]
fn null_fields_count_as_absent() {
    let body = parse_body(br#"{"text": null, "date": null}"#).unwrap();
    assert!(validate_update(&body).unwrap().is_empty());
    assert_eq!(
        validate_create(&body).unwrap_err().first_message(),
        "text is required"
    );
}
