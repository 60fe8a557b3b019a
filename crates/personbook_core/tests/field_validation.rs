use chrono::NaiveDate;
use personbook_core::validate::is_valid;
use personbook_core::{
    build_person_at, validate, validate_line, FieldKind, FieldRejection, RecordFields,
};

#[test]
fn required_fields_accept_valid_values() {
    assert_eq!(
        validate(&["Alice"], FieldKind::Name).unwrap().as_deref(),
        Some("Alice")
    );
    assert!(is_valid(&["1.5"], FieldKind::Decimal));
    assert!(is_valid(&["-272"], FieldKind::CoordinateY));
    assert!(is_valid(&["170"], FieldKind::Height));
    assert!(is_valid(&["Berlin"], FieldKind::LocationName));
}

#[test]
fn coordinate_y_must_stay_above_absolute_zero() {
    assert_eq!(
        validate(&["-273"], FieldKind::CoordinateY),
        Err(FieldRejection::OutOfRange)
    );
    assert_eq!(
        validate(&["-1000"], FieldKind::CoordinateY),
        Err(FieldRejection::OutOfRange)
    );
}

#[test]
fn height_must_be_positive() {
    assert_eq!(validate(&["0"], FieldKind::Height), Err(FieldRejection::OutOfRange));
    assert_eq!(validate(&["tall"], FieldKind::Height), Err(FieldRejection::Malformed));
}

#[test]
fn names_are_single_latin_words() {
    assert_eq!(validate(&["Al1ce"], FieldKind::Name), Err(FieldRejection::Malformed));
    assert_eq!(
        validate(&["Alice", "Smith"], FieldKind::Name),
        Err(FieldRejection::TooManyTokens)
    );
    assert_eq!(
        validate(&[], FieldKind::Name),
        Err(FieldRejection::Empty { optional: false })
    );
}

#[test]
fn skip_only_applies_to_optional_fields() {
    assert_eq!(validate_line("skip", FieldKind::Date), Ok(None));
    assert_eq!(validate_line("skip", FieldKind::EyeColor), Ok(None));
    assert_eq!(validate_line("skip", FieldKind::HairColor), Ok(None));
    assert_eq!(validate_line("skip", FieldKind::LocationX), Ok(None));
    assert_eq!(validate_line("skip", FieldKind::Height), Err(FieldRejection::Malformed));
    assert_eq!(
        validate_line("   ", FieldKind::Date),
        Err(FieldRejection::Empty { optional: true })
    );
}

#[test]
fn colors_match_exact_names() {
    assert!(is_valid(&["GREEN"], FieldKind::EyeColor));
    assert!(is_valid(&["BLACK"], FieldKind::HairColor));
    assert_eq!(
        validate(&["green"], FieldKind::EyeColor),
        Err(FieldRejection::UnknownVariant)
    );
    assert_eq!(
        validate(&["BLACK"], FieldKind::EyeColor),
        Err(FieldRejection::UnknownVariant)
    );
}

#[test]
fn dates_use_iso_format() {
    assert!(is_valid(&["1990-04-12"], FieldKind::Date));
    assert_eq!(validate(&["12.04.1990"], FieldKind::Date), Err(FieldRejection::Malformed));
}

#[test]
fn validated_fields_build_a_valid_person() {
    let mut fields: RecordFields = Default::default();
    fields[0] = Some("Alice".to_string());
    fields[1] = Some("1.5".to_string());
    fields[2] = Some("10".to_string());
    fields[3] = Some("170".to_string());
    fields[4] = Some("1990-04-12".to_string());
    fields[6] = Some("RED".to_string());

    let created = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();
    let person = build_person_at(&fields, created).unwrap();

    assert_eq!(person.name, "Alice");
    assert_eq!(person.height, 170);
    assert_eq!(person.creation_date, created);
    assert_eq!(person.birthday, NaiveDate::from_ymd_opt(1990, 4, 12));
    assert!(person.eye_color.is_none());
    assert!(person.location.is_none());
    assert!(person.validate().is_ok());
}
