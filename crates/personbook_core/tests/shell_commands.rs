use personbook_core::{
    load_collection, CollectionStore, Coordinates, Flow, HairColor, InteractiveSource, Person,
    PersonKey, Session,
};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

const ALICE_RECORD: &str = "Alice\n1.5\n10\n170\nskip\nskip\nskip\nskip\n";

fn session_with_keys(keys: &[PersonKey], path: &Path) -> Session<Vec<u8>> {
    let entries = keys
        .iter()
        .map(|key| (*key, Person::new("Zed", Coordinates::new(0.0, 0), 100)))
        .collect::<BTreeMap<_, _>>();
    Session::new(CollectionStore::with_entries(entries), path, Vec::new())
}

fn run(session: &mut Session<Vec<u8>>, input: &str) -> Flow {
    let mut source = InteractiveSource::new(Cursor::new(input.to_string()));
    session.run(&mut source).unwrap()
}

/// Output written since `from`.
fn output_since(session: &Session<Vec<u8>>, from: usize) -> String {
    String::from_utf8_lossy(&session.output()[from..]).into_owned()
}

#[test]
fn insert_alice_then_show_prints_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[], &dir.path().join("people.xml"));

    run(&mut session, &format!("insert\n{ALICE_RECORD}"));
    let store = session.store().unwrap();
    assert_eq!(store.len(), 1);
    let (_, alice) = store.entries().next().unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.coordinates, Coordinates::new(1.5, 10));
    assert_eq!(alice.height, 170);
    assert!(alice.birthday.is_none() && alice.location.is_none());

    let printed = output_since(&session, 0);
    assert!(printed.contains("Element added with key"));
    assert!(printed.contains("Enter coordinates"));
    assert!(printed.contains("[GREEN] [RED] [YELLOW] [WHITE]"));

    let mark = session.output().len();
    run(&mut session, "show\n");
    let shown = output_since(&session, mark);
    assert_eq!(shown.lines().count(), 1);
    assert!(shown.contains("Alice"));
    assert!(shown.contains("location = none"));
}

#[test]
fn interactive_insert_retries_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[], &dir.path().join("people.xml"));

    run(
        &mut session,
        "insert\nAl1ce\nAlice\n1.5\n-273\n10\n0\n170\nskip\nBLUE\nskip\nskip\nskip\n",
    );
    assert_eq!(session.store().unwrap().len(), 1);
    let printed = output_since(&session, 0);
    assert!(printed.contains("invalid format"));
    assert!(printed.contains("out of the allowed range"));
    assert!(printed.contains("not in the list"));
}

#[test]
fn insert_with_location_reads_all_location_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[], &dir.path().join("people.xml"));

    run(
        &mut session,
        "insert\nAlice\n1.5\n10\n170\n1990-04-12\nGREEN\nRED\n3\n4.5\n6\nBerlin\nshow\n",
    );
    let store = session.store().unwrap();
    let (_, alice) = store.entries().next().unwrap();
    let location = alice.location.as_ref().unwrap();
    assert_eq!(location.name, "Berlin");
    assert_eq!(location.z, 6);
    assert_eq!(alice.hair_color, Some(HairColor::Red));
}

#[test]
fn remove_greater_key_reports_count() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[3, 5, 9], &dir.path().join("people.xml"));

    run(&mut session, "remove_greater_key 5\n");
    let keys = session.store().unwrap().sorted_keys().collect::<Vec<_>>();
    assert_eq!(keys, vec![3, 5]);
    assert!(output_since(&session, 0).contains("1 element(s) removed."));
}

#[test]
fn remove_lower_key_requires_existing_pivot() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[3, 5, 9], &dir.path().join("people.xml"));

    run(&mut session, "remove_lower_key 4\nremove_lower_key 9\n");
    let keys = session.store().unwrap().sorted_keys().collect::<Vec<_>>();
    assert_eq!(keys, vec![9]);
    let printed = output_since(&session, 0);
    assert!(printed.contains("No element with key 4."));
    assert!(printed.contains("2 element(s) removed."));
}

#[test]
fn unknown_command_hints_at_help() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[], &dir.path().join("people.xml"));

    run(&mut session, "foo\nShow\n");
    let printed = output_since(&session, 0);
    assert!(printed
        .contains("Unknown command `foo`. Type `help` to list available commands."));
    assert!(printed.contains("Unknown command `Show`."));
}

#[test]
fn arity_errors_do_not_touch_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[3], &dir.path().join("people.xml"));

    run(&mut session, "remove\nremove 3 4\nshow extra\n");
    assert_eq!(session.store().unwrap().len(), 1);
    let printed = output_since(&session, 0);
    assert!(printed.contains("`remove` is missing an argument. Usage: remove [key]"));
    assert!(printed.contains("Too many arguments. Usage: remove [key]"));
    assert!(printed.contains("`show` takes no arguments."));
}

#[test]
fn non_numeric_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[3], &dir.path().join("people.xml"));

    run(&mut session, "update three\n");
    assert!(output_since(&session, 0).contains("Key must be an integer, got `three`."));
}

#[test]
fn replace_if_greater_reports_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[3], &dir.path().join("people.xml"));

    run(&mut session, &format!("replace_if_greater 3\n{ALICE_RECORD}"));
    assert_eq!(session.store().unwrap().get(3).unwrap().name, "Zed");
    assert!(output_since(&session, 0).contains("element 3 kept."));

    let mark = session.output().len();
    run(
        &mut session,
        "replace_if_greater 3\nZoe\n0\n0\n100\nskip\nskip\nskip\nskip\n",
    );
    assert_eq!(session.store().unwrap().get(3).unwrap().name, "Zoe");
    assert!(output_since(&session, mark).contains("Element 3 replaced."));
}

#[test]
fn empty_collection_queries_report_emptiness() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[], &dir.path().join("people.xml"));

    run(&mut session, "sort_print\nsort_hair\nunique_hair\nshow\nclear\n");
    let printed = output_since(&session, 0);
    assert_eq!(printed.matches("The collection is empty.").count(), 4);
    assert!(printed.contains("The collection is already empty."));
}

#[test]
fn hair_queries_print_color_lists() {
    let dir = tempfile::tempdir().unwrap();
    let mut entries = BTreeMap::new();
    for (key, color) in [(1, HairColor::Yellow), (2, HairColor::Black), (3, HairColor::Yellow)] {
        let mut person = Person::new("Zed", Coordinates::new(0.0, 0), 100);
        person.hair_color = Some(color);
        entries.insert(key, person);
    }
    let mut session = Session::new(
        CollectionStore::with_entries(entries),
        dir.path().join("people.xml"),
        Vec::new(),
    );

    run(&mut session, "sort_hair\nunique_hair\n");
    let printed = output_since(&session, 0);
    assert!(printed.contains("[BLACK, YELLOW, YELLOW]"));
    assert!(printed.contains("[BLACK]"));
}

#[test]
fn save_writes_to_session_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.xml");
    let mut session = session_with_keys(&[3, 5], &path);

    run(&mut session, "save\n");
    let loaded = load_collection(&path).unwrap();
    assert_eq!(loaded.keys().copied().collect::<Vec<_>>(), vec![3, 5]);
}

#[test]
fn info_and_help_describe_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[3], &dir.path().join("people.xml"));

    run(&mut session, "info\nhelp\n");
    let printed = output_since(&session, 0);
    assert!(printed.contains("Collection type: BTreeMap<i32, Person>"));
    assert!(printed.contains("Number of elements: 1"));
    assert!(printed.contains("update [key]: replace the element stored under key"));
    assert!(printed.contains("script [file_name]:"));
}

#[test]
fn exit_stops_reading() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[3], &dir.path().join("people.xml"));

    let flow = run(&mut session, "exit\nclear\n");
    assert_eq!(flow, Flow::Exit);
    assert_eq!(session.store().unwrap().len(), 1);
}

#[test]
fn exhausted_input_cancels_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with_keys(&[], &dir.path().join("people.xml"));

    let flow = run(&mut session, "insert\nAlice\n1.5\n");
    assert_eq!(flow, Flow::Continue);
    assert!(session.store().unwrap().is_empty());
    assert!(output_since(&session, 0).contains("Input ended; the command was cancelled."));
}

#[test]
fn missing_file_opens_empty_and_malformed_file_stays_uninitialized() {
    let dir = tempfile::tempdir().unwrap();

    let fresh = Session::open(dir.path().join("absent.xml"), Vec::new()).unwrap();
    assert!(fresh.store().unwrap().is_empty());

    let broken = dir.path().join("broken.xml");
    std::fs::write(&broken, "<collection><person>").unwrap();
    let mut session = Session::open(&broken, Vec::new()).unwrap();
    assert!(session.store().is_none());

    run(&mut session, "save\nshow\nhelp\n");
    let printed = output_since(&session, 0);
    assert!(printed.contains("Failed to read the collection"));
    assert_eq!(printed.matches("The collection is not initialized.").count(), 2);
    assert_eq!(
        std::fs::read_to_string(&broken).unwrap(),
        "<collection><person>"
    );
}
