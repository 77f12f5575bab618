use serde_json::json;
use tempfile::TempDir;
use tutorbook_core::{
    book_from_json, book_to_json, parse_session_date_time, Address, AddressBook,
    AttendanceStatus, BookStorage, ClassName, Email, ErrorKind, JsonBookStorage, PersonName,
    PersonProfile, Phone, Role, SessionDetails, SessionName, StorageError, Tag,
};

fn pn(name: &str) -> PersonName {
    PersonName::new(name).unwrap()
}

fn cn(name: &str) -> ClassName {
    ClassName::new(name).unwrap()
}

fn sn(name: &str) -> SessionName {
    SessionName::new(name).unwrap()
}

fn add(book: &mut AddressBook, role: Role, name: &str, tags: &[&str]) {
    let profile = PersonProfile::new(
        pn(name),
        Phone::new("91234567").unwrap(),
        Email::new(format!("{}@example.com", name.to_lowercase())).unwrap(),
        Address::new("10 Example Road, #01-01").unwrap(),
        tags.iter().map(|tag| Tag::new(tag).unwrap()),
    );
    book.add_person(role, profile).unwrap();
}

fn person_json(role: &str, name: &str) -> serde_json::Value {
    json!({
        "type": role,
        "name": name,
        "phone": "91234567",
        "email": format!("{}@example.com", name.to_lowercase()),
        "address": "10 Example Road",
        "tags": []
    })
}

/// Math101 with Alice and Bob, "Week 1" marked Alice present and Bob absent.
fn at(value: &str) -> chrono::NaiveDateTime {
    parse_session_date_time(value).unwrap()
}

fn scenario_book() -> AddressBook {
    let mut book = AddressBook::new();
    add(&mut book, Role::Student, "Alice", &[]);
    add(&mut book, Role::Student, "Bob", &[]);
    book.add_class(cn("Math101")).unwrap();
    book.enroll_student(&pn("Alice"), &cn("Math101")).unwrap();
    book.enroll_student(&pn("Bob"), &cn("Math101")).unwrap();
    book.add_session(
        &cn("Math101"),
        SessionDetails::new(sn("Week 1"), at("2024-10-28T14:00")),
    )
    .unwrap();
    book.mark_present(&cn("Math101"), &sn("Week 1"), &pn("Alice"), None)
        .unwrap();
    book.mark_absent(&cn("Math101"), &sn("Week 1"), &pn("Bob"), None)
        .unwrap();
    book
}

fn load_error(file: serde_json::Value) -> StorageError {
    book_from_json(&file.to_string()).unwrap_err()
}

#[test]
fn saved_attendance_survives_reload() {
    let dir = TempDir::new().unwrap();
    let storage = JsonBookStorage::new(dir.path().join("data").join("book.json"));
    let book = scenario_book();

    storage.save_book(&book).unwrap();
    let loaded = storage.read_book().unwrap().unwrap();

    assert!(loaded
        .has_attended(&cn("Math101"), &sn("Week 1"), &pn("Alice"))
        .unwrap());
    assert!(!loaded
        .has_attended(&cn("Math101"), &sn("Week 1"), &pn("Bob"))
        .unwrap());
    let session = loaded.session(&cn("Math101"), &sn("Week 1")).unwrap();
    assert_eq!(session.attendance().present_count(), 1);
    assert_eq!(session.attendance().len(), 2);
    assert_eq!(loaded, book);
}

#[test]
fn load_of_save_reproduces_the_whole_graph() {
    let mut book = AddressBook::new();
    add(&mut book, Role::Student, "Alice", &["gifted"]);
    add(&mut book, Role::Student, "Bob", &[]);
    add(&mut book, Role::Student, "Cleo", &[]);
    add(&mut book, Role::Parent, "Carol", &["vip", "payer"]);
    add(&mut book, Role::Tutor, "Tom", &[]);
    book.add_class(cn("MATH101")).unwrap();
    book.add_class(cn("Physics")).unwrap();
    book.assign_tutor(&pn("Tom"), &cn("Math101")).unwrap();
    book.enroll_student(&pn("Alice"), &cn("Math101")).unwrap();
    book.enroll_student(&pn("Bob"), &cn("Math101")).unwrap();
    book.enroll_student(&pn("Alice"), &cn("Physics")).unwrap();
    book.link_parent_child(&pn("Carol"), &pn("Alice")).unwrap();
    book.link_parent_child(&pn("Carol"), &pn("Cleo")).unwrap();

    let details = SessionDetails::new(sn("Week 1"), at("2024-10-28T14:00"))
        .with_location("Room 3")
        .with_remarks("bring calculators");
    book.add_session(&cn("Math101"), details).unwrap();
    book.add_session(
        &cn("Math101"),
        SessionDetails::new(sn("Week 2"), at("2024-11-04T14:00")),
    )
    .unwrap();
    book.mark_present(
        &cn("Math101"),
        &sn("Week 1"),
        &pn("Alice"),
        Some(at("2024-10-28T14:03:17")),
    )
    .unwrap();
    book.mark_present(&cn("Math101"), &sn("Week 2"), &pn("Bob"), None)
        .unwrap();
    // Bob keeps his Week 2 history after leaving the class.
    book.unenroll_student(&pn("Bob"), &cn("Math101")).unwrap();

    let json = book_to_json(&book).unwrap();
    let loaded = book_from_json(&json).unwrap();

    assert_eq!(loaded, book);
    assert_eq!(book_to_json(&loaded).unwrap(), json);
    assert_eq!(loaded.class(&cn("math101")).unwrap().name().as_str(), "MATH101");
    let week_one = loaded.session(&cn("Math101"), &sn("Week 1")).unwrap();
    let alice = loaded.person(&pn("Alice")).unwrap().id();
    let bob = loaded.person(&pn("Bob")).unwrap().id();
    assert_eq!(
        week_one.attendance().get(alice).unwrap().status(),
        AttendanceStatus::Present(Some(at("2024-10-28T14:03:17")))
    );
    assert_eq!(
        week_one.attendance().get(bob).unwrap().status(),
        AttendanceStatus::Unmarked
    );
    assert!(loaded
        .has_attended(&cn("Math101"), &sn("Week 2"), &pn("Bob"))
        .unwrap());
}

#[test]
fn saved_file_uses_the_book_schema() {
    let json = book_to_json(&scenario_book()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["persons"][0]["type"], "student");
    assert_eq!(value["persons"][0]["name"], "Alice");
    assert!(value["persons"][0].get("children").is_none());
    let class = &value["classes"][0];
    assert_eq!(class["name"], "Math101");
    assert!(class.get("tutor").is_none());
    assert_eq!(class["students"][1]["name"], "Bob");
    let session = &class["sessions"][0];
    assert_eq!(session["sessionName"], "Week 1");
    assert_eq!(session["dateTime"], "2024-10-28T14:00:00");
    assert_eq!(session["presentStudents"], json!(["Alice"]));
    assert_eq!(session["absentStudents"], json!(["Bob"]));
    assert!(session["markedAt"]["Alice"].is_string());
}

#[test]
fn missing_file_reads_as_no_book() {
    let dir = TempDir::new().unwrap();
    let storage = JsonBookStorage::new(dir.path().join("absent.json"));

    assert!(storage.read_book().unwrap().is_none());
}

#[test]
fn legacy_file_with_bare_names_loads() {
    let file = json!({
        "persons": [
            person_json("student", "Alice"),
            person_json("student", "Bob"),
            person_json("tutor", "Tom")
        ],
        "classes": [{
            "name": "Math101",
            "tutor": person_json("tutor", "Tom"),
            "students": ["Alice", person_json("student", "Bob")],
            "sessions": [{
                "sessionName": "Week 1",
                "dateTime": "2024-10-28T14:00",
                "presentStudents": ["Alice"],
                "absentStudents": []
            }]
        }]
    });

    let book = book_from_json(&file.to_string()).unwrap();

    let tom = book.person(&pn("Tom")).unwrap().id();
    let class = book.class(&cn("math101")).unwrap();
    assert_eq!(class.tutor(), Some(tom));
    assert_eq!(class.students().len(), 2);
    let session = book.session(&cn("Math101"), &sn("Week 1")).unwrap();
    let alice = book.person(&pn("Alice")).unwrap().id();
    assert_eq!(session.attendance().len(), 1);
    assert_eq!(
        session.attendance().get(alice).unwrap().status(),
        AttendanceStatus::Present(None)
    );
    assert!(!book
        .has_attended(&cn("Math101"), &sn("Week 1"), &pn("Bob"))
        .unwrap());
}

#[test]
fn parent_children_are_relinked_on_load() {
    let mut carol = person_json("parent", "Carol");
    carol["children"] = json!(["Alice"]);
    let file = json!({ "persons": [carol, person_json("student", "Alice")], "classes": [] });

    let book = book_from_json(&file.to_string()).unwrap();

    let carol = book.person(&pn("Carol")).unwrap().id();
    assert_eq!(book.person(&pn("Alice")).unwrap().parents(), &[carol]);
}

#[test]
fn duplicate_person_records_fail_the_load() {
    let file = json!({
        "persons": [person_json("student", "Alice"), person_json("parent", "Alice")],
        "classes": []
    });

    let err = load_error(file);
    assert!(matches!(&err, StorageError::DuplicatePerson(name) if name == "Alice"));
    assert_eq!(err.kind(), ErrorKind::Load);
}

#[test]
fn class_records_differing_in_case_are_duplicates() {
    let file = json!({
        "persons": [],
        "classes": [{ "name": "Math101" }, { "name": "math101" }]
    });

    assert!(matches!(load_error(file), StorageError::DuplicateClass(_)));
}

#[test]
fn tutor_reference_to_a_student_is_a_role_mismatch() {
    let file = json!({
        "persons": [person_json("student", "Alice")],
        "classes": [{ "name": "Math101", "tutor": "Alice" }]
    });

    let err = load_error(file);
    assert!(matches!(
        err,
        StorageError::RoleMismatch {
            expected: Role::Tutor,
            actual: Role::Student,
            ..
        }
    ));
}

#[test]
fn attendance_for_an_unknown_student_is_unresolved() {
    let file = json!({
        "persons": [person_json("student", "Alice")],
        "classes": [{
            "name": "Math101",
            "students": ["Alice"],
            "sessions": [{
                "sessionName": "Week 1",
                "dateTime": "2024-10-28T14:00:00",
                "presentStudents": ["Ghost"],
                "absentStudents": []
            }]
        }]
    });

    let err = load_error(file);
    assert!(matches!(
        &err,
        StorageError::UnresolvedPerson { name, .. } if name == "Ghost"
    ));
    assert!(err.to_string().contains("Week 1"));
}

fn session_file(session: serde_json::Value) -> serde_json::Value {
    json!({
        "persons": [person_json("student", "Alice"), person_json("student", "Bob")],
        "classes": [{
            "name": "Math101",
            "students": ["Alice", "Bob"],
            "sessions": [session]
        }]
    })
}

#[test]
fn student_both_present_and_absent_fails_the_load() {
    let file = session_file(json!({
        "sessionName": "Week 1",
        "dateTime": "2024-10-28T14:00:00",
        "presentStudents": ["Alice", "Bob"],
        "absentStudents": ["Alice"]
    }));

    let err = load_error(file);
    assert!(matches!(
        &err,
        StorageError::ConflictingAttendance { student, .. } if student == "Alice"
    ));
    assert_eq!(err.kind(), ErrorKind::Load);
}

#[test]
fn student_listed_twice_as_present_fails_the_load() {
    let file = session_file(json!({
        "sessionName": "Week 1",
        "dateTime": "2024-10-28T14:00:00",
        "presentStudents": ["Bob", "Bob"],
        "absentStudents": []
    }));

    assert!(matches!(
        load_error(file),
        StorageError::ConflictingAttendance { .. }
    ));
}

#[test]
fn mark_time_for_an_unlisted_student_fails_the_load() {
    let file = session_file(json!({
        "sessionName": "Week 1",
        "dateTime": "2024-10-28T14:00:00",
        "presentStudents": ["Alice"],
        "absentStudents": [],
        "markedAt": { "Alice": "2024-10-28T14:01:00", "Bob": "2024-10-28T14:02:00" }
    }));

    let err = load_error(file);
    assert!(matches!(
        &err,
        StorageError::UnresolvedPerson { name, referenced_by }
            if name == "Bob" && referenced_by.contains("markedAt")
    ));
}

#[test]
fn invalid_stored_values_are_reported() {
    let mut alice = person_json("student", "Alice");
    alice["phone"] = json!("12");
    let file = json!({ "persons": [alice], "classes": [] });
    assert!(matches!(load_error(file), StorageError::Validation(_)));

    let file = json!({
        "persons": [],
        "classes": [{
            "name": "Math101",
            "sessions": [{ "sessionName": "Week 1", "dateTime": "next monday" }]
        }]
    });
    assert!(matches!(load_error(file), StorageError::Validation(_)));

    assert!(matches!(
        book_from_json("{ not json"),
        Err(StorageError::Json(_))
    ));
}

#[test]
fn save_replaces_the_file_without_leftovers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.json");
    let storage = JsonBookStorage::new(path.clone());

    storage.save_book(&scenario_book()).unwrap();
    storage.save_book(&AddressBook::new()).unwrap();

    let loaded = storage.read_book().unwrap().unwrap();
    assert!(loaded.persons().is_empty());
    let names = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect::<Vec<_>>();
    assert_eq!(names, [path.file_name().unwrap().to_os_string()]);
}

#[test]
fn unreadable_file_content_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.json");
    std::fs::write(
        &path,
        r#"{"persons":[],"classes":[{"name":"Math101","students":["Ghost"]}]}"#,
    )
    .unwrap();

    let err = JsonBookStorage::new(path).read_book().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Load);
    assert!(matches!(err, StorageError::UnresolvedPerson { .. }));
}

#[test]
fn directory_in_place_of_the_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();

    let err = JsonBookStorage::new(dir.path()).read_book().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
}
