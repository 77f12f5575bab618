use std::cell::RefCell;
use std::rc::Rc;
use tutorbook_core::{
    Address, AddressBook, BookError, ClassName, Email, ErrorKind, ListChange, PersonName,
    PersonProfile, Phone, Role, TuitionClass, UniqueList,
};

fn pn(name: &str) -> PersonName {
    PersonName::new(name).unwrap()
}

fn cn(name: &str) -> ClassName {
    ClassName::new(name).unwrap()
}

fn profile(name: &str) -> PersonProfile {
    PersonProfile::new(
        pn(name),
        Phone::new("61234567").unwrap(),
        Email::new(format!("{}@example.com", name.to_lowercase())).unwrap(),
        Address::new("3 Example Road").unwrap(),
        [],
    )
}

#[test]
fn second_class_differing_only_in_case_is_rejected() {
    let mut book = AddressBook::new();
    book.add_class(cn("Math101")).unwrap();

    let err = book.add_class(cn("math101")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Duplicate);
    assert!(matches!(err, BookError::DuplicateClass(_)));
    assert_eq!(book.classes().len(), 1);
    assert_eq!(book.classes().as_slice()[0].name().as_str(), "Math101");
}

#[test]
fn duplicate_person_is_rejected_and_size_unchanged() {
    let mut book = AddressBook::new();
    book.add_person(Role::Student, profile("Alice")).unwrap();

    let err = book
        .add_person(Role::Parent, profile("Alice"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Duplicate);
    assert_eq!(book.persons().len(), 1);
    assert_eq!(
        book.person(&pn("Alice")).unwrap().role(),
        Role::Student
    );
}

#[test]
fn replace_all_is_all_or_nothing() {
    let mut list = UniqueList::new();
    list.add(TuitionClass::new(cn("Math101"))).unwrap();

    let err = list
        .replace_all(vec![
            TuitionClass::new(cn("Physics")),
            TuitionClass::new(cn("Chem")),
            TuitionClass::new(cn("PHYSICS")),
        ])
        .unwrap_err();
    assert!(err.to_string().contains("PHYSICS"));
    assert_eq!(list.len(), 1);
    assert!(list.contains(&cn("math101")));

    list.replace_all(vec![
        TuitionClass::new(cn("Physics")),
        TuitionClass::new(cn("Chem")),
    ])
    .unwrap();
    assert_eq!(list.len(), 2);
    assert!(!list.contains(&cn("Math101")));
}

#[test]
fn person_listeners_see_successful_mutations_only() {
    let mut book = AddressBook::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = book.subscribe_persons(move |change, items| {
        sink.borrow_mut().push((*change, items.len()));
    });

    book.add_person(Role::Student, profile("Alice")).unwrap();
    book.add_person(Role::Parent, profile("Carol")).unwrap();
    assert!(book.add_person(Role::Tutor, profile("Alice")).is_err());
    book.delete_person(&pn("Alice")).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            (ListChange::Added { index: 0 }, 1),
            (ListChange::Added { index: 1 }, 2),
            (ListChange::Removed { index: 0 }, 1),
        ]
    );

    assert!(book.unsubscribe_persons(subscription));
    assert!(!book.unsubscribe_persons(subscription));
    book.add_person(Role::Student, profile("Bob")).unwrap();
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn edge_writes_are_reported_as_updates() {
    let mut book = AddressBook::new();
    book.add_person(Role::Student, profile("Alice")).unwrap();
    book.add_class(cn("Math101")).unwrap();

    let persons = Rc::new(RefCell::new(Vec::new()));
    let classes = Rc::new(RefCell::new(Vec::new()));
    let person_sink = Rc::clone(&persons);
    let class_sink = Rc::clone(&classes);
    book.subscribe_persons(move |change, _| person_sink.borrow_mut().push(*change));
    book.subscribe_classes(move |change, _| class_sink.borrow_mut().push(*change));

    book.enroll_student(&pn("Alice"), &cn("Math101")).unwrap();
    assert!(book.enroll_student(&pn("Alice"), &cn("Math101")).is_err());

    assert_eq!(*persons.borrow(), vec![ListChange::Updated { index: 0 }]);
    assert_eq!(*classes.borrow(), vec![ListChange::Updated { index: 0 }]);
}

#[test]
fn reset_data_replaces_content_and_notifies_reset() {
    let mut book = AddressBook::new();
    book.add_person(Role::Student, profile("Alice")).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    book.subscribe_classes(move |change, items| {
        sink.borrow_mut().push((*change, items.len()));
    });

    let mut other = AddressBook::new();
    other.add_person(Role::Tutor, profile("Tom")).unwrap();
    other.add_class(cn("Physics")).unwrap();
    other.assign_tutor(&pn("Tom"), &cn("Physics")).unwrap();

    book.reset_data(other);

    assert!(!book.has_person(&pn("Alice")));
    let tom = book.person(&pn("Tom")).unwrap().id();
    assert_eq!(book.class(&cn("physics")).unwrap().tutor(), Some(tom));
    assert_eq!(*seen.borrow(), vec![(ListChange::Reset, 1)]);
}

#[test]
fn lookups_resolve_by_key_and_by_id() {
    let mut book = AddressBook::new();
    let id = book.add_class(cn("Math101")).unwrap();

    assert_eq!(book.classes().position(&cn("MATH101")), Some(0));
    assert_eq!(book.class_by_id(id).unwrap().name(), &cn("math101"));
    assert!(book.class(&cn("Physics")).is_none());
    assert_eq!(
        book.classes()
            .iter()
            .map(|class| class.name().as_str())
            .collect::<Vec<_>>(),
        ["Math101"]
    );
}
