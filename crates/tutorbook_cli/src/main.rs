//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load a book file through `tutorbook_core` and print a summary.
//! - Optionally write the book back, normalizing the file layout.
//!
//! Usage: `tutorbook_cli <book.json> [--rewrite]`
//! Set `TUTORBOOK_LOG_DIR` (absolute path) to enable file logging.

use log::warn;
use std::process::ExitCode;
use tutorbook_core::{
    default_log_level, init_logging, AddressBook, BookStorage, JsonBookStorage, Role,
};

const LOG_DIR_ENV: &str = "TUTORBOOK_LOG_DIR";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: tutorbook_cli <book.json> [--rewrite]");
        return ExitCode::from(2);
    };
    let rewrite = args.any(|arg| arg == "--rewrite");

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let storage = JsonBookStorage::new(path);
    let book = match storage.read_book() {
        Ok(Some(book)) => book,
        Ok(None) => {
            warn!("event=cli_load module=cli status=ok missing=true");
            println!("no book at {}; starting empty", storage.path().display());
            AddressBook::new()
        }
        Err(err) => {
            eprintln!("failed to load {}: {err}", storage.path().display());
            return ExitCode::FAILURE;
        }
    };

    print_summary(&book);

    if rewrite {
        if let Err(err) = storage.save_book(&book) {
            eprintln!("failed to save {}: {err}", storage.path().display());
            return ExitCode::FAILURE;
        }
        println!("saved {}", storage.path().display());
    }
    ExitCode::SUCCESS
}

fn print_summary(book: &AddressBook) {
    let count = |role: Role| {
        book.persons()
            .iter()
            .filter(|person| person.role() == role)
            .count()
    };
    println!(
        "tutorbook_core version={} students={} tutors={} parents={} classes={}",
        tutorbook_core::core_version(),
        count(Role::Student),
        count(Role::Tutor),
        count(Role::Parent),
        book.classes().len()
    );

    for class in book.classes() {
        let tutor = class
            .tutor()
            .and_then(|id| book.person_by_id(id))
            .map_or("unassigned".to_string(), |tutor| tutor.name().to_string());
        println!("{class} tutor={tutor}");
        for session in class.sessions() {
            println!("  {session}");
        }
    }
}
