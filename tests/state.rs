use std::{
    fs,
    path::{Path, PathBuf},
};

use classtable::{
    ClasstableError, MemoryCatalog, Outcome, PreferenceGroup, ScheduleSession, Section,
    SessionState, SolveOptions,
};

fn section(id: &str, course: &str, places: &str) -> Section {
    Section {
        id: id.into(),
        term: "T".into(),
        course_code: course.into(),
        course_name: course.into(),
        instructor: None,
        weeks: "1-16".into(),
        places: places.into(),
        credits: None,
    }
}

fn catalog() -> MemoryCatalog {
    [
        section("X1", "X", "A: 1(1)"),
        section("X2", "X", "A: 2(1)"),
        section("Y1", "Y", "B: 1(1)"),
        section("Y2", "Y", "B: 4(6)"),
    ]
    .into_iter()
    .collect()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("classtable-{}-{name}.json", std::process::id()))
}

#[test]
fn state_survives_a_file_round_trip() {
    let path = temp_path("round-trip");

    let mut first = ScheduleSession::new(catalog(), "T", SolveOptions::default());
    first.set_requested(["X", "Y"]);
    first.add_preference(PreferenceGroup::prefer("Y", ["Y2"], ["Y1", "Y2"]));

    let Outcome::Scheduled(produced) = first.solve().expect("valid model") else {
        panic!("expected a schedule");
    };

    first.state().save(&path).expect("state is written");
    let loaded = SessionState::load(&path).expect("state is read");
    fs::remove_file(&path).expect("state is removed");

    assert_eq!(first.state(), loaded);

    let mut second = ScheduleSession::new(catalog(), "T", SolveOptions::default());
    second.set_requested(["X", "Y"]);
    second.restore(loaded);

    let Outcome::Scheduled(next) = second.solve().expect("valid model") else {
        panic!("expected a second schedule");
    };

    assert_ne!(produced, next);
    assert!(next.contains("Y2"));
    assert_eq!(2, second.history().len());
}

#[test]
fn assignments_are_stored_as_plain_id_lists() {
    let state = SessionState {
        history: vec![["X2".to_owned(), "Y1".to_owned()].into_iter().collect()],
        preferences: vec![],
    };

    let json = serde_json::to_value(&state).expect("serializable");

    assert_eq!(
        serde_json::json!({ "history": [["X2", "Y1"]], "preferences": [] }),
        json
    );
}

#[test]
fn missing_state_files_are_io_errors() {
    let result = SessionState::load(temp_path("does-not-exist"));

    assert!(matches!(result, Err(ClasstableError::Io(_))));
}

fn solve_once(path: &Path, preferred: &str) -> Outcome {
    let mut session = ScheduleSession::new(catalog(), "T", SolveOptions::default());
    if path.exists() {
        session.restore(SessionState::load(path).expect("state is read"));
    }

    session.set_requested(["X"]);
    session.set_preference(PreferenceGroup::prefer("X", [preferred], ["X1", "X2"]));

    let outcome = session.solve().expect("valid model");
    session.state().save(path).expect("state is written");
    outcome
}

#[test]
fn changing_a_preference_between_runs_replaces_it() {
    let path = temp_path("changed-preference");
    let _ = fs::remove_file(&path);

    let first = solve_once(&path, "X1");
    let second = solve_once(&path, "X2");
    let repeated = solve_once(&path, "X2");

    let state = SessionState::load(&path).expect("state is read");
    fs::remove_file(&path).expect("state is removed");

    assert_eq!(
        Outcome::Scheduled(["X1".to_owned()].into_iter().collect()),
        first
    );
    assert_eq!(
        Outcome::Scheduled(["X2".to_owned()].into_iter().collect()),
        second
    );
    assert_eq!(
        Outcome::Infeasible(classtable::Infeasibility::Unsatisfiable),
        repeated
    );

    assert_eq!(
        vec![PreferenceGroup::prefer("X", ["X2"], ["X1", "X2"])],
        state.preferences
    );
    assert_eq!(2, state.history.len());
}
