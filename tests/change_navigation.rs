use std::sync::Arc;

use tablewalk::assertion::ChangesAssert;
use tablewalk::construct::{Change, Changes, LetterCase, Row};

fn row(id: i64, name: &str) -> Row {
    Row::new(
        vec!["id".into()],
        vec!["id".into(), "name".into()],
        vec![id.into(), name.into()],
    )
    .expect("row fits its columns")
}

// 3 creations, then 2 deletions on actor and 1 deletion on interpretation
fn change_log() -> Changes {
    Changes::new(vec![
        Change::creation("actor", row(1, "Weaver")).expect("change fits its rows"),
        Change::creation("actor", row(2, "Murray")).expect("change fits its rows"),
        Change::creation("movie", row(3, "Alien")).expect("change fits its rows"),
        Change::deletion("actor", row(4, "Hurt")).expect("change fits its rows"),
        Change::deletion("actor", row(5, "Skerritt")).expect("change fits its rows"),
        Change::deletion("interpretation", row(6, "Ripley")).expect("change fits its rows"),
    ])
}

fn same(changes: &Arc<ChangesAssert>, index: isize, view: &Arc<tablewalk::assertion::ChangeAssert>) -> bool {
    Arc::ptr_eq(view, &changes.change_at(index).expect("index in range"))
}

#[test]
fn creations_then_deletions_by_table() {
    let changes = ChangesAssert::new(change_log());

    for index in 0..3 {
        let creation = changes.change_of_creation().expect("three creations");
        assert!(same(&changes, index, &creation));
    }
    let err = changes.change_of_creation().err().expect("no fourth creation");
    assert_eq!(err.to_string(), "Index 3 out of the limits [0, 3[");

    let first = changes.change_of_deletion_on_table("actor").expect("first actor deletion");
    assert!(same(&changes, 3, &first));
    let second = changes.change_of_deletion_on_table("actor").expect("second actor deletion");
    assert!(same(&changes, 4, &second));
    let err = changes
        .change_of_deletion_on_table("actor")
        .err()
        .expect("only two actor deletions");
    // bounds count the actor deletions only, see "Scenario bounds" in DESIGN.md
    assert_eq!(err.to_string(), "Index 2 out of the limits [0, 2[");

    let other = changes
        .change_of_deletion_on_table("interpretation")
        .expect("one interpretation deletion");
    assert!(same(&changes, 5, &other));
    let err = changes
        .change_of_deletion_on_table("interpretation")
        .err()
        .expect("only one interpretation deletion");
    assert_eq!(err.to_string(), "Index 1 out of the limits [0, 1[");
}

#[test]
fn exhausted_cursor_fails_identically_on_retry() {
    let changes = ChangesAssert::new(change_log());
    changes.change_of_deletion_on_table("interpretation").expect("one deletion");
    for _ in 0..3 {
        let err = changes
            .change_of_deletion_on_table("interpretation")
            .err()
            .expect("exhausted");
        assert_eq!(err.to_string(), "Index 1 out of the limits [0, 1[");
    }
}

#[test]
fn cursors_do_not_disturb_each_other() {
    let changes = ChangesAssert::new(change_log());
    changes.change_of_creation().expect("creation 0");
    changes.change_of_creation().expect("creation 1");

    let any = changes.change().expect("plain walk starts at the beginning");
    assert!(same(&changes, 0, &any));
    let deletion = changes.change_of_deletion().expect("first deletion");
    assert!(same(&changes, 3, &deletion));
    let on_actor = changes.change_on_table("actor").expect("first change on actor");
    assert!(same(&changes, 0, &on_actor));

    let creation = changes.change_of_creation().expect("creation 2");
    assert!(same(&changes, 2, &creation));
}

#[test]
fn direct_index_does_not_move_cursors() {
    let changes = ChangesAssert::new(change_log());
    changes.change_at(4).expect("direct access");
    changes.change_of_deletion_at(2).expect("third deletion");
    let first = changes.change().expect("cursor still at 0");
    assert!(same(&changes, 0, &first));
}

#[test]
fn filtered_indexed_access() {
    let changes = ChangesAssert::new(change_log());
    let deletion = changes.change_of_deletion_at(1).expect("second deletion");
    assert!(same(&changes, 4, &deletion));
    let creation = changes.change_of_creation_on_table_at("movie", 0).expect("movie creation");
    assert!(same(&changes, 2, &creation));
    let on_actor = changes.change_on_table_at("actor", 3).expect("fourth change on actor");
    assert!(same(&changes, 4, &on_actor));
    assert!(changes.change_of_modification().is_err());
    let err = changes.change_of_modification_at(0).err().expect("no modification");
    assert_eq!(err.to_string(), "Index 0 out of the limits [0, 0[");
    let err = changes.change_of_deletion_at(-1).err().expect("negative index");
    assert_eq!(err.to_string(), "Index -1 out of the limits [0, 3[");
}

#[test]
fn bounds_of_direct_access() {
    let changes = ChangesAssert::new(change_log());
    for index in 0..6 {
        changes.change_at(index).expect("in range");
    }
    for index in [-1, 6] {
        let err = changes.change_at(index).err().expect("out of range");
        assert!(err.is_index_out_of_bounds());
        assert_eq!(err.to_string(), format!("Index {} out of the limits [0, 6[", index));
    }
}

#[test]
fn independent_roots_do_not_share_views() {
    let one = ChangesAssert::new(change_log());
    let other = ChangesAssert::new(change_log());
    let a = one.change_at(0).expect("in range");
    let b = other.change_at(0).expect("in range");
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.change(), b.change());
}

#[test]
fn change_by_primary_key() {
    let changes = ChangesAssert::new(change_log());
    let change = changes
        .change_on_table_with_pks("actor", &[5.into()])
        .expect("actor 5 was deleted");
    assert!(same(&changes, 4, &change));
    let err = changes
        .change_on_table_with_pks("actor", &[6.into()])
        .err()
        .expect("actor 6 never changed");
    assert_eq!(err.to_string(), "Change with primary key (6) on table actor does not exist");
}

#[test]
fn table_names_follow_letter_case() {
    let ignoring = ChangesAssert::new(change_log());
    let first = ignoring.change_of_deletion_on_table("ACTOR").expect("case ignored");
    let second = ignoring.change_of_deletion_on_table("actor").expect("same cursor");
    assert!(same(&ignoring, 3, &first));
    assert!(same(&ignoring, 4, &second));

    let strict = ChangesAssert::with_letter_case(change_log(), LetterCase::strict());
    let err = strict.change_on_table("ACTOR").err().expect("no table named ACTOR");
    assert_eq!(err.to_string(), "Index 0 out of the limits [0, 0[");
}

#[test]
fn change_returns_to_its_origin() {
    let changes = ChangesAssert::new(change_log());
    let change = changes.change().expect("first change");
    let origin = change.origin().expect("root still alive");
    assert!(Arc::ptr_eq(&origin, &changes));
    drop(origin);
    drop(changes);
    assert!(change.origin().is_none());
}
