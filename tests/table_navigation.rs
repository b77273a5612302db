use std::sync::Arc;

use tablewalk::assertion::TableAssert;
use tablewalk::construct::{LetterCase, Table};
use tablewalk::datatype::{Decimal, ValueKind, ValueType};

fn movie() -> Table {
    let budget = |s: &str| ValueKind::Decimal(Decimal::from_str(s).expect("decimal"));
    Table::new(
        "movie",
        vec!["id".into(), "title".into(), "budget".into()],
        vec!["id".into()],
        vec![
            vec![1.into(), "Alien".into(), budget("11.0")],
            vec![2.into(), "Ghostbusters".into(), ValueKind::Null],
        ],
    )
    .expect("rows fit the columns")
}

#[test]
fn rows_and_their_values() {
    let table = TableAssert::new(movie());
    table.has_number_of_rows(2).expect("two rows").has_number_of_columns(3).expect("three columns");

    let first = table.row().expect("first row");
    assert!(Arc::ptr_eq(&first, &table.row_at(0).expect("cached")));
    first.has_number_of_columns(3).expect("three values");
    first.value_at(1).expect("title").is_equal_to("Alien").expect("title");

    let second = table.row().expect("second row");
    second.value_named("budget").expect("budget").is_null().expect("no budget");
    let err = table.row().err().expect("two rows only");
    assert_eq!(err.to_string(), "Index 2 out of the limits [0, 2[");
}

#[test]
fn columns_and_their_values() {
    let table = TableAssert::new(movie());
    let id = table.column().expect("first column");
    assert_eq!(id.column().name(), "id");
    let title = table.column_named("Title").expect("case ignored by default");
    assert!(Arc::ptr_eq(&title, &table.column().expect("cursor moved to title")));
    title.has_number_of_rows(2).expect("one value per row");

    let budget = table.column_at(2).expect("budget");
    budget.value().expect("first budget").is_of_type(ValueType::Number).expect("decimal");
    let null = budget.value().expect("second budget");
    null.is_of_type(ValueType::NotIdentified).expect("null has no type");
    assert!(Arc::ptr_eq(&null, &budget.value_at(1).expect("cached")));
    assert_eq!(null.value().and_then(|v| v.column_name()), Some("budget"));
}

#[test]
fn column_names_follow_letter_case() {
    let table = TableAssert::with_letter_case(movie(), LetterCase::strict());
    table.column_named("title").expect("exact name");
    let err = table.column_named("TITLE").err().expect("case is strict");
    assert_eq!(err.to_string(), "Column TITLE does not exist");
}

#[test]
fn request_results_navigate_like_tables() {
    let request = Table::request(
        "select title from movie",
        vec!["title".into()],
        vec![vec!["Alien".into()]],
    )
    .expect("row fits");
    let view = TableAssert::new(request);
    view.row()
        .expect("one row")
        .value()
        .expect("title")
        .is_equal_to("Alien")
        .expect("title");
    let err = view.row_at(1).err().expect("one row only");
    assert_eq!(err.to_string(), "Index 1 out of the limits [0, 1[");
}

#[test]
fn failed_checks_name_the_view() {
    let table = TableAssert::new(movie());
    let err = table.has_number_of_rows(3).err().expect("two rows");
    assert_eq!(err.to_string(), "[table movie] expecting 3 rows but was 2");
    let value = table.row_at(1).expect("second row").value_at(1).expect("title");
    let err = value.is_equal_to("Alien").err().expect("wrong title");
    assert_eq!(
        err.to_string(),
        "[Value of column title of (Row (2) of (table movie))] expecting \"Alien\" but was \"Ghostbusters\""
    );
}
