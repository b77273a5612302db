//! Assertion views: the view tree with checks on top.
//!
//! Every check returns the view it was called on, so checks and navigation
//! chain with `?`. A failed check reports the description of the view.

use std::fmt::Display;
use std::sync::Arc;

use crate::construct::ChangeType;
use crate::datatype::{ValueKind, ValueType};
use crate::error::{Result, TablewalkError};
use crate::view::{
    Assertion, ChangeColumnView, ChangeView, ChangesView, ColumnView, Origin, RowView, TableView, ValueView,
};

pub type ChangesAssert = ChangesView<Assertion>;
pub type ChangeAssert = ChangeView<Assertion>;
pub type ChangeRowAssert = RowView<Assertion, ChangeAssert>;
pub type ChangeRowValueAssert = ValueView<Assertion, ChangeRowAssert>;
pub type ChangeColumnAssert = ChangeColumnView<Assertion>;
pub type ChangeValueAssert = ValueView<Assertion, ChangeColumnAssert>;
pub type TableAssert = TableView<Assertion>;
pub type TableRowAssert = RowView<Assertion, TableAssert>;
pub type TableRowValueAssert = ValueView<Assertion, TableRowAssert>;
pub type TableColumnAssert = ColumnView<Assertion>;
pub type TableColumnValueAssert = ValueView<Assertion, TableColumnAssert>;

fn check<V: Origin>(view: &V, holds: bool, expected: impl Display, actual: impl Display) -> Result<()> {
    if holds {
        return Ok(());
    }
    Err(TablewalkError::Assertion {
        description: view.description().to_owned(),
        message: format!("expecting {} but was {}", expected, actual),
    })
}

impl ChangesView<Assertion> {
    pub fn has_number_of_changes(self: &Arc<Self>, expected: usize) -> Result<&Arc<Self>> {
        let actual = self.changes().len();
        check(&**self, actual == expected, format!("{} changes", expected), actual)?;
        Ok(self)
    }
}

impl ChangeView<Assertion> {
    pub fn is_of_type(self: &Arc<Self>, expected: ChangeType) -> Result<&Arc<Self>> {
        let actual = self.change().change_type();
        check(&**self, actual == expected, expected, actual)?;
        Ok(self)
    }
    pub fn is_creation(self: &Arc<Self>) -> Result<&Arc<Self>> {
        self.is_of_type(ChangeType::Creation)
    }
    pub fn is_modification(self: &Arc<Self>) -> Result<&Arc<Self>> {
        self.is_of_type(ChangeType::Modification)
    }
    pub fn is_deletion(self: &Arc<Self>) -> Result<&Arc<Self>> {
        self.is_of_type(ChangeType::Deletion)
    }
    pub fn is_on_table(self: &Arc<Self>, expected: &str) -> Result<&Arc<Self>> {
        let actual = self.change().data_name();
        let holds = self.letter_case().table.is_equal(actual, expected);
        check(&**self, holds, format!("change on {}", expected), format!("on {}", actual))?;
        Ok(self)
    }
    pub fn has_number_of_modified_columns(self: &Arc<Self>, expected: usize) -> Result<&Arc<Self>> {
        let actual = self.change().modified_column_indices().len();
        check(&**self, actual == expected, format!("{} modified columns", expected), actual)?;
        Ok(self)
    }
}

impl ChangeColumnView<Assertion> {
    pub fn is_modified(self: &Arc<Self>) -> Result<&Arc<Self>> {
        check(&**self, self.column().is_modified(), "a modified column", "not modified")?;
        Ok(self)
    }
    pub fn is_not_modified(self: &Arc<Self>) -> Result<&Arc<Self>> {
        check(&**self, !self.column().is_modified(), "an unmodified column", "modified")?;
        Ok(self)
    }
}

impl<P> RowView<Assertion, P> {
    pub fn exists(self: &Arc<Self>) -> Result<&Arc<Self>> {
        check(&**self, self.row().is_some(), "an existing row", "absent")?;
        Ok(self)
    }
    pub fn does_not_exist(self: &Arc<Self>) -> Result<&Arc<Self>> {
        check(&**self, self.row().is_none(), "an absent row", "present")?;
        Ok(self)
    }
    pub fn has_number_of_columns(self: &Arc<Self>, expected: usize) -> Result<&Arc<Self>> {
        let actual = self.row().map_or(0, |r| r.column_names().len());
        check(&**self, actual == expected, format!("{} columns", expected), actual)?;
        Ok(self)
    }
}

impl<P> ValueView<Assertion, P> {
    fn kind(&self) -> Option<&ValueKind> {
        self.value().map(|v| v.kind())
    }
    fn shown(&self) -> String {
        self.value().map_or("a value that does not exist".to_owned(), |v| v.to_string())
    }
    pub fn is_null(self: &Arc<Self>) -> Result<&Arc<Self>> {
        check(&**self, self.kind() == Some(&ValueKind::Null), "null", self.shown())?;
        Ok(self)
    }
    pub fn is_not_null(self: &Arc<Self>) -> Result<&Arc<Self>> {
        let holds = self.kind().is_some_and(|k| *k != ValueKind::Null);
        check(&**self, holds, "a value that is not null", self.shown())?;
        Ok(self)
    }
    pub fn is_equal_to(self: &Arc<Self>, expected: impl Into<ValueKind>) -> Result<&Arc<Self>> {
        let expected = expected.into();
        check(&**self, self.kind() == Some(&expected), &expected, self.shown())?;
        Ok(self)
    }
    pub fn is_of_type(self: &Arc<Self>, expected: ValueType) -> Result<&Arc<Self>> {
        let actual = self.value().map(|v| v.value_type());
        let shown = actual.map_or("a value that does not exist".to_owned(), |t| t.to_string());
        check(&**self, actual == Some(expected), expected, shown)?;
        Ok(self)
    }
}

impl TableView<Assertion> {
    pub fn has_number_of_rows(self: &Arc<Self>, expected: usize) -> Result<&Arc<Self>> {
        let actual = self.table().rows().len();
        check(&**self, actual == expected, format!("{} rows", expected), actual)?;
        Ok(self)
    }
    pub fn has_number_of_columns(self: &Arc<Self>, expected: usize) -> Result<&Arc<Self>> {
        let actual = self.table().column_names().len();
        check(&**self, actual == expected, format!("{} columns", expected), actual)?;
        Ok(self)
    }
}

impl ColumnView<Assertion> {
    pub fn has_number_of_rows(self: &Arc<Self>, expected: usize) -> Result<&Arc<Self>> {
        let actual = self.column().values().len();
        check(&**self, actual == expected, format!("{} rows", expected), actual)?;
        Ok(self)
    }
}
