//! The tree of views over a change log or a table.
//!
//! Every view is generic over a [`Family`]: assertion views and output views
//! share the same structure and the same positions, only the operations
//! offered on top differ (see the `assertion` and `output` modules).
//!
//! Navigation methods take `self: &Arc<Self>` because the child view keeps a
//! weak link back to the view it came from. A child never keeps its origin
//! alive: dropping the root drops the whole tree of cached views.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use crate::construct::{Change, ChangeColumn, ChangeType, Changes, Column, LetterCase, Row, Table};
use crate::datatype::{Value, ValueKind};
use crate::error::{Result, TablewalkError};
use crate::factory::{Bind, BindError, ViewFactory};
use crate::position::Position;
use crate::position_with_changes::{ChangeKey, PositionWithChanges};
use crate::position_with_points::PositionWithPoints;

pub trait Family: 'static {
    const NAME: &'static str;
}

#[derive(Clone, Copy, Debug)]
pub struct Assertion;
impl Family for Assertion {
    const NAME: &'static str = "assertion";
}

#[derive(Clone, Copy, Debug)]
pub struct Output;
impl Family for Output {
    const NAME: &'static str = "output";
}

/// What a child view needs to know about the view it was navigated from.
pub trait Origin {
    fn description(&self) -> &str;
    fn letter_case(&self) -> LetterCase;
}

fn upgrade<P>(origin: &Weak<P>) -> std::result::Result<Arc<P>, BindError> {
    origin
        .upgrade()
        .ok_or_else(|| BindError::new("the origin view is no longer reachable"))
}

fn not_found(kind: &'static str, name: &str) -> TablewalkError {
    TablewalkError::NotFound {
        kind,
        name: name.to_owned(),
    }
}

macro_rules! debug_view {
    ($view:ident < $($generic:ident),+ >, $element:ident) => {
        impl<$($generic),+> fmt::Debug for $view<$($generic),+>
        where
            F: Family,
        {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.debug_struct(stringify!($view))
                    .field("family", &F::NAME)
                    .field("description", &self.description)
                    .field(stringify!($element), &self.$element)
                    .finish_non_exhaustive()
            }
        }
        impl<$($generic),+> Origin for $view<$($generic),+>
        where
            F: Family,
        {
            fn description(&self) -> &str {
                &self.description
            }
            fn letter_case(&self) -> LetterCase {
                self.letter_case
            }
        }
    };
}

// ------------- Changes -------------
pub struct ChangesView<F> {
    description: String,
    letter_case: LetterCase,
    changes: Changes,
    change_position: PositionWithChanges<ChangesView<F>, Change, ChangeView<F>>,
}
debug_view!(ChangesView<F>, changes);

impl<F: Family> ChangesView<F> {
    pub fn new(changes: Changes) -> Arc<Self> {
        Self::with_letter_case(changes, LetterCase::default())
    }
    pub fn with_letter_case(changes: Changes, letter_case: LetterCase) -> Arc<Self> {
        Arc::new(Self {
            description: "Changes".to_owned(),
            letter_case,
            changes,
            change_position: PositionWithChanges::new(ViewFactory::of()),
        })
    }
    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    fn next_change(self: &Arc<Self>, key: ChangeKey) -> Result<Arc<ChangeView<F>>> {
        let case = self.letter_case.table;
        self.change_position
            .next_instance_among(self, self.changes.changes(), |c| key.matches(c, case), &key)
    }
    fn change_among(self: &Arc<Self>, key: ChangeKey, index: isize) -> Result<Arc<ChangeView<F>>> {
        let case = self.letter_case.table;
        self.change_position
            .instance_among(self, self.changes.changes(), |c| key.matches(c, case), index)
    }
    fn on_table(&self, change_type: ChangeType, name: &str) -> ChangeKey {
        ChangeKey::of_type_on_table(change_type, name, self.letter_case.table)
    }

    pub fn change(self: &Arc<Self>) -> Result<Arc<ChangeView<F>>> {
        self.next_change(ChangeKey::all())
    }
    pub fn change_at(self: &Arc<Self>, index: isize) -> Result<Arc<ChangeView<F>>> {
        self.change_position.instance(self, self.changes.changes(), index)
    }
    pub fn change_of_creation(self: &Arc<Self>) -> Result<Arc<ChangeView<F>>> {
        self.next_change(ChangeKey::of_type(ChangeType::Creation))
    }
    pub fn change_of_creation_at(self: &Arc<Self>, index: isize) -> Result<Arc<ChangeView<F>>> {
        self.change_among(ChangeKey::of_type(ChangeType::Creation), index)
    }
    pub fn change_of_modification(self: &Arc<Self>) -> Result<Arc<ChangeView<F>>> {
        self.next_change(ChangeKey::of_type(ChangeType::Modification))
    }
    pub fn change_of_modification_at(self: &Arc<Self>, index: isize) -> Result<Arc<ChangeView<F>>> {
        self.change_among(ChangeKey::of_type(ChangeType::Modification), index)
    }
    pub fn change_of_deletion(self: &Arc<Self>) -> Result<Arc<ChangeView<F>>> {
        self.next_change(ChangeKey::of_type(ChangeType::Deletion))
    }
    pub fn change_of_deletion_at(self: &Arc<Self>, index: isize) -> Result<Arc<ChangeView<F>>> {
        self.change_among(ChangeKey::of_type(ChangeType::Deletion), index)
    }
    pub fn change_on_table(self: &Arc<Self>, name: &str) -> Result<Arc<ChangeView<F>>> {
        self.next_change(ChangeKey::on_table(name, self.letter_case.table))
    }
    pub fn change_on_table_at(self: &Arc<Self>, name: &str, index: isize) -> Result<Arc<ChangeView<F>>> {
        self.change_among(ChangeKey::on_table(name, self.letter_case.table), index)
    }
    pub fn change_of_creation_on_table(self: &Arc<Self>, name: &str) -> Result<Arc<ChangeView<F>>> {
        self.next_change(self.on_table(ChangeType::Creation, name))
    }
    pub fn change_of_creation_on_table_at(self: &Arc<Self>, name: &str, index: isize) -> Result<Arc<ChangeView<F>>> {
        self.change_among(self.on_table(ChangeType::Creation, name), index)
    }
    pub fn change_of_modification_on_table(self: &Arc<Self>, name: &str) -> Result<Arc<ChangeView<F>>> {
        self.next_change(self.on_table(ChangeType::Modification, name))
    }
    pub fn change_of_modification_on_table_at(
        self: &Arc<Self>,
        name: &str,
        index: isize,
    ) -> Result<Arc<ChangeView<F>>> {
        self.change_among(self.on_table(ChangeType::Modification, name), index)
    }
    pub fn change_of_deletion_on_table(self: &Arc<Self>, name: &str) -> Result<Arc<ChangeView<F>>> {
        self.next_change(self.on_table(ChangeType::Deletion, name))
    }
    pub fn change_of_deletion_on_table_at(self: &Arc<Self>, name: &str, index: isize) -> Result<Arc<ChangeView<F>>> {
        self.change_among(self.on_table(ChangeType::Deletion, name), index)
    }

    /// The first change on table `name` whose row carries the primary key
    /// values `pks`.
    pub fn change_on_table_with_pks(self: &Arc<Self>, name: &str, pks: &[ValueKind]) -> Result<Arc<ChangeView<F>>> {
        let case = self.letter_case.table;
        let index = self
            .changes
            .changes()
            .iter()
            .position(|c| case.is_equal(c.data_name(), name) && c.has_pk_values(pks))
            .ok_or_else(|| {
                let pks: Vec<String> = pks.iter().map(|k| k.to_string()).collect();
                not_found("Change with primary key", &format!("({}) on table {}", pks.join(", "), name))
            })?;
        self.change_position.instance(self, self.changes.changes(), index as isize)
    }
}

// ------------- Change -------------
pub struct ChangeView<F> {
    origin: Weak<ChangesView<F>>,
    description: String,
    letter_case: LetterCase,
    change: Change,
    columns: Vec<ChangeColumn>,
    row_points: PositionWithPoints<ChangeView<F>, Row, RowView<F, ChangeView<F>>>,
    column_position: Position<ChangeView<F>, ChangeColumn, ChangeColumnView<F>>,
}
debug_view!(ChangeView<F>, change);

impl<F: Family> Bind<ChangesView<F>, Change> for ChangeView<F> {
    fn bind(origin: Weak<ChangesView<F>>, change: Change) -> std::result::Result<Self, BindError> {
        let changes = upgrade(&origin)?;
        Ok(Self {
            description: format!(
                "Change on {} {} of ({})",
                change.data_type(),
                change.data_name(),
                changes.description()
            ),
            letter_case: changes.letter_case(),
            origin,
            columns: change.columns(),
            change,
            row_points: PositionWithPoints::new(ViewFactory::of()),
            column_position: Position::new(ViewFactory::of()),
        })
    }
}

impl<F: Family> ChangeView<F> {
    pub fn origin(&self) -> Option<Arc<ChangesView<F>>> {
        self.origin.upgrade()
    }
    pub fn change(&self) -> &Change {
        &self.change
    }
    pub fn row_at_start_point(self: &Arc<Self>) -> Result<Arc<RowView<F, ChangeView<F>>>> {
        self.row_points
            .instance_at_start_point(self, || self.change.row_at_start_point().cloned())
    }
    pub fn row_at_end_point(self: &Arc<Self>) -> Result<Arc<RowView<F, ChangeView<F>>>> {
        self.row_points
            .instance_at_end_point(self, || self.change.row_at_end_point().cloned())
    }
    pub fn column(self: &Arc<Self>) -> Result<Arc<ChangeColumnView<F>>> {
        self.column_position.next_instance(self, &self.columns)
    }
    pub fn column_at(self: &Arc<Self>, index: isize) -> Result<Arc<ChangeColumnView<F>>> {
        self.column_position.instance(self, &self.columns, index)
    }
    pub fn column_named(self: &Arc<Self>, name: &str) -> Result<Arc<ChangeColumnView<F>>> {
        let case = self.letter_case.column;
        let index = self
            .columns
            .iter()
            .position(|c| case.is_equal(c.name(), name))
            .ok_or_else(|| not_found("Column", name))?;
        self.column_at(index as isize)
    }
    pub fn column_among_the_modified_ones_at(self: &Arc<Self>, index: isize) -> Result<Arc<ChangeColumnView<F>>> {
        self.column_position
            .instance_among(self, &self.columns, ChangeColumn::is_modified, index)
    }
    pub fn column_among_the_modified_ones(self: &Arc<Self>) -> Result<Arc<ChangeColumnView<F>>> {
        self.column_position
            .next_instance_among(self, &self.columns, ChangeColumn::is_modified, "modified")
    }
}

// ------------- Change column -------------
pub struct ChangeColumnView<F> {
    origin: Weak<ChangeView<F>>,
    description: String,
    letter_case: LetterCase,
    column: ChangeColumn,
    primary_key: bool,
    value_points: PositionWithPoints<ChangeColumnView<F>, Value, ValueView<F, ChangeColumnView<F>>>,
}
debug_view!(ChangeColumnView<F>, column);

impl<F: Family> Bind<ChangeView<F>, ChangeColumn> for ChangeColumnView<F> {
    fn bind(origin: Weak<ChangeView<F>>, column: ChangeColumn) -> std::result::Result<Self, BindError> {
        let change = upgrade(&origin)?;
        let letter_case = change.letter_case();
        let primary_key = change
            .change()
            .pk_names()
            .iter()
            .any(|pk| letter_case.primary_key.is_equal(pk, column.name()));
        Ok(Self {
            description: format!("Column {} of ({})", column.name(), change.description()),
            letter_case,
            origin,
            column,
            primary_key,
            value_points: PositionWithPoints::new(ViewFactory::of()),
        })
    }
}

impl<F: Family> ChangeColumnView<F> {
    pub fn origin(&self) -> Option<Arc<ChangeView<F>>> {
        self.origin.upgrade()
    }
    pub fn column(&self) -> &ChangeColumn {
        &self.column
    }
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }
    pub fn value_at_start_point(self: &Arc<Self>) -> Result<Arc<ValueView<F, ChangeColumnView<F>>>> {
        self.value_points
            .instance_at_start_point(self, || self.column.value_at_start_point().cloned())
    }
    pub fn value_at_end_point(self: &Arc<Self>) -> Result<Arc<ValueView<F, ChangeColumnView<F>>>> {
        self.value_points
            .instance_at_end_point(self, || self.column.value_at_end_point().cloned())
    }
}

// ------------- Table -------------
pub struct TableView<F> {
    description: String,
    letter_case: LetterCase,
    table: Table,
    columns: Vec<Column>,
    row_position: Position<TableView<F>, Row, RowView<F, TableView<F>>>,
    column_position: Position<TableView<F>, Column, ColumnView<F>>,
}
debug_view!(TableView<F>, table);

impl<F: Family> TableView<F> {
    pub fn new(table: Table) -> Arc<Self> {
        Self::with_letter_case(table, LetterCase::default())
    }
    pub fn with_letter_case(table: Table, letter_case: LetterCase) -> Arc<Self> {
        Arc::new(Self {
            description: format!("{} {}", table.data_type(), table.name()),
            letter_case,
            columns: table.columns(),
            table,
            row_position: Position::new(ViewFactory::of()),
            column_position: Position::new(ViewFactory::of()),
        })
    }
    pub fn table(&self) -> &Table {
        &self.table
    }
    pub fn row(self: &Arc<Self>) -> Result<Arc<RowView<F, TableView<F>>>> {
        self.row_position.next_instance(self, self.table.rows())
    }
    pub fn row_at(self: &Arc<Self>, index: isize) -> Result<Arc<RowView<F, TableView<F>>>> {
        self.row_position.instance(self, self.table.rows(), index)
    }
    pub fn column(self: &Arc<Self>) -> Result<Arc<ColumnView<F>>> {
        self.column_position.next_instance(self, &self.columns)
    }
    pub fn column_at(self: &Arc<Self>, index: isize) -> Result<Arc<ColumnView<F>>> {
        self.column_position.instance(self, &self.columns, index)
    }
    pub fn column_named(self: &Arc<Self>, name: &str) -> Result<Arc<ColumnView<F>>> {
        let index = self
            .table
            .column_index(name, self.letter_case.column)
            .ok_or_else(|| not_found("Column", name))?;
        self.column_at(index as isize)
    }
}

// ------------- Column -------------
pub struct ColumnView<F> {
    origin: Weak<TableView<F>>,
    description: String,
    letter_case: LetterCase,
    column: Column,
    value_position: Position<ColumnView<F>, Value, ValueView<F, ColumnView<F>>>,
}
debug_view!(ColumnView<F>, column);

impl<F: Family> Bind<TableView<F>, Column> for ColumnView<F> {
    fn bind(origin: Weak<TableView<F>>, column: Column) -> std::result::Result<Self, BindError> {
        let table = upgrade(&origin)?;
        Ok(Self {
            description: format!("Column {} of ({})", column.name(), table.description()),
            letter_case: table.letter_case(),
            origin,
            column,
            value_position: Position::new(ViewFactory::of()),
        })
    }
}

impl<F: Family> ColumnView<F> {
    pub fn origin(&self) -> Option<Arc<TableView<F>>> {
        self.origin.upgrade()
    }
    pub fn column(&self) -> &Column {
        &self.column
    }
    pub fn value(self: &Arc<Self>) -> Result<Arc<ValueView<F, ColumnView<F>>>> {
        self.value_position.next_instance(self, self.column.values())
    }
    pub fn value_at(self: &Arc<Self>, index: isize) -> Result<Arc<ValueView<F, ColumnView<F>>>> {
        self.value_position.instance(self, self.column.values(), index)
    }
}

// ------------- Row -------------
/// A row of a table, or the row of a change at one of its points. The row
/// is absent when it did not exist at that point.
pub struct RowView<F, P> {
    origin: Weak<P>,
    description: String,
    letter_case: LetterCase,
    row: Option<Row>,
    value_position: Position<RowView<F, P>, Value, ValueView<F, RowView<F, P>>>,
}
debug_view!(RowView<F, P>, row);

impl<F: Family, P: Origin + 'static> Bind<P, Option<Row>> for RowView<F, P> {
    fn bind(origin: Weak<P>, row: Option<Row>) -> std::result::Result<Self, BindError> {
        let parent = upgrade(&origin)?;
        let which = match &row {
            Some(row) => {
                let pks: Vec<String> = row.pk_values().iter().map(|v| v.to_string()).collect();
                format!("Row ({})", pks.join(", "))
            }
            None => "Row that does not exist".to_owned(),
        };
        Ok(Self {
            description: format!("{} of ({})", which, parent.description()),
            letter_case: parent.letter_case(),
            origin,
            row,
            value_position: Position::new(ViewFactory::of()),
        })
    }
}

impl<F: Family, P: Origin + 'static> Bind<P, Row> for RowView<F, P> {
    fn bind(origin: Weak<P>, row: Row) -> std::result::Result<Self, BindError> {
        <Self as Bind<P, Option<Row>>>::bind(origin, Some(row))
    }
}

impl<F: Family, P> RowView<F, P> {
    pub fn origin(&self) -> Option<Arc<P>> {
        self.origin.upgrade()
    }
    pub fn row(&self) -> Option<&Row> {
        self.row.as_ref()
    }
}

impl<F: Family, P: Origin + 'static> RowView<F, P> {
    fn values(&self) -> &[Value] {
        self.row.as_ref().map(|r| r.values()).unwrap_or(&[])
    }
    pub fn value(self: &Arc<Self>) -> Result<Arc<ValueView<F, RowView<F, P>>>> {
        self.value_position.next_instance(self, self.values())
    }
    pub fn value_at(self: &Arc<Self>, index: isize) -> Result<Arc<ValueView<F, RowView<F, P>>>> {
        self.value_position.instance(self, self.values(), index)
    }
    pub fn value_named(self: &Arc<Self>, name: &str) -> Result<Arc<ValueView<F, RowView<F, P>>>> {
        let case = self.letter_case.column;
        let index = self
            .values()
            .iter()
            .position(|v| v.column_name().is_some_and(|n| case.is_equal(n, name)))
            .ok_or_else(|| not_found("Column", name))?;
        self.value_at(index as isize)
    }
}

// ------------- Value -------------
/// A single value, absent when read from a point where its row did not exist.
pub struct ValueView<F, P> {
    origin: Weak<P>,
    description: String,
    letter_case: LetterCase,
    value: Option<Value>,
    family: PhantomData<F>,
}
debug_view!(ValueView<F, P>, value);

impl<F: Family, P: Origin + 'static> Bind<P, Option<Value>> for ValueView<F, P> {
    fn bind(origin: Weak<P>, value: Option<Value>) -> std::result::Result<Self, BindError> {
        let parent = upgrade(&origin)?;
        let which = match value.as_ref().and_then(|v| v.column_name()) {
            Some(name) => format!("Value of column {}", name),
            None => "Value".to_owned(),
        };
        Ok(Self {
            description: format!("{} of ({})", which, parent.description()),
            letter_case: parent.letter_case(),
            origin,
            value,
            family: PhantomData,
        })
    }
}

impl<F: Family, P: Origin + 'static> Bind<P, Value> for ValueView<F, P> {
    fn bind(origin: Weak<P>, value: Value) -> std::result::Result<Self, BindError> {
        <Self as Bind<P, Option<Value>>>::bind(origin, Some(value))
    }
}

impl<F: Family, P> ValueView<F, P> {
    pub fn origin(&self) -> Option<Arc<P>> {
        self.origin.upgrade()
    }
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}
