// used to read snapshots and change logs from serialized form
use serde::{Deserialize, Serialize};

// used to print out readable forms of a construct
use std::fmt;

// our own stuff that we need
use crate::datatype::{Value, ValueKind};

// ------------- Letter case -------------
/// How two names are compared when navigating by name.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseComparison {
    #[default]
    Ignore,
    Strict,
}
impl CaseComparison {
    pub fn is_equal(&self, a: &str, b: &str) -> bool {
        match self {
            CaseComparison::Ignore => a.eq_ignore_ascii_case(b),
            CaseComparison::Strict => a == b,
        }
    }
    /// A representative of `name` such that names equal under this
    /// comparison share it.
    pub fn normalize(&self, name: &str) -> String {
        match self {
            CaseComparison::Ignore => name.to_ascii_lowercase(),
            CaseComparison::Strict => name.to_owned(),
        }
    }
}

/// Name comparison settings for tables, columns and primary keys.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterCase {
    pub table: CaseComparison,
    pub column: CaseComparison,
    pub primary_key: CaseComparison,
}
impl LetterCase {
    pub fn strict() -> Self {
        Self {
            table: CaseComparison::Strict,
            column: CaseComparison::Strict,
            primary_key: CaseComparison::Strict,
        }
    }
}

fn position_of(names: &[String], name: &str, case: CaseComparison) -> Option<usize> {
    names.iter().position(|n| case.is_equal(n, name))
}

// ------------- Row -------------
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub struct Row {
    pk_names: Vec<String>,
    column_names: Vec<String>,
    values: Vec<Value>,
}
impl Row {
    /// Returns `None` when the number of values does not match the number of
    /// columns, or when a primary key is not one of the columns.
    pub fn new(pk_names: Vec<String>, column_names: Vec<String>, values: Vec<ValueKind>) -> Option<Self> {
        if values.len() != column_names.len() {
            return None;
        }
        if pk_names.iter().any(|pk| !column_names.contains(pk)) {
            return None;
        }
        let values = column_names
            .iter()
            .zip(values)
            .map(|(name, kind)| Value::new(Some(name.clone()), kind))
            .collect();
        Some(Self {
            pk_names,
            column_names,
            values,
        })
    }
    pub fn pk_names(&self) -> &[String] {
        &self.pk_names
    }
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn value_named(&self, name: &str, case: CaseComparison) -> Option<&Value> {
        position_of(&self.column_names, name, case).map(|i| &self.values[i])
    }
    pub fn pk_values(&self) -> Vec<&Value> {
        self.pk_names
            .iter()
            .filter_map(|pk| self.value_named(pk, CaseComparison::Strict))
            .collect()
    }
    pub fn has_pk_values(&self, pks: &[ValueKind]) -> bool {
        let own = self.pk_values();
        own.len() == pks.len() && own.iter().zip(pks).all(|(v, k)| v.kind() == k)
    }
}
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = String::new();
        for (name, value) in self.column_names.iter().zip(&self.values) {
            if self.pk_names.contains(name) {
                s += "*";
            }
            s += &format!("{}={},", name, value);
        }
        s.pop();
        write!(f, "[{}]", s)
    }
}

#[derive(Deserialize)]
struct RowRecord {
    #[serde(default)]
    pks: Vec<String>,
    columns: Vec<String>,
    values: Vec<ValueKind>,
}
impl TryFrom<RowRecord> for Row {
    type Error = String;
    fn try_from(record: RowRecord) -> Result<Self, Self::Error> {
        let (columns, values) = (record.columns.len(), record.values.len());
        Row::new(record.pks, record.columns, record.values)
            .ok_or_else(|| format!("row with {} columns cannot hold {} values", columns, values))
    }
}
impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = RowRecord::deserialize(deserializer)?;
        Row::try_from(record).map_err(serde::de::Error::custom)
    }
}

// ------------- Column -------------
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}
impl Column {
    pub fn new(name: String, values: Vec<Value>) -> Self {
        let values = values.into_iter().map(|v| v.with_column_name(&name)).collect();
        Self { name, values }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}
impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "{}: ({})", self.name, values.join(", "))
    }
}

// ------------- Table -------------
/// Whether a snapshot was taken from a table or from the result of a request.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum DataType {
    Table,
    Request,
}
impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataType::Table => write!(f, "table"),
            DataType::Request => write!(f, "request"),
        }
    }
}

/// A materialized snapshot of a table (or of a request result).
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub struct Table {
    data_type: DataType,
    name: String,
    column_names: Vec<String>,
    pk_names: Vec<String>,
    rows: Vec<Row>,
}
impl Table {
    pub fn new(
        name: &str,
        column_names: Vec<String>,
        pk_names: Vec<String>,
        rows: Vec<Vec<ValueKind>>,
    ) -> Option<Self> {
        Self::build(DataType::Table, name, column_names, pk_names, rows)
    }
    pub fn request(sql: &str, column_names: Vec<String>, rows: Vec<Vec<ValueKind>>) -> Option<Self> {
        Self::build(DataType::Request, sql, column_names, Vec::new(), rows)
    }
    fn build(
        data_type: DataType,
        name: &str,
        column_names: Vec<String>,
        pk_names: Vec<String>,
        rows: Vec<Vec<ValueKind>>,
    ) -> Option<Self> {
        let rows = rows
            .into_iter()
            .map(|values| Row::new(pk_names.clone(), column_names.clone(), values))
            .collect::<Option<Vec<Row>>>()?;
        Some(Self {
            data_type,
            name: name.to_owned(),
            column_names,
            pk_names,
            rows,
        })
    }
    pub fn data_type(&self) -> DataType {
        self.data_type
    }
    /// The table name, or the SQL text for a request.
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }
    pub fn pk_names(&self) -> &[String] {
        &self.pk_names
    }
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
    pub fn columns(&self) -> Vec<Column> {
        self.column_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values = self.rows.iter().map(|row| row.values()[i].clone()).collect();
                Column::new(name.clone(), values)
            })
            .collect()
    }
    pub fn column_index(&self, name: &str, case: CaseComparison) -> Option<usize> {
        position_of(&self.column_names, name, case)
    }
}
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ({} rows)", self.data_type, self.name, self.rows.len())
    }
}

// ------------- Change -------------
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ChangeType {
    Creation,
    Modification,
    Deletion,
}
impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChangeType::Creation => write!(f, "CREATION"),
            ChangeType::Modification => write!(f, "MODIFICATION"),
            ChangeType::Deletion => write!(f, "DELETION"),
        }
    }
}

/// One column of a change, seen at both points of the observation.
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub struct ChangeColumn {
    name: String,
    value_at_start_point: Option<Value>,
    value_at_end_point: Option<Value>,
}
impl ChangeColumn {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value_at_start_point(&self) -> Option<&Value> {
        self.value_at_start_point.as_ref()
    }
    pub fn value_at_end_point(&self) -> Option<&Value> {
        self.value_at_end_point.as_ref()
    }
    pub fn is_modified(&self) -> bool {
        self.value_at_start_point != self.value_at_end_point
    }
}
impl fmt::Display for ChangeColumn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let show = |v: &Option<Value>| v.as_ref().map_or("-".to_owned(), |v| v.to_string());
        write!(
            f,
            "{}: {} -> {}",
            self.name,
            show(&self.value_at_start_point),
            show(&self.value_at_end_point)
        )
    }
}

#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub struct Change {
    data_type: DataType,
    data_name: String,
    change_type: ChangeType,
    row_at_start_point: Option<Row>,
    row_at_end_point: Option<Row>,
}
impl Change {
    /// Returns `None` when the rows present do not fit the change type: a
    /// creation has no start row, a deletion no end row, a modification has
    /// both and they share their columns.
    pub fn new(
        data_type: DataType,
        data_name: &str,
        change_type: ChangeType,
        row_at_start_point: Option<Row>,
        row_at_end_point: Option<Row>,
    ) -> Option<Self> {
        let fits = match change_type {
            ChangeType::Creation => row_at_start_point.is_none() && row_at_end_point.is_some(),
            ChangeType::Modification => match (&row_at_start_point, &row_at_end_point) {
                (Some(start), Some(end)) => start.column_names() == end.column_names(),
                _ => false,
            },
            ChangeType::Deletion => row_at_start_point.is_some() && row_at_end_point.is_none(),
        };
        if !fits {
            return None;
        }
        Some(Self {
            data_type,
            data_name: data_name.to_owned(),
            change_type,
            row_at_start_point,
            row_at_end_point,
        })
    }
    pub fn creation(table: &str, row: Row) -> Option<Self> {
        Self::new(DataType::Table, table, ChangeType::Creation, None, Some(row))
    }
    /// `None` when `start` and `end` do not share their columns.
    pub fn modification(table: &str, start: Row, end: Row) -> Option<Self> {
        Self::new(DataType::Table, table, ChangeType::Modification, Some(start), Some(end))
    }
    pub fn deletion(table: &str, row: Row) -> Option<Self> {
        Self::new(DataType::Table, table, ChangeType::Deletion, Some(row), None)
    }
    pub fn data_type(&self) -> DataType {
        self.data_type
    }
    pub fn data_name(&self) -> &str {
        &self.data_name
    }
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }
    pub fn row_at_start_point(&self) -> Option<&Row> {
        self.row_at_start_point.as_ref()
    }
    pub fn row_at_end_point(&self) -> Option<&Row> {
        self.row_at_end_point.as_ref()
    }
    // at least one of the rows is always present
    fn present_row(&self) -> Option<&Row> {
        self.row_at_end_point.as_ref().or(self.row_at_start_point.as_ref())
    }
    pub fn column_names(&self) -> &[String] {
        self.present_row().map(|row| row.column_names()).unwrap_or(&[])
    }
    pub fn pk_names(&self) -> &[String] {
        self.present_row().map(|row| row.pk_names()).unwrap_or(&[])
    }
    pub fn pk_values(&self) -> Vec<&Value> {
        self.present_row().map_or_else(Vec::new, |row| row.pk_values())
    }
    pub fn has_pk_values(&self, pks: &[ValueKind]) -> bool {
        self.present_row().is_some_and(|row| row.has_pk_values(pks))
    }
    pub fn columns(&self) -> Vec<ChangeColumn> {
        self.column_names()
            .iter()
            .enumerate()
            .map(|(i, name)| ChangeColumn {
                name: name.clone(),
                value_at_start_point: self.row_at_start_point.as_ref().and_then(|r| r.values().get(i).cloned()),
                value_at_end_point: self.row_at_end_point.as_ref().and_then(|r| r.values().get(i).cloned()),
            })
            .collect()
    }
    pub fn modified_column_indices(&self) -> Vec<usize> {
        self.columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_modified())
            .map(|(i, _)| i)
            .collect()
    }
}
impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let show = |r: &Option<Row>| r.as_ref().map_or("-".to_owned(), |r| r.to_string());
        write!(
            f,
            "{} on {} {}: {} -> {}",
            self.change_type,
            self.data_type,
            self.data_name,
            show(&self.row_at_start_point),
            show(&self.row_at_end_point)
        )
    }
}

#[derive(Deserialize)]
struct ChangeRecord {
    #[serde(default = "default_data_type")]
    data_type: DataType,
    data_name: String,
    change_type: ChangeType,
    #[serde(default)]
    row_at_start_point: Option<Row>,
    #[serde(default)]
    row_at_end_point: Option<Row>,
}
fn default_data_type() -> DataType {
    DataType::Table
}
impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let r = ChangeRecord::deserialize(deserializer)?;
        let change_type = r.change_type;
        Change::new(r.data_type, &r.data_name, change_type, r.row_at_start_point, r.row_at_end_point)
            .ok_or_else(|| serde::de::Error::custom(format!("rows do not fit a {} change", change_type)))
    }
}

// ------------- Changes -------------
/// An ordered, already computed change log.
#[derive(Eq, PartialEq, Hash, Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Changes {
    changes: Vec<Change>,
}
impl Changes {
    pub fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }
    pub fn len(&self) -> usize {
        self.changes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
impl fmt::Display for Changes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, change) in self.changes.iter().enumerate() {
            writeln!(f, "{:>3} {}", i, change)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: i64, name: &str) -> Row {
        Row::new(
            vec!["id".into()],
            vec!["id".into(), "name".into()],
            vec![id.into(), name.into()],
        )
        .expect("row")
    }

    #[test]
    fn row_rejects_mismatched_values() {
        assert!(Row::new(vec![], vec!["id".into()], vec![]).is_none());
        assert!(Row::new(vec!["pk".into()], vec!["id".into()], vec![1.into()]).is_none());
    }

    #[test]
    fn change_rejects_rows_not_fitting_the_type() {
        assert!(Change::new(DataType::Table, "actor", ChangeType::Creation, Some(actor(1, "a")), None).is_none());
        assert!(Change::new(DataType::Table, "actor", ChangeType::Deletion, None, None).is_none());
        assert!(Change::new(DataType::Table, "actor", ChangeType::Deletion, Some(actor(1, "a")), None).is_some());
    }

    #[test]
    fn modification_rows_share_their_columns() {
        let titled = Row::new(
            vec!["id".into()],
            vec!["id".into(), "title".into()],
            vec![1.into(), "b".into()],
        )
        .expect("row");
        assert!(Change::modification("actor", actor(1, "a"), titled.clone()).is_none());
        assert!(Change::new(DataType::Table, "actor", ChangeType::Modification, Some(actor(1, "a")), Some(titled)).is_none());
        let renamed = Change::modification("actor", actor(1, "a"), actor(1, "b")).expect("same columns");
        let shown: Vec<String> = renamed.columns().iter().map(|c| c.to_string()).collect();
        assert_eq!(shown, vec!["id: 1 -> 1", "name: \"a\" -> \"b\""]);
    }

    #[test]
    fn modified_columns_and_pks() {
        let change = Change::modification("actor", actor(1, "Weaver"), actor(1, "Sigourney")).expect("same columns");
        assert_eq!(change.modified_column_indices(), vec![1]);
        assert!(change.has_pk_values(&[1.into()]));
        assert!(!change.has_pk_values(&[2.into()]));
        let creation = Change::creation("actor", actor(2, "Murray")).expect("creation");
        let columns = creation.columns();
        assert!(columns[0].value_at_start_point().is_none());
        assert_eq!(creation.modified_column_indices(), vec![0, 1]);
    }

    #[test]
    fn letter_case_comparison() {
        assert!(CaseComparison::Ignore.is_equal("ACTOR", "actor"));
        assert!(!CaseComparison::Strict.is_equal("ACTOR", "actor"));
        let row = actor(1, "x");
        assert!(row.value_named("NAME", CaseComparison::Ignore).is_some());
        assert!(row.value_named("NAME", CaseComparison::Strict).is_none());
    }

    #[test]
    fn changes_read_from_json() {
        let json = r#"[
            {"data_name": "actor", "change_type": "Creation",
             "row_at_end_point": {"pks": ["id"], "columns": ["id", "name"], "values": [{"Number": 1}, {"Text": "Weaver"}]}}
        ]"#;
        let changes: Changes = serde_json::from_str(json).expect("valid change log");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.changes()[0].change_type(), ChangeType::Creation);
        let bad = r#"[{"data_name": "actor", "change_type": "Deletion"}]"#;
        assert!(serde_json::from_str::<Changes>(bad).is_err());
    }
}
