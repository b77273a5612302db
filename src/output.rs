//! Output views: the view tree rendered as plain text.
//!
//! The rendering is intentionally plain, one header line with the view
//! description followed by the element.

use std::fmt;

use crate::view::{ChangeColumnView, ChangeView, ChangesView, ColumnView, Origin, Output, RowView, TableView, ValueView};

pub type ChangesOutput = ChangesView<Output>;
pub type ChangeOutput = ChangeView<Output>;
pub type ChangeRowOutput = RowView<Output, ChangeOutput>;
pub type ChangeRowValueOutput = ValueView<Output, ChangeRowOutput>;
pub type ChangeColumnOutput = ChangeColumnView<Output>;
pub type ChangeValueOutput = ValueView<Output, ChangeColumnOutput>;
pub type TableOutput = TableView<Output>;
pub type TableRowOutput = RowView<Output, TableOutput>;
pub type TableRowValueOutput = ValueView<Output, TableRowOutput>;
pub type TableColumnOutput = ColumnView<Output>;
pub type TableColumnValueOutput = ValueView<Output, TableColumnOutput>;

macro_rules! render {
    ($view:ty $(, $generic:ident)*; |$this:ident, $f:ident| $body:expr) => {
        impl<$($generic),*> fmt::Display for $view {
            fn fmt(&self, $f: &mut fmt::Formatter) -> fmt::Result {
                writeln!($f, "[{}]", self.description())?;
                let $this = self;
                $body
            }
        }
        impl<$($generic),*> $view {
            pub fn render(&self) -> String {
                self.to_string()
            }
        }
    };
}

render!(ChangesView<Output>; |this, f| write!(f, "{}", this.changes()));
render!(ChangeView<Output>; |this, f| writeln!(f, "{}", this.change()));
render!(ChangeColumnView<Output>; |this, f| {
    let marker = if this.is_primary_key() { "*" } else { "" };
    writeln!(f, "{}{}", marker, this.column())
});
render!(TableView<Output>; |this, f| {
    writeln!(f, "{}", this.table())?;
    for row in this.table().rows() {
        writeln!(f, "  {}", row)?;
    }
    Ok(())
});
render!(ColumnView<Output>; |this, f| writeln!(f, "{}", this.column()));
render!(RowView<Output, P>, P; |this, f| match this.row() {
    Some(row) => writeln!(f, "{}", row),
    None => writeln!(f, "-"),
});
render!(ValueView<Output, P>, P; |this, f| match this.value() {
    Some(value) => writeln!(f, "{} ({})", value, value.value_type()),
    None => writeln!(f, "-"),
});
