//! Tablewalk – fluent, identity-stable navigation over in-memory snapshots.
//!
//! A snapshot is either a table (or the result of a request) made of rows,
//! columns and values, or a change log made of changes, each change seen as
//! its row at the start point and at the end point of the observation. The
//! crate lets a caller walk such a snapshot one step at a time:
//!
//! ```text
//! changes -> change -> row at start/end point -> value
//!                   -> column -> value at start/end point
//! table   -> row    -> value
//!         -> column -> value
//! ```
//!
//! Each step returns a *view*, an `Arc` the caller keeps using. Asking twice
//! for the same step returns the same view, not a copy: views are built once,
//! on first request, and cached by the view they were navigated from.
//!
//! ## Modules
//! * [`construct`] – Snapshot building blocks: rows, columns, tables, changes.
//! * [`datatype`] – The values held by a snapshot.
//! * [`factory`] – How a position builds a view it has never handed out.
//! * [`position`], [`position_with_changes`], [`position_with_points`] – The
//!   three caches behind navigation: by index, by change cursor, by point.
//! * [`view`] – The view tree, generic over a [`view::Family`].
//! * [`assertion`] and [`output`] – The two families: checks and plain-text
//!   rendering.
//! * [`settings`] – Configuration and logging bootstrap.
//!
//! ## Quick Start
//! ```
//! use tablewalk::assertion::ChangesAssert;
//! use tablewalk::construct::{Change, Changes, Row};
//! use std::sync::Arc;
//!
//! let row = |id: i64| Row::new(vec!["id".into()], vec!["id".into()], vec![id.into()]).unwrap();
//! let changes = ChangesAssert::new(Changes::new(vec![
//!     Change::creation("actor", row(1)).unwrap(),
//!     Change::deletion("actor", row(2)).unwrap(),
//! ]));
//! let deletion = changes.change_of_deletion().unwrap();
//! deletion.is_deletion().unwrap();
//! assert!(Arc::ptr_eq(&deletion, &changes.change_at(1).unwrap()));
//! assert_eq!(
//!     changes.change_of_deletion().unwrap_err().to_string(),
//!     "Index 1 out of the limits [0, 1["
//! );
//! ```
//!
//! ## Errors
//! Navigation fails in two ways only. An index (or a cursor) outside the
//! elements available is an [`TablewalkError::IndexOutOfBounds`], a normal
//! outcome the caller can recover from. A view that cannot be bound to its
//! element is an [`TablewalkError::Instantiation`] and points at a bug in
//! how the navigation was put together.

pub mod assertion;
pub mod construct;
pub mod datatype;
pub mod error;
pub mod factory;
pub mod output;
pub mod position;
pub mod position_with_changes;
pub mod position_with_points;
pub mod settings;
pub mod view;

pub use error::{Result, TablewalkError};
pub use view::{Assertion, Family, Origin, Output};
