//! Index-free navigation through a change log.
//!
//! On top of the indexed cache of [`Position`], a [`PositionWithChanges`]
//! keeps one cursor per [`ChangeKey`]. Asking for the next change under a key
//! walks the changes matching that key in log order; the views come out of
//! the shared cache, so the same change reached by index is the same view.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::construct::{CaseComparison, Change, ChangeType};
use crate::error::{Result, TablewalkError};
use crate::factory::ViewFactory;
use crate::position::{OtherHasher, Position, lock, matching_indices};

/// Which changes a cursor walks through: an optional change type and an
/// optional table name. The empty key walks every change.
#[derive(Eq, PartialEq, Hash, Clone, Debug, Default)]
pub struct ChangeKey {
    change_type: Option<ChangeType>,
    data_name: Option<String>,
}

impl ChangeKey {
    pub fn all() -> Self {
        Self::default()
    }
    pub fn of_type(change_type: ChangeType) -> Self {
        Self {
            change_type: Some(change_type),
            data_name: None,
        }
    }
    /// The table name is normalized by `case`, so that names equal under the
    /// comparison share one cursor.
    pub fn on_table(data_name: &str, case: CaseComparison) -> Self {
        Self {
            change_type: None,
            data_name: Some(case.normalize(data_name)),
        }
    }
    pub fn of_type_on_table(change_type: ChangeType, data_name: &str, case: CaseComparison) -> Self {
        Self {
            change_type: Some(change_type),
            data_name: Some(case.normalize(data_name)),
        }
    }
    pub fn change_type(&self) -> Option<ChangeType> {
        self.change_type
    }
    pub fn data_name(&self) -> Option<&str> {
        self.data_name.as_deref()
    }
    pub fn matches(&self, change: &Change, case: CaseComparison) -> bool {
        self.change_type.is_none_or(|t| t == change.change_type())
            && self
                .data_name
                .as_deref()
                .is_none_or(|name| case.is_equal(name, change.data_name()))
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.change_type, &self.data_name) {
            (None, None) => write!(f, "any change"),
            (Some(t), None) => write!(f, "{}", t),
            (None, Some(n)) => write!(f, "on {}", n),
            (Some(t), Some(n)) => write!(f, "{} on {}", t, n),
        }
    }
}

pub struct PositionWithChanges<P, E, V> {
    position: Position<P, E, V>,
    cursors: Mutex<HashMap<ChangeKey, usize, OtherHasher>>,
}

impl<P, E: Clone, V> PositionWithChanges<P, E, V> {
    pub fn new(factory: ViewFactory<P, E, V>) -> Self {
        Self {
            position: Position::new(factory),
            cursors: Mutex::new(HashMap::default()),
        }
    }

    /// Direct indexed access, exactly as [`Position::instance`]. Cursors are
    /// left alone.
    pub fn instance(&self, parent: &Arc<P>, elements: &[E], index: isize) -> Result<Arc<V>> {
        self.position.instance(parent, elements, index)
    }

    /// Indexed access among the elements matching `predicate`. Cursors are
    /// left alone.
    pub fn instance_among(
        &self,
        parent: &Arc<P>,
        elements: &[E],
        predicate: impl Fn(&E) -> bool,
        index: isize,
    ) -> Result<Arc<V>> {
        self.position.instance_among(parent, elements, predicate, index)
    }

    /// The next unvisited element among those matching `predicate`, tracked
    /// under `key`. The cursor of `key` moves only when a view is returned;
    /// past the last match every call fails with the same bounds.
    pub fn next_instance_among(
        &self,
        parent: &Arc<P>,
        elements: &[E],
        predicate: impl Fn(&E) -> bool,
        key: &ChangeKey,
    ) -> Result<Arc<V>> {
        let matching = matching_indices(elements, predicate);
        let next = lock(&self.cursors).get(key).copied().unwrap_or(0);
        let Some(&absolute) = matching.get(next) else {
            return Err(TablewalkError::out_of_bounds(next as isize, matching.len()));
        };
        let view = self.position.instance_at(parent, &elements[absolute], absolute)?;
        lock(&self.cursors).insert(key.clone(), next + 1);
        debug!(%key, next, absolute, "change cursor advanced");
        Ok(view)
    }
}

impl<P, E, V> PositionWithChanges<P, E, V> {
    /// The position within the matching elements the next call under `key`
    /// will visit.
    pub fn next_index(&self, key: &ChangeKey) -> usize {
        lock(&self.cursors).get(key).copied().unwrap_or(0)
    }
    pub fn is_cached(&self, index: usize) -> bool {
        self.position.is_cached(index)
    }
    pub fn cached_len(&self) -> usize {
        self.position.cached_len()
    }
}

impl<P, E, V> fmt::Debug for PositionWithChanges<P, E, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PositionWithChanges")
            .field("position", &self.position)
            .field("cursors", &*lock(&self.cursors))
            .finish()
    }
}
