//! The sequential index cache behind every navigation.
//!
//! A [`Position`] hands out at most one view per index of the element
//! sequence it is asked about, for as long as the position lives. Callers
//! receive an `Arc` to the view; the position keeps a second one so that the
//! next request for the same index returns the very same instance.

use core::hash::BuildHasherDefault;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use seahash::SeaHasher;
use tracing::{debug, trace};

use crate::error::{Result, TablewalkError};
use crate::factory::ViewFactory;

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

// A cache is never left half-written, so a poisoned lock is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Checks `index` against the half-open range `[0, len[`.
pub(crate) fn check_index(index: isize, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| TablewalkError::out_of_bounds(index, len))
}

/// Absolute indices of the elements satisfying `predicate`, in sequence order.
pub(crate) fn matching_indices<E>(elements: &[E], predicate: impl Fn(&E) -> bool) -> Vec<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, e)| predicate(e))
        .map(|(i, _)| i)
        .collect()
}

pub struct Position<P, E, V> {
    factory: ViewFactory<P, E, V>,
    instances: Mutex<HashMap<usize, Arc<V>, OtherHasher>>,
    next_index: Mutex<usize>,
    // one cursor per named filter, apart from the plain one
    filtered: Mutex<HashMap<&'static str, usize, OtherHasher>>,
}

impl<P, E: Clone, V> Position<P, E, V> {
    pub fn new(factory: ViewFactory<P, E, V>) -> Self {
        Self {
            factory,
            instances: Mutex::new(HashMap::default()),
            next_index: Mutex::new(0),
            filtered: Mutex::new(HashMap::default()),
        }
    }

    /// The view of `elements[index]`, built on first request and cached after.
    pub fn instance(&self, parent: &Arc<P>, elements: &[E], index: isize) -> Result<Arc<V>> {
        let index = check_index(index, elements.len())?;
        self.instance_at(parent, &elements[index], index)
    }

    /// The view at the cursor, which then moves one step forward. The cursor
    /// only moves when a view is returned.
    pub fn next_instance(&self, parent: &Arc<P>, elements: &[E]) -> Result<Arc<V>> {
        let next = *lock(&self.next_index);
        let view = self.instance(parent, elements, next as isize)?;
        *lock(&self.next_index) = next + 1;
        Ok(view)
    }

    /// The view of the `index`-th element among those matching `predicate`.
    /// Bounds are stated against the matching elements only; the cache is the
    /// same one used by [`Position::instance`].
    pub fn instance_among(
        &self,
        parent: &Arc<P>,
        elements: &[E],
        predicate: impl Fn(&E) -> bool,
        index: isize,
    ) -> Result<Arc<V>> {
        let matching = matching_indices(elements, predicate);
        let absolute = matching[check_index(index, matching.len())?];
        self.instance_at(parent, &elements[absolute], absolute)
    }

    /// The next unvisited element among those matching `predicate`, walked
    /// with the cursor named `filter`. Like [`Position::next_instance`], the
    /// cursor only moves when a view is returned.
    pub fn next_instance_among(
        &self,
        parent: &Arc<P>,
        elements: &[E],
        predicate: impl Fn(&E) -> bool,
        filter: &'static str,
    ) -> Result<Arc<V>> {
        let next = self.next_index_among(filter);
        let view = self.instance_among(parent, elements, predicate, next as isize)?;
        lock(&self.filtered).insert(filter, next + 1);
        debug!(filter, next, "filtered cursor advanced");
        Ok(view)
    }

    pub(crate) fn instance_at(&self, parent: &Arc<P>, element: &E, index: usize) -> Result<Arc<V>> {
        if let Some(view) = lock(&self.instances).get(&index) {
            trace!(index, "position cache hit");
            return Ok(Arc::clone(view));
        }
        // built without holding the lock, the factory may navigate elsewhere
        let view = Arc::new(self.factory.build(Arc::downgrade(parent), element.clone())?);
        debug!(index, signature = self.factory.signature(), "view constructed");
        let mut instances = lock(&self.instances);
        Ok(Arc::clone(instances.entry(index).or_insert(view)))
    }
}

impl<P, E, V> Position<P, E, V> {
    pub fn is_cached(&self, index: usize) -> bool {
        lock(&self.instances).contains_key(&index)
    }
    pub fn cached_len(&self) -> usize {
        lock(&self.instances).len()
    }
    pub fn next_index(&self) -> usize {
        *lock(&self.next_index)
    }
    pub fn next_index_among(&self, filter: &str) -> usize {
        lock(&self.filtered).get(filter).copied().unwrap_or(0)
    }
}

impl<P, E, V> fmt::Debug for Position<P, E, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Position")
            .field("factory", &self.factory)
            .field("cached", &self.cached_len())
            .field("next_index", &self.next_index())
            .finish()
    }
}
