//! The two temporal facets of one change: its state at the start point and
//! at the end point of the observation.
//!
//! Each point resolves its element once, through a provider, and builds its
//! view once. An element absent at a point (no start row for a creation) is
//! still handed to the factory as `None`, so a view always comes back.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};

use crate::error::Result;
use crate::factory::ViewFactory;
use crate::position::lock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Point {
    Start,
    End,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Point::Start => write!(f, "start point"),
            Point::End => write!(f, "end point"),
        }
    }
}

struct Slot<E, V> {
    // `Some(None)` once resolved to an absent element
    element: Option<Option<E>>,
    view: Option<Arc<V>>,
}

impl<E, V> Default for Slot<E, V> {
    fn default() -> Self {
        Self { element: None, view: None }
    }
}

pub struct PositionWithPoints<P, E, V> {
    factory: ViewFactory<P, Option<E>, V>,
    at_start: Mutex<Slot<E, V>>,
    at_end: Mutex<Slot<E, V>>,
}

impl<P, E: Clone, V> PositionWithPoints<P, E, V> {
    pub fn new(factory: ViewFactory<P, Option<E>, V>) -> Self {
        Self {
            factory,
            at_start: Mutex::new(Slot::default()),
            at_end: Mutex::new(Slot::default()),
        }
    }

    pub fn instance_at_start_point(&self, parent: &Arc<P>, provider: impl FnOnce() -> Option<E>) -> Result<Arc<V>> {
        self.instance_at(Point::Start, parent, provider)
    }

    pub fn instance_at_end_point(&self, parent: &Arc<P>, provider: impl FnOnce() -> Option<E>) -> Result<Arc<V>> {
        self.instance_at(Point::End, parent, provider)
    }

    fn instance_at(&self, point: Point, parent: &Arc<P>, provider: impl FnOnce() -> Option<E>) -> Result<Arc<V>> {
        let element = {
            let mut slot = lock(self.slot(point));
            if let Some(view) = &slot.view {
                trace!(%point, "point cache hit");
                return Ok(Arc::clone(view));
            }
            slot.element.get_or_insert_with(provider).clone()
        };
        // built unlocked, so a factory may navigate back to this point
        let view = Arc::new(self.factory.build(Arc::downgrade(parent), element)?);
        debug!(%point, signature = self.factory.signature(), "point view constructed");
        let mut slot = lock(self.slot(point));
        slot.element = None;
        Ok(Arc::clone(slot.view.get_or_insert(view)))
    }
}

impl<P, E, V> PositionWithPoints<P, E, V> {
    fn slot(&self, point: Point) -> &Mutex<Slot<E, V>> {
        match point {
            Point::Start => &self.at_start,
            Point::End => &self.at_end,
        }
    }
    pub fn is_cached(&self, point: Point) -> bool {
        lock(self.slot(point)).view.is_some()
    }
}

impl<P, E, V> fmt::Debug for PositionWithPoints<P, E, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PositionWithPoints")
            .field("factory", &self.factory)
            .field("at_start", &self.is_cached(Point::Start))
            .field("at_end", &self.is_cached(Point::End))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{Bind, BindError};
    use std::cell::Cell;
    use std::sync::Weak;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Parent;

    struct Snapshot(Option<u8>);

    impl Bind<Parent, Option<u8>> for Snapshot {
        fn bind(_origin: Weak<Parent>, element: Option<u8>) -> std::result::Result<Self, BindError> {
            Ok(Snapshot(element))
        }
    }

    #[test]
    fn points_are_resolved_once_and_independently() {
        let parent = Arc::new(Parent);
        let points = PositionWithPoints::new(ViewFactory::<Parent, Option<u8>, Snapshot>::of());
        let calls = Cell::new(0);
        let provide = || {
            calls.set(calls.get() + 1);
            Some(7)
        };
        let start = points.instance_at_start_point(&parent, provide).expect("start");
        assert!(points.is_cached(Point::Start));
        assert!(!points.is_cached(Point::End));
        let again = points.instance_at_start_point(&parent, provide).expect("start again");
        assert!(Arc::ptr_eq(&start, &again));
        assert_eq!(calls.get(), 1);
        assert_eq!(start.0, Some(7));
    }

    #[test]
    fn absent_element_still_yields_a_cached_view() {
        let parent = Arc::new(Parent);
        let points = PositionWithPoints::new(ViewFactory::<Parent, Option<u8>, Snapshot>::of());
        let end = points.instance_at_end_point(&parent, || None).expect("end");
        assert_eq!(end.0, None);
        let again = points.instance_at_end_point(&parent, || Some(1)).expect("end again");
        assert!(Arc::ptr_eq(&end, &again));
        assert_eq!(again.0, None);
    }

    struct Holder {
        points: PositionWithPoints<Holder, u8, Numbered>,
    }

    struct Numbered(usize);

    #[test]
    fn factory_may_navigate_back_to_its_own_point() {
        let built = Arc::new(AtomicUsize::new(0));
        let reentered = Arc::new(AtomicBool::new(false));
        let factory = {
            let (built, reentered) = (Arc::clone(&built), Arc::clone(&reentered));
            ViewFactory::<Holder, Option<u8>, Numbered>::from_fn("reentrant", move |origin, _| {
                let number = built.fetch_add(1, Ordering::SeqCst);
                if !reentered.swap(true, Ordering::SeqCst) {
                    let holder = origin.upgrade().ok_or_else(|| BindError::new("holder dropped"))?;
                    holder
                        .points
                        .instance_at_end_point(&holder, || None)
                        .map_err(|e| BindError::new(e.to_string()))?;
                }
                Ok(Numbered(number))
            })
        };
        let holder = Arc::new(Holder {
            points: PositionWithPoints::new(factory),
        });
        let end = holder.points.instance_at_end_point(&holder, || Some(1)).expect("end");
        assert_eq!(built.load(Ordering::SeqCst), 2);
        // the view cached by the inner call wins
        assert_eq!(end.0, 1);
        let again = holder.points.instance_at_end_point(&holder, || None).expect("cached");
        assert!(Arc::ptr_eq(&end, &again));
    }

    #[test]
    fn provider_not_called_again_after_failed_construction() {
        let parent = Arc::new(Parent);
        let points = PositionWithPoints::new(ViewFactory::<Parent, Option<u8>, Snapshot>::from_fn(
            "absent only",
            |_, element| match element {
                None => Ok(Snapshot(None)),
                Some(_) => Err(BindError::new("present")),
            },
        ));
        let calls = Cell::new(0);
        for _ in 0..2 {
            let err = points
                .instance_at_start_point(&parent, || {
                    calls.set(calls.get() + 1);
                    Some(3)
                })
                .err()
                .expect("refused");
            assert!(err.is_instantiation());
        }
        assert_eq!(calls.get(), 1);
        assert!(!points.is_cached(Point::Start));
    }
}
