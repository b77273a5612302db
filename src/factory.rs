//! Construction of views on demand.
//!
//! A position never knows which concrete view it hands out. The view type
//! implements [`Bind`] (or a closure is supplied) and the position keeps the
//! resulting [`ViewFactory`] for the whole life of its cache.

use std::any::type_name;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Weak;

use thiserror::Error;
use tracing::warn;

use crate::error::{Result, TablewalkError};

/// Why a view refused to be bound to an element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BindError(pub String);

impl BindError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A view that can be built from the view it was navigated from (its
/// origin) and the element it wraps.
pub trait Bind<P, E>: Sized {
    fn bind(origin: Weak<P>, element: E) -> std::result::Result<Self, BindError>;
}

type Construct<P, E, V> = dyn Fn(Weak<P>, E) -> std::result::Result<V, BindError> + Send + Sync;

pub struct ViewFactory<P, E, V> {
    signature: String,
    construct: Box<Construct<P, E, V>>,
}

impl<P: 'static, E: 'static, V: 'static> ViewFactory<P, E, V> {
    /// The factory of a view type that binds itself.
    pub fn of() -> Self
    where
        V: Bind<P, E>,
    {
        Self {
            signature: format!(
                "{}::bind(Weak<{}>, {})",
                type_name::<V>(),
                type_name::<P>(),
                type_name::<E>()
            ),
            construct: Box::new(V::bind),
        }
    }

    /// A factory around an arbitrary constructor; `name` appears in diagnostics.
    pub fn from_fn<C>(name: &str, construct: C) -> Self
    where
        C: Fn(Weak<P>, E) -> std::result::Result<V, BindError> + Send + Sync + 'static,
    {
        Self {
            signature: format!("{}(Weak<{}>, {})", name, type_name::<P>(), type_name::<E>()),
            construct: Box::new(construct),
        }
    }
}

impl<P, E, V> ViewFactory<P, E, V> {
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Builds one view. A refusal or a panic inside the constructor both come
    /// back as [`TablewalkError::Instantiation`].
    pub fn build(&self, origin: Weak<P>, element: E) -> Result<V> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.construct)(origin, element)));
        let cause = match outcome {
            Ok(Ok(view)) => return Ok(view),
            Ok(Err(refusal)) => refusal.0,
            Err(payload) => panic_message(payload.as_ref()),
        };
        warn!(signature = %self.signature, %cause, "view construction failed");
        Err(TablewalkError::Instantiation {
            signature: self.signature.clone(),
            view_type: type_name::<V>(),
            element_type: type_name::<E>(),
            cause,
        })
    }
}

impl<P, E, V> fmt::Debug for ViewFactory<P, E, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ViewFactory")
            .field("signature", &self.signature)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "constructor panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Parent;

    #[derive(Debug)]
    struct Even(u32);

    impl Bind<Parent, u32> for Even {
        fn bind(_origin: Weak<Parent>, element: u32) -> std::result::Result<Self, BindError> {
            if element % 2 == 0 {
                Ok(Even(element))
            } else {
                Err(BindError::new(format!("{} is odd", element)))
            }
        }
    }

    #[test]
    fn bind_success_and_refusal() {
        let parent = Arc::new(Parent);
        let factory = ViewFactory::<Parent, u32, Even>::of();
        let even = factory.build(Arc::downgrade(&parent), 4).expect("even binds");
        assert_eq!(even.0, 4);
        match factory.build(Arc::downgrade(&parent), 3) {
            Err(TablewalkError::Instantiation { cause, view_type, element_type, signature }) => {
                assert_eq!(cause, "3 is odd");
                assert!(view_type.ends_with("Even"));
                assert_eq!(element_type, "u32");
                assert!(signature.contains("::bind(Weak<"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn panicking_constructor_is_an_instantiation_failure() {
        let parent = Arc::new(Parent);
        let factory = ViewFactory::<Parent, u32, Even>::from_fn("exploding", |_, _| panic!("boom"));
        let err = factory
            .build(Arc::downgrade(&parent), 2)
            .err()
            .expect("panics are reported");
        assert!(err.is_instantiation());
        let message = err.to_string();
        assert!(message.starts_with("There is an exception 'boom'"));
        assert!(message.contains("exploding(Weak<"));
        assert!(message.contains("Please report this as a bug"));
    }
}
