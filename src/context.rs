//! Singleton values shared by all systems of a world.
//!
//! The context holds at most one value per type.
//! Values are created on demand with [`Context::get_or_create`]
//! and live as long as the world.
//! Systems only receive a shared reference during a tick.

use std::any::{self, Any};
use std::collections::HashMap;

use crate::util::DbgTypeId;


/// A type-keyed store of singleton values.
#[derive(Default)]
pub struct Context {
    values: HashMap<DbgTypeId, Box<dyn Any + Send + Sync>>,
}

impl Context {
    /// Returns the value of type `T`, creating it with `factory` if absent.
    ///
    /// `factory` is only called when no value of type `T` exists yet.
    pub fn get_or_create<T: Send + Sync + 'static>(&mut self, factory: impl FnOnce() -> T) -> &mut T {
        self.values
            .entry(DbgTypeId::of::<T>())
            .or_insert_with(|| Box::new(factory()))
            .downcast_mut::<T>()
            .expect("TypeId mismatch")
    }

    /// Returns the value of type `T` if it exists.
    pub fn try_get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values
            .get(&DbgTypeId::of::<T>())
            .map(|value| value.downcast_ref::<T>().expect("TypeId mismatch"))
    }

    /// Returns the value of type `T` mutably if it exists.
    pub fn try_get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.values
            .get_mut(&DbgTypeId::of::<T>())
            .map(|value| value.downcast_mut::<T>().expect("TypeId mismatch"))
    }

    /// Returns the value of type `T`.
    ///
    /// # Panics
    /// Panics if no value of type `T` was created.
    pub fn get<T: Send + Sync + 'static>(&self) -> &T {
        match self.try_get::<T>() {
            Some(value) => value,
            None => panic!("The context value {} has not been created", any::type_name::<T>()),
        }
    }

    /// Sets the value of type `T`, returning the previous value if any.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(DbgTypeId::of::<T>(), Box::new(value))
            .map(|old| *old.downcast::<T>().expect("TypeId mismatch"))
    }

    /// Whether a value of type `T` exists.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.values.contains_key(&DbgTypeId::of::<T>())
    }
}

/// The simulated duration of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDelta {
    /// The duration in seconds.
    pub seconds: f32,
}

impl Default for FixedDelta {
    fn default() -> Self { Self { seconds: 1.0 / 60.0 } }
}
