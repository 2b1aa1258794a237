//! Specifies the requirements for a system.

use std::fmt;

use crate::storage::{self, AnyStorage, Component};
use crate::util::DbgTypeId;

/// Describes an instance of system.
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    /// The name of the system, unique within a world.
    pub debug_name: String,
    /// The component types accessed by the system, in declaration order.
    pub access:     Vec<Access>,
}

impl Spec {
    /// Creates a spec with no declared access.
    pub fn new(debug_name: impl Into<String>) -> Self {
        Self { debug_name: debug_name.into(), access: Vec::new() }
    }

    /// Declares read access to `C`.
    pub fn read<C: Component>(self) -> Self { self.with(Access::read::<C>()) }

    /// Declares write access to `C`.
    pub fn write<C: Component>(self) -> Self { self.with(Access::write::<C>()) }

    /// Appends an access declaration.
    pub fn with(mut self, access: Access) -> Self {
        self.access.push(access);
        self
    }

    /// Appends multiple access declarations.
    pub fn with_all(mut self, access: impl IntoIterator<Item = Access>) -> Self {
        self.access.extend(access);
        self
    }

    /// Checks whether some access of `self` conflicts with some access of `other`.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.access.iter().any(|a| other.access.iter().any(|b| a.conflicts_with(b)))
    }
}

/// Whether a component type is read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// Shared access.
    Read,
    /// Exclusive access.
    Write,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

/// Declares that a system accesses a component type.
#[derive(Clone)]
pub struct Access {
    /// The accessed component type.
    pub ty:                     DbgTypeId,
    /// Whether the type is read or written.
    pub mode:                   Mode,
    pub(crate) storage_builder: fn() -> Box<dyn AnyStorage>,
}

impl Access {
    /// Declares read access to `C`.
    pub fn read<C: Component>() -> Self {
        Self { ty: type_of::<C>(), mode: Mode::Read, storage_builder: storage::new_any::<C> }
    }

    /// Declares write access to `C`.
    pub fn write<C: Component>() -> Self {
        Self { ty: type_of::<C>(), mode: Mode::Write, storage_builder: storage::new_any::<C> }
    }

    /// Two accesses conflict if they touch the same type and at least one of them writes.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.ty == other.ty && (self.mode == Mode::Write || other.mode == Mode::Write)
    }
}

impl PartialEq for Access {
    fn eq(&self, other: &Self) -> bool { self.ty == other.ty && self.mode == other.mode }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mode, self.ty)
    }
}

pub(crate) fn type_of<C: Component>() -> DbgTypeId { DbgTypeId::of::<C>() }
