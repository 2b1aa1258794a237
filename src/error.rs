//! Errors reported while building a world or executing a tick.

use crate::scheduler::SystemIndex;
use crate::system;

/// A configuration error detected while organizing systems.
///
/// These are reported once, when the world is built, and never during a tick.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Two systems were registered with the same name.
    #[error("system name {name:?} is used by both system #{first} and system #{second}")]
    DuplicateName {
        /// The duplicated name.
        name:   String,
        /// The index of the system registered first.
        first:  usize,
        /// The index of the system registered later.
        second: usize,
    },

    /// A system declared the same component type more than once.
    #[error("system {system:?} declares access to {ty} more than once")]
    ConflictingAccess {
        /// The name of the offending system.
        system: String,
        /// The name of the repeated type.
        ty:     &'static str,
    },

    /// An explicit order refers to a system that was not scheduled.
    #[error("ordering constraint refers to unknown system #{index}")]
    UnknownSystem {
        /// The unknown system index.
        index: usize,
    },

    /// The ordering constraints form a cycle.
    #[error("scheduled systems have a cyclic dependency: {path}")]
    CyclicDependency {
        /// The cycle, rendered as `a -> b -> a`.
        path: String,
    },
}

/// An error that aborted a tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A system returned an error.
    #[error("system #{} ({name}) failed: {source}", .index.0)]
    System {
        /// The failing system.
        index:  SystemIndex,
        /// The name of the failing system.
        name:   String,
        /// The error returned by the system.
        #[source]
        source: system::Error,
    },
}

impl TickError {
    /// The index of the system that caused this error.
    pub fn system(&self) -> SystemIndex {
        match self {
            Self::System { index, .. } => *index,
        }
    }
}
