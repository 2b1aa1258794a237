//! Exposes testing, profiling and tracing capabilities.

use crate::scheduler::SystemIndex;

/// Defines the [`Tracer`] trait and implements the [`Log`] and [`Aggregate`] types.
///
/// All tracer method parameters must be [`Copy`].
macro_rules! define_tracer {
    (
        $(
            $(#[$meta:meta])*
            fn $name:ident(&self $(, $arg_ident:ident: $arg_ty:ty)* $(,)?);
        )*
    ) => {
        /// A tracer used for recording the events throughout a tick.
        ///
        /// Can be used for profiling and testing.
        /// All methods default to no-op.
        pub trait Tracer: Sync {
            $(
                $(#[$meta])*
                #[allow(unused_variables)]
                fn $name(&self, $($arg_ident: $arg_ty,)*) {}
            )*
        }

        impl<T: Tracer + ?Sized> Tracer for &T {
            $(
                fn $name(&self, $($arg_ident: $arg_ty,)*) {
                    (**self).$name($($arg_ident,)*)
                }
            )*
        }

        impl Tracer for Log {
            $(
                fn $name(&self, $($arg_ident: $arg_ty,)*) {
                    log::log!(self.0, concat!(stringify!($name), "(", $(
                        stringify!($arg_ident),
                        " = {",
                        stringify!($arg_ident),
                        ":?}, ",
                    )* ")"), $(
                        $arg_ident = $arg_ident,
                    )*);
                }
            )*
        }

        impl_tuple_accumulate! {
            @TYPES (T1, T2, T3, T4, T5, T6, T7, T8);
            $(
                @VARS (t1, t2, t3, t4, t5, t6, t7, t8);
                @METHOD {fn $name(&self, $($arg_ident: $arg_ty,)*);}
            )*
        }
    };
}

macro_rules! impl_tuple {
    (
        @TYPES ($($ty:ident),* $(,)?);
        $(
            @VARS ($($vars:ident),* $(,)?);
            @METHOD {fn $name:ident(&self, $($arg_ident:ident: $arg_ty:ty,)*);}
        )*
    ) => {
        impl<$($ty: Tracer),*> Tracer for Aggregate<($($ty,)*)> {
            $(
                fn $name(&self, $($arg_ident: $arg_ty),*) {
                    #[allow(unused_mut, unused_variables)]
                    let mut args = ($($arg_ident,)*);

                    #[allow(dead_code)]
                    fn call_with_args(tracer: &impl Tracer, ($($arg_ident,)*): &mut ($($arg_ty,)*)) {
                        tracer.$name($(*$arg_ident,)*);
                    }

                    let Aggregate(($($vars,)*)) = self;
                    $(
                        call_with_args($vars, &mut args);
                    )*
                }
            )*
        }
    };
}

macro_rules! impl_tuple_accumulate {
    (@TYPES (); $(@VARS (); @METHOD {$($body:tt)*})*) => {
        impl_tuple! {
            @TYPES ();
            $(
                @VARS ();
                @METHOD {$($body)*}
            )*
        }
    };
    (
        @TYPES ($first_ty:ident $(, $rest_ty:ident)* $(,)?);
        $(
            @VARS ($first_var:ident $(, $rest_var:ident)* $(,)?);
            @METHOD {$($body:tt)*}
        )*
    ) => {
        impl_tuple! {
            @TYPES ($first_ty $(, $rest_ty)* );
            $(
                @VARS ($first_var $(, $rest_var)*);
                @METHOD {$($body)*}
            )*
        }

        impl_tuple_accumulate! {
            @TYPES ($($rest_ty),*);
            $(
                @VARS ($($rest_var),*);
                @METHOD {$($body)*}
            )*
        }
    };
}

define_tracer! {
    /// A tick starts.
    fn start_cycle(&self);

    /// A tick ends, after all queued commands have been applied.
    fn end_cycle(&self);

    /// A thread tries to steal a task, but all tasks have started.
    fn steal_return_complete(&self, thread: Thread);

    /// A thread tries to steal a task, but no tasks are in the runnable pool.
    fn steal_return_pending(&self, thread: Thread);

    /// A node is marked as runnable because all its prerequisites have completed.
    fn mark_runnable(&self, node: SystemIndex);

    /// A system starts running.
    fn start_run(&self, thread: Thread, node: SystemIndex, debug_name: &str);

    /// A system stops running, whether it succeeded or not.
    fn end_run(&self, thread: Thread, node: SystemIndex, debug_name: &str);

    /// A system has completed. Also passes the number of remaining nodes.
    fn complete_system(&self, node: SystemIndex, remaining: usize);

    /// A system failed and no further systems are started in this tick.
    fn abort_cycle(&self, node: SystemIndex, debug_name: &str);

    /// The queued commands of a system are applied.
    fn drain_commands(&self, node: SystemIndex, count: usize);

    /// The entities queued for destruction in this tick are destroyed.
    fn destroy_entities(&self, requested: usize, destroyed: usize);
}

/// An empty tracer.
pub struct Noop;

impl Tracer for Noop {}

/// Groups multiple tracers into a tuple and dispatches each call to them in serial.
pub struct Aggregate<T>(
    /// A tuple of child tracers to execute in serial.
    pub T,
);

/// A tracer that logs all events.
pub struct Log(
    /// The log level to log events with.
    pub log::Level,
);

/// The thread ID for a system executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Thread {
    /// The thread that called [`World::execute`](crate::World::execute),
    /// which runs all systems when threading is disabled.
    Main,
    /// A worker thread. The index is in the range `0..concurrency`.
    Worker(usize),
}

impl Thread {
    /// Identifies the current thread.
    pub(crate) fn current() -> Self {
        match rayon::current_thread_index() {
            Some(index) => Self::Worker(index),
            None => Self::Main,
        }
    }
}
