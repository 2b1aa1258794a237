use super::{Args, Error, Spec, System};

/// A system backed by a closure.
///
/// Any state the system needs between ticks lives in the closure captures.
pub struct Closure<F> {
    spec: Spec,
    run:  F,
}

/// Creates a system from its spec and a closure.
pub fn from_fn<F>(spec: Spec, run: F) -> Closure<F>
where
    F: FnMut(&mut Args<'_>) -> Result<(), Error> + Send,
{
    Closure { spec, run }
}

impl<F> System for Closure<F>
where
    F: FnMut(&mut Args<'_>) -> Result<(), Error> + Send,
{
    fn get_spec(&self) -> Spec { self.spec.clone() }

    fn run(&mut self, args: &mut Args<'_>) -> Result<(), Error> { (self.run)(args) }
}
