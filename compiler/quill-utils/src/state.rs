//! Helper structs for keeping track of scoped state. The [LightState] provides
//! a mechanism for keeping track of state which is small in size and can be
//! copied cheaply. Scopes install a new value with [LightState::update] and
//! put the returned old value back with [LightState::set] once they are left.

use core::fmt;
use std::cell::Cell;

/// Helper struct for keeping track of light state.
///
/// Light state is state which is small in size and can be copied cheaply.
/// Internally uses a [`Cell`] to store the state, so it can be modified
/// through a shared reference.
#[derive(Clone, Debug)]
pub struct LightState<T: Copy + fmt::Debug> {
    current: Cell<T>,
}

impl<T: Copy + fmt::Debug> LightState<T> {
    pub fn new(initial: T) -> Self {
        Self { current: Cell::new(initial) }
    }

    /// Get the current value of the state.
    pub fn get(&self) -> T {
        self.current.get()
    }

    /// Set the value of the state.
    pub fn set(&self, value: T) {
        self.current.set(value)
    }

    /// Compute a new value from the current one and install it. Returns the
    /// old value so that the caller can restore it later on.
    pub fn update(&self, f: impl FnOnce(T) -> T) -> T {
        let old_value = self.get();
        self.set(f(old_value));
        old_value
    }
}
