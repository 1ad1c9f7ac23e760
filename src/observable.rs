//! Observable fields for presentational shells.
//!
//! Shells re-derive their visuals from a handful of engine values (the
//! viewport, the connection snapshot). [`Observable`] wraps such a value,
//! detects actual changes, and hands old and new value to a change callback —
//! an explicit replacement for attribute-observer metaprogramming.

/// A value cell that reports changes through a callback.
pub struct Observable<T> {
    value: T,
    on_change: Option<Box<dyn Fn(&T, &T)>>,
}

impl<T: PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self { value, on_change: None }
    }

    /// Register the change callback, invoked as `(old, new)` on every
    /// effective change. Replaces any previous callback.
    pub fn subscribe(&mut self, on_change: impl Fn(&T, &T) + 'static) {
        self.on_change = Some(Box::new(on_change));
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Store `next` if it differs from the current value. Returns whether a
    /// change happened; the callback fires only on change.
    pub fn set(&mut self, next: T) -> bool {
        if self.value == next {
            return false;
        }
        let old = std::mem::replace(&mut self.value, next);
        if let Some(on_change) = &self.on_change {
            on_change(&old, &self.value);
        }
        true
    }
}
