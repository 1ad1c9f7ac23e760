//! Shared test support: callback tracking and the engine harness.

#![allow(dead_code)]

pub mod harness;

use std::cell::RefCell;
use std::rc::Rc;

use node_flow::{Connection, Flow, Handle};

/// Records every host callback invocation for later assertions.
#[derive(Clone, Default)]
pub struct CallbackTracker {
    pub connects: Rc<RefCell<Vec<Connection>>>,
    pub connect_starts: Rc<RefCell<Vec<Handle>>>,
    pub connect_ends: Rc<RefCell<usize>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register tracking callbacks on the flow.
    pub fn install(&self, flow: &Flow) {
        let connects = self.connects.clone();
        flow.on_connect(move |conn| connects.borrow_mut().push(conn.clone()));

        let starts = self.connect_starts.clone();
        flow.on_connect_start(move |handle| starts.borrow_mut().push(handle.clone()));

        let ends = self.connect_ends.clone();
        flow.on_connect_end(move || *ends.borrow_mut() += 1);
    }

    pub fn connect_count(&self) -> usize {
        self.connects.borrow().len()
    }

    pub fn end_count(&self) -> usize {
        *self.connect_ends.borrow()
    }
}
