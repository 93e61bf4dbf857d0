use crate::launcher::{AuxLauncher, AuxTarget};
use std::cell::RefCell;

#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launched: RefCell<Vec<AuxTarget>>,
}

impl RecordingLauncher {
    pub fn launched(&self) -> Vec<AuxTarget> {
        self.launched.borrow().clone()
    }
}

impl AuxLauncher for RecordingLauncher {
    fn launch(&self, target: AuxTarget) {
        self.launched.borrow_mut().push(target);
    }
}
