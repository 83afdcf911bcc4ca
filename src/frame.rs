//! Frame scheduling primitives.
//!
//! The browser's `requestAnimationFrame` is abstracted behind
//! [`FrameScheduler`] so the animation loops can be driven by a fake clock in
//! tests. [`FrameGate`] implements frame coalescing: any number of triggering
//! events between two frames collapse into one scheduled pass.

use crate::error::EffectError;

/// Opaque id of a pending frame request (the value `requestAnimationFrame`
/// returned).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// "Run once after the next repaint" and "cancel a pending run".
pub trait FrameScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, EffectError>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Coalesces triggering events into at most one pending pass.
#[derive(Debug, Default)]
pub struct FrameGate {
    pending: bool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a pass as wanted. Returns `true` when the caller must schedule a
    /// frame, `false` when one is already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Called at the top of the scheduled pass; later events schedule anew.
    pub fn begin_pass(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_coalesces_until_pass_begins() {
        let mut gate = FrameGate::new();
        assert!(gate.request());
        assert!(!gate.request());
        assert!(!gate.request());
        assert!(gate.is_pending());

        gate.begin_pass();
        assert!(!gate.is_pending());
        assert!(gate.request());
    }
}
