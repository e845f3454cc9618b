//! Cooperative cancellation of a running export

use crate::{ExportError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag a caller sets to stop an export at its next phase boundary
///
/// The output file is committed only after the last check, so a cancelled
/// export never leaves a file behind.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`ExportError::Cancelled`] once the flag is set
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ExportError::Cancelled("stopped before the file was written".into()));
        }
        Ok(())
    }
}

/// Sets the flag when dropped unless disarmed
///
/// Held by an awaiting caller so that dropping its future (a timeout, an
/// aborted task) cancels the background work too.
#[derive(Debug)]
pub(crate) struct CancelOnDrop {
    flag: CancelFlag,
    armed: bool,
}

impl CancelOnDrop {
    pub(crate) fn new(flag: CancelFlag) -> Self {
        Self { flag, armed: true }
    }

    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(flag.check().is_ok());
        other.cancel();
        assert!(flag.is_cancelled());
        assert!(matches!(flag.check(), Err(ExportError::Cancelled(_))));
    }

    #[test]
    fn test_drop_guard() {
        let flag = CancelFlag::new();
        CancelOnDrop::new(flag.clone()).disarm();
        assert!(!flag.is_cancelled());
        drop(CancelOnDrop::new(flag.clone()));
        assert!(flag.is_cancelled());
    }
}
