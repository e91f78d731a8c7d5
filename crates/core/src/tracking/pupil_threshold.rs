use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::shared::constants::DEFAULT_PUPIL_THRESHOLD;

/// Shared, runtime-adjustable binarisation threshold for pupil detection.
///
/// Clones share the same value. A new value is picked up at the start of the
/// next pupil detection; calls already in flight keep the old one.
#[derive(Clone, Debug)]
pub struct PupilThreshold(Arc<AtomicU8>);

impl PupilThreshold {
    pub fn new(value: u8) -> Self {
        Self(Arc::new(AtomicU8::new(value)))
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, value: u8) {
        self.0.store(value, Ordering::Relaxed);
    }
}

impl Default for PupilThreshold {
    fn default() -> Self {
        Self::new(DEFAULT_PUPIL_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_seventy() {
        assert_eq!(PupilThreshold::default().get(), 70);
    }

    #[test]
    fn test_clones_share_value() {
        let handle = PupilThreshold::new(70);
        let ui_side = handle.clone();
        ui_side.set(40);
        assert_eq!(handle.get(), 40);
    }
}
