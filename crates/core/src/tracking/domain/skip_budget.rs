/// Frame-skip tolerance for a tracking stage.
///
/// Starts full. Every empty detection consumes one frame; a successful
/// detection refills it. Once nothing is left the stage has lost its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipBudget {
    remaining: u32,
    max: u32,
}

impl SkipBudget {
    pub fn new(max: u32) -> Self {
        Self {
            remaining: max,
            max,
        }
    }

    pub fn refill(&mut self) {
        self.remaining = self.max;
    }

    /// Records an empty frame. Returns `true` while the stage may keep
    /// coasting on its last region, `false` once the budget is exhausted.
    pub fn consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}
