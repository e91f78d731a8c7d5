use serde::Serialize;

/// Left/right results of a bilateral stage, in camera (pre-mirroring)
/// orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pair<T> {
    pub left: Option<T>,
    pub right: Option<T>,
}

impl<T> Pair<T> {
    pub fn new(left: Option<T>, right: Option<T>) -> Self {
        Self { left, right }
    }

    pub fn none() -> Self {
        Self {
            left: None,
            right: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn count(&self) -> usize {
        self.left.is_some() as usize + self.right.is_some() as usize
    }
}

impl<T> Default for Pair<T> {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_and_empty() {
        assert!(Pair::<u8>::none().is_empty());
        assert_eq!(Pair::new(Some(1), None).count(), 1);
        assert_eq!(Pair::new(Some(1), Some(2)).count(), 2);
        assert!(!Pair::new(None, Some(2)).is_empty());
    }
}
