//! Distinct-until-changed filter

/// One-slot filter that passes a value only when it differs from the last one
#[derive(Debug, Clone)]
pub struct DistinctUntilChanged<T> {
    last: T,
}

impl<T: PartialEq + Clone> DistinctUntilChanged<T> {
    /// Start with `initial` as the last seen value
    pub fn with_initial(initial: T) -> Self {
        Self { last: initial }
    }

    /// Record `value`; returns true if it differs from the previous one
    pub fn observe(&mut self, value: T) -> bool {
        if self.last == value {
            return false;
        }
        self.last = value;
        true
    }

    pub fn last(&self) -> &T {
        &self.last
    }

    pub fn reset(&mut self, value: T) {
        self.last = value;
    }
}
