//! Interval arithmetic for face bounds.
//!
//! Provides closed intervals [min, max] used to decide whether a plane crossing
//! lands on the face of a solid.

/// Closed interval [min, max] for range checking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Minimum value of the interval
    pub min: f32,
    /// Maximum value of the interval
    pub max: f32,
}

impl Interval {
    /// Create a new interval with given min and max values
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Interval [-half, half] centered on zero
    pub fn centered(half: f32) -> Self {
        Self::new(-half, half)
    }

    /// Calculate the size (width) of the interval
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Check if the interval contains the given value (inclusive bounds)
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Grow the interval by `delta` on both sides
    pub fn expand(&self, delta: f32) -> Self {
        Self::new(self.min - delta, self.max + delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let i = Interval::centered(1.0);
        assert!(i.contains(-1.0));
        assert!(i.contains(1.0));
        assert!(!i.contains(1.0001));
        assert_eq!(i.size(), 2.0);
    }

    #[test]
    fn test_expand() {
        let i = Interval::new(0.0, 1.0).expand(0.5);
        assert_eq!(i, Interval::new(-0.5, 1.5));
        assert!(!Interval::new(0.0, 1.0).contains(f32::NAN));
    }
}
