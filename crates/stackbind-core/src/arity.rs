//! Argument-count ranges.

use std::fmt;

/// The range of argument counts a callback accepts.
///
/// `max == None` means any number of arguments at or above `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity {
    min: usize,
    max: Option<usize>,
}

impl Arity {
    /// Exactly `n` arguments.
    pub const fn exact(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    /// Between `min` and `max` arguments, inclusive.
    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// `min` or more arguments.
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Any number of arguments.
    pub const fn variadic() -> Self {
        Self::at_least(0)
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn is_exact(&self) -> bool {
        self.max == Some(self.min)
    }

    /// Check whether `count` arguments fall inside this range.
    pub fn admits(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }

    /// Shift the whole range up, e.g. to account for a leading receiver.
    pub fn shifted(self, by: usize) -> Self {
        Self {
            min: self.min + by,
            max: self.max.map(|max| max + by),
        }
    }

    /// The smallest range covering both `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        Self {
            min: self.min.min(other.min),
            max,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}..={}", self.min, max),
            None => write!(f, "{}..", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_admits_only_its_count() {
        let arity = Arity::exact(2);
        assert!(!arity.admits(1));
        assert!(arity.admits(2));
        assert!(!arity.admits(3));
        assert!(arity.is_exact());
    }

    #[test]
    fn range_and_open_ended() {
        assert!(Arity::range(1, 3).admits(3));
        assert!(!Arity::range(1, 3).admits(0));
        assert!(Arity::at_least(2).admits(100));
        assert!(Arity::variadic().admits(0));
    }

    #[test]
    fn shifted_moves_both_bounds() {
        assert_eq!(Arity::range(0, 2).shifted(1), Arity::range(1, 3));
        assert_eq!(Arity::at_least(1).shifted(1), Arity::at_least(2));
    }

    #[test]
    fn union_covers_both() {
        assert_eq!(Arity::exact(1).union(Arity::exact(3)), Arity::range(1, 3));
        assert_eq!(Arity::exact(1).union(Arity::at_least(4)), Arity::at_least(1));
    }

    #[test]
    fn display() {
        assert_eq!(Arity::exact(2).to_string(), "2");
        assert_eq!(Arity::range(1, 2).to_string(), "1..=2");
        assert_eq!(Arity::at_least(3).to_string(), "3..");
    }
}
