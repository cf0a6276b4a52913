//! Population split configuration.

use std::fmt;

/// The sample sizes of the two populations.
///
/// Rows `0..first` of a record belong to the first population, and rows `first..first + second`
/// belong to the second population.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Populations {
    first: usize,
    second: usize,
}

impl Populations {
    /// Creates new population sizes.
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    /// Returns the number of samples in the first population.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Returns the number of samples in the second population.
    pub fn second(&self) -> usize {
        self.second
    }

    /// Returns the total number of samples in both populations.
    pub fn total(&self) -> usize {
        self.first + self.second
    }

    /// Checks that both populations are strictly larger than the minimum sample size.
    ///
    /// # Errors
    ///
    /// If either population has at most `min_sample_size` samples.
    pub fn validate(self, min_sample_size: MinSampleSize) -> Result<Self, Error> {
        if self.first <= min_sample_size.get() || self.second <= min_sample_size.get() {
            Err(Error::IllegalSize {
                populations: self,
                min_sample_size,
            })
        } else {
            Ok(self)
        }
    }
}

impl fmt::Display for Populations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// The minimum number of non-missing alleles per population for a site to contribute.
///
/// The value is never smaller than [`MinSampleSize::FLOOR`], since smaller values would lead to
/// division by zero.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MinSampleSize(usize);

impl MinSampleSize {
    /// The smallest allowed minimum sample size.
    pub const FLOOR: usize = 2;

    /// Creates a new minimum sample size, clamping it to at least [`MinSampleSize::FLOOR`].
    pub fn new(min_sample_size: usize) -> Self {
        Self(min_sample_size.max(Self::FLOOR))
    }

    /// Returns the minimum sample size.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for MinSampleSize {
    fn default() -> Self {
        Self(Self::FLOOR)
    }
}

impl fmt::Display for MinSampleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An error associated with the population configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// Population sizes not larger than the minimum sample size.
    IllegalSize {
        /// The provided population sizes.
        populations: Populations,
        /// The minimum sample size.
        min_sample_size: MinSampleSize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IllegalSize {
                min_sample_size, ..
            } => write!(
                f,
                "illegal population sizes specified, both must be greater than {min_sample_size}"
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_sample_size_clamped() {
        assert_eq!(MinSampleSize::new(0).get(), 2);
        assert_eq!(MinSampleSize::new(1).get(), 2);
        assert_eq!(MinSampleSize::new(2).get(), 2);
        assert_eq!(MinSampleSize::new(5).get(), 5);
        assert_eq!(MinSampleSize::default(), MinSampleSize::new(2));
    }

    #[test]
    fn test_validate() {
        let min = MinSampleSize::default();

        assert!(Populations::new(3, 3).validate(min).is_ok());
        assert!(Populations::new(2, 3).validate(min).is_err());
        assert!(Populations::new(3, 2).validate(min).is_err());
        assert!(Populations::new(0, 10).validate(min).is_err());

        let min = MinSampleSize::new(4);
        assert_eq!(
            Populations::new(4, 10).validate(min),
            Err(Error::IllegalSize {
                populations: Populations::new(4, 10),
                min_sample_size: min,
            })
        );
        assert!(Populations::new(5, 10).validate(min).is_ok());
    }

    #[test]
    fn test_sizes() {
        let populations = Populations::new(4, 6);

        assert_eq!(populations.first(), 4);
        assert_eq!(populations.second(), 6);
        assert_eq!(populations.total(), 10);
        assert_eq!(populations.to_string(), "4/6");
    }
}
