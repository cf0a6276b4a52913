//! Hudson, Slatkin and Maddison (1992) estimator of Fst.
//!
//! For each site, alleles coded `'1'` and `'0'` are counted separately within each population;
//! any other character, notably `'?'`, is treated as missing and not counted. A site contributes
//! to the estimate only if both populations have at least the minimum number of non-missing
//! alleles at that site.

use std::fmt;

use crate::{Matrix, MinSampleSize, Populations};

/// Counts of alleles at a single site within a single population.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Counts {
    /// Number of alleles coded `'1'`.
    pub ones: usize,
    /// Number of alleles coded `'0'`.
    pub zeros: usize,
}

impl Counts {
    fn from_rows<'a, I>(rows: I, site: usize) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        rows.into_iter().fold(Self::default(), |mut counts, row| {
            match row[site] {
                b'1' => counts.ones += 1,
                b'0' => counts.zeros += 1,
                _ => (),
            }
            counts
        })
    }

    /// Returns the number of non-missing alleles.
    pub fn total(&self) -> usize {
        self.ones + self.zeros
    }

    fn within(&self) -> f64 {
        let n = self.total() as f64;
        (self.ones * self.zeros) as f64 / (n * (n - 1.))
    }
}

/// Allele counts at a single site in both populations.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct AlleleCounts {
    /// Counts in the first population.
    pub first: Counts,
    /// Counts in the second population.
    pub second: Counts,
}

impl AlleleCounts {
    /// Counts alleles at the provided site.
    ///
    /// # Panics
    ///
    /// If the site or the populations are out of bounds for the matrix.
    pub fn from_site(matrix: &Matrix, populations: Populations, site: usize) -> Self {
        let split = populations.first();

        Self {
            first: Counts::from_rows(matrix.rows(0..split), site),
            second: Counts::from_rows(matrix.rows(split..split + populations.second()), site),
        }
    }

    /// Returns true if both populations have at least the minimum number of non-missing alleles.
    pub fn is_informative(&self, min_sample_size: MinSampleSize) -> bool {
        let min = min_sample_size.get();
        self.first.total() >= min && self.second.total() >= min
    }

    fn between(&self) -> f64 {
        let (i, j) = (self.first, self.second);
        (i.ones * j.zeros + j.ones * i.zeros) as f64 / (i.total() * j.total()) as f64
    }
}

/// Sums of within- and between-population heterozygosity over the sites of a record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Heterozygosity {
    /// Within-population heterozygosity, summed over both populations.
    pub within: f64,
    /// Between-population heterozygosity.
    pub between: f64,
    /// Number of sites with enough data in both populations to contribute.
    pub informative_sites: usize,
}

impl Heterozygosity {
    /// Sums heterozygosity over all sites in the matrix.
    ///
    /// # Errors
    ///
    /// If the number of samples in the matrix does not match the populations.
    pub fn from_matrix(
        matrix: &Matrix,
        populations: Populations,
        min_sample_size: MinSampleSize,
    ) -> Result<Self, SampleCountError> {
        check_samples(matrix, populations)?;

        Ok(Self::from_matrix_unchecked(matrix, populations, min_sample_size))
    }

    fn from_matrix_unchecked(
        matrix: &Matrix,
        populations: Populations,
        min_sample_size: MinSampleSize,
    ) -> Self {
        (0..matrix.sites())
            .map(|site| AlleleCounts::from_site(matrix, populations, site))
            .fold(Self::default(), |mut heterozygosity, counts| {
                heterozygosity.add(&counts, min_sample_size);
                heterozygosity
            })
    }

    /// Adds the contribution of a single site, if informative.
    pub fn add(&mut self, counts: &AlleleCounts, min_sample_size: MinSampleSize) {
        if counts.is_informative(min_sample_size) {
            self.within += counts.first.within();
            self.within += counts.second.within();
            self.between += counts.between();
            self.informative_sites += 1;
        }
    }
}

/// An Fst estimate for a single record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fst {
    /// The record has no segregating sites.
    NoSites,
    /// No between-population heterozygosity was observed.
    Undefined,
    /// A well-defined estimate.
    Estimate(f64),
}

impl Fst {
    /// The number of decimals used when displaying an estimate without explicit precision.
    pub const DEFAULT_PRECISION: usize = 6;

    /// Estimates Fst from a matrix.
    ///
    /// # Errors
    ///
    /// If the number of samples in the matrix does not match the populations.
    pub fn from_matrix(
        matrix: &Matrix,
        populations: Populations,
        min_sample_size: MinSampleSize,
    ) -> Result<Self, SampleCountError> {
        check_samples(matrix, populations)?;

        if matrix.sites() == 0 {
            Ok(Self::NoSites)
        } else {
            let heterozygosity =
                Heterozygosity::from_matrix_unchecked(matrix, populations, min_sample_size);

            Ok(Self::from_heterozygosity(&heterozygosity))
        }
    }

    /// Estimates Fst from summed heterozygosity.
    pub fn from_heterozygosity(heterozygosity: &Heterozygosity) -> Self {
        if heterozygosity.between > 0. {
            Self::Estimate(1. - heterozygosity.within / heterozygosity.between)
        } else {
            Self::Undefined
        }
    }

    /// Returns the estimate as a number.
    ///
    /// Records without segregating sites give zero, and undefined estimates give NaN.
    pub fn value(&self) -> f64 {
        match self {
            Fst::NoSites => 0.,
            Fst::Undefined => f64::NAN,
            Fst::Estimate(v) => *v,
        }
    }
}

impl fmt::Display for Fst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fst::NoSites => f.write_str("0.0"),
            Fst::Undefined => f.write_str("nan"),
            Fst::Estimate(v) => {
                let precision = f.precision().unwrap_or(Self::DEFAULT_PRECISION);
                write!(f, "{v:.precision$}")
            }
        }
    }
}

fn check_samples(matrix: &Matrix, populations: Populations) -> Result<(), SampleCountError> {
    if matrix.samples() == populations.total() {
        Ok(())
    } else {
        Err(SampleCountError {
            expected: populations.total(),
            actual: matrix.samples(),
        })
    }
}

/// An error associated with a mismatch between matrix samples and population sizes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SampleCountError {
    /// Number of samples defined by the populations.
    pub expected: usize,
    /// Number of samples in the matrix.
    pub actual: usize,
}

impl fmt::Display for SampleCountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} samples in genotype matrix, found {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for SampleCountError {}
