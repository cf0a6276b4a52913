//! Genotype matrix with geometrically growing row buffers.

use std::fmt;

/// A genotype matrix of samples by sites.
///
/// The matrix owns one row buffer per sample. Buffers are reused between records and grow by
/// doubling whenever a record has more sites than the current capacity; they never shrink.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Matrix {
    rows: Vec<Vec<u8>>,
    capacity: usize,
    sites: usize,
}

impl Matrix {
    /// The default initial capacity of each row, in sites.
    pub const DEFAULT_CAPACITY: usize = 5_000_000;

    /// Creates a new, empty matrix for the provided number of samples, using the default initial
    /// capacity.
    ///
    /// # Errors
    ///
    /// If the row buffers cannot be allocated.
    pub fn new(samples: usize) -> Result<Self, AllocationError> {
        Self::with_capacity(samples, Self::DEFAULT_CAPACITY)
    }

    /// Creates a new, empty matrix for the provided number of samples and initial row capacity.
    ///
    /// A capacity of zero is treated as one, since it could otherwise never be doubled.
    ///
    /// # Errors
    ///
    /// If the row buffers cannot be allocated.
    pub fn with_capacity(samples: usize, capacity: usize) -> Result<Self, AllocationError> {
        let capacity = capacity.max(1);

        let rows = (0..samples)
            .map(|_| {
                let mut row = Vec::new();
                row.try_reserve_exact(capacity)
                    .map(|()| row)
                    .map_err(|_| AllocationError::Exhausted { capacity })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rows,
            capacity,
            sites: 0,
        })
    }

    /// Returns the current row capacity, in sites.
    ///
    /// This is always strictly greater than the largest number of sites seen so far.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ensures that every row can hold the provided number of sites.
    ///
    /// If the current capacity is insufficient, it is doubled until it exceeds `sites`, and all
    /// rows are reallocated. Any current row contents are discarded when growing.
    ///
    /// # Errors
    ///
    /// If the new capacity overflows, or if any row cannot be reallocated. The matrix should not
    /// be used after an error.
    pub fn ensure_capacity(&mut self, sites: usize) -> Result<(), AllocationError> {
        if sites < self.capacity {
            return Ok(());
        }

        let mut capacity = self.capacity;
        while sites >= capacity {
            capacity = capacity
                .checked_mul(2)
                .ok_or(AllocationError::Overflow { sites })?;
        }

        log::debug!(
            "Growing genotype buffers from {} to {capacity} sites for {} samples",
            self.capacity,
            self.rows.len()
        );

        for row in self.rows.iter_mut() {
            row.clear();
            row.try_reserve_exact(capacity)
                .map_err(|_| AllocationError::Exhausted { capacity })?;
        }
        self.capacity = capacity;

        Ok(())
    }

    /// Prepares the matrix for a new record with the provided number of sites.
    ///
    /// All rows are emptied, and capacity is ensured before any rows are filled.
    pub(crate) fn reset(&mut self, sites: usize) -> Result<(), AllocationError> {
        self.ensure_capacity(sites)?;
        self.rows.iter_mut().for_each(Vec::clear);
        self.sites = sites;
        Ok(())
    }

    /// Sets the contents of the row at the provided index.
    ///
    /// The caller must ensure that the row has exactly as many sites as the matrix.
    pub(crate) fn set_row(&mut self, index: usize, row: &[u8]) {
        debug_assert_eq!(row.len(), self.sites);

        let dest = &mut self.rows[index];
        dest.clear();
        dest.extend_from_slice(row);
    }

    /// Returns the number of samples, i.e. rows.
    pub fn samples(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of sites, i.e. columns, in the current record.
    pub fn sites(&self) -> usize {
        self.sites
    }

    /// Returns the row of the sample at the provided index, if any.
    pub fn get_row(&self, index: usize) -> Option<&[u8]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Returns an iterator over the rows in the provided range of samples.
    ///
    /// # Panics
    ///
    /// If the range is out of bounds.
    pub fn rows(&self, samples: std::ops::Range<usize>) -> impl Iterator<Item = &[u8]> {
        self.rows[samples].iter().map(Vec::as_slice)
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let sites = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut matrix = Self::with_capacity(rows.len(), 4).unwrap();
        matrix.reset(sites).unwrap();
        for (i, row) in rows.iter().enumerate() {
            matrix.set_row(i, row.as_bytes());
        }
        matrix
    }
}

/// An error associated with allocating genotype buffers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AllocationError {
    /// Allocation of row buffers with the provided capacity failed.
    Exhausted {
        /// The requested capacity, in sites.
        capacity: usize,
    },
    /// The capacity required to hold the provided number of sites overflows.
    Overflow {
        /// The number of sites.
        sites: usize,
    },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::Exhausted { capacity } => {
                write!(f, "failed to allocate genotype buffers for {capacity} sites")
            }
            AllocationError::Overflow { sites } => {
                write!(f, "genotype buffer capacity for {sites} sites overflows")
            }
        }
    }
}

impl std::error::Error for AllocationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_capacity_within_capacity() {
        let mut matrix = Matrix::with_capacity(2, 8).unwrap();

        matrix.ensure_capacity(7).unwrap();
        assert_eq!(matrix.capacity(), 8);
    }

    #[test]
    fn test_ensure_capacity_doubles_past_sites() {
        let mut matrix = Matrix::with_capacity(2, 8).unwrap();

        // Capacity must strictly exceed the number of sites
        matrix.ensure_capacity(8).unwrap();
        assert_eq!(matrix.capacity(), 16);

        matrix.ensure_capacity(100).unwrap();
        assert_eq!(matrix.capacity(), 128);
    }

    #[test]
    fn test_ensure_capacity_never_shrinks() {
        let mut matrix = Matrix::with_capacity(1, 4).unwrap();

        matrix.ensure_capacity(40).unwrap();
        assert_eq!(matrix.capacity(), 64);

        matrix.ensure_capacity(0).unwrap();
        assert_eq!(matrix.capacity(), 64);
    }

    #[test]
    fn test_zero_capacity_grows() {
        let mut matrix = Matrix::with_capacity(1, 0).unwrap();
        assert_eq!(matrix.capacity(), 1);

        matrix.ensure_capacity(3).unwrap();
        assert_eq!(matrix.capacity(), 4);
    }

    #[test]
    fn test_ensure_capacity_overflow() {
        let mut matrix = Matrix::with_capacity(0, 3).unwrap();

        assert_eq!(
            matrix.ensure_capacity(usize::MAX),
            Err(AllocationError::Overflow { sites: usize::MAX })
        );
        assert_eq!(matrix.capacity(), 3);
    }

    #[test]
    fn test_reset_and_set_rows() {
        let mut matrix = Matrix::with_capacity(2, 2).unwrap();

        matrix.reset(3).unwrap();
        matrix.set_row(0, b"01?");
        matrix.set_row(1, b"110");

        assert_eq!(matrix.capacity(), 4);
        assert_eq!(matrix.sites(), 3);
        assert_eq!(matrix.get_row(0), Some(&b"01?"[..]));
        assert_eq!(matrix.rows(1..2).collect::<Vec<_>>(), vec![&b"110"[..]]);

        matrix.reset(0).unwrap();
        assert_eq!(matrix.sites(), 0);
        assert_eq!(matrix.get_row(1), Some(&b""[..]));
        assert_eq!(matrix.get_row(2), None);
    }
}
