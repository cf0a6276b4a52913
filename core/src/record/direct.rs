//! Directly framed records.
//!
//! Each record starts with the number of sites, followed directly by the positions and the
//! genotype rows. There is no header, and no delimiter between records.

use std::io;

use crate::{
    input::Tokens,
    matrix::{AllocationError, Matrix},
    Populations,
};

use super::{parse_site_count, read_body, Error, Framing, ReadStatus};

/// A reader of directly framed records.
#[derive(Debug)]
pub struct Reader<R> {
    tokens: Tokens<R>,
    matrix: Matrix,
    populations: Populations,
}

impl<R> Reader<R>
where
    R: io::BufRead,
{
    /// Creates a new reader with the provided initial row capacity.
    ///
    /// # Errors
    ///
    /// If the genotype buffers cannot be allocated.
    pub fn new(
        tokens: Tokens<R>,
        populations: Populations,
        capacity: usize,
    ) -> Result<Self, AllocationError> {
        Ok(Self {
            tokens,
            matrix: Matrix::with_capacity(populations.total(), capacity)?,
            populations,
        })
    }

    fn read(&mut self) -> Result<bool, Error> {
        let sites = match self.tokens.next_token()? {
            Some(token) => parse_site_count(token)?,
            None => return Ok(false),
        };

        log::trace!("Reading record with {sites} sites");

        read_body(&mut self.tokens, &mut self.matrix, sites)?;

        Ok(true)
    }
}

impl<R> super::Reader for Reader<R>
where
    R: io::BufRead,
{
    fn framing(&self) -> Framing {
        Framing::Direct
    }

    fn populations(&self) -> Populations {
        self.populations
    }

    fn read_record(&mut self) -> ReadStatus<&Matrix> {
        match self.read() {
            Ok(true) => ReadStatus::Read(&self.matrix),
            Ok(false) => ReadStatus::Done,
            Err(e) => ReadStatus::Error(e),
        }
    }
}
