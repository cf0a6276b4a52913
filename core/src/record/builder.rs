//! Record reader builder.

use std::{fmt, io};

use crate::{
    input::{self, Tokens},
    matrix::{AllocationError, Matrix},
    population, Input, MinSampleSize, Populations,
};

use super::{direct, ms, DynReader, Framing, Reader as _};

/// A record reader builder.
#[derive(Debug)]
pub struct Builder {
    input: Option<Input>,
    framing: Option<Framing>,
    populations: Option<Populations>,
    min_sample_size: MinSampleSize,
    capacity: usize,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            input: None,
            framing: None,
            populations: None,
            min_sample_size: MinSampleSize::default(),
            capacity: Matrix::DEFAULT_CAPACITY,
        }
    }
}

impl Builder {
    /// Returns a new reader from the input.
    ///
    /// If no input has been set, stdin will be used.
    ///
    /// # Errors
    ///
    /// For a variety of reasons, see [`Error`] for details.
    pub fn build(mut self) -> Result<DynReader, Error> {
        let reader = self.input.take().unwrap_or(Input::Stdin).open()?;

        self.build_from_reader(reader)
    }

    /// Returns a new reader from the provided reader.
    ///
    /// Compression and, unless set, framing are detected from the start of the reader. When the
    /// framing is `ms`, the population sizes are read from the `ms` command line; otherwise, the
    /// population sizes must have been set and are checked against the minimum sample size.
    ///
    /// # Errors
    ///
    /// For a variety of reasons, see [`Error`] for details.
    pub fn build_from_reader<R>(self, reader: R) -> Result<DynReader, Error>
    where
        R: 'static + io::BufRead,
    {
        let mut tokens = Tokens::new(input::decompress(reader)?);

        let framing = match self.framing {
            Some(framing) => framing,
            None => Framing::detect(&mut tokens)?,
        };
        log::info!("Reading input with {framing} framing");

        let reader: DynReader = match framing {
            Framing::Direct => {
                let populations = self
                    .populations
                    .ok_or(Error::MissingPopulations)?
                    .validate(self.min_sample_size)?;

                Box::new(direct::Reader::new(tokens, populations, self.capacity)?)
            }
            Framing::Ms => {
                let header = ms::Header::read(&mut tokens)?;
                log::debug!("Read ms command line '{}'", header.command());

                let populations = header.populations();
                if let Some(provided) = self.populations.filter(|&p| p != populations) {
                    log::warn!(
                        "Ignoring provided population sizes {provided}, \
                        using {populations} from ms command line instead"
                    );
                }

                Box::new(ms::Reader::new(tokens, populations, self.capacity)?)
            }
        };

        log::info!(
            "Using population sizes {} with minimum sample size {}",
            reader.populations(),
            self.min_sample_size
        );

        Ok(reader)
    }

    /// Sets the initial genotype buffer capacity, in sites.
    ///
    /// By default, [`Matrix::DEFAULT_CAPACITY`] is used.
    pub fn set_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the framing of the input.
    ///
    /// By default, the framing is detected from the input.
    pub fn set_framing(mut self, framing: Framing) -> Self {
        self.framing = Some(framing);
        self
    }

    /// Sets the input to read from.
    pub fn set_input(mut self, input: Input) -> Self {
        self.input = Some(input);
        self
    }

    /// Sets the minimum sample size used to check population sizes.
    ///
    /// By default, [`MinSampleSize::default`] is used.
    pub fn set_min_sample_size(mut self, min_sample_size: MinSampleSize) -> Self {
        self.min_sample_size = min_sample_size;
        self
    }

    /// Sets the population sizes.
    ///
    /// These are required for directly framed input, and ignored for `ms` input.
    pub fn set_populations(mut self, populations: Option<Populations>) -> Self {
        self.populations = populations;
        self
    }
}

/// An error associated with building a record reader.
#[derive(Debug)]
pub enum Error {
    /// Genotype buffers could not be allocated.
    Allocation(AllocationError),
    /// The `ms` header could not be read.
    Header(ms::HeaderError),
    /// I/O error.
    Io(io::Error),
    /// Population sizes are required, but were not provided.
    MissingPopulations,
    /// Population sizes are invalid.
    Population(population::Error),
}

impl From<AllocationError> for Error {
    fn from(e: AllocationError) -> Self {
        Self::Allocation(e)
    }
}

impl From<ms::HeaderError> for Error {
    fn from(e: ms::HeaderError) -> Self {
        Self::Header(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<population::Error> for Error {
    fn from(e: population::Error) -> Self {
        Self::Population(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Allocation(e) => write!(f, "{e}"),
            Error::Header(e) => write!(f, "{e}"),
            Error::Io(e) => write!(f, "{e}"),
            Error::MissingPopulations => {
                f.write_str("population sizes must be provided for input without ms header")
            }
            Error::Population(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}
