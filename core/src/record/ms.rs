//! Records in the output format of the `ms` coalescent simulator.
//!
//! The output starts with the `ms` command line, which must define two populations using the
//! `-I` flag. Each replicate then starts with a `//` delimiter line, followed by a
//! `segsites: <int>` line, a `positions: ` line, and one line per sample.

use std::{fmt, io};

use crate::{
    input::Tokens,
    matrix::{AllocationError, Matrix},
    Populations,
};

use super::{lossy, parse, parse_site_count, read_body, Error, Framing, ReadStatus, Stage};

const POPULATION_FLAG: &[u8] = b"-I";
const SEGSITES: &[u8] = b"segsites:";
const POSITIONS: &[u8] = b"positions:";

fn is_delimiter(token: &[u8]) -> bool {
    token.starts_with(b"//")
}

/// The `ms` command line header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    command: String,
    populations: Populations,
}

impl Header {
    /// Reads the header from the first line of the stream.
    ///
    /// # Errors
    ///
    /// If the line does not contain a well-formed `-I` flag defining exactly two populations.
    pub fn read<R>(tokens: &mut Tokens<R>) -> Result<Self, HeaderError>
    where
        R: io::BufRead,
    {
        let mut words = Vec::new();
        let mut populations = None;

        while let Some(token) = tokens.next_token_on_line()? {
            let is_flag = token == POPULATION_FLAG;
            words.push(lossy(token));

            if is_flag && populations.is_none() {
                populations = Some(read_population_flag(tokens, &mut words)?);
            }
        }

        Ok(Self {
            command: words.join(" "),
            populations: populations.ok_or(HeaderError::MissingPopulationFlag)?,
        })
    }

    /// Returns the `ms` command line.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns the population sizes defined by the `-I` flag.
    pub fn populations(&self) -> Populations {
        self.populations
    }
}

fn read_population_flag<R>(
    tokens: &mut Tokens<R>,
    words: &mut Vec<String>,
) -> Result<Populations, HeaderError>
where
    R: io::BufRead,
{
    let mut next_value = || -> Result<usize, HeaderError> {
        let token = tokens
            .next_token_on_line()?
            .ok_or(HeaderError::InvalidPopulationFlag)?;
        words.push(lossy(token));
        parse(token).ok_or(HeaderError::InvalidPopulationFlag)
    };

    let count = next_value()?;
    if count != 2 {
        return Err(HeaderError::WrongPopulationCount { count });
    }

    let first = next_value()?;
    let second = next_value()?;

    Ok(Populations::new(first, second))
}

/// An error associated with reading the `ms` header.
#[derive(Debug)]
pub enum HeaderError {
    /// The `-I` flag is not followed by the number of populations and their sizes.
    InvalidPopulationFlag,
    /// I/O error.
    Io(io::Error),
    /// The command line does not contain the `-I` flag.
    MissingPopulationFlag,
    /// The `-I` flag defines a number of populations other than two.
    WrongPopulationCount {
        /// The number of populations.
        count: usize,
    },
}

impl From<io::Error> for HeaderError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::InvalidPopulationFlag => {
                f.write_str("failed to parse the -I flag in the ms command line")
            }
            HeaderError::Io(e) => write!(f, "{e}"),
            HeaderError::MissingPopulationFlag => {
                f.write_str("failed to find the -I flag in the ms command line")
            }
            HeaderError::WrongPopulationCount { count } => {
                write!(f, "only two populations are supported, found {count}")
            }
        }
    }
}

impl std::error::Error for HeaderError {}

/// A reader of `ms` replicates.
#[derive(Debug)]
pub struct Reader<R> {
    tokens: Tokens<R>,
    matrix: Matrix,
    populations: Populations,
    replicate: usize,
}

impl<R> Reader<R>
where
    R: io::BufRead,
{
    /// Creates a new reader with the provided initial row capacity.
    ///
    /// The tokens should be positioned after the header.
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
            replicate: 0,
        })
    }

    fn read(&mut self) -> Result<bool, Error> {
        match self.tokens.next_token()?.map(is_delimiter) {
            Some(true) => (),
            Some(false) => self.skip_to_delimiter()?,
            None => return Ok(false),
        }

        let sites = self.read_site_count()?;
        self.replicate += 1;

        log::trace!("Reading replicate {} with {sites} sites", self.replicate);

        if sites > 0 {
            let label = self.tokens.next_token()?.map(|token| token == POSITIONS);
            if label == Some(false) {
                self.tokens.unread();
            }
        }

        read_body(&mut self.tokens, &mut self.matrix, sites)?;

        Ok(true)
    }

    fn skip_to_delimiter(&mut self) -> Result<(), Error> {
        loop {
            match self.tokens.next_token()? {
                Some(token) if is_delimiter(token) => return Ok(()),
                Some(_) => (),
                None => {
                    return Err(Error::UnexpectedEof {
                        stage: Stage::Delimiter,
                    })
                }
            }
        }
    }

    fn read_site_count(&mut self) -> Result<usize, Error> {
        loop {
            match self.tokens.next_token()? {
                Some(token) if token == SEGSITES => break,
                Some(token) if is_delimiter(token) => {
                    return Err(Error::InvalidSiteCount {
                        token: lossy(token),
                    })
                }
                Some(_) => (),
                None => {
                    return Err(Error::UnexpectedEof {
                        stage: Stage::SiteCount,
                    })
                }
            }
        }

        match self.tokens.next_token()? {
            Some(token) => parse_site_count(token),
            None => Err(Error::UnexpectedEof {
                stage: Stage::SiteCount,
            }),
        }
    }

    /// Returns the number of replicates read so far.
    pub fn replicates(&self) -> usize {
        self.replicate
    }
}

impl<R> super::Reader for Reader<R>
where
    R: io::BufRead,
{
    fn framing(&self) -> Framing {
        Framing::Ms
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
