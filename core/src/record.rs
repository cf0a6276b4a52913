//! Reading genotype matrix records from a stream.
//!
//! Two framings of records are supported: the output of the `ms` coalescent simulator, where
//! replicates are separated by `//` delimiter lines, and a direct framing for real data, where
//! records follow each other without delimiters. In both framings, a record consists of a number
//! of sites, that many floating point positions, and one genotype row per sample.

use std::{fmt, io, str::FromStr};

use crate::{
    input::Tokens,
    matrix::{AllocationError, Matrix},
    Populations,
};

pub mod builder;
pub use builder::Builder;

pub mod direct;

pub mod ms;

/// A boxed record reader.
pub type DynReader = Box<dyn Reader>;

/// A reader of records.
pub trait Reader {
    /// Returns the framing of the records.
    fn framing(&self) -> Framing;

    /// Returns the population sizes used for reading.
    fn populations(&self) -> Populations;

    /// Reads the next record into the matrix owned by the reader.
    fn read_record(&mut self) -> ReadStatus<&Matrix>;
}

/// A status when trying to read a record from a reader.
#[derive(Debug)]
pub enum ReadStatus<T> {
    /// Record was succesfully read.
    Read(T),
    /// An error was encountered.
    Error(Error),
    /// The reader has finished.
    Done,
}

impl<T> ReadStatus<T> {
    /// Converts the status into a result, where the reader having finished is `None`.
    pub fn into_result(self) -> Result<Option<T>, Error> {
        match self {
            ReadStatus::Read(t) => Ok(Some(t)),
            ReadStatus::Error(e) => Err(e),
            ReadStatus::Done => Ok(None),
        }
    }
}

/// The framing of records in a stream.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Framing {
    /// Output from the `ms` coalescent simulator.
    Ms,
    /// Records without delimiters or headers.
    Direct,
}

impl Framing {
    /// Detects the framing from the first token of the stream, without consuming it.
    ///
    /// If the first token is an integer, the stream is assumed to be directly framed, otherwise
    /// it is assumed to start with an `ms` command line. Empty streams are directly framed.
    pub fn detect<R>(tokens: &mut Tokens<R>) -> io::Result<Self>
    where
        R: io::BufRead,
    {
        let framing = match tokens.next_token()? {
            Some(token) if parse::<i64>(token).is_some() => Framing::Direct,
            Some(_) => Framing::Ms,
            None => return Ok(Framing::Direct),
        };

        tokens.unread();

        Ok(framing)
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::Ms => f.write_str("ms"),
            Framing::Direct => f.write_str("direct"),
        }
    }
}

/// The stage of reading a record.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stage {
    /// Searching for the record delimiter.
    Delimiter,
    /// Reading the number of sites.
    SiteCount,
    /// Reading the position at the provided index.
    Position(usize),
    /// Reading the genotype row at the provided index.
    Row(usize),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Delimiter => f.write_str("record delimiter"),
            Stage::SiteCount => f.write_str("number of segregating sites"),
            Stage::Position(index) => write!(f, "position {index}"),
            Stage::Row(index) => write!(f, "genotype row {index}"),
        }
    }
}

/// An error associated with reading a record.
#[derive(Debug)]
pub enum Error {
    /// Genotype buffers could not be allocated.
    Allocation(AllocationError),
    /// A genotype row does not have one genotype per site.
    InvalidRow {
        /// Index of the row.
        index: usize,
        /// Number of sites in the record.
        expected: usize,
        /// Length of the row.
        actual: usize,
    },
    /// A position could not be parsed.
    InvalidPosition {
        /// Index of the position.
        index: usize,
        /// The unparsed token.
        token: String,
    },
    /// The number of sites could not be parsed.
    InvalidSiteCount {
        /// The unparsed token.
        token: String,
    },
    /// I/O error.
    Io(io::Error),
    /// The stream ended in the middle of a record.
    UnexpectedEof {
        /// The stage at which the stream ended.
        stage: Stage,
    },
}

impl Error {
    /// Returns the stage at which the error occurred, if known.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::InvalidRow { index, .. } => Some(Stage::Row(*index)),
            Error::InvalidPosition { index, .. } => Some(Stage::Position(*index)),
            Error::InvalidSiteCount { .. } => Some(Stage::SiteCount),
            Error::UnexpectedEof { stage } => Some(*stage),
            Error::Allocation(_) | Error::Io(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<AllocationError> for Error {
    fn from(e: AllocationError) -> Self {
        Self::Allocation(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Allocation(e) => write!(f, "{e}"),
            Error::InvalidRow {
                index,
                expected,
                actual,
            } => write!(
                f,
                "genotype row {index} has length {actual}, expected {expected} \
                (perhaps the wrong sample size was specified?)"
            ),
            Error::InvalidPosition { index, token } => {
                write!(f, "failed to parse position {index} from '{token}'")
            }
            Error::InvalidSiteCount { token } => write!(
                f,
                "failed to parse number of segregating sites from '{token}'"
            ),
            Error::Io(e) => write!(f, "{e}"),
            Error::UnexpectedEof { stage } => {
                write!(f, "premature end of input while reading {stage}")
            }
        }
    }
}

impl std::error::Error for Error {}

fn parse<T>(token: &[u8]) -> Option<T>
where
    T: FromStr,
{
    std::str::from_utf8(token).ok()?.parse().ok()
}

fn lossy(token: &[u8]) -> String {
    String::from_utf8_lossy(token).into_owned()
}

/// Parses the number of sites from a token.
fn parse_site_count(token: &[u8]) -> Result<usize, Error> {
    parse(token).ok_or_else(|| Error::InvalidSiteCount {
        token: lossy(token),
    })
}

/// Reads the positions and genotype rows of a record with the provided number of sites.
///
/// Positions are checked to be numeric, but otherwise discarded.
fn read_body<R>(tokens: &mut Tokens<R>, matrix: &mut Matrix, sites: usize) -> Result<(), Error>
where
    R: io::BufRead,
{
    matrix.reset(sites)?;

    if sites == 0 {
        return Ok(());
    }

    for index in 0..sites {
        let token = tokens.next_token()?.ok_or(Error::UnexpectedEof {
            stage: Stage::Position(index),
        })?;

        if parse::<f64>(token).is_none() {
            return Err(Error::InvalidPosition {
                index,
                token: lossy(token),
            });
        }
    }

    for index in 0..matrix.samples() {
        let row = tokens.next_token()?.ok_or(Error::UnexpectedEof {
            stage: Stage::Row(index),
        })?;

        if row.len() != sites {
            return Err(Error::InvalidRow {
                index,
                expected: sites,
                actual: row.len(),
            });
        }

        matrix.set_row(index, row);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(samples: usize) -> Matrix {
        Matrix::with_capacity(samples, 2).unwrap()
    }

    #[test]
    fn test_detect_framing() -> io::Result<()> {
        let mut tokens = Tokens::new(&b"ms 6 2 -I 2 3 3\n"[..]);
        assert_eq!(Framing::detect(&mut tokens)?, Framing::Ms);
        assert_eq!(tokens.next_token()?, Some(&b"ms"[..]));

        let mut tokens = Tokens::new(&b"\n 3 0.1 0.2"[..]);
        assert_eq!(Framing::detect(&mut tokens)?, Framing::Direct);
        assert_eq!(tokens.next_token()?, Some(&b"3"[..]));

        let mut tokens = Tokens::new(&b""[..]);
        assert_eq!(Framing::detect(&mut tokens)?, Framing::Direct);

        Ok(())
    }

    #[test]
    fn test_read_body() {
        let mut tokens = Tokens::new(&b"0.1 0.7\n01\n1?\n00\n"[..]);
        let mut matrix = matrix(3);

        read_body(&mut tokens, &mut matrix, 2).unwrap();

        assert_eq!(matrix.sites(), 2);
        assert_eq!(matrix.get_row(0), Some(&b"01"[..]));
        assert_eq!(matrix.get_row(1), Some(&b"1?"[..]));
        assert_eq!(matrix.get_row(2), Some(&b"00"[..]));
        assert_eq!(matrix.capacity(), 4);
    }

    #[test]
    fn test_read_body_no_sites() {
        let mut tokens = Tokens::new(&b"7\n"[..]);
        let mut matrix = matrix(3);

        read_body(&mut tokens, &mut matrix, 0).unwrap();

        assert_eq!(matrix.sites(), 0);
        assert_eq!(tokens.next_token().unwrap(), Some(&b"7"[..]));
    }

    #[test]
    fn test_read_body_invalid_position() {
        let mut tokens = Tokens::new(&b"0.1 x\n01\n"[..]);

        let result = read_body(&mut tokens, &mut matrix(1), 2);

        assert!(matches!(
            result,
            Err(Error::InvalidPosition { index: 1, ref token }) if token == "x"
        ));
    }

    #[test]
    fn test_read_body_invalid_row_length() {
        let mut tokens = Tokens::new(&b"0.1 0.2\n01\n011\n"[..]);

        let result = read_body(&mut tokens, &mut matrix(2), 2);

        assert!(matches!(
            result,
            Err(Error::InvalidRow {
                index: 1,
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_read_body_unexpected_eof() {
        let result = read_body(&mut Tokens::new(&b"0.1"[..]), &mut matrix(2), 2);
        assert_eq!(result.unwrap_err().stage(), Some(Stage::Position(1)));

        let result = read_body(&mut Tokens::new(&b"0.1 0.2 11"[..]), &mut matrix(2), 2);
        assert_eq!(result.unwrap_err().stage(), Some(Stage::Row(1)));
    }

    #[test]
    fn test_parse_site_count() {
        assert_eq!(parse_site_count(b"12").unwrap(), 12);
        assert!(matches!(
            parse_site_count(b"-1"),
            Err(Error::InvalidSiteCount { .. })
        ));
        assert!(matches!(
            parse_site_count(b"segsites:"),
            Err(Error::InvalidSiteCount { .. })
        ));
    }
}
