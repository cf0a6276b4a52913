//! Exit codes for errors.

use std::{fmt, io};

use anyhow::Error;

use fst_core::{
    fst::SampleCountError,
    record::{self, builder, ms::HeaderError},
};

pub const USAGE: i32 = 1;
pub const PREMATURE_END: i32 = 2;
pub const MISSING_POPULATION_FLAG: i32 = 3;
pub const INVALID_POPULATION_FLAG: i32 = 4;
pub const WRONG_POPULATION_COUNT: i32 = 5;
pub const INVALID_SITE_COUNT: i32 = 6;
pub const INVALID_POSITION: i32 = 7;
pub const INVALID_ROW: i32 = 10;
pub const ALLOCATION: i32 = 11;
pub const IO: i32 = 12;

/// An error in the use of the program not caught while parsing arguments.
#[derive(Debug)]
pub struct UsageError(pub io::Error);

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UsageError {}

/// Returns the exit code for an error.
pub fn code(error: &Error) -> i32 {
    if let Some(e) = error.downcast_ref::<record::Error>() {
        record_code(e)
    } else if let Some(e) = error.downcast_ref::<builder::Error>() {
        builder_code(e)
    } else if error.is::<SampleCountError>() {
        INVALID_ROW
    } else if error.is::<io::Error>() {
        IO
    } else {
        USAGE
    }
}

fn record_code(error: &record::Error) -> i32 {
    match error {
        record::Error::Allocation(_) => ALLOCATION,
        record::Error::InvalidRow { .. } => INVALID_ROW,
        record::Error::InvalidPosition { .. } => INVALID_POSITION,
        record::Error::InvalidSiteCount { .. } => INVALID_SITE_COUNT,
        record::Error::Io(_) => IO,
        record::Error::UnexpectedEof { .. } => PREMATURE_END,
    }
}

fn builder_code(error: &builder::Error) -> i32 {
    match error {
        builder::Error::Allocation(_) => ALLOCATION,
        builder::Error::Header(HeaderError::InvalidPopulationFlag) => INVALID_POPULATION_FLAG,
        builder::Error::Header(HeaderError::Io(_)) => IO,
        builder::Error::Header(HeaderError::MissingPopulationFlag) => MISSING_POPULATION_FLAG,
        builder::Error::Header(HeaderError::WrongPopulationCount { .. }) => WRONG_POPULATION_COUNT,
        builder::Error::Io(_) => IO,
        builder::Error::MissingPopulations | builder::Error::Population(_) => USAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use fst_core::{matrix::AllocationError, record::Stage};

    #[test]
    fn test_record_codes() {
        let eof = record::Error::UnexpectedEof {
            stage: Stage::Row(2),
        };
        assert_eq!(code(&Error::new(eof)), PREMATURE_END);

        let row = record::Error::InvalidRow {
            index: 0,
            expected: 2,
            actual: 3,
        };
        assert_eq!(code(&Error::new(row)), INVALID_ROW);

        let allocation = record::Error::Allocation(AllocationError::Overflow { sites: usize::MAX });
        assert_eq!(code(&Error::new(allocation)), ALLOCATION);
    }

    #[test]
    fn test_builder_codes() {
        let missing = builder::Error::Header(HeaderError::MissingPopulationFlag);
        assert_eq!(code(&Error::new(missing)), MISSING_POPULATION_FLAG);

        let count = builder::Error::Header(HeaderError::WrongPopulationCount { count: 3 });
        assert_eq!(code(&Error::new(count)), WRONG_POPULATION_COUNT);

        assert_eq!(code(&Error::new(builder::Error::MissingPopulations)), USAGE);
    }

    #[test]
    fn test_other_codes() {
        let mismatch = SampleCountError {
            expected: 4,
            actual: 6,
        };
        assert_eq!(code(&Error::new(mismatch)), INVALID_ROW);

        let io = io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe");
        assert_eq!(code(&Error::new(io)), IO);

        let usage = UsageError(io::Error::new(io::ErrorKind::Other, "no input"));
        assert_eq!(code(&Error::new(usage)), USAGE);
    }
}
