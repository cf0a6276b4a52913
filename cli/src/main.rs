use std::{io::Write, path::PathBuf};

use anyhow::Error;

use clap::{ArgAction, Parser};

use fst_core::{Fst, MinSampleSize};

mod exit;

mod runner;
use runner::Runner;

const NAME: &str = env!("CARGO_BIN_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Calculate Fst between two populations from ms-style input.
///
/// Uses equation 3 of Hudson, Slatkin and Maddison (1992), with the first N1 samples of each
/// record in the first population and the following N2 samples in the second population. One
/// estimate is printed per record. Missing data can be coded as '?'.
///
/// Input is either ms output, in which case the population sizes are read from the -I flag in the
/// ms command line, or records of the form '<sites> <positions...> <rows...>', in which case
/// the population sizes must be provided.
#[derive(Debug, Parser)]
#[clap(name = NAME, version = VERSION, about)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of samples in the first population.
    ///
    /// Required unless the input is ms output. Must be greater than the minimum sample size.
    #[arg(value_name = "N1", requires = "n2")]
    n1: Option<usize>,

    /// Number of samples in the second population.
    ///
    /// Required unless the input is ms output. Must be greater than the minimum sample size.
    #[arg(value_name = "N2")]
    n2: Option<usize>,

    /// Minimum number of non-missing alleles per population for a site to be used.
    ///
    /// Values smaller than 2 are raised to 2. Defaults to 2.
    #[arg(value_name = "MIN_SAMPLE_SIZE", requires = "n2")]
    min_sample_size: Option<usize>,

    /// Minimum number of non-missing alleles per population for a site to be used.
    ///
    /// Same as the MIN_SAMPLE_SIZE argument, but can be given without population sizes, as when
    /// reading ms output.
    #[arg(
        short = 'm',
        long = "min-sample-size",
        value_name = "INT",
        conflicts_with = "min_sample_size"
    )]
    min_sample_size_option: Option<usize>,

    /// Input file.
    ///
    /// If no file is provided, stdin will be used. Gzip-compressed input is supported.
    #[arg(short = 'i', long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Precision to use when printing estimates.
    #[arg(short = 'p', long, default_value_t = Fst::DEFAULT_PRECISION, value_name = "INT")]
    precision: usize,

    /// Suppress warnings.
    ///
    /// By default, only warnings are printed. By setting this flag, warnings will be disabled.
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbosity.
    ///
    /// Flag can be set multiply times to increase verbosity, or left unset for quiet mode.
    #[clap(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print CLI arguments for debugging.
    #[clap(long, hide = true, global = true)]
    debug: bool,
}

impl Cli {
    fn min_sample_size(&self) -> MinSampleSize {
        self.min_sample_size
            .or(self.min_sample_size_option)
            .map(MinSampleSize::new)
            .unwrap_or_default()
    }

    pub fn run(self) -> Result<(), Error> {
        if self.debug {
            eprintln!("{self:#?}");
        }

        let level = if self.quiet {
            log::LevelFilter::Off
        } else {
            match self.verbose {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        };

        match env_logger::Builder::new()
            .filter_level(level)
            .target(env_logger::Target::Stderr)
            .format(|buf, record| {
                let level = record.level().as_str().to_lowercase();
                let args = record.args();
                writeln!(buf, "[{NAME} {level:>5}] {args}")
            })
            .try_init()
        {
            Ok(()) => (),
            Err(e) => eprintln!("failed to setup logger: {e}"),
        }

        let mut runner = Runner::try_from(self)?;
        runner.run()
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(exit::USAGE);
        }
        Err(e) => e.exit(),
    };

    match cli.run() {
        Ok(()) => (),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(exit::code(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::error::ErrorKind as ClapErrorKind;

    fn try_parse_args(cmd: &str) -> Result<Cli, clap::Error> {
        Parser::try_parse_from(cmd.split_whitespace())
    }

    fn parse_args(cmd: &str) -> Cli {
        try_parse_args(cmd).expect("failed to parse command")
    }

    #[test]
    fn test_no_args() {
        let args = parse_args("filtfst");

        assert_eq!(args.n1, None);
        assert_eq!(args.n2, None);
        assert_eq!(args.min_sample_size(), MinSampleSize::new(2));
        assert_eq!(args.precision, 6);
    }

    #[test]
    fn test_population_sizes() {
        let args = parse_args("filtfst 10 12");

        assert_eq!(args.n1, Some(10));
        assert_eq!(args.n2, Some(12));
        assert_eq!(args.min_sample_size(), MinSampleSize::default());
    }

    #[test]
    fn test_min_sample_size() {
        let args = parse_args("filtfst 10 12 4 -i input.txt");

        assert_eq!(args.min_sample_size(), MinSampleSize::new(4));
        assert_eq!(args.input, Some(PathBuf::from("input.txt")));
    }

    #[test]
    fn test_min_sample_size_option() {
        let args = parse_args("filtfst -m 4");

        assert_eq!(args.n1, None);
        assert_eq!(args.min_sample_size(), MinSampleSize::new(4));

        let args = parse_args("filtfst 10 12 --min-sample-size 3");
        assert_eq!(args.min_sample_size(), MinSampleSize::new(3));

        let args = parse_args("filtfst -m 1");
        assert_eq!(args.min_sample_size(), MinSampleSize::new(2));
    }

    #[test]
    fn test_min_sample_size_twice() {
        let result = try_parse_args("filtfst 10 12 4 -m 3");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_single_population_size() {
        let result = try_parse_args("filtfst 10");

        assert_eq!(
            result.unwrap_err().kind(),
            ClapErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_negative_population_size() {
        assert!(try_parse_args("filtfst 10 -4").is_err());
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        let result = try_parse_args("filtfst -q -v");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ArgumentConflict);
    }
}
