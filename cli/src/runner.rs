use std::io;

use anyhow::Error;

use fst_core::{
    fst::Heterozygosity,
    record::{self, DynReader, ReadStatus},
    Fst, Input, MinSampleSize, Populations,
};

use super::{exit::UsageError, Cli};

/// Counts of estimates written during a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    records: usize,
    undefined: usize,
    no_sites: usize,
}

impl Summary {
    fn add(&mut self, fst: &Fst) {
        self.records += 1;

        match fst {
            Fst::NoSites => self.no_sites += 1,
            Fst::Undefined => self.undefined += 1,
            Fst::Estimate(_) => (),
        }
    }
}

pub struct Runner<W> {
    writer: W,
    reader: DynReader,
    min_sample_size: MinSampleSize,
    precision: usize,
    summary: Summary,
}

impl<W> Runner<W>
where
    W: io::Write,
{
    pub fn new(
        writer: W,
        reader: DynReader,
        min_sample_size: MinSampleSize,
        precision: usize,
    ) -> Self {
        Self {
            writer,
            reader,
            min_sample_size,
            precision,
            summary: Summary::default(),
        }
    }

    pub fn run(&mut self) -> Result<(), Error> {
        let populations = self.reader.populations();

        loop {
            let matrix = match self.reader.read_record() {
                ReadStatus::Read(matrix) => matrix,
                ReadStatus::Error(e) => return Err(e.into()),
                ReadStatus::Done => break,
            };

            let fst = Fst::from_matrix(matrix, populations, self.min_sample_size)?;

            if log::log_enabled!(log::Level::Debug) {
                let heterozygosity =
                    Heterozygosity::from_matrix(matrix, populations, self.min_sample_size)?;

                log::debug!(
                    "Record {}: {} sites, {} informative, Hw={}, Hb={}",
                    self.summary.records + 1,
                    matrix.sites(),
                    heterozygosity.informative_sites,
                    heterozygosity.within,
                    heterozygosity.between,
                );
            }

            writeln!(self.writer, "{fst:.precision$}", precision = self.precision)?;
            self.summary.add(&fst);
        }

        self.writer.flush()?;

        let Summary {
            records,
            undefined,
            no_sites,
        } = self.summary;
        log::info!(
            "Processed {records} records, {undefined} undefined and {no_sites} without sites"
        );

        Ok(())
    }
}

impl TryFrom<Cli> for Runner<io::BufWriter<io::StdoutLock<'static>>> {
    type Error = Error;

    fn try_from(args: Cli) -> Result<Self, Self::Error> {
        let min_sample_size = args.min_sample_size();
        let populations = args.n1.zip(args.n2).map(|(n1, n2)| Populations::new(n1, n2));

        let input = Input::new(args.input).map_err(UsageError)?;

        let reader = record::Builder::default()
            .set_input(input)
            .set_populations(populations)
            .set_min_sample_size(min_sample_size)
            .build()?;

        Ok(Self::new(
            io::BufWriter::new(io::stdout().lock()),
            reader,
            min_sample_size,
            args.precision,
        ))
    }
}
