use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use particle::{EndRecord, HitRecord, Logger, TrackRecord};

use crate::SimulationContext;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    End,
    Snapshot,
    Track,
    Hit,
}

impl Kind {
    fn suffix(self) -> &'static str {
        match self {
            Kind::End => "end",
            Kind::Snapshot => "snapshot",
            Kind::Track => "track",
            Kind::Hit => "hit",
        }
    }

    fn header(self) -> &'static str {
        match self {
            Kind::End | Kind::Snapshot => EndRecord::HEADER,
            Kind::Track => TrackRecord::HEADER,
            Kind::Hit => HitRecord::HEADER,
        }
    }
}

/// Column-text output files, one per species and record kind.
///
/// Files are created lazily on the first row that needs them, with the
/// column header as the first line. Writes are not synchronized; the driver
/// serializes access across particle tasks.
pub struct FileLogger {
    out_dir: PathBuf,
    job_number: u64,
    species: String,
    files: HashMap<(String, Kind), BufWriter<File>>,
}

impl FileLogger {
    pub fn new(context: &SimulationContext) -> Self {
        Self {
            out_dir: context.out_dir.clone(),
            job_number: context.job_number,
            species: "particle".into(),
            files: HashMap::new(),
        }
    }

    /// Routes the following rows to the files of this species.
    pub fn set_species(&mut self, species: &str) {
        self.species = species.into();
    }

    fn sink(&mut self, kind: Kind) -> io::Result<&mut BufWriter<File>> {
        let key = (self.species.clone(), kind);
        if !self.files.contains_key(&key) {
            let name = format!("{:08}_{}_{}.out", self.job_number, self.species, kind.suffix());
            let path = self.out_dir.join(name);
            log::info!("creating output file {}", path.display());
            let mut writer = BufWriter::new(File::create(&path)?);
            writeln!(writer, "{}", kind.header())?;
            self.files.insert(key.clone(), writer);
        }
        Ok(self.files.get_mut(&key).unwrap())
    }

    /// Flushes every open file.
    pub fn flush(&mut self) -> io::Result<()> {
        for writer in self.files.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Logger for FileLogger {
    fn end(&mut self, record: &EndRecord) -> io::Result<()> {
        record.write_to(self.sink(Kind::End)?)
    }

    fn snapshot(&mut self, record: &EndRecord) -> io::Result<()> {
        record.write_to(self.sink(Kind::Snapshot)?)
    }

    fn track(&mut self, record: &TrackRecord) -> io::Result<()> {
        record.write_to(self.sink(Kind::Track)?)
    }

    fn hit(&mut self, record: &HitRecord) -> io::Result<()> {
        record.write_to(self.sink(Kind::Hit)?)
    }
}
