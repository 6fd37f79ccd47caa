use std::io::{self, Write};

use fields::BFieldTensor;

/// Full start/end summary of one particle; also the snapshot row format.
#[derive(Clone, Debug)]
pub struct EndRecord {
    pub job_number: u64,
    pub particle: u64,
    pub t_start: f64,
    pub y_start: [f64; 6],
    pub pol_start: i8,
    pub h_start: f64,
    pub e_start: f64,
    pub t_end: f64,
    pub y_end: [f64; 6],
    pub pol_end: i8,
    pub h_end: f64,
    pub e_end: f64,
    pub stop_id: i32,
    pub spin_flips: u64,
    pub computing_time: f64,
    pub hits: u64,
    pub steps: u64,
    pub trajectory_length: f64,
    pub h_max: f64,
}

impl EndRecord {
    pub const HEADER: &'static str = "jobnumber particle tstart xstart ystart zstart \
        vxstart vystart vzstart polstart Hstart Estart tend xend yend zend vxend vyend \
        vzend polend Hend Eend stopID Nspinflip ComputingTime Nhit Nstep trajlength Hmax";

    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        write!(w, "{} {} {:.9e}", self.job_number, self.particle, self.t_start)?;
        for v in self.y_start {
            write!(w, " {v:.9e}")?;
        }
        write!(
            w,
            " {} {:.9e} {:.9e} {:.9e}",
            self.pol_start, self.h_start, self.e_start, self.t_end
        )?;
        for v in self.y_end {
            write!(w, " {v:.9e}")?;
        }
        writeln!(
            w,
            " {} {:.9e} {:.9e} {} {} {:.9e} {} {} {:.9e} {:.9e}",
            self.pol_end,
            self.h_end,
            self.e_end,
            self.stop_id,
            self.spin_flips,
            self.computing_time,
            self.hits,
            self.steps,
            self.trajectory_length,
            self.h_max,
        )
    }
}

/// One trajectory sample with the local field.
#[derive(Clone, Debug)]
pub struct TrackRecord {
    pub particle: u64,
    pub polarisation: i8,
    pub t: f64,
    pub y: [f64; 6],
    pub h: f64,
    pub e: f64,
    /// The full 4×4 magnetic tensor, written row-major.
    pub b: BFieldTensor,
    pub e_field: [f64; 3],
    pub v: f64,
}

impl TrackRecord {
    pub const HEADER: &'static str = "particle polarisation t x y z vx vy vz H E \
        Bx dBxdx dBxdy dBxdz By dBydx dBydy dBydz Bz dBzdx dBzdy dBzdz \
        Babs dBabsdx dBabsdy dBabsdz Ex Ey Ez V";

    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        write!(w, "{} {} {:.9e}", self.particle, self.polarisation, self.t)?;
        for v in self.y {
            write!(w, " {v:.9e}")?;
        }
        write!(w, " {:.9e} {:.9e}", self.h, self.e)?;
        for row in self.b {
            for v in row {
                write!(w, " {v:.9e}")?;
            }
        }
        for v in self.e_field {
            write!(w, " {v:.9e}")?;
        }
        writeln!(w, " {:.9e}", self.v)
    }
}

/// One wall contact.
#[derive(Clone, Debug)]
pub struct HitRecord {
    pub job_number: u64,
    pub particle: u64,
    pub t: f64,
    pub position: [f64; 3],
    pub v_before: [f64; 3],
    pub pol_before: i8,
    pub v_after: [f64; 3],
    pub pol_after: i8,
    pub normal: [f64; 3],
    pub leaving_id: i32,
    pub entering_id: i32,
}

impl HitRecord {
    pub const HEADER: &'static str = "jobnumber particle t x y z v1x v1y v1z pol1 \
        v2x v2y v2z pol2 nx ny nz solid1 solid2";

    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        write!(w, "{} {} {:.9e}", self.job_number, self.particle, self.t)?;
        for v in self.position {
            write!(w, " {v:.9e}")?;
        }
        for v in self.v_before {
            write!(w, " {v:.9e}")?;
        }
        write!(w, " {}", self.pol_before)?;
        for v in self.v_after {
            write!(w, " {v:.9e}")?;
        }
        write!(w, " {}", self.pol_after)?;
        for v in self.normal {
            write!(w, " {v:.9e}")?;
        }
        writeln!(w, " {} {}", self.leaving_id, self.entering_id)
    }
}

/// Output sink for the integrator's events. Events of one particle arrive in
/// monotone time order.
pub trait Logger {
    fn end(&mut self, record: &EndRecord) -> io::Result<()>;
    fn snapshot(&mut self, record: &EndRecord) -> io::Result<()>;
    fn track(&mut self, record: &TrackRecord) -> io::Result<()>;
    fn hit(&mut self, record: &HitRecord) -> io::Result<()>;
}

/// Swallows every event.
pub struct NullLogger;

impl Logger for NullLogger {
    fn end(&mut self, _record: &EndRecord) -> io::Result<()> {
        Ok(())
    }

    fn snapshot(&mut self, _record: &EndRecord) -> io::Result<()> {
        Ok(())
    }

    fn track(&mut self, _record: &TrackRecord) -> io::Result<()> {
        Ok(())
    }

    fn hit(&mut self, _record: &HitRecord) -> io::Result<()> {
        Ok(())
    }
}

/// Collects every event in memory; the test sink.
#[derive(Default)]
pub struct MemoryLogger {
    pub ends: Vec<EndRecord>,
    pub snapshots: Vec<EndRecord>,
    pub tracks: Vec<TrackRecord>,
    pub hits: Vec<HitRecord>,
}

impl Logger for MemoryLogger {
    fn end(&mut self, record: &EndRecord) -> io::Result<()> {
        self.ends.push(record.clone());
        Ok(())
    }

    fn snapshot(&mut self, record: &EndRecord) -> io::Result<()> {
        self.snapshots.push(record.clone());
        Ok(())
    }

    fn track(&mut self, record: &TrackRecord) -> io::Result<()> {
        self.tracks.push(record.clone());
        Ok(())
    }

    fn hit(&mut self, record: &HitRecord) -> io::Result<()> {
        self.hits.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_end_record_column_count() {
        let record = EndRecord {
            job_number: 1,
            particle: 2,
            t_start: 0.0,
            y_start: [0.0; 6],
            pol_start: 1,
            h_start: 0.0,
            e_start: 0.0,
            t_end: 1.0,
            y_end: [0.0; 6],
            pol_end: -1,
            h_end: 0.0,
            e_end: 0.0,
            stop_id: -1,
            spin_flips: 0,
            computing_time: 0.1,
            hits: 3,
            steps: 100,
            trajectory_length: 5.0,
            h_max: 0.0,
        };
        let mut buf = Vec::new();
        record.write_to(&mut buf).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert_eq!(
            line.trim().split_whitespace().count(),
            EndRecord::HEADER.split_whitespace().count(),
        );
    }

    #[test]
    fn test_track_record_column_count() {
        let record = TrackRecord {
            particle: 1,
            polarisation: 0,
            t: 0.0,
            y: [0.0; 6],
            h: 0.0,
            e: 0.0,
            b: [[0.0; 4]; 4],
            e_field: [0.0; 3],
            v: 0.0,
        };
        let mut buf = Vec::new();
        record.write_to(&mut buf).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert_eq!(
            line.trim().split_whitespace().count(),
            TrackRecord::HEADER.split_whitespace().count(),
        );
    }

    #[test]
    fn test_hit_record_column_count() {
        let record = HitRecord {
            job_number: 0,
            particle: 0,
            t: 0.0,
            position: [0.0; 3],
            v_before: [0.0; 3],
            pol_before: 0,
            v_after: [0.0; 3],
            pol_after: 0,
            normal: [0.0; 3],
            leaving_id: 2,
            entering_id: 1,
        };
        let mut buf = Vec::new();
        record.write_to(&mut buf).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert_eq!(
            line.trim().split_whitespace().count(),
            HitRecord::HEADER.split_whitespace().count(),
        );
    }
}
