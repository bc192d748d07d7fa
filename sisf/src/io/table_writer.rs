use super::FileIoError;
use crate::core::{MultiOriginSample, SingleOriginSample};
use log::info;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub const SINGLE_ORIGIN_HEADER: &str = "# 1)frame 2)timestep 3)Fk(t)";
pub const MULTI_ORIGIN_HEADER: &str = "# 1)i0 2)i 3)t0 4)t 5)Fk(t,t0)";

pub fn write_single_origin_rows(
    buf: &mut impl Write,
    rows: &[SingleOriginSample],
) -> std::io::Result<()> {
    writeln!(buf, "{SINGLE_ORIGIN_HEADER}")?;
    for r in rows {
        writeln!(buf, "{} {} {:.14}", r.frame, r.timestep, r.fk)?;
    }
    Ok(())
}

pub fn write_multi_origin_rows(
    buf: &mut impl Write,
    rows: &[MultiOriginSample],
) -> std::io::Result<()> {
    writeln!(buf, "{MULTI_ORIGIN_HEADER}")?;
    for r in rows {
        writeln!(
            buf,
            "{} {} {} {} {:.14}",
            r.origin_index, r.lag, r.origin, r.frame, r.fk
        )?;
    }
    Ok(())
}

fn write_file<F>(fname: &Path, nrows: usize, f: F) -> Result<(), FileIoError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let name = fname.display().to_string();
    let file = File::create(fname).map_err(|e| FileIoError::Write(e, name.clone()))?;
    let mut buf = BufWriter::new(file);
    f(&mut buf)
        .and_then(|_| buf.flush())
        .map_err(|e| FileIoError::Write(e, name.clone()))?;
    info!("{nrows} rows written to '{name}'");
    Ok(())
}

/// Writes single-origin table `frame timestep Fk` to text file
pub fn write_single_origin(
    fname: impl AsRef<Path>,
    rows: &[SingleOriginSample],
) -> Result<(), FileIoError> {
    write_file(fname.as_ref(), rows.len(), |buf| {
        write_single_origin_rows(buf, rows)
    })
}

/// Writes multi-origin table `i0 lag t0 t Fk` to text file
pub fn write_multi_origin(
    fname: impl AsRef<Path>,
    rows: &[MultiOriginSample],
) -> Result<(), FileIoError> {
    write_file(fname.as_ref(), rows.len(), |buf| {
        write_multi_origin_rows(buf, rows)
    })
}
