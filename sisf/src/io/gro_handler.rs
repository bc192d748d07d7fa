use super::RawFrame;
use crate::core::Pos;
use nalgebra::Matrix3;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    num::{ParseFloatError, ParseIntError},
    path::Path,
};
use thiserror::Error;

/// Reader of multi-frame GROMACS `.gro` trajectories
pub struct GroFileHandler {
    reader: BufReader<File>,
    frames_read: usize,
}

#[derive(Debug, Error)]
pub enum GroHandlerError {
    #[error("unexpected io error")]
    Io(#[from] std::io::Error),

    #[error("can't open gro file for reading")]
    OpenRead(#[source] std::io::Error),

    #[error(transparent)]
    ParseInt(#[from] ParseIntError),

    #[error(transparent)]
    ParseFloat(#[from] ParseFloatError),

    #[error("atom {0} has incomplete {1} entry")]
    AtomEntry(usize, String),

    #[error("box line has {0} values, 3 or 9 expected")]
    BoxLine(usize),

    #[error("gro file is empty")]
    EmptyFile,

    #[error("unexpected end of file in frame {0}")]
    Eof(usize),
}

impl GroFileHandler {
    pub fn open(fname: impl AsRef<Path>) -> Result<Self, GroHandlerError> {
        Ok(Self {
            reader: BufReader::new(File::open(fname).map_err(GroHandlerError::OpenRead)?),
            frames_read: 0,
        })
    }

    fn next_line(&mut self, line: &mut String) -> Result<(), GroHandlerError> {
        line.clear();
        if self.reader.read_line(line)? == 0 {
            return Err(GroHandlerError::Eof(self.frames_read));
        }
        Ok(())
    }

    /// Reads next frame. Returns `None` at the end of trajectory.
    pub fn read_frame(&mut self) -> Result<Option<RawFrame>, GroHandlerError> {
        // Check if we are at EOF
        if self.reader.fill_buf()?.is_empty() {
            if self.frames_read > 0 {
                return Ok(None);
            } else {
                return Err(GroHandlerError::EmptyFile);
            }
        }

        let mut line = String::new();

        // Title may contain "t= <time>" and "step= <step>"
        self.next_line(&mut line)?;
        let time = title_value(&line, "t=").and_then(|s| s.parse::<f64>().ok());
        let step = title_value(&line, "step=").and_then(|s| s.parse::<i64>().ok());

        self.next_line(&mut line)?;
        let natoms = line.trim().parse::<usize>()?;

        let mut coords = Vec::with_capacity(natoms);
        for i in 0..natoms {
            self.next_line(&mut line)?;
            coords.push(Pos::new(
                parse_field(&line, 20..28, i, "x")?,
                parse_field(&line, 28..36, i, "y")?,
                parse_field(&line, 36..44, i, "z")?,
            ));
        }

        /* Box line
        Format: v1(x) v2(y) v3(z) v1(y) v1(z) v2(x) v2(z) v3(x) v3(y)
        Box vectors are stored in columns, so the sequence of reads is:
        (0,0) (1,1) (2,2) (1,0) (2,0) (0,1) (2,1) (0,2) (1,2)
        */
        self.next_line(&mut line)?;
        let l = line
            .split_whitespace()
            .map(|s| s.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()?;

        let mut m = Matrix3::zeros();
        match l.len() {
            3 | 9 => {
                m[(0, 0)] = l[0];
                m[(1, 1)] = l[1];
                m[(2, 2)] = l[2];
            }
            n => return Err(GroHandlerError::BoxLine(n)),
        }
        if l.len() == 9 {
            m[(1, 0)] = l[3];
            m[(2, 0)] = l[4];
            m[(0, 1)] = l[5];
            m[(2, 1)] = l[6];
            m[(0, 2)] = l[7];
            m[(1, 2)] = l[8];
        }

        self.frames_read += 1;

        Ok(Some(RawFrame {
            time,
            step,
            coords,
            box_matrix: m,
        }))
    }
}

fn parse_field(
    line: &str,
    range: std::ops::Range<usize>,
    atom: usize,
    what: &str,
) -> Result<f64, GroHandlerError> {
    Ok(line
        .get(range)
        .ok_or_else(|| GroHandlerError::AtomEntry(atom, what.into()))?
        .trim()
        .parse::<f64>()?)
}

// Value following `key` either glued to it or as the next token
fn title_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let mut tokens = line.split_whitespace();
    while let Some(tok) = tokens.next() {
        if tok == key {
            return tokens.next();
        }
        if let Some(rest) = tok.strip_prefix(key) {
            return Some(rest);
        }
    }
    None
}
