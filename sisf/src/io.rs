use crate::core::{BoxError, CubicBox, Pos, Trajectory, TrajectoryError};
use log::{debug, info};
use nalgebra::Matrix3;
use std::path::Path;
use thiserror::Error;

mod gro_handler;
mod table_writer;

// Reexports
pub use gro_handler::{GroFileHandler, GroHandlerError};
pub use table_writer::*;

/// Frame as it is stored in the file, before any validation
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub time: Option<f64>,
    pub step: Option<i64>,
    pub coords: Vec<Pos>,
    /// Box vectors in columns
    pub box_matrix: Matrix3<f64>,
}

#[derive(Error, Debug)]
pub enum FileIoError {
    #[error("file '{0}' has no extension")]
    NoExtension(String),

    #[error("format '{0}' is not readable")]
    NotReadable(String),

    #[error("frame stride must be positive")]
    ZeroStride,

    #[error("no frames in '{0}'")]
    NoFrames(String),

    #[error("can't write output file '{1}'")]
    Write(#[source] std::io::Error, String),

    #[error(transparent)]
    Gro(#[from] GroHandlerError),

    #[error("invalid periodic box in frame 0")]
    Box(#[from] BoxError),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}

enum FileFormat {
    Gro(GroFileHandler),
}

impl FileFormat {
    fn open(fname: &Path) -> Result<Self, FileIoError> {
        let ext = fname
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| FileIoError::NoExtension(fname.display().to_string()))?;
        match ext {
            "gro" => Ok(FileFormat::Gro(GroFileHandler::open(fname)?)),
            _ => Err(FileIoError::NotReadable(ext.to_owned())),
        }
    }

    fn read_frame(&mut self) -> Result<Option<RawFrame>, FileIoError> {
        Ok(match self {
            FileFormat::Gro(ref mut h) => h.read_frame()?,
        })
    }
}

/// Trajectory file reader dispatching on file extension
pub struct FileHandler {
    pub file_name: String,
    format_handler: FileFormat,
}

impl FileHandler {
    pub fn open(fname: impl AsRef<Path>) -> Result<Self, FileIoError> {
        let fname = fname.as_ref();
        Ok(Self {
            file_name: fname.display().to_string(),
            format_handler: FileFormat::open(fname)?,
        })
    }

    pub fn read_frame(&mut self) -> Result<Option<RawFrame>, FileIoError> {
        self.format_handler.read_frame()
    }

    /// Reads the whole file keeping every `every`-th frame.
    ///
    /// The box is taken from the first frame and must be cubic. The timestep
    /// of a frame is its `step` if the file provides it and its ordinal
    /// number in the file otherwise.
    pub fn read_trajectory(mut self, every: usize) -> Result<Trajectory, FileIoError> {
        if every == 0 {
            return Err(FileIoError::ZeroStride);
        }

        let mut pbox = None;
        let mut frames = vec![];
        let mut nread = 0;

        while let Some(fr) = self.read_frame()? {
            if pbox.is_none() {
                let b = CubicBox::from_matrix(&fr.box_matrix)?;
                info!("Box edge: {}, particles: {}", b.edge(), fr.coords.len());
                pbox = Some(b);
            }
            if nread % every == 0 {
                debug!("frame {nread}, time {:?}, step {:?}", fr.time, fr.step);
                frames.push((fr.step.unwrap_or(nread as i64), fr.coords));
            }
            nread += 1;
        }

        let pbox = pbox.ok_or_else(|| FileIoError::NoFrames(self.file_name.clone()))?;
        info!(
            "There are {} frames in '{}', {} of them are used",
            nread,
            self.file_name,
            frames.len()
        );
        Ok(Trajectory::from_frames(frames, pbox)?)
    }
}

/// Loads the trajectory from file keeping every `every`-th frame.
pub fn load_trajectory(fname: impl AsRef<Path>, every: usize) -> Result<Trajectory, FileIoError> {
    info!("Reading trajectory '{}'...", fname.as_ref().display());
    FileHandler::open(fname)?.read_trajectory(every)
}
