use super::{CubicBox, Pos};
use ndarray::{Array3, ArrayView2, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrajectoryError {
    #[error("positions must have shape [frames, particles, 3], got [{0}, {1}, {2}]")]
    Shape(usize, usize, usize),

    #[error("{0} timesteps given for {1} frames")]
    Timesteps(usize, usize),

    #[error("frame {0} has {1} particles, expected {2}")]
    ParticleCount(usize, usize, usize),

    #[error("trajectory has no frames")]
    Empty,

    #[error("trajectory has no particles")]
    NoParticles,
}

/// Single snapshot borrowed from a [Trajectory]
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub timestep: i64,
    /// Positions as `[N,3]` array
    pub positions: ArrayView2<'a, f64>,
}

/// Dense in-memory trajectory.
///
/// Positions are stored as a single `[frames, particles, 3]` array together
/// with the integer timestep of each frame. All frames share the same number
/// of particles and the same [CubicBox]. A trajectory is never modified after
/// construction.
#[derive(Debug, Clone)]
pub struct Trajectory {
    coords: Array3<f64>,
    timesteps: Vec<i64>,
    pbox: CubicBox,
}

impl Trajectory {
    pub fn new(
        coords: Array3<f64>,
        timesteps: Vec<i64>,
        pbox: CubicBox,
    ) -> Result<Self, TrajectoryError> {
        let (nfr, nat, ndim) = coords.dim();
        if ndim != 3 {
            return Err(TrajectoryError::Shape(nfr, nat, ndim));
        }
        if nfr == 0 {
            return Err(TrajectoryError::Empty);
        }
        if nat == 0 {
            return Err(TrajectoryError::NoParticles);
        }
        if timesteps.len() != nfr {
            return Err(TrajectoryError::Timesteps(timesteps.len(), nfr));
        }
        Ok(Self {
            coords,
            timesteps,
            pbox,
        })
    }

    /// Builds a trajectory from `(timestep, positions)` pairs.
    pub fn from_frames<I, P>(frames: I, pbox: CubicBox) -> Result<Self, TrajectoryError>
    where
        I: IntoIterator<Item = (i64, P)>,
        P: AsRef<[Pos]>,
    {
        let mut timesteps = vec![];
        let mut flat = vec![];
        let mut natoms = None;

        for (i, (step, pos)) in frames.into_iter().enumerate() {
            let pos = pos.as_ref();
            let n = *natoms.get_or_insert(pos.len());
            if pos.len() != n {
                return Err(TrajectoryError::ParticleCount(i, pos.len(), n));
            }
            flat.extend(pos.iter().flat_map(|p| [p.x, p.y, p.z]));
            timesteps.push(step);
        }

        let nfr = timesteps.len();
        let nat = natoms.unwrap_or(0);
        let coords = Array3::from_shape_vec((nfr, nat, 3), flat)
            .map_err(|_| TrajectoryError::Shape(nfr, nat, 3))?;
        Self::new(coords, timesteps, pbox)
    }

    /// Number of frames
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.timesteps.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.timesteps.is_empty()
    }

    #[inline(always)]
    pub fn num_particles(&self) -> usize {
        self.coords.dim().1
    }

    #[inline(always)]
    pub fn get_box(&self) -> &CubicBox {
        &self.pbox
    }

    #[inline(always)]
    pub fn timestep(&self, fr: usize) -> i64 {
        self.timesteps[fr]
    }

    pub fn timesteps(&self) -> &[i64] {
        &self.timesteps
    }

    /// Positions of frame `fr` as `[N,3]` array. Panics if out of range.
    #[inline(always)]
    pub fn positions(&self, fr: usize) -> ArrayView2<'_, f64> {
        self.coords.index_axis(Axis(0), fr)
    }

    pub fn frame(&self, fr: usize) -> Option<Frame<'_>> {
        (fr < self.len()).then(|| Frame {
            timestep: self.timesteps[fr],
            positions: self.positions(fr),
        })
    }

    pub fn iter_frames(&self) -> impl ExactSizeIterator<Item = Frame<'_>> {
        self.coords
            .outer_iter()
            .zip(self.timesteps.iter())
            .map(|(positions, &timestep)| Frame {
                timestep,
                positions,
            })
    }
}
