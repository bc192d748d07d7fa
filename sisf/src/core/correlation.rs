use super::{GeometryError, KShell, Trajectory, WaveVectorMagnitudes};
use itertools::Itertools;
use log::{debug, info, warn};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorrelationError {
    #[error("number of time origins must be positive")]
    NoOrigins,

    #[error("lag fraction must be within [0,1], got {0}")]
    LagFraction(f64),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// What to do with time origins that coincide after truncation
/// to integer frame indices (happens for short trajectories).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginPolicy {
    /// Keep all origins, repeated ones are sampled several times
    #[default]
    KeepDuplicates,
    /// Keep only the first occurrence of each origin
    Deduplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    Serial,
    #[default]
    Parallel,
}

/// Parameters of the correlation run
#[derive(Debug, Clone)]
pub struct CorrelationParams {
    pub magnitudes: WaveVectorMagnitudes,
    /// Number of evenly spaced time origins in multi-origin mode
    pub num_origins: usize,
    /// Longest lag as a fraction of the trajectory length
    pub lag_fraction: f64,
    pub origin_policy: OriginPolicy,
    pub parallelism: Parallelism,
}

impl Default for CorrelationParams {
    fn default() -> Self {
        Self {
            magnitudes: WaveVectorMagnitudes::default(),
            num_origins: 10,
            lag_fraction: 0.25,
            origin_policy: OriginPolicy::default(),
            parallelism: Parallelism::default(),
        }
    }
}

impl CorrelationParams {
    pub fn with_magnitudes(mut self, magnitudes: WaveVectorMagnitudes) -> Self {
        self.magnitudes = magnitudes;
        self
    }

    pub fn with_origins(mut self, num_origins: usize) -> Self {
        self.num_origins = num_origins;
        self
    }

    pub fn with_lag_fraction(mut self, lag_fraction: f64) -> Self {
        self.lag_fraction = lag_fraction;
        self
    }

    pub fn with_origin_policy(mut self, origin_policy: OriginPolicy) -> Self {
        self.origin_policy = origin_policy;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn validate(&self) -> Result<(), CorrelationError> {
        if self.num_origins == 0 {
            return Err(CorrelationError::NoOrigins);
        }
        if !(0.0..=1.0).contains(&self.lag_fraction) {
            return Err(CorrelationError::LagFraction(self.lag_fraction));
        }
        Ok(())
    }
}

/// Row of the single-origin table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleOriginSample {
    pub frame: usize,
    pub timestep: i64,
    pub fk: f64,
}

/// Row of the multi-origin table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiOriginSample {
    /// Index in the list of time origins
    pub origin_index: usize,
    /// Lag in frames
    pub lag: usize,
    /// Origin frame t0
    pub origin: usize,
    /// Frame t = t0 + lag
    pub frame: usize,
    pub fk: f64,
}

/// Time origins `floor(k*duration/num_origins)` for `k` in `0..num_origins`.
///
/// With [OriginPolicy::KeepDuplicates] exactly `num_origins` values are
/// returned even if some of them coincide.
pub fn time_origins(duration: usize, num_origins: usize, policy: OriginPolicy) -> Vec<usize> {
    let origins = (0..num_origins).map(|k| k * duration / num_origins);
    match policy {
        OriginPolicy::KeepDuplicates => origins.collect(),
        // Origins are non-decreasing, so removing consecutive repeats is enough
        OriginPolicy::Deduplicate => origins.dedup().collect(),
    }
}

/// Number of lags `floor(lag_fraction*duration)`
pub fn max_lag(duration: usize, lag_fraction: f64) -> usize {
    (duration as f64 * lag_fraction).floor() as usize
}

/// Scattering function between frames `origin` and `frame` normalized
/// by the number of particles. Panics if any frame index is out of range.
pub fn correlate_pair(
    traj: &Trajectory,
    shell: &KShell,
    origin: usize,
    frame: usize,
) -> Result<f64, CorrelationError> {
    let pbox = traj.get_box();
    let disp = pbox.periodic_displacement(traj.positions(frame), traj.positions(origin))?;
    Ok(shell.amplitude(disp.view(), pbox.edge()) / traj.num_particles() as f64)
}

/// Scattering function of all frames relative to frame 0.
pub fn single_origin(
    traj: &Trajectory,
    params: &CorrelationParams,
) -> Result<Vec<SingleOriginSample>, CorrelationError> {
    let shell = KShell::new(params.magnitudes);
    info!(
        "Single-origin SISF: {} frames, {} particles, box {}, k={}",
        traj.len(),
        traj.num_particles(),
        traj.get_box().edge(),
        params.magnitudes
    );

    let plan = (0..traj.len()).collect::<Vec<_>>();
    evaluate(&plan, params.parallelism, |&t| {
        Ok(SingleOriginSample {
            frame: t,
            timestep: traj.timestep(t),
            fk: correlate_pair(traj, &shell, 0, t)?,
        })
    })
}

/// Scattering function for several time origins and lags up to
/// `lag_fraction` of the trajectory. Pairs with `t0+lag` beyond the last
/// frame are skipped. Rows are ordered by origin index, then by lag.
pub fn multi_origin(
    traj: &Trajectory,
    params: &CorrelationParams,
) -> Result<Vec<MultiOriginSample>, CorrelationError> {
    params.validate()?;
    let shell = KShell::new(params.magnitudes);
    let duration = traj.len();

    let origins = time_origins(duration, params.num_origins, params.origin_policy);
    let nt = max_lag(duration, params.lag_fraction);
    info!(
        "Multi-origin SISF: {} frames, {} particles, box {}, k={}",
        duration,
        traj.num_particles(),
        traj.get_box().edge(),
        params.magnitudes
    );
    info!("Time origins: {:?}, lags per origin: {}", origins, nt);

    if origins.iter().dedup().count() != origins.len() {
        warn!("Some time origins coincide, they will be sampled several times");
    }

    // Plan of (origin_index, lag, t0, t) with out of range pairs omitted
    let mut plan = Vec::with_capacity(origins.len() * nt);
    for (i0, &t0) in origins.iter().enumerate() {
        let before = plan.len();
        plan.extend(
            (0..nt)
                .map(|lag| (i0, lag, t0, t0 + lag))
                .filter(|&(_, _, _, t)| t < duration),
        );
        debug!("origin {i0} (frame {t0}): {} pairs", plan.len() - before);
    }

    evaluate(&plan, params.parallelism, |&(origin_index, lag, origin, frame)| {
        Ok(MultiOriginSample {
            origin_index,
            lag,
            origin,
            frame,
            fk: correlate_pair(traj, &shell, origin, frame)?,
        })
    })
}

// Results are collected in plan order in both modes
fn evaluate<P, R, F>(plan: &[P], parallelism: Parallelism, f: F) -> Result<Vec<R>, CorrelationError>
where
    P: Sync,
    R: Send,
    F: Fn(&P) -> Result<R, CorrelationError> + Sync + Send,
{
    let res = match parallelism {
        Parallelism::Serial => plan.iter().map(f).collect::<Result<Vec<_>, _>>(),
        Parallelism::Parallel => plan.par_iter().with_min_len(4).map(f).collect(),
    }?;
    info!("{} samples computed", res.len());
    Ok(res)
}
