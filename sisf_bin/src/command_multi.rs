use anyhow::{Context, Result};
use log::info;
use sisf::prelude::*;

use crate::summary;

#[allow(clippy::too_many_arguments)]
pub(super) fn command_multi(
    file: &str,
    every: usize,
    k: &[u32],
    outfile: &str,
    origins: usize,
    lag_fraction: f64,
    dedup: bool,
    serial: bool,
) -> Result<()> {
    let magnitudes = WaveVectorMagnitudes::new(k[0], k[1], k[2]);
    let params = CorrelationParams::default()
        .with_magnitudes(magnitudes)
        .with_origins(origins)
        .with_lag_fraction(lag_fraction)
        .with_origin_policy(if dedup {
            OriginPolicy::Deduplicate
        } else {
            OriginPolicy::KeepDuplicates
        })
        .with_parallelism(if serial {
            Parallelism::Serial
        } else {
            Parallelism::Parallel
        });
    // Fail on bad parameters before reading a possibly large file
    params.validate()?;

    let trj = load_trajectory(file, every)
        .with_context(|| format!("loading trajectory '{file}'"))?;
    let rows = multi_origin(&trj, &params)?;

    info!("Writing Fk(t0,t) to '{outfile}'...");
    write_multi_origin(outfile, &rows)?;
    summary(rows.len(), &trj, magnitudes);
    Ok(())
}
