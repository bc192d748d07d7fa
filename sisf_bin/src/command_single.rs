use anyhow::{Context, Result};
use log::info;
use sisf::prelude::*;

use crate::summary;

pub(super) fn command_single(file: &str, every: usize, k: &[u32], outfile: &str) -> Result<()> {
    let magnitudes = WaveVectorMagnitudes::new(k[0], k[1], k[2]);
    let trj = load_trajectory(file, every)
        .with_context(|| format!("loading trajectory '{file}'"))?;

    let params = CorrelationParams::default().with_magnitudes(magnitudes);
    let rows = single_origin(&trj, &params)?;

    info!("Writing Fk(t) to '{outfile}'...");
    write_single_origin(outfile, &rows)?;
    summary(rows.len(), &trj, magnitudes);
    Ok(())
}
