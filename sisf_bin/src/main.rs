use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod command_multi;
mod command_single;

use command_multi::command_multi;
use command_single::command_single;

/// Self-intermediate scattering function of MD trajectories
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cmd {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by all commands
#[derive(Args)]
struct TrajArgs {
    /// Trajectory file (.gro) with a cubic periodic box
    #[arg(short, required = true)]
    file: String,
    /// Wave vector components in units of 2π/L
    #[arg(short, num_args = 3, value_names = ["NX", "NY", "NZ"], default_values_t = [4, 6, 8])]
    k: Vec<u32>,
    /// Use every N-th frame of the trajectory
    #[arg(long, default_value_t = 1)]
    every: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Computes Fk(t) relative to the first frame
    Single {
        #[command(flatten)]
        traj: TrajArgs,
        /// Output text file
        #[arg(short, default_value = "Fkt.txt")]
        outfile: String,
    },

    /// Computes Fk(t0,t) for a set of evenly spaced time origins
    Multi {
        #[command(flatten)]
        traj: TrajArgs,
        /// Output text file
        #[arg(short, default_value = "Fkt-t0.txt")]
        outfile: String,
        /// Number of time origins
        #[arg(long, default_value_t = 10)]
        origins: usize,
        /// Longest lag as a fraction of the trajectory length
        #[arg(long, default_value_t = 0.25)]
        lag_fraction: f64,
        /// Remove coinciding time origins
        #[arg(long)]
        dedup: bool,
        /// Run on a single thread
        #[arg(long)]
        serial: bool,
    },
}

fn main() -> Result<()> {
    env_logger::builder()
        .format_timestamp(None)
        .format_indent(Some(8))
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cmd = Cmd::parse();

    match &cmd.command {
        Commands::Single { traj, outfile } => {
            sisf::greeting("single");
            command_single(&traj.file, traj.every, &traj.k, outfile)?;
        }
        Commands::Multi {
            traj,
            outfile,
            origins,
            lag_fraction,
            dedup,
            serial,
        } => {
            sisf::greeting("multi");
            command_multi(
                &traj.file,
                traj.every,
                &traj.k,
                outfile,
                *origins,
                *lag_fraction,
                *dedup,
                *serial,
            )?;
        }
    }
    Ok(())
}

pub(crate) fn summary(rows: usize, trj: &sisf::core::Trajectory, k: sisf::core::WaveVectorMagnitudes) {
    use comfy_table::modifiers::UTF8_ROUND_CORNERS;
    use comfy_table::presets::UTF8_FULL;
    use comfy_table::Table;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Frames", "Particles", "Box", "k", "Rows"])
        .add_row(vec![
            trj.len().to_string(),
            trj.num_particles().to_string(),
            trj.get_box().edge().to_string(),
            k.to_string(),
            rows.to_string(),
        ]);
    println!("{table}");
}
