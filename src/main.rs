use std::{env, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::ProgressBar;

use ttbar_fiducial::{table, Analysis, AnalysisConfig, Sample};

/// Theory prediction for tt̄ production at √s = 8 TeV, in pb.
const TTBAR_CROSS_SECTION: f64 = 252.89;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a toy sample, select it and print the normalized yields
    Run {
        #[arg(short, long, value_name = "NSIG", default_value_t = 10000)]
        sig: usize,
        #[arg(short, long, value_name = "NBKG", default_value_t = 10000)]
        bkg: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Cross section the sample is normalized to, in pb
        #[arg(short = 'x', long, default_value_t = TTBAR_CROSS_SECTION)]
        cross_section: f64,
        /// TOML file overriding the default selection
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Write the per-event selection table here (tab-separated)
        #[arg(short, long, value_name = "TABLE")]
        table: Option<PathBuf>,
    },
    /// Summarize a selection table written by `run` into a cutflow
    Cutflow {
        input: PathBuf,
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    match cli.command {
        Some(Commands::Run {
            sig,
            bkg,
            seed,
            cross_section,
            config,
            table: table_path,
        }) => {
            let config = match config {
                Some(path) => {
                    tracing::info!(path = %path.display(), "loading configuration");
                    AnalysisConfig::from_file(&path)?
                }
                None => AnalysisConfig::default(),
            };
            let analysis = Analysis::new(config)?;
            let sample = Sample::generate_with_progress(sig, bkg, seed, ProgressBar::new(0));
            let (summary, selections) = analysis.run(&sample.events, cross_section)?;
            println!("Events\t{}", summary.yields.n_events);
            println!("SumOfWeights\t{}", summary.yields.sum_of_weights);
            println!("DetectorPassed\t{}", summary.detector_passed.events);
            println!("ParticlePassed\t{}", summary.particle_passed.events);
            println!("BothPassed\t{}", summary.both_passed.events);
            println!("LeptonMismatches\t{}", summary.lepton_count_mismatches);
            for ((level, reason), tally) in &summary.rejections {
                println!("Rejected[{level}:{reason}]\t{}\t{}", tally.events, tally.weight);
            }
            println!("Inclusive [pb]\t{}", summary.yields.inclusive);
            println!("Fiducial [pb]\t{}", summary.yields.fiducial);
            println!("Acceptance\t{}", summary.yields.acceptance());
            if let Some(path) = table_path {
                println!("Writing selection table to {:?}", path);
                let mut df = table::selection_frame(&selections)?;
                table::write_table(&mut df, &path)?;
            }
        }
        Some(Commands::Cutflow { input, output }) => {
            let df = table::read_table(&input)?;
            let mut res = table::cutflow(&df)?;
            env::set_var("POLARS_FMT_TABLE_ROUNDED_CORNERS", "1");
            env::set_var("POLARS_FMT_MAX_COLS", "-1");
            env::set_var("POLARS_FMT_MAX_ROWS", "-1");
            println!("{}", res);
            if let Some(out_path) = output {
                println!("Writing result to {:?}", out_path);
                table::write_table(&mut res, &out_path)?;
            }
        }
        None => Cli::command().print_help()?,
    }
    Ok(())
}
