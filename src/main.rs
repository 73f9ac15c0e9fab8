use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use mud_image::batch::{self, BatchConfig};
use mud_image::Options;

/// A image processing tool for MUD.
///
/// Converts every PNG in a directory to an 8-bit palette PNG, all of them
/// sharing one palette
#[derive(Parser, Debug)]
#[command(name = "mud_image", version, about)]
struct Args {
    /// Source directory of png files
    #[arg(short, long)]
    source: PathBuf,

    /// Destination directory for 8 bit png files
    #[arg(short, long)]
    dest: PathBuf,

    /// Maximum number of palette colors
    #[arg(
        short,
        long,
        default_value_t = 256,
        value_parser = clap::value_parser!(u16).range(2..=256)
    )]
    colors: u16,

    /// Dithering level, 0 disables dithering
    #[arg(long, default_value_t = 1.0)]
    dither: f32,

    /// Worker threads, defaults to the number of cores
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Log every file
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn quantize_options(args: &Args) -> Result<Options, mud_image::Error> {
    let mut options = Options::default();
    options.set_max_colors(args.colors as usize)?;
    options.set_dithering_level(args.dither)?;

    Ok(options)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = match quantize_options(&args) {
        Ok(options) => options,
        Err(e) => {
            error!("Invalid options: {}", e);
            return ExitCode::from(64);
        }
    };

    let config = BatchConfig {
        source: args.source,
        dest: args.dest,
        options,
        jobs: args.jobs,
    };

    match batch::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let mut msg = e.to_string();
            let mut cause = e.source();
            while let Some(c) = cause {
                msg.push_str(": ");
                msg.push_str(&c.to_string());
                cause = c.source();
            }

            error!("{}", msg);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
