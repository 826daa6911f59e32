use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod convert;

pub use config::Config;

/// sdrf-openms - SDRF to OpenMS experimental design converter
#[derive(Parser)]
#[command(name = "sdrf-openms")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an SDRF file into OpenMS search settings and experimental design
    ConvertOpenms {
        /// Input SDRF file
        #[arg(short = 's', long = "sdrf", value_name = "SDRF")]
        sdrf: PathBuf,

        /// Directory for openms.tsv and experimental_design.tsv
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Write the single-table experimental design
        #[arg(long)]
        one_table: bool,

        /// Keep the numeric Sample column in the single-table design
        #[arg(long)]
        legacy: bool,

        /// Condition columns, e.g. "[characteristics[individual],factor value[disease]]";
        /// outputs are split per condition
        #[arg(short = 'c', long = "conditionsfromcolumns", value_name = "COLUMNS")]
        conditions_from_columns: Option<String>,

        /// Extension rewrites for spectra paths, e.g. "raw:mzML,d:mzML"
        #[arg(short = 'e', long = "extension_convert", value_name = "PATTERN")]
        extension_convert: Option<String>,

        /// unimod.xml used to resolve modification accessions
        #[arg(long, value_name = "FILE")]
        unimod: Option<PathBuf>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::ConvertOpenms {
            sdrf,
            output_dir,
            one_table,
            legacy,
            conditions_from_columns,
            extension_convert,
            unimod,
            config,
        } => convert::run(convert::ConvertArgs {
            sdrf,
            output_dir,
            one_table,
            legacy,
            conditions_from_columns,
            extension_convert,
            unimod,
            config,
        }),
    }
}
