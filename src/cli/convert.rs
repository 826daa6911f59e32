use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use sdrf_openms::ontology::UnimodDatabase;
use sdrf_openms::openms::{parse_column_list, ConversionReport, ConvertOptions, OpenMs};

use super::Config;

/// Command line arguments of convert-openms
pub struct ConvertArgs {
    pub sdrf: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub one_table: bool,
    pub legacy: bool,
    pub conditions_from_columns: Option<String>,
    pub extension_convert: Option<String>,
    pub unimod: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Convert an SDRF file to OpenMS inputs
pub fn run(args: ConvertArgs) -> Result<()> {
    if !args.sdrf.exists() {
        anyhow::bail!("Input file does not exist: {}", args.sdrf.display());
    }

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .openms;

    let mut options = ConvertOptions::new()
        .with_one_table(args.one_table || config.one_table.unwrap_or(false))
        .with_legacy(args.legacy || config.legacy.unwrap_or(false));
    if let Some(dir) = args.output_dir.or(config.output_dir) {
        options = options.with_output_dir(dir);
    }
    if let Some(pattern) = args.extension_convert.or(config.extension_convert) {
        options = options.with_extension_convert(pattern);
    }
    let columns = match args.conditions_from_columns {
        Some(list) => Some(parse_column_list(&list)),
        None => config
            .conditions_from_columns
            .map(|c| c.iter().map(|name| name.trim().to_lowercase()).collect()),
    };
    if let Some(columns) = columns {
        info!("User selected factor columns: {:?}", columns);
        options = options.with_split_by_columns(columns);
    }

    let unimod = match args.unimod.or(config.unimod) {
        Some(path) => UnimodDatabase::from_xml_file(&path)
            .with_context(|| format!("Failed to load UNIMOD file: {}", path.display()))?,
        None => UnimodDatabase::builtin(),
    };
    info!("UNIMOD records: {}", unimod.len());

    let sdrf_name = args.sdrf.display().to_string();
    let mut openms = OpenMs::with_lookup(unimod);
    let report = match openms.convert_file(&args.sdrf, &options) {
        Ok(summary) => {
            for path in &summary.written {
                info!("Output: {}", path.display());
            }
            ConversionReport::success(sdrf_name, summary.diagnostics)
        }
        Err(e) => ConversionReport::failed(sdrf_name, openms.diagnostics(), e),
    };

    report.diagnostics.log();

    #[cfg(feature = "colorized_output")]
    {
        print!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        print!("{}", report);
    }

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
