use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Args;
use log::debug;
use symprop_attach::report::{write_markdown_report, ReportContext};
use symprop_attach::{attach_properties, AttachOptions, TextEncoding};

#[derive(Args, Debug)]
#[command(about = "Attach properties to every symbol in a .kicad_sym library")]
pub struct AttachArgs {
    /// Symbol library to edit
    #[arg(long = "input", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Property name to attach; repeat the flag to attach several
    #[arg(long = "property-name", value_name = "NAME", required = true)]
    pub property_names: Vec<String>,

    /// Value for every attached property
    #[arg(long = "property-value", value_name = "VALUE", default_value = "")]
    pub property_value: String,

    /// Where to write the patched library. Defaults to writing the input back
    /// in place (a numbered .orig backup is made either way).
    #[arg(long = "output", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Classify and report without touching the library or creating a backup
    #[arg(long)]
    pub dry_run: bool,

    /// Where to write the markdown report. Defaults to
    /// <output-stem>.<timestamp>.report.md next to the output file.
    #[arg(long = "report", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub report: Option<PathBuf>,

    /// Text encoding of the library file (a WHATWG label)
    #[arg(long, value_name = "LABEL", default_value = "utf-8")]
    pub encoding: String,
}

pub fn execute(args: AttachArgs) -> Result<()> {
    let encoding = TextEncoding::for_label(&args.encoding)
        .ok_or_else(|| anyhow!("unknown text encoding {:?}", args.encoding))?;

    let output = args.output.clone().unwrap_or_else(|| args.input.clone());
    let report_path = args
        .report
        .clone()
        .unwrap_or_else(|| default_report_path(&output));
    debug!("report path: {}", report_path.display());

    let options = AttachOptions {
        output: Some(output.clone()),
        dry_run: args.dry_run,
        encoding,
    };

    let input_path = args.input.display().to_string();
    let output_path = output.display().to_string();

    match attach_properties(
        &args.input,
        &args.property_names,
        &args.property_value,
        &options,
    ) {
        Ok(stats) => {
            let ctx = ReportContext {
                input_path,
                output_path,
                stats: Some(&stats),
                ..ReportContext::default()
            };
            write_markdown_report(&report_path, &ctx)?;
            println!(
                "Processed={} added={} skipped={}",
                stats.symbols_processed, stats.properties_added, stats.properties_skipped
            );
            Ok(())
        }
        Err(err) => {
            // A failed run still gets a report, with the message in the
            // error list and zeroed counts.
            let ctx = ReportContext {
                input_path,
                output_path,
                errors: vec![err.to_string()],
                ..ReportContext::default()
            };
            if let Err(report_err) = write_markdown_report(&report_path, &ctx) {
                debug!(
                    "could not write failure report to {}: {report_err}",
                    report_path.display()
                );
            }
            Err(err.into())
        }
    }
}

/// `lib.kicad_sym` -> `lib.<YYYYmmdd-HHMMSS>.report.md` in the same directory.
fn default_report_path(output: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "library".to_string());
    output.with_file_name(format!("{stem}.{timestamp}.report.md"))
}
