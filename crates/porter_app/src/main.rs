mod cli;
mod logging;
mod run;

use clap::Parser;
use porter_logging::{porter_error, porter_info, porter_warn};

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::initialize(
        logging::level_for(cli.verbose, cli.quiet),
        cli.log_file.as_deref(),
    );

    match run::run(&cli) {
        Ok(report) => {
            let summary = &report.summary;
            for (reason, count) in &summary.skipped_by_reason {
                porter_warn!("Skipped {} entries: {}", count, reason);
            }
            if summary.photos_without_file > 0 {
                porter_warn!(
                    "{} photos share a source file with a later entry and have no file in the archive.",
                    summary.photos_without_file
                );
            }
            if report.package.media_failed > 0 {
                porter_warn!("{} photos could not be copied.", report.package.media_failed);
            }
            porter_info!("Conversion complete!");
            porter_info!(
                "{} of {} entries converted, {} photos written to {:?}",
                summary.entries_processed,
                summary.documents_seen,
                report.package.media_written,
                report.package.output_path
            );
        }
        Err(err) => {
            porter_error!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}
