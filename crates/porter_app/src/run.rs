//! One conversion run, from input archive to output archive.

use anyhow::Context;
use porter_core::UuidMinter;
use porter_engine::{
    convert_tree, extract_archive, write_journal_archive, ConvertOptions, Converter, EntryParser,
    Html2MdConverter, MarkdownConverter, PackageOptions, PackageReport, RunSummary, SourceLayout,
};
use porter_logging::{porter_debug, porter_info, porter_warn};

use crate::cli::{Cli, ConverterKind};

#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub package: PackageReport,
}

/// Converts `cli.input` into `cli.output`.
///
/// The extracted source lives in a private temp directory that is removed on
/// every exit path.
pub fn run(cli: &Cli) -> anyhow::Result<RunReport> {
    porter_info!("Starting conversion from {:?} to {:?}", cli.input, cli.output);

    let workdir = tempfile::Builder::new()
        .prefix("journal_porter_extract_")
        .tempdir()
        .context("failed to create temporary directory")?;
    porter_debug!("Temporary extraction directory: {:?}", workdir.path());

    let extracted = extract_archive(&cli.input, workdir.path())
        .with_context(|| format!("failed to unzip {:?}", cli.input))?;
    porter_info!("Unzipped {} files.", extracted);

    let layout = SourceLayout::detect(workdir.path())?;

    let options = ConvertOptions::with_time_zone(cli.time_zone.clone());
    let converter: Box<dyn Converter> = match cli.converter {
        ConverterKind::Native => Box::new(MarkdownConverter::new()),
        ConverterKind::Html2md => Box::new(Html2MdConverter),
    };
    let parser = EntryParser::new(converter.as_ref(), &options);
    let aggregate = convert_tree(&layout, &parser, &mut UuidMinter);

    porter_info!("Creating Day One zip file: {:?}", cli.output);
    let package = write_journal_archive(
        &cli.output,
        &aggregate.journal,
        &aggregate.media,
        &PackageOptions::default(),
    )
    .with_context(|| format!("failed to create Day One zip {:?}", cli.output))?;

    let cleanup_path = workdir.path().to_path_buf();
    if let Err(err) = workdir.close() {
        porter_warn!("Failed to remove temp directory {:?}: {}", cleanup_path, err);
    }

    Ok(RunReport {
        summary: aggregate.summary,
        package,
    })
}
