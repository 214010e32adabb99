//! Align command implementation - score every record against every template

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tsw_core::record::parse_record;
use tsw_core::report::{self, AlignmentRecord, ReportOptions};
use tsw_core::{AlignParams, Sequence, SimilarityTable, TswAligner};

use crate::config::{Config, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::AlignArgs;

/// An input row: record id or template name with its events
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSequence {
    pub name: String,
    pub sequence: Sequence,
}

pub fn execute(config: &Config, deterministic: bool, verbose: u8, args: AlignArgs) -> Result<()> {
    log::info!("Records: {}", args.records.display());
    log::info!("Templates: {}", args.templates.display());

    let mut params = resolve_params(config, &args)?;
    params.verbose = verbose;
    log::info!(
        "Alignment parameters: g={}, T={}, method={}, mem={}, remove_overlap={}, exclusion={:?}",
        params.gap_penalty,
        params.time_param,
        params.method,
        i64::from(params.max_alignments),
        params.remove_overlap,
        params.exclusion
    );

    let delimiter = config.io.input_delimiter;
    let records = load_named_sequences(&args.records, delimiter).context("Failed to load records")?;
    let templates =
        load_named_sequences(&args.templates, delimiter).context("Failed to load templates")?;
    if templates.is_empty() {
        return Err(CliError::validation(format!(
            "no templates found in {}",
            args.templates.display()
        ))
        .into());
    }
    log::info!("Loaded {} records and {} templates", records.len(), templates.len());

    let table = load_similarity(
        args.similarity.as_deref(),
        config.io.similarity_delimiter,
        &records,
        &templates,
    )?;
    log::info!("Similarity table covers {} labels", table.len());

    let options = config.io.report_options();
    let start = Instant::now();
    let rows = run_pairs(
        &table,
        params,
        &records,
        &templates,
        &options,
        deterministic || config.general.deterministic,
    )?;
    log::info!(
        "Aligned {} pairs into {} alignments in {:.2?}",
        records.len() * templates.len(),
        rows.len(),
        start.elapsed()
    );

    let format = args.format.unwrap_or(config.io.format);
    let rendered = render(&rows, format, &options)?;
    write_output(&rendered, args.out.as_deref())?;

    Ok(())
}

/// Command-line flags override the [align] section
fn resolve_params(config: &Config, args: &AlignArgs) -> CliResult<AlignParams> {
    let mut align = config.align.clone();
    if let Some(g) = args.gap_penalty {
        align.gap_penalty = g;
    }
    if let Some(t) = args.time_param {
        align.time_param = t;
    }
    if let Some(method) = args.method {
        align.method = method;
    }
    if let Some(mem) = args.mem {
        align.mem = mem;
    }
    if args.no_remove_overlap {
        align.remove_overlap = false;
    }
    if let Some(exclusion) = args.exclusion {
        align.exclusion = exclusion;
    }
    if let Some(encoding) = args.time_encoding {
        align.time_encoding = encoding;
    }
    align.to_params()
}

fn load_named_sequences(path: &Path, delimiter: char) -> Result<Vec<NamedSequence>> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_named_sequences(&text, delimiter, &path.display().to_string())?)
}

/// Parse `<name><delimiter><record>` rows, skipping blank lines and `#` comments
pub fn parse_named_sequences(text: &str, delimiter: char, file: &str) -> CliResult<Vec<NamedSequence>> {
    let mut rows = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let (name, record) = line.split_once(delimiter).ok_or_else(|| {
            CliError::parse(file, format!(
                "line {}: expected '<id>{}<sequence>'",
                line_no,
                delimiter.escape_default()
            ))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CliError::parse(file, format!("line {}: empty id", line_no)));
        }

        let sequence = parse_record(record)
            .map_err(|e| CliError::parse(file, format!("line {} ({}): {}", line_no, name, e)))?;
        rows.push(NamedSequence {
            name: name.to_string(),
            sequence,
        });
    }

    Ok(rows)
}

/// Read the similarity matrix, or score every seen label with the 1.0 / -1.1 defaults
fn load_similarity(
    path: Option<&Path>,
    delimiter: char,
    records: &[NamedSequence],
    templates: &[NamedSequence],
) -> Result<SimilarityTable> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::file_not_found(path.to_path_buf()).into());
            }
            log::info!("Loading similarity matrix from: {}", path.display());
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let table = SimilarityTable::parse_delimited(&text, delimiter)
                .map_err(|e| CliError::invalid_format(format!("{}: {}", path.display(), e)))?;
            Ok(table)
        }
        None => {
            log::info!("No similarity matrix given, using uniform 1.0 / -1.1 scores");
            let labels = templates
                .iter()
                .chain(records)
                .flat_map(|named| named.sequence.labels());
            Ok(SimilarityTable::with_defaults(labels)?)
        }
    }
}

/// Align each template (s1) against each record (s2). Rows come back
/// record-major, then template order, then best alignment first.
pub fn run_pairs(
    table: &SimilarityTable,
    params: AlignParams,
    records: &[NamedSequence],
    templates: &[NamedSequence],
    options: &ReportOptions,
    sequential: bool,
) -> CliResult<Vec<AlignmentRecord>> {
    let aligner = TswAligner::new(table, params)
        .map_err(|e| CliError::config(e.to_string()))?;

    let pairs: Vec<(&NamedSequence, &NamedSequence)> = records
        .iter()
        .flat_map(|record| templates.iter().map(move |template| (record, template)))
        .collect();

    let align_pair = |&(record, template): &(&NamedSequence, &NamedSequence)| -> CliResult<Vec<AlignmentRecord>> {
        let alignments = aligner
            .align(&template.sequence, &record.sequence)
            .map_err(|e| CliError::alignment(record.name.as_str(), template.name.as_str(), e))?;
        log::debug!(
            "{} x {}: {} alignment(s)",
            record.name,
            template.name,
            alignments.len()
        );
        Ok(report::assemble(&record.name, &template.name, &alignments, options))
    };

    let per_pair: Vec<Vec<AlignmentRecord>> = if sequential {
        pairs.iter().map(align_pair).collect::<CliResult<_>>()?
    } else {
        pairs.par_iter().map(align_pair).collect::<CliResult<_>>()?
    };

    Ok(per_pair.into_iter().flatten().collect())
}

pub fn render(rows: &[AlignmentRecord], format: OutputFormat, options: &ReportOptions) -> Result<String> {
    match format {
        OutputFormat::Tsv => {
            let mut out = report::header(options);
            out.push('\n');
            for row in rows {
                out.push_str(&row.to_row(options));
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(rows).context("Failed to serialize alignments")?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn write_output(rendered: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .map_err(CliError::from)
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
