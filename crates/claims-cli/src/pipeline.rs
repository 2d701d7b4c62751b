//! Suggest-and-review pipeline behind the `suggest` command.
//!
//! Every claims file in a batch goes through the same stages: read, suggest
//! (through a shared [`SuggestionCache`]), replay any stored template, apply
//! command-line overrides and rejections, accept the remaining suggestions,
//! and validate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use claims_ingest::{FrameSource, ReadOptions, encoding_for_label, read_csv_table_with};
use claims_map::{
    MappingEngine, MappingRepository, MappingReview, SampleSource, StoredMappingConfig,
    SuggestionCache,
};
use claims_model::{MappingConfig, SuggestionSet, TargetLayout};
use tracing::{debug, info, info_span, trace, warn};

use crate::logging::redact_value;
use crate::types::{BatchResult, ClaimsResult};

/// Claims file parsing settings from the command line.
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    pub delimiter: Option<char>,
    pub encoding: Option<String>,
    pub header_file: Option<PathBuf>,
    pub text_only: bool,
}

impl InputOptions {
    pub fn read_options(&self) -> Result<ReadOptions> {
        let mut options = ReadOptions::default();
        if let Some(delimiter) = self.delimiter {
            let byte = u8::try_from(delimiter)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| anyhow!("delimiter must be a single ASCII character: {delimiter:?}"))?;
            options = options.with_delimiter(byte);
        }
        if let Some(label) = &self.encoding {
            options = options.with_encoding(encoding_for_label(label)?);
        }
        if let Some(path) = &self.header_file {
            options = options
                .with_header_file(path)
                .with_context(|| format!("read header file {}", path.display()))?;
        }
        if self.text_only {
            options = options.text_only();
        }
        Ok(options)
    }
}

/// Name used for a file in stored templates: its stem, or the whole file
/// name when there is no stem.
pub fn file_label(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "claims".to_string())
}

/// Parses a `FIELD=COLUMN` override. Splits on the first `=`; both sides
/// are trimmed and must be non-empty.
pub fn parse_override(raw: &str) -> Result<(String, String)> {
    let Some((field, column)) = raw.split_once('=') else {
        bail!("override must look like FIELD=COLUMN: {raw}");
    };
    let (field, column) = (field.trim(), column.trim());
    if field.is_empty() || column.is_empty() {
        bail!("override must name both a field and a column: {raw}");
    }
    Ok((field.to_string(), column.to_string()))
}

/// Reviewer decisions applied to every file of a batch.
#[derive(Debug, Clone, Default)]
pub struct ReviewInputs {
    pub overrides: Vec<(String, String)>,
    pub rejects: Vec<String>,
}

impl ReviewInputs {
    pub fn parse(overrides: &[String], rejects: &[String]) -> Result<Self> {
        let overrides = overrides
            .iter()
            .map(|raw| parse_override(raw))
            .collect::<Result<Vec<_>>>()?;
        let rejects = rejects
            .iter()
            .map(|field| field.trim().to_string())
            .filter(|field| !field.is_empty())
            .collect();
        Ok(Self { overrides, rejects })
    }
}

/// Builds the review for one file.
///
/// Order: stored template, overrides, rejections, then every suggestion
/// still undecided is accepted. Returns the review and the number of
/// template decisions replayed.
pub fn review_suggestions(
    layout: &TargetLayout,
    suggestions: SuggestionSet,
    columns: Vec<String>,
    template: Option<&MappingConfig>,
    inputs: &ReviewInputs,
) -> Result<(MappingReview, usize)> {
    let mut review = MappingReview::new(layout.clone(), suggestions, columns);
    let applied = template.map_or(0, |config| review.apply_config(config));
    for (field, column) in &inputs.overrides {
        review
            .override_with(field, column)
            .with_context(|| format!("override {field}={column}"))?;
    }
    for field in &inputs.rejects {
        review
            .reject(field)
            .with_context(|| format!("reject {field}"))?;
    }
    review.accept_all();
    Ok((review, applied))
}

/// Everything shared by the files of one batch.
pub struct BatchContext<'a> {
    pub engine: &'a MappingEngine,
    pub layout: &'a TargetLayout,
    pub layout_name: &'a str,
    pub read_options: &'a ReadOptions,
    pub inputs: &'a ReviewInputs,
    pub templates: Option<&'a MappingRepository>,
}

pub fn process_claims_file(
    ctx: &BatchContext<'_>,
    cache: &mut SuggestionCache,
    path: &Path,
) -> Result<ClaimsResult> {
    let source_name = file_label(path);
    let span = info_span!("claims", source = %source_name);
    let _guard = span.enter();

    let df = read_csv_table_with(path, ctx.read_options)
        .with_context(|| format!("read claims file {}", path.display()))?;
    let source = FrameSource::new(&df);
    let columns = source.column_names();
    for column in &columns {
        if let Some(first) = source.sample_values(column, 1).first() {
            trace!(column = %column, first_value = redact_value(first), "sampled column");
        }
    }

    let suggestions = cache.get_or_compute(ctx.engine, ctx.layout, &source);
    debug!(
        suggested = suggestions.len(),
        fields = ctx.layout.len(),
        "suggestions ready"
    );

    let template = match ctx.templates {
        Some(repo) => repo
            .load(ctx.layout_name, &source_name)
            .with_context(|| format!("load template for {source_name}"))?,
        None => None,
    };
    let (review, template_applied) = review_suggestions(
        ctx.layout,
        suggestions.clone(),
        columns.clone(),
        template.as_ref(),
        ctx.inputs,
    )?;
    if template_applied > 0 {
        info!(decisions = template_applied, "replayed stored template");
    }

    let issues = review.validate();
    for issue in issues.iter().filter(|issue| issue.is_blocking()) {
        warn!("{issue}");
    }
    let summary = review.summary();

    Ok(ClaimsResult {
        path: path.to_path_buf(),
        source_name,
        rows: df.height(),
        columns,
        suggestions,
        review,
        issues,
        summary,
        template_applied,
        saved_to: None,
    })
}

/// Runs every claims file through [`process_claims_file`] with one cache.
pub fn process_batch(
    ctx: &BatchContext<'_>,
    cache: &mut SuggestionCache,
    paths: &[PathBuf],
) -> Result<BatchResult> {
    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        results.push(process_claims_file(ctx, cache, path)?);
    }
    info!(
        files = results.len(),
        cache_hits = cache.hits(),
        cache_misses = cache.misses(),
        "batch complete"
    );
    Ok(BatchResult {
        layout_name: ctx.layout_name.to_string(),
        layout_fields: ctx.layout.len(),
        results,
        cache_hits: cache.hits(),
        cache_misses: cache.misses(),
    })
}

/// Stores a reviewed mapping as a template and records where it went.
pub fn save_mapping(
    repo: &MappingRepository,
    layout_name: &str,
    result: &mut ClaimsResult,
    description: Option<&str>,
) -> Result<PathBuf> {
    let mut stored = StoredMappingConfig::new(result.to_config(layout_name));
    if let Some(description) = description {
        stored = stored.with_description(description);
    }
    let path = repo.save_stored(&stored)?;
    info!(path = %path.display(), "saved mapping template");
    result.saved_to = Some(path.clone());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_parsing() {
        assert_eq!(
            parse_override(" Zip = ZIP5 ").unwrap(),
            ("Zip".to_string(), "ZIP5".to_string())
        );
        assert_eq!(
            parse_override("Note=A=B").unwrap(),
            ("Note".to_string(), "A=B".to_string())
        );
        assert!(parse_override("Zip").is_err());
        assert!(parse_override("=ZIP5").is_err());
        assert!(parse_override("Zip=").is_err());
    }

    #[test]
    fn file_labels() {
        assert_eq!(file_label(Path::new("/data/claims_jan.csv")), "claims_jan");
        assert_eq!(file_label(Path::new("feed")), "feed");
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let options = InputOptions {
            delimiter: Some('§'),
            ..InputOptions::default()
        };
        assert!(options.read_options().is_err());

        let options = InputOptions {
            delimiter: Some('|'),
            text_only: true,
            ..InputOptions::default()
        };
        let read = options.read_options().unwrap();
        assert_eq!(read.delimiter, Some(b'|'));
        assert!(read.text_only);
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let options = InputOptions {
            encoding: Some("klingon".to_string()),
            ..InputOptions::default()
        };
        assert!(options.read_options().is_err());
    }
}
