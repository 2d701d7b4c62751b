use anyhow::{Context, Result};
use claims_ingest::{FrameSource, load_layout, read_csv_table_with};
use claims_map::{
    DEFAULT_CACHE_CAPACITY, MappingEngine, MappingError, MappingRepository, SuggestionCache,
};
use claims_model::ConfidenceThresholds;
use tracing::info_span;

use claims_cli::config::AppConfig;
use claims_cli::pipeline::{
    BatchContext, InputOptions, ReviewInputs, file_label, process_batch, save_mapping,
};
use claims_cli::report::{render_explanation, render_layout_overview};
use claims_cli::types::BatchResult;

use crate::cli::{ExplainArgs, InputArgs, LayoutArgs, OutputFormatArg, SuggestArgs, TemplatesArgs};
use crate::summary::{print_batch_summary, print_templates};

fn input_options(args: &InputArgs) -> InputOptions {
    InputOptions {
        delimiter: args.delimiter,
        encoding: args.encoding.clone(),
        header_file: args.header_file.clone(),
        text_only: args.text_only,
    }
}

pub fn run_suggest(args: &SuggestArgs, config: AppConfig) -> Result<BatchResult> {
    let config = config.with_overrides(args.threshold, args.sample_size);
    let layout_name = file_label(&args.layout);
    let span = info_span!("suggest", layout = %layout_name);
    let _guard = span.enter();

    let layout = load_layout(&args.layout)
        .with_context(|| format!("load layout {}", args.layout.display()))?;
    let read_options = input_options(&args.input).read_options()?;
    let inputs = ReviewInputs::parse(&args.overrides, &args.rejects)?;
    let templates = args
        .reuse
        .as_ref()
        .map(MappingRepository::new)
        .transpose()?;
    let engine = MappingEngine::new(config.engine);
    let mut cache = SuggestionCache::new(DEFAULT_CACHE_CAPACITY);

    let ctx = BatchContext {
        engine: &engine,
        layout: &layout,
        layout_name: &layout_name,
        read_options: &read_options,
        inputs: &inputs,
        templates: templates.as_ref(),
    };
    let mut batch = process_batch(&ctx, &mut cache, &args.claims)?;

    if let Some(dir) = &args.save {
        let repo = MappingRepository::new(dir)?;
        for result in &mut batch.results {
            save_mapping(&repo, &layout_name, result, args.description.as_deref())?;
        }
    }

    match args.format {
        OutputFormatArg::Table => print_batch_summary(&batch, &config.confidence),
        OutputFormatArg::Json => {
            let json = serde_json::to_string_pretty(&batch.reports())
                .context("serialize suggestions")?;
            println!("{json}");
        }
    }
    Ok(batch)
}

pub fn run_explain(args: &ExplainArgs, config: AppConfig) -> Result<()> {
    let config = config.with_overrides(args.threshold, args.sample_size);
    let layout = load_layout(&args.layout)
        .with_context(|| format!("load layout {}", args.layout.display()))?;
    let field = layout
        .field(args.field.trim())
        .ok_or_else(|| MappingError::FieldNotFound(args.field.clone()))?;

    let read_options = input_options(&args.input).read_options()?;
    let df = read_csv_table_with(&args.claims, &read_options)
        .with_context(|| format!("read claims file {}", args.claims.display()))?;
    let engine = MappingEngine::new(config.engine);
    let scores = engine.score_all_for_field(field, &FrameSource::new(&df));
    print!("{}", render_explanation(field, &scores, engine.threshold()));
    print_thresholds(&config.confidence);
    Ok(())
}

fn print_thresholds(thresholds: &ConfidenceThresholds) {
    println!(
        "Levels: high >= {:.2}%, medium >= {:.2}%, low >= {:.2}%",
        thresholds.high * 100.0,
        thresholds.medium * 100.0,
        thresholds.low * 100.0
    );
}

pub fn run_layout(args: &LayoutArgs) -> Result<()> {
    let layout = load_layout(&args.layout)
        .with_context(|| format!("load layout {}", args.layout.display()))?;
    println!("Layout: {}", file_label(&args.layout));
    print!("{}", render_layout_overview(&layout));
    Ok(())
}

pub fn run_templates(args: &TemplatesArgs) -> Result<()> {
    let repo = MappingRepository::new(&args.repo)?;
    let mut templates = repo.list()?;
    if let Some(layout_name) = &args.layout_name {
        templates.retain(|template| template.layout_name.eq_ignore_ascii_case(layout_name));
    }
    print_templates(&templates);
    Ok(())
}
