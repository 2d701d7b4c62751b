use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use claims_map::{FieldStatus, MappingMetadata, ReviewIssue};
use claims_model::{ConfidenceLevel, ConfidenceThresholds, FieldUsage};

use claims_cli::types::{BatchResult, ClaimsResult};

pub fn print_batch_summary(batch: &BatchResult, thresholds: &ConfidenceThresholds) {
    println!("Layout: {} ({} fields)", batch.layout_name, batch.layout_fields);
    for result in &batch.results {
        println!();
        print_claims_summary(result, thresholds);
    }
    if batch.results.len() > 1 {
        println!();
        print_batch_totals(batch);
    }
}

fn print_claims_summary(result: &ClaimsResult, thresholds: &ConfidenceThresholds) {
    println!(
        "Claims: {} ({} rows, {} columns)",
        result.path.display(),
        result.rows,
        result.columns.len()
    );
    if result.template_applied > 0 {
        println!("Template: {} decisions replayed", result.template_applied);
    }
    if let Some(path) = &result.saved_to {
        println!("Saved: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Usage"),
        header_cell("Status"),
        header_cell("Column"),
        header_cell("Confidence"),
        header_cell("Level"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    for field in result.review.layout().iter() {
        let status = result.review.status(&field.name);
        let column = result.review.mapped_column(&field.name);
        // A template may have accepted a different column than the engine.
        let confidence = result
            .suggestions
            .get(&field.name)
            .filter(|entry| match status {
                FieldStatus::Suggested => true,
                FieldStatus::Accepted => column == Some(entry.source_column.as_str()),
                _ => false,
            });
        table.add_row(vec![
            Cell::new(&field.name),
            usage_cell(field.usage),
            status_cell(status),
            column.map_or_else(|| dim_cell("-"), Cell::new),
            confidence.map_or_else(
                || dim_cell("-"),
                |entry| Cell::new(format!("{:.2}%", entry.confidence_percent)),
            ),
            confidence
                .and_then(|entry| thresholds.categorize(entry.raw_score))
                .map_or_else(|| dim_cell("-"), level_cell),
        ]);
    }
    println!("{table}");

    let summary = &result.summary;
    println!(
        "Mapped {}/{} fields, required {}/{}",
        summary.mapped, summary.total_fields, summary.required_mapped, summary.required_total
    );
    if let Some(mean) = result.suggestions.mean_confidence() {
        println!(
            "Suggestions: {}, mean confidence {:.2}%",
            result.suggestions.len(),
            mean * 100.0
        );
    }
    print_issue_table(&result.issues);
}

fn print_issue_table(issues: &[ReviewIssue]) {
    if issues.is_empty() {
        return;
    }
    let mut ordered: Vec<&ReviewIssue> = issues.iter().collect();
    ordered.sort_by_key(|issue| !issue.is_blocking());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Severity"), header_cell("Issue")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for issue in ordered {
        let severity = if issue.is_blocking() {
            Cell::new("ERROR").fg(Color::Red).add_attribute(Attribute::Bold)
        } else {
            Cell::new("INFO").fg(Color::DarkGrey)
        };
        table.add_row(vec![severity, Cell::new(issue.to_string())]);
    }
    println!("Issues:");
    println!("{table}");
}

fn print_batch_totals(batch: &BatchResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Claims"),
        header_cell("Mapped"),
        header_cell("Required"),
        header_cell("Errors"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for result in &batch.results {
        let errors = result
            .issues
            .iter()
            .filter(|issue| issue.is_blocking())
            .count();
        table.add_row(vec![
            Cell::new(&result.source_name),
            Cell::new(format!(
                "{}/{}",
                result.summary.mapped, result.summary.total_fields
            )),
            Cell::new(format!(
                "{}/{}",
                result.summary.required_mapped, result.summary.required_total
            )),
            count_cell(errors, Color::Red),
        ]);
    }
    println!("{table}");
    println!(
        "Suggestion cache: {} hits, {} misses",
        batch.cache_hits, batch.cache_misses
    );
}

pub fn print_templates(templates: &[MappingMetadata]) {
    if templates.is_empty() {
        println!("No stored mappings.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Layout"),
        header_cell("Source"),
        header_cell("Mapped"),
        header_cell("Unmapped"),
        header_cell("Saved"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for template in templates {
        table.add_row(vec![
            Cell::new(&template.layout_name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&template.source_name),
            Cell::new(template.mapping_count),
            count_cell(template.unmapped_count, Color::Yellow),
            template
                .saved_at
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn usage_cell(usage: FieldUsage) -> Cell {
    match usage {
        FieldUsage::Mandatory => Cell::new("required")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        FieldUsage::Optional => Cell::new("optional"),
        FieldUsage::Unspecified => dim_cell("-"),
    }
}

fn status_cell(status: FieldStatus) -> Cell {
    let color = match status {
        FieldStatus::Accepted => Color::Green,
        FieldStatus::Overridden => Color::Blue,
        FieldStatus::Suggested => Color::Yellow,
        FieldStatus::Rejected => Color::DarkGrey,
        FieldStatus::Unmapped => Color::Red,
    };
    Cell::new(status.as_str()).fg(color)
}

fn level_cell(level: ConfidenceLevel) -> Cell {
    let color = match level {
        ConfidenceLevel::High => Color::Green,
        ConfidenceLevel::Medium => Color::Yellow,
        ConfidenceLevel::Low => Color::Red,
    };
    Cell::new(level.label()).fg(color)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
