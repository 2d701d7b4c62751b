use std::io::Write;

use claims_ingest::{FrameSource, IngestError, ReadOptions, load_layout, read_csv_table_with};
use claims_map::{SampleSource, suggest_mapping};
use claims_model::FieldUsage;
use tempfile::NamedTempFile;

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{content}").expect("write temp file");
    file
}

const LAYOUT: &str = "\
 Data Field ,Usage,Category,Example Value
NPI,Yes,PROVIDER INFO,
Diagnosis Code,Mandatory,clinical,
 Member ID ,no,member info,
Zip,No,member info,
,Yes,orphan,
Claim Amount,,financial,
";

const CLAIMS: &str = "\
PROV_NPI,DIAG_CD,SVC_DT,MBR_ID,ZIP5,NOTES
1234567890,E11.9,01/15/2024,M001,30301-1234,call back
1234567891,I10,02/03/2024,M002,30302,n/a
1234567892,J45.909,2/4/24,M003,30303,ok
1234567893,E78.5,03/11/2024,M004,30304,see chart
1234567894,Z00.00,12/30/2023,M005,30305,pending
";

#[test]
fn layout_is_cleaned() {
    let file = temp_file(LAYOUT);
    let layout = load_layout(file.path()).expect("load layout");

    let names: Vec<&str> = layout.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["NPI", "Diagnosis Code", "Member ID", "Zip", "Claim Amount"]
    );
    assert_eq!(layout.required_fields().len(), 2);
    assert_eq!(layout.optional_fields().len(), 2);
    assert_eq!(
        layout.field("Claim Amount").map(|f| f.usage),
        Some(FieldUsage::Unspecified)
    );
    assert_eq!(
        layout.field_groups(),
        vec!["Clinical", "Financial", "Member Info", "Provider Info"]
    );
    assert!(layout.iter().all(|f| f.example.is_empty()));
}

#[test]
fn layout_without_example_column() {
    let file = temp_file("Data Field,Usage,Category\nNPI,Yes,Provider\n");
    let layout = load_layout(file.path()).expect("load layout");
    assert_eq!(layout.len(), 1);
}

#[test]
fn layout_missing_required_column() {
    let file = temp_file("Data Field,Usage\nNPI,Yes\n");
    let result = load_layout(file.path());
    assert!(matches!(
        result,
        Err(IngestError::MissingColumn { ref column, .. }) if column == "Category"
    ));
}

#[test]
fn layout_empty_after_cleaning() {
    let file = temp_file("Data Field,Usage,Category\n ,Yes,Provider\n");
    let result = load_layout(file.path());
    assert!(matches!(result, Err(IngestError::EmptyLayout { .. })));
}

#[test]
fn end_to_end_suggestions_from_files() {
    let layout_file = temp_file(LAYOUT);
    let claims_file = temp_file(CLAIMS);
    let layout = load_layout(layout_file.path()).expect("load layout");
    let claims = read_csv_table_with(claims_file.path(), &ReadOptions::default())
        .expect("read claims");

    let source = FrameSource::new(&claims);
    assert_eq!(source.sample_values("PROV_NPI", 2), vec!["1234567890", "1234567891"]);

    let suggestions = suggest_mapping(&layout, &source, 0.6);
    let pairs: Vec<(&str, &str, f64)> = suggestions
        .iter()
        .map(|e| {
            (
                e.target_field.as_str(),
                e.source_column.as_str(),
                e.confidence_percent,
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Diagnosis Code", "DIAG_CD", 82.14),
            ("Member ID", "MBR_ID", 91.67),
            ("NPI", "PROV_NPI", 79.55),
            ("Zip", "ZIP5", 110.71),
        ]
    );
}

#[test]
fn headerless_claims_with_header_file() {
    let header = temp_file("NPI|Zip\n");
    let claims = temp_file("1234567890|30301\n1234567891|30302\n");

    let options = ReadOptions::default()
        .with_header_file(header.path())
        .expect("read header");
    let df = read_csv_table_with(claims.path(), &options).expect("read claims");
    let source = FrameSource::new(&df);
    assert_eq!(source.column_names(), vec!["NPI", "Zip"]);
    assert_eq!(source.sample_values("Zip", 5), vec!["30301", "30302"]);
}

#[test]
fn text_only_keeps_leading_zeros() {
    let claims = temp_file("Zip\n02134\n02135\n");

    let inferred = read_csv_table_with(claims.path(), &ReadOptions::default()).expect("read");
    assert_eq!(FrameSource::new(&inferred).sample_values("Zip", 1), vec!["2134"]);

    let text = read_csv_table_with(claims.path(), &ReadOptions::default().text_only())
        .expect("read");
    assert_eq!(FrameSource::new(&text).sample_values("Zip", 1), vec!["02134"]);
}
