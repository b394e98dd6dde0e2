#![allow(dead_code)]

use std::path::PathBuf;

use schema_normalizer::model::AnalysisResult;
use schema_normalizer::parser::{parse_schema, BuiltSchema};

pub(crate) fn fixture_dir(fixture: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture)
}

pub(crate) fn read_fixture_sql(fixture: &str) -> String {
    std::fs::read_to_string(fixture_dir(fixture).join("input.sql"))
        .expect("fixture SQL should be readable")
}

pub(crate) fn build_fixture_schema(fixture: &str) -> BuiltSchema {
    let sql = read_fixture_sql(fixture);
    parse_schema(&sql).unwrap_or_else(|e| panic!("fixture {fixture} should build: {e}"))
}

pub(crate) fn analyze_fixture(fixture: &str) -> AnalysisResult {
    let sql = read_fixture_sql(fixture);
    schema_normalizer::analyze_schema(&sql)
        .unwrap_or_else(|e| panic!("fixture {fixture} should analyze: {e}"))
}
