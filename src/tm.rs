use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use target_mapping::*;

use std::fs;
use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::tm::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum TmError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Survey distribution: expected an object of percentages (variable {variable:?})"))]
    SurveyFormat { variable: String },
    #[snafu(display("Survey distribution: the percentage of {variable}/{label} is not a number"))]
    SurveyNotNumber { variable: String, label: String },
    #[snafu(display("Unknown input type {provider:?} for {path}"))]
    UnknownProvider { provider: String, path: String },
    #[snafu(display("Invalid selection of variables: {source}"))]
    Selection { source: MappingErrors },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TmResult<T> = Result<T, TmError>;

/// Where the summary goes.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SummaryOutput {
    Stdout,
    File(String),
    Discard,
}

impl SummaryOutput {
    pub fn from_arg(out: &Option<String>) -> Option<SummaryOutput> {
        out.as_ref().map(|s| match s.as_str() {
            "stdout" => SummaryOutput::Stdout,
            "" => SummaryOutput::Discard,
            p => SummaryOutput::File(p.to_string()),
        })
    }
}

fn read_target_table(root: &Path, source: &TargetSource) -> TmResult<TargetTable> {
    let path = io_common::resolve_path(root, &source.file_path);
    info!(
        "Attempting to read target file {:?} for variable {:?}",
        path, source.variable
    );
    let table = match source.provider()? {
        Provider::Csv => io_csv::read_csv_table(&path, source.csv_delimiter()?)?,
        Provider::Xlsx => {
            io_xlsx::read_xlsx_table(&path, source.excel_worksheet_name.as_deref())?
        }
    };
    debug!(
        "read_target_table: {}: header {:?}, {} rows",
        io_common::simplify_file_name(&path),
        table.header,
        table.rows.len()
    );
    Ok(table)
}

fn format_pct(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{} %", v),
        None => "-".to_string(),
    }
}

fn print_report(report: &MappingReport, rules: &MappingRules) {
    for vm in report.variables.iter() {
        info!(
            "Variable {} (categories: {:?}, percentages: {:?})",
            vm.variable, vm.category_column, vm.percent_column
        );
        for row in vm.rows.iter() {
            let flag = if row.exceeds(rules.difference_threshold) {
                " <-"
            } else {
                ""
            };
            info!(
                "{:>12} {:<24} -> {:<24} {:>12}  diff {}{}",
                format_pct(Some(row.survey_pct)),
                row.survey_label,
                row.official_label.as_deref().unwrap_or("-"),
                format_pct(row.official_pct),
                format_pct(row.difference),
                flag
            );
        }
        for entry in vm.unmatched_targets.iter() {
            warn!(
                "Variable {}: official category {:?} ({} %) does not match any survey category",
                vm.variable, entry.label, entry.pct
            );
        }
        if !vm.is_ready() {
            warn!("Variable {}: no category to compare", vm.variable);
        }
    }
}

fn mapping_to_json(vm: &VariableMapping, source: &TargetSource, threshold: f64) -> JSValue {
    let mapping: Vec<JSValue> = vm
        .rows
        .iter()
        .map(|row| {
            json!({
                "surveyLabel": row.survey_label,
                "surveyPct": row.survey_pct,
                "officialLabel": row.official_label,
                "officialPct": row.official_pct,
                "difference": row.difference,
                "flagged": row.exceeds(threshold),
            })
        })
        .collect();
    let unmatched: Vec<JSValue> = vm
        .unmatched_targets
        .iter()
        .map(|e| json!({"label": e.label, "pct": e.pct}))
        .collect();
    json!({
        "variable": vm.variable,
        "categoryColumn": vm.category_column,
        "percentColumn": vm.percent_column,
        "filePath": source.file_path,
        "ready": vm.is_ready(),
        "mapping": mapping,
        "unmatchedTargets": unmatched,
    })
}

fn build_summary_js(
    project_name: &str,
    sources: &[TargetSource],
    report: &MappingReport,
    rules: &MappingRules,
) -> JSValue {
    let variables: Vec<JSValue> = report
        .variables
        .iter()
        .zip(sources.iter())
        .map(|(vm, source)| mapping_to_json(vm, source, rules.difference_threshold))
        .collect();
    json!({
        "project": project_name,
        "ready": report.is_ready(),
        "differenceThreshold": rules.difference_threshold,
        "variables": variables,
    })
}

/// Reads the target files, compares them with the survey and assembles the summary.
pub fn compute_summary(
    project_name: &str,
    survey: &SurveyDistribution,
    sources: &[TargetSource],
    root: &Path,
    rules: &MappingRules,
) -> TmResult<JSValue> {
    let mut specs: Vec<TargetSpec> = Vec::new();
    for source in sources {
        let table = read_target_table(root, source)?;
        specs.push(TargetSpec {
            variable: source.variable.clone(),
            table,
            category_column: source.category_column.clone(),
            percent_column: source.percent_column.clone(),
        });
    }

    let report = run_mapping(survey, &specs, rules).context(SelectionSnafu {})?;
    print_report(&report, rules);
    if report.is_ready() {
        info!("All the variables are ready for weighting");
    } else {
        warn!("Some variables have no category to compare, they cannot be weighted");
    }
    Ok(build_summary_js(project_name, sources, &report, rules))
}

fn write_summary(summary: &JSValue, output: &SummaryOutput) -> TmResult<()> {
    let pretty_js = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {
        path: "summary".to_string(),
    })?;
    match output {
        SummaryOutput::Stdout => {
            println!("{}", pretty_js);
        }
        SummaryOutput::File(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty_js).context(WritingSummarySnafu { path })?;
        }
        SummaryOutput::Discard => {}
    }
    Ok(())
}

/// Compares the summary with a reference summary. Differences are printed and reported as an error.
pub fn check_reference(summary: &JSValue, reference_path: &str) -> TmResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("summary reference: {:?}", summary_ref);
    if &summary_ref != summary {
        let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {
            path: reference_path,
        })?;
        let pretty_stats = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {
            path: "summary".to_string(),
        })?;
        warn!("Found differences with the reference summary");
        print_diff(pretty_ref.as_str(), pretty_stats.as_str(), "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

fn finish(
    summary: &JSValue,
    output: Option<SummaryOutput>,
    check_summary_path: Option<String>,
) -> TmResult<()> {
    write_summary(summary, &output.unwrap_or(SummaryOutput::Stdout))?;
    if let Some(summary_p) = check_summary_path {
        check_reference(summary, &summary_p)?;
    }
    Ok(())
}

/// Runs a project described by a configuration file.
///
/// The output given here takes precedence over the output path of the configuration.
pub fn run_project(
    config_path: &str,
    output: Option<SummaryOutput>,
    check_summary_path: Option<String>,
    threshold: Option<f64>,
) -> TmResult<JSValue> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;

    let mut rules = config.rules.mapping_rules();
    if let Some(t) = threshold {
        rules.difference_threshold = t;
    }

    let survey_path = io_common::resolve_path(root_p, &config.survey_distribution_path);
    info!("Attempting to read survey distribution {:?}", survey_path);
    let survey = read_survey_distribution(&survey_path)?;

    let summary = compute_summary(
        &config.output_settings.project_name,
        &survey,
        &config.targets,
        root_p,
        &rules,
    )?;

    let output = output.or_else(|| {
        config
            .output_settings
            .output_path
            .as_ref()
            .map(|p| SummaryOutput::File(io_common::resolve_path(root_p, p)))
    });
    finish(&summary, output, check_summary_path)?;
    Ok(summary)
}

/// Compares a single target file with the survey, without a configuration file.
pub fn run_single(
    survey_path: &str,
    source: &TargetSource,
    output: Option<SummaryOutput>,
    check_summary_path: Option<String>,
    rules: &MappingRules,
) -> TmResult<JSValue> {
    info!("Attempting to read survey distribution {:?}", survey_path);
    let survey = read_survey_distribution(survey_path)?;
    let project_name = io_common::simplify_file_name(&source.file_path);
    let summary = compute_summary(
        &project_name,
        &survey,
        std::slice::from_ref(source),
        Path::new(""),
        rules,
    )?;
    finish(&summary, output, check_summary_path)?;
    Ok(summary)
}
