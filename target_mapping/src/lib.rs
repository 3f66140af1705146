mod config;
pub mod builder;
pub mod manual;

use log::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use std::collections::HashSet;

pub use crate::config::*;

/// Number of decimals kept for the survey percentages and the differences.
const DECIMALS: i32 = 4;

/// The key under which two labels are considered to be the same category.
///
/// The case, the accents, the surrounding spaces and the punctuation are ignored:
/// `"Hômmes"`, `" hommes "` and `"HOMMES,"` all give `"hommes"`. Plurals are not folded.
///
/// ```
/// use target_mapping::canonical_label;
///
/// assert_eq!(canonical_label("  Île-de-France "), "ile de france");
/// assert_eq!(canonical_label("18–24 ans"), "18 24 ans");
/// ```
pub fn canonical_label(label: &str) -> String {
    let folded: String = label
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut key = String::with_capacity(folded.len());
    let mut in_gap = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            // Runs of other characters collapse to one space, none at the edges.
            if in_gap && !key.is_empty() {
                key.push(' ');
            }
            in_gap = false;
            key.push(c);
        } else {
            in_gap = true;
        }
    }
    key
}

/// Reads a percentage as written in a spreadsheet: `"12,5%"`, `" 12.5 "`, `"48"`.
///
/// The number is returned on the same scale as written, nothing is rescaled.
/// Text after the number is ignored. Returns `None` if no finite number can be read.
pub fn parse_percentage(raw: &str) -> Option<f64> {
    let s = raw.trim().replacen(',', ".", 1).replacen('%', "", 1);
    leading_number(s.trim_start()).filter(|x| x.is_finite())
}

pub fn parse_percentage_cell(cell: &Cell) -> Option<f64> {
    parse_percentage(&cell.to_text())
}

// The longest prefix that reads as a decimal number.
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let skip_digits = |mut pos: usize| {
        while pos < len && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        pos
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_end = skip_digits(end);
    let mut num_digits = int_end - end;
    end = int_end;
    if end < len && bytes[end] == b'.' {
        let frac_end = skip_digits(end + 1);
        num_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if num_digits == 0 {
        return None;
    }
    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_start = end + 1;
        if exp_start < len && (bytes[exp_start] == b'+' || bytes[exp_start] == b'-') {
            exp_start += 1;
        }
        let exp_end = skip_digits(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

fn round_decimals(x: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS);
    (x * scale).round() / scale
}

/// Builds the dictionary of the official categories from the rows of a target file.
///
/// Rows without a readable percentage are dropped. If several rows share the same
/// canonical label, the last one wins.
pub fn build_target_dictionary(
    rows: &[Vec<Cell>],
    category_idx: usize,
    percent_idx: usize,
) -> TargetDictionary {
    let mut dictionary = TargetDictionary::new();
    for (lineno, row) in rows.iter().enumerate() {
        let label = row.get(category_idx).map(Cell::to_text).unwrap_or_default();
        let pct = match row.get(percent_idx).and_then(parse_percentage_cell) {
            Some(x) => x,
            None => {
                debug!(
                    "build_target_dictionary: row {}: skipping {:?}: no percentage in {:?}",
                    lineno,
                    label,
                    row.get(percent_idx)
                );
                continue;
            }
        };
        let key = canonical_label(&label);
        if let Some(previous) = dictionary.insert(key.clone(), TargetEntry { label, pct }) {
            debug!(
                "build_target_dictionary: row {}: key {:?} replaces {:?}",
                lineno, key, previous
            );
        }
    }
    debug!(
        "build_target_dictionary: {} rows, {} categories",
        rows.len(),
        dictionary.len()
    );
    dictionary
}

/// Joins the survey categories of one variable with the official categories.
///
/// Exactly one row is returned per survey category, in the survey order.
pub fn map_categories(survey: &[(String, f64)], dictionary: &TargetDictionary) -> Vec<MappingRow> {
    survey
        .iter()
        .map(|(label, pct)| {
            let official = dictionary.get(&canonical_label(label));
            debug!("map_categories: {:?} -> {:?}", label, official);
            MappingRow {
                survey_label: label.clone(),
                survey_pct: round_decimals(*pct),
                official_label: official.map(|e| e.label.clone()),
                official_pct: official.map(|e| e.pct),
                difference: official.map(|e| round_decimals(pct - e.pct)),
            }
        })
        .collect()
}

/// The official categories that none of the survey categories matched, in dictionary order.
pub fn unmatched_targets<'a>(
    survey: &[(String, f64)],
    dictionary: &'a TargetDictionary,
) -> Vec<&'a TargetEntry> {
    let survey_keys: HashSet<String> = survey
        .iter()
        .map(|(label, _)| canonical_label(label))
        .collect();
    dictionary
        .iter()
        .filter(|(key, _)| !survey_keys.contains(*key))
        .map(|(_, entry)| entry)
        .collect()
}

fn check_selection(specs: &[TargetSpec], rules: &MappingRules) -> Result<(), MappingErrors> {
    if specs.is_empty() {
        return Err(MappingErrors::NoVariables);
    }
    if specs.len() > rules.max_variables {
        return Err(MappingErrors::TooManyVariables {
            count: specs.len(),
            max: rules.max_variables,
        });
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.variable.as_str()) {
            return Err(MappingErrors::DuplicateVariable(spec.variable.clone()));
        }
    }
    Ok(())
}

fn resolve_column(spec: &TargetSpec, column: &str) -> Result<usize, MappingErrors> {
    spec.table
        .column_index(column)
        .ok_or_else(|| MappingErrors::UnknownColumn {
            variable: spec.variable.clone(),
            column: column.to_string(),
        })
}

/// Compares the survey distribution with the target file of each selected variable.
///
/// Arguments:
/// * `survey` the distribution observed in the survey, for all the variables
/// * `specs` one target file per selected variable, with the names of the category and
/// percentage columns
/// * `rules` the limits on the selection
pub fn run_mapping(
    survey: &SurveyDistribution,
    specs: &[TargetSpec],
    rules: &MappingRules,
) -> Result<MappingReport, MappingErrors> {
    info!(
        "Processing {:?} variables, rules: {:?}",
        specs.len(),
        rules
    );
    check_selection(specs, rules)?;

    let mut variables: Vec<VariableMapping> = Vec::new();
    for spec in specs {
        let category_idx = resolve_column(spec, &spec.category_column)?;
        let percent_idx = resolve_column(spec, &spec.percent_column)?;
        debug!(
            "run_mapping: variable {:?}: category column {}, percent column {}",
            spec.variable, category_idx, percent_idx
        );

        let dictionary = build_target_dictionary(&spec.table.rows, category_idx, percent_idx);
        let categories = survey.categories(&spec.variable);
        if categories.is_empty() {
            warn!(
                "Variable {:?}: no survey distribution, nothing to compare",
                spec.variable
            );
        }

        let rows = map_categories(categories, &dictionary);
        let unmatched: Vec<TargetEntry> = unmatched_targets(categories, &dictionary)
            .into_iter()
            .cloned()
            .collect();
        info!(
            "Variable {:?}: {} of {} categories matched, {} official categories unused",
            spec.variable,
            rows.iter().filter(|r| r.is_matched()).count(),
            rows.len(),
            unmatched.len()
        );

        variables.push(VariableMapping {
            variable: spec.variable.clone(),
            category_column: spec.category_column.clone(),
            percent_column: spec.percent_column.clone(),
            rows,
            unmatched_targets: unmatched,
        });
    }
    Ok(MappingReport { variables })
}
