// ********* Input data structures ***********

use indexmap::IndexMap;
use std::error::Error;
use std::fmt::Display;

/// The raw content of a spreadsheet cell, as delivered by the file readers.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// The textual form of the cell, the way a spreadsheet would print it.
    ///
    /// Integral numbers are printed without a fractional part (`48.0` gives `"48"`).
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(x) => x.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Cell {
        Cell::Number(x)
    }
}

/// A spreadsheet reduced to its header and its data rows.
///
/// Rows may be shorter than the header: missing cells are read as empty.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct TargetTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TargetTable {
    /// The position of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// The distribution of the categories of each variable, as observed in the survey.
///
/// Both the variables and the categories keep the order in which they were provided.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SurveyDistribution {
    variables: Vec<(String, Vec<(String, f64)>)>,
}

impl SurveyDistribution {
    pub fn new() -> SurveyDistribution {
        SurveyDistribution::default()
    }

    /// Sets the categories of a variable. A variable that is inserted again is replaced in place.
    pub fn insert(&mut self, variable: &str, categories: Vec<(String, f64)>) {
        if let Some(elt) = self.variables.iter_mut().find(|(v, _)| v == variable) {
            elt.1 = categories;
        } else {
            self.variables.push((variable.to_string(), categories));
        }
    }

    /// The categories of a variable. Unknown variables have no categories.
    pub fn categories(&self, variable: &str) -> &[(String, f64)] {
        self.variables
            .iter()
            .find(|(v, _)| v == variable)
            .map(|(_, cats)| cats.as_slice())
            .unwrap_or(&[])
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(v, _)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// An official category, as written in the target file.
#[derive(PartialEq, Debug, Clone)]
pub struct TargetEntry {
    pub label: String,
    pub pct: f64,
}

/// The official categories of one target file, indexed by canonical label.
///
/// Iteration follows the order in which the keys were first seen. When several rows share
/// a key, the entry holds the content of the last one.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct TargetDictionary {
    entries: IndexMap<String, TargetEntry>,
}

impl TargetDictionary {
    pub fn new() -> TargetDictionary {
        TargetDictionary::default()
    }

    /// Inserts an entry. Returns the entry it replaced, if any.
    pub fn insert(&mut self, key: String, entry: TargetEntry) -> Option<TargetEntry> {
        self.entries.insert(key, entry)
    }

    pub fn get(&self, key: &str) -> Option<&TargetEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The choices made for one variable: the target file and the two columns to read in it.
#[derive(PartialEq, Debug, Clone)]
pub struct TargetSpec {
    pub variable: String,
    pub table: TargetTable,
    pub category_column: String,
    pub percent_column: String,
}

// ******** Output data structures *********

/// One line of the comparison between the survey and the official distribution.
#[derive(PartialEq, Debug, Clone)]
pub struct MappingRow {
    pub survey_label: String,
    /// Rounded to 4 decimals.
    pub survey_pct: f64,
    pub official_label: Option<String>,
    /// Exactly as read from the target file.
    pub official_pct: Option<f64>,
    /// Survey minus official, rounded to 4 decimals.
    pub difference: Option<f64>,
}

impl MappingRow {
    pub fn is_matched(&self) -> bool {
        self.official_label.is_some()
    }

    /// True if the category was matched and the gap is strictly larger than the threshold
    /// (in percentage points, either direction).
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.difference.map(|d| d.abs() > threshold).unwrap_or(false)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct VariableMapping {
    pub variable: String,
    pub category_column: String,
    pub percent_column: String,
    pub rows: Vec<MappingRow>,
    /// Official categories that no survey category matched.
    pub unmatched_targets: Vec<TargetEntry>,
}

impl VariableMapping {
    /// A variable can be sent for weighting once it has a mapping to show.
    pub fn is_ready(&self) -> bool {
        !self.rows.is_empty()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct MappingReport {
    pub variables: Vec<VariableMapping>,
}

impl MappingReport {
    pub fn is_ready(&self) -> bool {
        !self.variables.is_empty() && self.variables.iter().all(|v| v.is_ready())
    }

    pub fn get(&self, variable: &str) -> Option<&VariableMapping> {
        self.variables.iter().find(|v| v.variable == variable)
    }
}

/// Errors in the selection of the variables and columns.
///
/// The mapping itself never fails.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MappingErrors {
    NoVariables,
    TooManyVariables { count: usize, max: usize },
    DuplicateVariable(String),
    UnknownColumn { variable: String, column: String },
}

impl Error for MappingErrors {}

impl Display for MappingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingErrors::NoVariables => write!(f, "no variable selected"),
            MappingErrors::TooManyVariables { count, max } => {
                write!(f, "{} variables selected, at most {} are allowed", count, max)
            }
            MappingErrors::DuplicateVariable(v) => {
                write!(f, "variable {:?} has more than one target file", v)
            }
            MappingErrors::UnknownColumn { variable, column } => {
                write!(
                    f,
                    "variable {:?}: column {:?} not found in the target file header",
                    variable, column
                )
            }
        }
    }
}

// ********* Configuration **********

#[derive(PartialEq, Debug, Clone)]
pub struct MappingRules {
    /// Differences strictly above this value (in percentage points) are flagged.
    pub difference_threshold: f64,
    /// The number of variables that can be weighted together.
    pub max_variables: usize,
}

impl MappingRules {
    pub const DEFAULT_RULES: MappingRules = MappingRules {
        difference_threshold: 5.0,
        max_variables: 3,
    };
}

impl Default for MappingRules {
    fn default() -> Self {
        MappingRules::DEFAULT_RULES
    }
}
