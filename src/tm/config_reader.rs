use crate::tm::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "projectName")]
    pub project_name: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TargetSource {
    pub variable: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub provider: Option<String>,
    #[serde(rename = "categoryColumn")]
    pub category_column: String,
    #[serde(rename = "percentColumn")]
    pub percent_column: String,
    #[serde(rename = "csvDelimiter")]
    pub csv_delimiter: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

/// The supported formats for the target files.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Xlsx,
}

impl TargetSource {
    /// The provider, given explicitly or deduced from the extension of the file.
    pub fn provider(&self) -> TmResult<Provider> {
        let name = match &self.provider {
            Some(p) => p.to_lowercase(),
            None => Path::new(&self.file_path)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_default(),
        };
        match name.as_str() {
            "csv" => Ok(Provider::Csv),
            "xlsx" => Ok(Provider::Xlsx),
            _ => UnknownProviderSnafu {
                provider: name,
                path: self.file_path.clone(),
            }
            .fail(),
        }
    }

    pub fn csv_delimiter(&self) -> TmResult<Option<u8>> {
        match self.csv_delimiter.as_deref() {
            None => Ok(None),
            Some(s) => read_delimiter(s).map(Some),
        }
    }
}

pub fn read_delimiter(s: &str) -> TmResult<u8> {
    let s = match s {
        "\\t" | "tab" => "\t",
        x => x,
    };
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => whatever!("the CSV delimiter must be a single ASCII character, got {:?}", s),
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct TmRules {
    #[serde(rename = "differenceThreshold")]
    pub difference_threshold: Option<f64>,
    #[serde(rename = "maxVariables")]
    pub max_variables: Option<usize>,
}

impl TmRules {
    pub fn mapping_rules(&self) -> MappingRules {
        let defaults = MappingRules::DEFAULT_RULES;
        MappingRules {
            difference_threshold: self
                .difference_threshold
                .unwrap_or(defaults.difference_threshold),
            max_variables: self.max_variables.unwrap_or(defaults.max_variables),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TmConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "surveyDistributionPath")]
    pub survey_distribution_path: String,
    pub targets: Vec<TargetSource>,
    #[serde(default)]
    pub rules: TmRules,
}

pub fn read_config(path: &str) -> TmResult<TmConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Reads a JSON summary, for example a reference summary.
pub fn read_summary(path: &str) -> TmResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Reads the survey distribution: `{ variable: { label: percentage } }`.
///
/// The order of the variables and of the labels is kept.
pub fn read_survey_distribution(path: &str) -> TmResult<SurveyDistribution> {
    let js = read_summary(path)?;
    parse_survey_distribution(&js)
}

pub fn parse_survey_distribution(js: &JSValue) -> TmResult<SurveyDistribution> {
    let variables = js.as_object().context(SurveyFormatSnafu {
        variable: "".to_string(),
    })?;
    let mut res = SurveyDistribution::new();
    for (variable, cats_js) in variables.iter() {
        let cats = cats_js.as_object().context(SurveyFormatSnafu {
            variable: variable.clone(),
        })?;
        let mut categories: Vec<(String, f64)> = Vec::new();
        for (label, pct_js) in cats.iter() {
            let pct = pct_js.as_f64().context(SurveyNotNumberSnafu {
                variable: variable.clone(),
                label: label.clone(),
            })?;
            categories.push((label.clone(), pct));
        }
        debug!(
            "parse_survey_distribution: variable {:?}: {:?}",
            variable, categories
        );
        res.insert(variable, categories);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(file_path: &str, provider: Option<&str>) -> TargetSource {
        TargetSource {
            variable: "sexe".to_string(),
            file_path: file_path.to_string(),
            provider: provider.map(|s| s.to_string()),
            category_column: "Modalité".to_string(),
            percent_column: "Pourcentage".to_string(),
            csv_delimiter: None,
            excel_worksheet_name: None,
        }
    }

    #[test]
    fn provider_from_extension() {
        assert_eq!(source("a/b.csv", None).provider().unwrap(), Provider::Csv);
        assert_eq!(source("b.XLSX", None).provider().unwrap(), Provider::Xlsx);
        assert_eq!(
            source("b.txt", Some("csv")).provider().unwrap(),
            Provider::Csv
        );
        assert!(source("b.ods", None).provider().is_err());
        assert!(source("noext", None).provider().is_err());
    }

    #[test]
    fn delimiters() {
        assert_eq!(read_delimiter(";").unwrap(), b';');
        assert_eq!(read_delimiter("\\t").unwrap(), b'\t');
        assert_eq!(read_delimiter("tab").unwrap(), b'\t');
        assert!(read_delimiter(";;").is_err());
        assert!(read_delimiter("").is_err());
        assert!(read_delimiter("é").is_err());
    }

    #[test]
    fn config_with_defaults() {
        let js = r#"{
            "outputSettings": { "projectName": "p" },
            "surveyDistributionPath": "dist.json",
            "targets": [
                { "variable": "sexe", "filePath": "sexe.csv",
                  "categoryColumn": "Modalité", "percentColumn": "Pourcentage" }
            ]
        }"#;
        let config: TmConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].provider, None);
        assert_eq!(config.rules.mapping_rules(), MappingRules::DEFAULT_RULES);
    }

    #[test]
    fn rules_override() {
        let rules = TmRules {
            difference_threshold: Some(2.5),
            max_variables: None,
        };
        let mr = rules.mapping_rules();
        assert_eq!(mr.difference_threshold, 2.5);
        assert_eq!(mr.max_variables, 3);
    }

    #[test]
    fn survey_keeps_order() {
        let js = json!({
            "sexe": { "Hommes": 45.2, "Femmes": 54.8 },
            "age": { "65 ans et +": 26.5, "18-34 ans": 28, "35-64 ans": 45.5 }
        });
        let dist = parse_survey_distribution(&js).unwrap();
        assert!(!dist.is_empty());
        let vars: Vec<&str> = dist.variables().collect();
        assert_eq!(vars, vec!["sexe", "age"]);
        let labels: Vec<&str> = dist
            .categories("age")
            .iter()
            .map(|(l, _)| l.as_str())
            .collect();
        assert_eq!(labels, vec!["65 ans et +", "18-34 ans", "35-64 ans"]);
        assert_eq!(dist.categories("age")[1].1, 28.0);
    }

    #[test]
    fn survey_rejects_bad_values() {
        let js = json!({ "sexe": { "Hommes": "45,2" } });
        assert!(parse_survey_distribution(&js).is_err());
        let js = json!({ "sexe": [1, 2] });
        assert!(parse_survey_distribution(&js).is_err());
        let js = json!([]);
        assert!(parse_survey_distribution(&js).is_err());
        assert!(parse_survey_distribution(&json!({})).unwrap().is_empty());
    }
}
