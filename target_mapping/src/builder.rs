pub use crate::config::*;

/// A builder for comparing the survey with the target files, one variable at a time.
///
/// The selection is checked as the variables are added.
///
/// ```
/// pub use target_mapping::builder::Builder;
/// pub use target_mapping::{Cell, MappingRules, TargetTable};
/// # use target_mapping::MappingErrors;
///
/// let mut builder = Builder::new(&MappingRules::DEFAULT_RULES)?
///     .survey_categories("sexe", &[("Homme", 45.2), ("Femme", 54.8)])?;
///
/// let table = TargetTable {
///     header: vec!["Modalité".to_string(), "%".to_string()],
///     rows: vec![
///         vec![Cell::from("hommes"), Cell::from("48,0%")],
///         vec![Cell::from("FEMME"), Cell::from("52")],
///     ],
/// };
/// builder.add_target("sexe", &table, "Modalité", "%")?;
///
/// let report = builder.build()?;
/// assert!(report.is_ready());
/// assert_eq!(report.variables[0].rows[1].difference, Some(2.8));
///
/// # Ok::<(), MappingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: MappingRules,
    pub(crate) _survey: SurveyDistribution,
    pub(crate) _targets: Vec<TargetSpec>,
}

impl Builder {
    pub fn new(rules: &MappingRules) -> Result<Builder, MappingErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _survey: SurveyDistribution::new(),
            _targets: Vec::new(),
        })
    }

    /// Replaces the survey distribution.
    pub fn survey(self, survey: &SurveyDistribution) -> Result<Builder, MappingErrors> {
        Ok(Builder {
            _rules: self._rules,
            _survey: survey.clone(),
            _targets: self._targets,
        })
    }

    /// Sets the survey distribution of a single variable.
    pub fn survey_categories(
        mut self,
        variable: &str,
        categories: &[(&str, f64)],
    ) -> Result<Builder, MappingErrors> {
        self._survey.insert(
            variable,
            categories
                .iter()
                .map(|(label, pct)| (label.to_string(), *pct))
                .collect(),
        );
        Ok(self)
    }

    /// Adds the target file of a variable.
    ///
    /// The columns are given by their names in the header. The first column with that name is used.
    pub fn add_target(
        &mut self,
        variable: &str,
        table: &TargetTable,
        category_column: &str,
        percent_column: &str,
    ) -> Result<(), MappingErrors> {
        self.add_target_2(&TargetSpec {
            variable: variable.to_string(),
            table: table.clone(),
            category_column: category_column.to_string(),
            percent_column: percent_column.to_string(),
        })
    }

    pub fn add_target_2(&mut self, spec: &TargetSpec) -> Result<(), MappingErrors> {
        if self._targets.iter().any(|t| t.variable == spec.variable) {
            return Err(MappingErrors::DuplicateVariable(spec.variable.clone()));
        }
        if self._targets.len() >= self._rules.max_variables {
            return Err(MappingErrors::TooManyVariables {
                count: self._targets.len() + 1,
                max: self._rules.max_variables,
            });
        }
        for column in [&spec.category_column, &spec.percent_column] {
            if spec.table.column_index(column).is_none() {
                return Err(MappingErrors::UnknownColumn {
                    variable: spec.variable.clone(),
                    column: column.clone(),
                });
            }
        }
        self._targets.push(spec.clone());
        Ok(())
    }

    pub fn build(&self) -> Result<MappingReport, MappingErrors> {
        crate::run_mapping(&self._survey, &self._targets, &self._rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &str)]) -> TargetTable {
        TargetTable {
            header: vec!["Libellé".to_string(), "Part".to_string()],
            rows: rows
                .iter()
                .map(|(l, p)| vec![Cell::from(*l), Cell::from(*p)])
                .collect(),
        }
    }

    #[test]
    fn builder_checks_selection_eagerly() {
        let rules = MappingRules {
            difference_threshold: 5.0,
            max_variables: 2,
        };
        let mut builder = Builder::new(&rules).unwrap();
        let t = table(&[("Nord", "20")]);
        builder.add_target("region", &t, "Libellé", "Part").unwrap();
        assert_eq!(
            builder.add_target("region", &t, "Libellé", "Part"),
            Err(MappingErrors::DuplicateVariable("region".to_string()))
        );
        assert_eq!(
            builder.add_target("age", &t, "Libellé", "Pourcentage"),
            Err(MappingErrors::UnknownColumn {
                variable: "age".to_string(),
                column: "Pourcentage".to_string()
            })
        );
        builder.add_target("age", &t, "Libellé", "Part").unwrap();
        assert_eq!(
            builder.add_target("sexe", &t, "Libellé", "Part"),
            Err(MappingErrors::TooManyVariables { count: 3, max: 2 })
        );
    }

    #[test]
    fn builder_without_variables() {
        let builder = Builder::new(&MappingRules::DEFAULT_RULES).unwrap();
        assert_eq!(builder.build(), Err(MappingErrors::NoVariables));
    }

    #[test]
    fn builder_report() {
        let mut survey = SurveyDistribution::new();
        survey.insert(
            "region",
            vec![("Nord".to_string(), 22.5), ("Sud".to_string(), 77.5)],
        );
        let mut builder = Builder::new(&MappingRules::DEFAULT_RULES)
            .unwrap()
            .survey(&survey)
            .unwrap();
        builder
            .add_target(
                "region",
                &table(&[("nord", "30"), ("Est", "10"), ("SUD", "60")]),
                "Libellé",
                "Part",
            )
            .unwrap();
        let report = builder.build().unwrap();
        let region = report.get("region").unwrap();
        assert_eq!(region.rows.len(), 2);
        assert_eq!(region.rows[0].difference, Some(-7.5));
        assert_eq!(region.rows[1].difference, Some(17.5));
        assert!(region.rows[1].exceeds(5.0));
        assert_eq!(region.unmatched_targets.len(), 1);
        assert_eq!(region.unmatched_targets[0].label, "Est");
    }
}
