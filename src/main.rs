mod args;
mod tm;

use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

use target_mapping::MappingRules;

use crate::tm::config_reader::TargetSource;
use crate::tm::{SummaryOutput, TmResult};

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn missing(name: &str) -> tm::TmError {
    tm::TmError::Whatever {
        message: format!(
            "missing option --{} (or use --config with a project file)",
            name
        ),
        source: None,
    }
}

fn run(args: &args::Args) -> TmResult<()> {
    let output = SummaryOutput::from_arg(&args.out);

    if let Some(config_path) = args.config.clone() {
        tm::run_project(
            &config_path,
            output,
            args.reference.clone(),
            args.threshold,
        )?;
        return Ok(());
    }

    let survey_path = args.survey.clone().ok_or_else(|| missing("survey"))?;
    let source = TargetSource {
        variable: args.variable.clone().ok_or_else(|| missing("variable"))?,
        file_path: args.input.clone().ok_or_else(|| missing("input"))?,
        provider: args.input_type.clone(),
        category_column: args
            .category_column
            .clone()
            .ok_or_else(|| missing("category-column"))?,
        percent_column: args
            .percent_column
            .clone()
            .ok_or_else(|| missing("percent-column"))?,
        csv_delimiter: args.csv_delimiter.map(|c| c.to_string()),
        excel_worksheet_name: args.excel_worksheet_name.clone(),
    };

    let mut rules = MappingRules::DEFAULT_RULES;
    if let Some(t) = args.threshold {
        rules.difference_threshold = t;
    }
    tm::run_single(
        &survey_path,
        &source,
        output,
        args.reference.clone(),
        &rules,
    )?;
    Ok(())
}

fn main() {
    let args = args::Args::parse();
    init_logging(args.verbose);
    info!("args: {:?}", args);

    if let Err(e) = run(&args) {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_option(argv: &[&str]) -> String {
        let args = args::Args::parse_from(argv);
        match run(&args) {
            Err(tm::TmError::Whatever { message, .. }) => message,
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn single_file_requires_options() {
        assert!(missing_option(&["targetmap"]).contains("--survey"));
        assert!(missing_option(&["targetmap", "-s", "dist.json"]).contains("--variable"));
        assert!(
            missing_option(&["targetmap", "-s", "dist.json", "--variable", "sexe"])
                .contains("--input")
        );
        assert!(missing_option(&[
            "targetmap",
            "-s",
            "dist.json",
            "--variable",
            "sexe",
            "-i",
            "sexe.csv",
            "--category-column",
            "Modalité",
        ])
        .contains("--percent-column"));
    }
}
