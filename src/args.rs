use clap::Parser;

/// This program compares the distribution of a survey with official target files, before weighting.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the project: the survey distribution and one
    /// target file per variable. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, targetmap will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, without --config) The survey distribution, in JSON format.
    #[clap(short, long, value_parser)]
    pub survey: Option<String>,

    /// (without --config) The variable to compare.
    #[clap(long, value_parser)]
    pub variable: Option<String>,

    /// (file path, without --config) The target file of the variable.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. Deduced from the extension of the file by default.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (without --config) The name of the column with the categories in the target file.
    #[clap(long, value_parser)]
    pub category_column: Option<String>,

    /// (without --config) The name of the column with the percentages in the target file.
    #[clap(long, value_parser)]
    pub percent_column: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. The first worksheet by default.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// When using a CSV file, the separator between the fields. Detected by default.
    #[clap(long, value_parser)]
    pub csv_delimiter: Option<char>,

    /// (number, default 5) Differences larger than this value, in percentage points, are flagged.
    /// Setting this option overrides the value that may be specified with the --config option.
    #[clap(long, value_parser)]
    pub threshold: Option<f64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
