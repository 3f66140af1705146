// Primitives for reading Excel workbooks.

use calamine::DataType;

use crate::tm::{io_common::assemble_table, *};

pub fn read_xlsx_table(path: &str, worksheet_name: Option<&str>) -> TmResult<TargetTable> {
    let wrange = get_range(path, worksheet_name)?;
    let rows: Vec<Vec<Cell>> = wrange
        .rows()
        .map(|row| row.iter().map(read_cell).collect())
        .collect();
    debug!("read_xlsx_table: path: {:?} rows: {:?}", path, rows.len());
    Ok(assemble_table(rows))
}

pub fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) if s.is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Bool(*b),
        DataType::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> TmResult<calamine::Range<DataType>> {
    debug!(
        "read_xlsx_table: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    let wrange = if let Some(name) = worksheet_name {
        workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?
    };
    Ok(wrange)
}
