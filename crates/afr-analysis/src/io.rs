//! Two-column CSV series files.
//!
//! Each record holds one `x,y` sample. There is no header row. Fields may be
//! quoted and surrounding whitespace is ignored. Blank lines are skipped and
//! columns beyond the second are not read. Any malformed record fails the
//! whole read with its 1-based line number.

use std::{fs::File, io, path::Path};

use afr_stats::series::{SeriesError, TimeSeries};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SeriesIoError {
    #[display("failed to open series file {path}")]
    Open { path: String, source: io::Error },
    #[display("failed to read {path}")]
    Read { path: String, source: csv::Error },
    #[display("{path}:{line}: expected two comma-separated columns")]
    MissingColumn { path: String, line: u64 },
    #[display("{path}:{line}: column {column} is not a number: '{value}'")]
    InvalidNumber {
        path: String,
        line: u64,
        column: usize,
        value: String,
    },
    #[display("{path}: invalid series")]
    Series { path: String, source: SeriesError },
    #[display("failed to write series file {path}")]
    Write { path: String, source: csv::Error },
}

/// Reads an `x,y` series from the file at `path`.
pub fn read_series<P>(path: P) -> Result<TimeSeries, SeriesIoError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let name = path.display().to_string();
    let file = File::open(path).map_err(|source| SeriesIoError::Open {
        path: name.clone(),
        source,
    })?;
    parse_series(file, &name)
}

/// Parses `x,y` records from `reader`; `name` labels errors.
pub fn parse_series<R>(reader: R, name: &str) -> Result<TimeSeries, SeriesIoError>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut xs = vec![];
    let mut ys = vec![];
    for record in reader.records() {
        let record = record.map_err(|source| SeriesIoError::Read {
            path: name.to_owned(),
            source,
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let line = record.position().map_or(0, csv::Position::line);
        let (Some(x), Some(y)) = (record.get(0), record.get(1)) else {
            return Err(SeriesIoError::MissingColumn {
                path: name.to_owned(),
                line,
            });
        };
        xs.push(parse_number(x, name, line, 1)?);
        ys.push(parse_number(y, name, line, 2)?);
    }

    TimeSeries::new(xs, ys).map_err(|source| SeriesIoError::Series {
        path: name.to_owned(),
        source,
    })
}

fn parse_number(field: &str, name: &str, line: u64, column: usize) -> Result<f64, SeriesIoError> {
    field.parse::<f64>().map_err(|_| SeriesIoError::InvalidNumber {
        path: name.to_owned(),
        line,
        column,
        value: field.to_owned(),
    })
}

/// Writes `(xs[i], ys[i])` rows to the file at `path`, replacing it.
pub fn write_series<P>(xs: &[f64], ys: &[f64], path: P) -> Result<(), SeriesIoError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let wrap = |source| SeriesIoError::Write {
        path: path.display().to_string(),
        source,
    };
    let file = File::create(path).map_err(|err| wrap(csv::Error::from(err)))?;
    write_rows(file, xs, ys).map_err(wrap)
}

/// Writes `x,y` rows, one pair per line.
pub fn write_rows<W>(writer: W, xs: &[f64], ys: &[f64]) -> csv::Result<()>
where
    W: io::Write,
{
    write_columns(writer, None, &[xs, ys])
}

/// Writes equal-length `columns` side by side, one row per index, after an
/// optional `header` record.
pub fn write_columns<W>(writer: W, header: Option<&[&str]>, columns: &[&[f64]]) -> csv::Result<()>
where
    W: io::Write,
{
    let len = columns.first().map_or(0, |column| column.len());
    assert!(
        columns.iter().all(|column| column.len() == len),
        "columns must have equal length"
    );

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    if let Some(header) = header {
        writer.write_record(header)?;
    }
    for i in 0..len {
        writer.write_record(columns.iter().map(|column| column[i].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
