use std::path::Path;

use tracing::debug;

use crate::error::{GnfError, Result};
use crate::io::sequence::read_data_files;

/// A numeric CSV table, column-major.
#[derive(Clone, Debug)]
pub struct Table {
    pub headers: Vec<String>,
    /// One Vec per header, all the same length.
    pub columns: Vec<Vec<f64>>,
}

impl Table {
    pub fn rows(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|i| self.columns[i].as_slice())
    }
}

/// Read a headed CSV file as a numeric table.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(GnfError::TableMismatch(format!(
                "row has {} fields, header has {} in {}",
                record.len(),
                headers.len(),
                path.display()
            )));
        }
        for (i, field) in record.iter().enumerate() {
            let value = field.parse::<f64>().map_err(|_| {
                GnfError::TableMismatch(format!(
                    "non-numeric value '{field}' in column '{}' of {}",
                    headers[i],
                    path.display()
                ))
            })?;
            columns[i].push(value);
        }
    }

    Ok(Table { headers, columns })
}

/// Write a numeric table as a headed CSV file.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in 0..table.rows() {
        let fields: Vec<String> = table.columns.iter().map(|c| c[row].to_string()).collect();
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

/// Element-wise average of the named columns across every CSV in a
/// directory.
///
/// Each file must contain every requested column and the same number of
/// rows. The output holds the averaged columns first, then the remaining
/// columns of the last file unchanged. Averaging `k` identical files
/// returns the single file's values.
pub fn average_data(dir: &Path, columns: &[String]) -> Result<Table> {
    if columns.is_empty() {
        return Err(GnfError::InvalidParameter(
            "at least one column to average is required".to_string(),
        ));
    }

    let entries = read_data_files(dir)?;
    let mut sums: Vec<Vec<f64>> = Vec::new();
    let mut last: Option<Table> = None;

    for entry in &entries {
        let table = read_table(&entry.path)?;
        for label in columns {
            if table.column(label).is_none() {
                return Err(GnfError::MissingColumn {
                    column: label.clone(),
                    path: entry.path.clone(),
                });
            }
        }

        if sums.is_empty() {
            sums = columns
                .iter()
                .map(|label| table.column(label).unwrap().to_vec())
                .collect();
        } else {
            for (sum, label) in sums.iter_mut().zip(columns) {
                let col = table.column(label).unwrap();
                if col.len() != sum.len() {
                    return Err(GnfError::TableMismatch(format!(
                        "{} has {} rows, expected {}",
                        entry.path.display(),
                        col.len(),
                        sum.len()
                    )));
                }
                for (s, &v) in sum.iter_mut().zip(col) {
                    *s += v;
                }
            }
        }
        last = Some(table);
    }

    let k = entries.len() as f64;
    debug!(files = entries.len(), "Averaged data files");
    let last = last.expect("read_data_files guarantees at least one entry");

    let mut headers: Vec<String> = columns.to_vec();
    let mut out_columns: Vec<Vec<f64>> = sums
        .into_iter()
        .map(|col| col.into_iter().map(|v| v / k).collect())
        .collect();

    // Carry the remaining columns of the last file unchanged.
    for (header, column) in last.headers.iter().zip(&last.columns) {
        if !columns.contains(header) {
            headers.push(header.clone());
            out_columns.push(column.clone());
        }
    }

    Ok(Table {
        headers,
        columns: out_columns,
    })
}
