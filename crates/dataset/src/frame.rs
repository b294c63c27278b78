//! Column-oriented in-memory table.

use serde_json::{Map, Number, Value};

use crate::error::DatasetError;

/// Cell text treated as missing when inferring and parsing columns.
const MISSING_TOKENS: &[&str] = &[
    "", "na", "n/a", "nan", "-nan", "null", "none", "#n/a", "<na>",
];

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Categorical,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnKind::Categorical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Categorical => "categorical",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

/// A named, typed column. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let integer = values
            .iter()
            .flatten()
            .all(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
            && values.iter().any(Option::is_some)
            && values.iter().all(Option::is_some);
        Self {
            name: name.into(),
            kind: if integer {
                ColumnKind::Integer
            } else {
                ColumnKind::Float
            },
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical,
            data: ColumnData::Categorical(values),
        }
    }

    /// Infers the column type from raw cell text: numeric when every non-missing cell parses
    /// as a finite number, categorical otherwise.
    pub fn infer(name: impl Into<String>, cells: &[Option<&str>]) -> Self {
        let normalized: Vec<Option<&str>> = cells
            .iter()
            .map(|cell| cell.map(str::trim).filter(|c| !is_missing_token(c)))
            .collect();

        let parsed: Option<Vec<Option<f64>>> = normalized
            .iter()
            .map(|cell| match cell {
                None => Some(None),
                Some(text) => text.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some),
            })
            .collect();

        match parsed {
            Some(values) => Self::numeric(name, values),
            None => Self::categorical(
                name,
                normalized
                    .into_iter()
                    .map(|cell| cell.map(str::to_string))
                    .collect(),
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Categorical(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    pub fn non_null_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Raw numeric cells, or `None` for categorical columns.
    pub fn numeric_cells(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Non-missing numeric values in row order, or `None` for categorical columns.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        self.numeric_cells()
            .map(|cells| cells.iter().flatten().copied().collect())
    }

    /// Cell rendered as text; `None` when missing.
    pub fn cell_text(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten().map(|n| format_number(n, self.kind)),
            ColumnData::Categorical(v) => v.get(row).cloned().flatten(),
        }
    }

    /// Cell as JSON: numbers stay numbers, missing cells become `null`.
    pub fn cell_json(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::Numeric(v) => match v.get(row).copied().flatten() {
                Some(n) if self.kind == ColumnKind::Integer => Value::from(n as i64),
                Some(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
                None => Value::Null,
            },
            ColumnData::Categorical(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map(Value::String)
                .unwrap_or(Value::Null),
        }
    }

    /// Number of distinct non-missing values.
    pub fn unique_count(&self) -> usize {
        self.value_counts().len()
    }

    /// Counts of each distinct non-missing value, most frequent first; ties keep first appearance.
    pub fn value_counts(&self) -> Vec<(String, usize)> {
        let mut counts: indexmap::IndexMap<String, usize> = indexmap::IndexMap::new();
        for row in 0..self.len() {
            if let Some(text) = self.cell_text(row) {
                *counts.entry(text).or_insert(0) += 1;
            }
        }
        let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Approximate in-memory footprint in bytes.
    pub fn approximate_bytes(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len() * std::mem::size_of::<f64>(),
            ColumnData::Categorical(v) => v
                .iter()
                .map(|c| std::mem::size_of::<usize>() + c.as_ref().map(String::len).unwrap_or(0))
                .sum(),
        }
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        let data = match &self.data {
            ColumnData::Numeric(v) => {
                ColumnData::Numeric(rows.iter().map(|&r| v.get(r).copied().flatten()).collect())
            }
            ColumnData::Categorical(v) => {
                ColumnData::Categorical(rows.iter().map(|&r| v.get(r).cloned().flatten()).collect())
            }
        };
        Self {
            name: self.name.clone(),
            kind: self.kind,
            data,
        }
    }
}

/// A table of equally long, uniquely ordered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Builds a dataset, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        if columns.is_empty() {
            return Err(DatasetError::Empty);
        }
        let row_count = columns[0].len();
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(DatasetError::Malformed(format!(
                "column '{}' has {} rows, expected {}",
                bad.name(),
                bad.len(),
                row_count
            )));
        }
        Ok(Self { columns, row_count })
    }

    /// Builds a dataset from a header row and text records, inferring column types.
    pub fn from_records(headers: &[String], rows: &[Vec<String>]) -> Result<Self, DatasetError> {
        if headers.is_empty() {
            return Err(DatasetError::Empty);
        }
        let columns = headers
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let cells: Vec<Option<&str>> = rows
                    .iter()
                    .map(|row| row.get(index).map(String::as_str))
                    .collect();
                Column::infer(name.clone(), &cells)
            })
            .collect();
        Self::new(columns)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }

    pub fn categorical_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| !c.is_numeric()).collect()
    }

    /// Columns whose lowercased name occurs in `query`, in dataset order.
    pub fn mentioned_columns(&self, query: &str) -> Vec<&Column> {
        let query_lower = query.to_lowercase();
        self.columns
            .iter()
            .filter(|c| !c.name().is_empty() && query_lower.contains(&c.name().to_lowercase()))
            .collect()
    }

    /// Row `index` as a JSON object in column order.
    pub fn record(&self, index: usize) -> Map<String, Value> {
        self.columns
            .iter()
            .map(|c| (c.name().to_string(), c.cell_json(index)))
            .collect()
    }

    /// A new dataset with only the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.take_rows(rows)).collect(),
            row_count: rows.len(),
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let rows: Vec<usize> = (0..n.min(self.row_count)).collect();
        self.take_rows(&rows)
    }

    /// Writes the first `max_rows` rows back out as CSV text.
    pub fn to_csv_string(&self, max_rows: usize) -> Result<String, DatasetError> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(self.columns.iter().map(Column::name))?;
        for row in 0..max_rows.min(self.row_count) {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|c| c.cell_text(row).unwrap_or_default())
                .collect();
            writer.write_record(&record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| DatasetError::Malformed(format!("failed to flush CSV writer: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| DatasetError::Malformed(format!("CSV output is not UTF-8: {}", e)))
    }
}

fn is_missing_token(cell: &str) -> bool {
    let lower = cell.to_ascii_lowercase();
    MISSING_TOKENS.contains(&lower.as_str())
}

fn format_number(n: f64, kind: ColumnKind) -> String {
    if kind == ColumnKind::Integer {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
