//! Schema-typed CSV loading.
//!
//! Each source dataset declares its required columns and their types in a
//! [`TableSchema`]. The loader checks the header row against it, coerces every
//! declared cell with [`coerce`], and hands the typed row to the entity
//! constructor. Timestamps get their own parse step after generic coercion.
//!
//! Any missing column or uncoercible cell aborts the whole load; there is no
//! partial table.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::info;

use super::types::*;

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// Declared type of a source column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    /// Blank cells become `None`.
    Decimal,
    String,
    Boolean,
    /// Enum-like label; empty cells become `None`.
    Categorical,
    Timestamp,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Decimal => write!(f, "decimal"),
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
            Self::Categorical => write!(f, "categorical"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Required columns of one dataset.
#[derive(Debug)]
pub struct TableSchema {
    pub dataset: Dataset,
    pub columns: &'static [(&'static str, ColumnType)],
    /// Lowercase raw headers before matching (the feedback export is mixed-case).
    pub lowercase_headers: bool,
}

impl TableSchema {
    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|(name, _)| *name == column)
    }
}

pub const CATEGORY_SCHEMA: TableSchema = TableSchema {
    dataset: Dataset::Categories,
    columns: &[
        ("category_id", ColumnType::Integer),
        ("category_name", ColumnType::String),
    ],
    lowercase_headers: false,
};

pub const MENU_SCHEMA: TableSchema = TableSchema {
    dataset: Dataset::Menu,
    columns: &[
        ("item_id", ColumnType::Integer),
        ("item_name", ColumnType::String),
        ("description", ColumnType::String),
        ("price", ColumnType::Decimal),
        ("category_id", ColumnType::Integer),
        ("is_vegetarian", ColumnType::Boolean),
        ("is_spicy", ColumnType::Boolean),
        ("is_gluten_free", ColumnType::Boolean),
    ],
    lowercase_headers: false,
};

pub const ORDER_SCHEMA: TableSchema = TableSchema {
    dataset: Dataset::Orders,
    columns: &[
        ("order_id", ColumnType::Integer),
        ("item_id", ColumnType::Integer),
        ("customer_id", ColumnType::Integer),
        ("quantity", ColumnType::Integer),
        ("special_request", ColumnType::String),
        ("subtotal", ColumnType::Decimal),
        ("payment_method", ColumnType::Categorical),
        ("order_status", ColumnType::Categorical),
        ("order_placed", ColumnType::Timestamp),
    ],
    lowercase_headers: false,
};

pub const FEEDBACK_SCHEMA: TableSchema = TableSchema {
    dataset: Dataset::Feedback,
    columns: &[
        ("customer_id", ColumnType::Integer),
        ("item_id", ColumnType::Integer),
        ("feedback_text", ColumnType::String),
        ("rating", ColumnType::Decimal),
        ("feedback_category", ColumnType::Categorical),
        ("submission_timestamp", ColumnType::Timestamp),
    ],
    lowercase_headers: true,
};

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// A coerced cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    /// Blank and `NaN` cells are `None`.
    Decimal(Option<f64>),
    /// String and categorical columns; empty text is `None`.
    Text(Option<String>),
    Boolean(Option<bool>),
    Timestamp(NaiveDateTime),
}

/// Coerce one raw (already trimmed) field to its declared type.
pub fn coerce(raw: &str, ty: ColumnType) -> Result<Cell, String> {
    match ty {
        ColumnType::Integer => parse_integer(raw).map(Cell::Integer),
        ColumnType::Decimal => parse_decimal(raw).map(Cell::Decimal),
        ColumnType::String | ColumnType::Categorical => Ok(Cell::Text(
            (!raw.is_empty()).then(|| raw.to_string()),
        )),
        ColumnType::Boolean => parse_boolean(raw).map(Cell::Boolean),
        ColumnType::Timestamp => parse_timestamp(raw).map(Cell::Timestamp),
    }
}

fn parse_integer(raw: &str) -> Result<i64, String> {
    if raw.is_empty() {
        return Err("missing integer value".into());
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    // Integral decimals such as "3.0" (spreadsheet exports) are accepted.
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("expected integer, got '{raw}'")),
    }
}

fn parse_decimal(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(|v| (!v.is_nan()).then_some(v))
        .map_err(|_| format!("expected decimal, got '{raw}'"))
}

fn parse_boolean(raw: &str) -> Result<Option<bool>, String> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "na" | "null" => Ok(None),
        "true" | "t" | "1" | "yes" | "y" => Ok(Some(true)),
        "false" | "f" | "0" | "no" | "n" => Ok(Some(false)),
        _ => Err(format!("expected boolean, got '{raw}'")),
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Dedicated timestamp parse step. Offsets are dropped and the local wall
/// clock is kept, so hour buckets match what the restaurant saw.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    if raw.is_empty() {
        return Err("missing timestamp".into());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Some(dt) = NaiveDate::parse_from_str(raw, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(dt);
        }
    }
    Err(format!("expected timestamp, got '{raw}'"))
}

// ---------------------------------------------------------------------------
// Typed rows
// ---------------------------------------------------------------------------

/// One source row coerced against its schema; cells follow `schema.columns`.
#[derive(Debug)]
pub struct TypedRow {
    schema: &'static TableSchema,
    row: usize,
    cells: Vec<Cell>,
}

impl TypedRow {
    fn cell(&self, column: &str) -> AnalyticsResult<&Cell> {
        self.schema
            .position(column)
            .and_then(|i| self.cells.get(i))
            .ok_or_else(|| self.mismatch(column, "column is not declared in the schema"))
    }

    fn mismatch(&self, column: &str, detail: &str) -> AnalyticsError {
        AnalyticsError::SchemaMismatch {
            dataset: self.schema.dataset,
            column: column.to_string(),
            row: Some(self.row),
            detail: detail.to_string(),
        }
    }

    pub fn integer(&self, column: &str) -> AnalyticsResult<i64> {
        match self.cell(column)? {
            Cell::Integer(v) => Ok(*v),
            _ => Err(self.mismatch(column, "not declared as integer")),
        }
    }

    pub fn decimal(&self, column: &str) -> AnalyticsResult<Option<f64>> {
        match self.cell(column)? {
            Cell::Decimal(v) => Ok(*v),
            _ => Err(self.mismatch(column, "not declared as decimal")),
        }
    }

    pub fn text(&self, column: &str) -> AnalyticsResult<Option<String>> {
        match self.cell(column)? {
            Cell::Text(v) => Ok(v.clone()),
            _ => Err(self.mismatch(column, "not declared as text")),
        }
    }

    /// Text column where an empty cell reads as the empty string.
    pub fn text_or_empty(&self, column: &str) -> AnalyticsResult<String> {
        Ok(self.text(column)?.unwrap_or_default())
    }

    pub fn boolean(&self, column: &str) -> AnalyticsResult<Option<bool>> {
        match self.cell(column)? {
            Cell::Boolean(v) => Ok(*v),
            _ => Err(self.mismatch(column, "not declared as boolean")),
        }
    }

    pub fn timestamp(&self, column: &str) -> AnalyticsResult<NaiveDateTime> {
        match self.cell(column)? {
            Cell::Timestamp(v) => Ok(*v),
            _ => Err(self.mismatch(column, "not declared as timestamp")),
        }
    }
}

/// Entities buildable from a typed row of their dataset.
pub trait FromTypedRow: Sized {
    const SCHEMA: &'static TableSchema;

    fn from_row(row: &TypedRow) -> AnalyticsResult<Self>;
}

impl FromTypedRow for Category {
    const SCHEMA: &'static TableSchema = &CATEGORY_SCHEMA;

    fn from_row(row: &TypedRow) -> AnalyticsResult<Self> {
        Ok(Self {
            category_id: row.integer("category_id")?,
            category_name: row.text_or_empty("category_name")?,
        })
    }
}

impl FromTypedRow for MenuItem {
    const SCHEMA: &'static TableSchema = &MENU_SCHEMA;

    fn from_row(row: &TypedRow) -> AnalyticsResult<Self> {
        Ok(Self {
            item_id: row.integer("item_id")?,
            item_name: row.text_or_empty("item_name")?,
            description: row.text_or_empty("description")?,
            price: row.decimal("price")?,
            category_id: row.integer("category_id")?,
            is_vegetarian: row.boolean("is_vegetarian")?,
            is_spicy: row.boolean("is_spicy")?,
            is_gluten_free: row.boolean("is_gluten_free")?,
        })
    }
}

impl FromTypedRow for Order {
    const SCHEMA: &'static TableSchema = &ORDER_SCHEMA;

    fn from_row(row: &TypedRow) -> AnalyticsResult<Self> {
        Ok(Self {
            order_id: row.integer("order_id")?,
            item_id: row.integer("item_id")?,
            customer_id: row.integer("customer_id")?,
            quantity: row.integer("quantity")?,
            special_request: row.text("special_request")?,
            subtotal: row.decimal("subtotal")?,
            payment_method: row.text("payment_method")?,
            order_status: OrderStatus::from(row.text_or_empty("order_status")?.as_str()),
            order_placed: row.timestamp("order_placed")?,
        })
    }
}

impl FromTypedRow for Feedback {
    const SCHEMA: &'static TableSchema = &FEEDBACK_SCHEMA;

    fn from_row(row: &TypedRow) -> AnalyticsResult<Self> {
        Ok(Self {
            customer_id: row.integer("customer_id")?,
            item_id: row.integer("item_id")?,
            feedback_text: row.text_or_empty("feedback_text")?,
            rating: row.decimal("rating")?,
            feedback_category: row.text("feedback_category")?,
            submission_timestamp: row.timestamp("submission_timestamp")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read and coerce every row of a CSV source against `schema`.
pub fn read_typed_rows<R: Read>(
    reader: R,
    schema: &'static TableSchema,
) -> AnalyticsResult<Vec<TypedRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header_error = |detail: String| AnalyticsError::SchemaMismatch {
        dataset: schema.dataset,
        column: "(header)".into(),
        row: None,
        detail,
    };

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| header_error(e.to_string()))?
        .iter()
        .map(|h| {
            if schema.lowercase_headers {
                h.to_lowercase()
            } else {
                h.to_string()
            }
        })
        .collect();

    // Resolve each declared column to its position in the source.
    let mut positions = Vec::with_capacity(schema.columns.len());
    for (name, _) in schema.columns {
        let idx = headers.iter().position(|h| h.as_str() == *name).ok_or_else(|| {
            AnalyticsError::SchemaMismatch {
                dataset: schema.dataset,
                column: (*name).to_string(),
                row: None,
                detail: "required column is missing".into(),
            }
        })?;
        positions.push(idx);
    }

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let row = idx + 1;
        let record: StringRecord = result.map_err(|e| AnalyticsError::SchemaMismatch {
            dataset: schema.dataset,
            column: "(record)".into(),
            row: Some(row),
            detail: e.to_string(),
        })?;

        let mut cells = Vec::with_capacity(schema.columns.len());
        for ((name, ty), &pos) in schema.columns.iter().zip(&positions) {
            let raw = record.get(pos).unwrap_or("");
            let cell = coerce(raw, *ty).map_err(|detail| AnalyticsError::SchemaMismatch {
                dataset: schema.dataset,
                column: (*name).to_string(),
                row: Some(row),
                detail,
            })?;
            cells.push(cell);
        }
        rows.push(TypedRow { schema, row, cells });
    }

    Ok(rows)
}

/// Load entities of type `T` from any reader.
pub fn load_from_reader<T: FromTypedRow, R: Read>(reader: R) -> AnalyticsResult<Vec<T>> {
    read_typed_rows(reader, T::SCHEMA)?
        .iter()
        .map(T::from_row)
        .collect()
}

/// Load entities of type `T` from a CSV file.
pub fn load_table<T: FromTypedRow>(path: &Path) -> AnalyticsResult<Vec<T>> {
    let dataset = T::SCHEMA.dataset;
    let not_found = || AnalyticsError::SourceNotFound {
        dataset,
        path: path.to_path_buf(),
    };
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
        Err(source) => {
            return Err(AnalyticsError::SourceUnreadable {
                dataset,
                path: path.to_path_buf(),
                source,
            });
        }
    };
    // A directory opens fine on Unix but is not a source file.
    if path.is_dir() {
        return Err(not_found());
    }
    let rows: Vec<T> = load_from_reader(file)?;
    info!(
        dataset = %dataset,
        path = %path.display(),
        rows = rows.len(),
        "loaded dataset"
    );
    Ok(rows)
}

pub fn load_categories(path: &Path) -> AnalyticsResult<Vec<Category>> {
    load_table(path)
}

pub fn load_menu(path: &Path) -> AnalyticsResult<Vec<MenuItem>> {
    load_table(path)
}

pub fn load_orders(path: &Path) -> AnalyticsResult<Vec<Order>> {
    load_table(path)
}

pub fn load_feedback(path: &Path) -> AnalyticsResult<Vec<Feedback>> {
    load_table(path)
}

pub fn categories_from_reader<R: Read>(reader: R) -> AnalyticsResult<Vec<Category>> {
    load_from_reader(reader)
}

pub fn menu_from_reader<R: Read>(reader: R) -> AnalyticsResult<Vec<MenuItem>> {
    load_from_reader(reader)
}

pub fn orders_from_reader<R: Read>(reader: R) -> AnalyticsResult<Vec<Order>> {
    load_from_reader(reader)
}

pub fn feedback_from_reader<R: Read>(reader: R) -> AnalyticsResult<Vec<Feedback>> {
    load_from_reader(reader)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
