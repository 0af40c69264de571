//! Typed cell values.
//!
//! Documents mix text with numbers, booleans and empty cells. Rather than
//! inspecting types at every call site, adapters convert into `CellValue`
//! once and the core decides eligibility through a single predicate:
//! only non-blank text can ever reach the translation pipeline.

/// A single cell or text fragment extracted from a document.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty or null cell; always passed through untouched.
    Empty,
    /// Text, the only variant eligible for translation.
    Text(String),
    /// Floating-point number.
    Number(f64),
    /// Integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
}

impl CellValue {
    /// Text content eligible for the dedup/translation pipeline.
    ///
    /// Returns `None` for non-text variants and for blank text, which the
    /// unique-value index must not count as distinct values.
    pub fn translatable(&self) -> Option<&str> {
        match self {
            Self::Text(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() { Self::Empty } else { Self::Text(s) }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One sheet of a workbook: a name plus a rectangular-ish grid of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}
