use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// One row of a loaded table, addressed by normalized (trimmed, lower-case) header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(key, value)| (normalize_header(key.as_ref()), value.into()))
            .collect();
        Self { fields }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(normalize_header(key), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(&normalize_header(key)).map(String::as_str)
    }

    pub fn require(&self, table: &str, row: usize, key: &str) -> Result<&str, ValidationError> {
        self.get(key).ok_or_else(|| {
            ValidationError::new(format!(
                "{table} row {row}: missing required field '{}'",
                normalize_header(key)
            ))
        })
    }
}

pub fn normalize_header(header: &str) -> String {
    header.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

/// Checks a table header once, before any row is interpreted.
pub fn validate_headers(
    table: &str,
    headers: &[String],
    required: &[String],
) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(headers.len());
    for header in headers {
        let normalized = normalize_header(header);
        if !seen.insert(normalized.clone()) {
            return Err(ValidationError::new(format!(
                "{table} table has duplicate column '{normalized}'"
            )));
        }
    }
    for column in required {
        let normalized = normalize_header(column);
        if !seen.contains(&normalized) {
            return Err(ValidationError::new(format!(
                "{table} table is missing required column '{normalized}'"
            )));
        }
    }
    Ok(())
}

pub fn parse_flag(table: &str, row: usize, key: &str, input: &str) -> Result<bool, ValidationError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Ok(true),
        "false" | "f" | "no" | "n" | "0" | "0.0" => Ok(false),
        other => Err(ValidationError::new(format!(
            "{table} row {row}: field '{key}' has non-boolean value '{other}'"
        ))),
    }
}

pub fn parse_score(table: &str, row: usize, key: &str, input: &str) -> Result<f64, ValidationError> {
    let value = input.trim().parse::<f64>().map_err(|_| {
        ValidationError::new(format!(
            "{table} row {row}: field '{key}' has non-numeric value '{}'",
            input.trim()
        ))
    })?;
    if !value.is_finite() {
        return Err(ValidationError::new(format!(
            "{table} row {row}: field '{key}' must be finite (got {value})"
        )));
    }
    Ok(value)
}
