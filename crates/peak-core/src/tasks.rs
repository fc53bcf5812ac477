//! Task rows loaded from the CSV task file.
//!
//! Each data row becomes one [`Task`]. Rows are validated independently: a
//! bad row is reported in [`TaskFile::rejected`] and the remaining rows still
//! run.

use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::ConfigError;

/// Size token meaning "any available variant, picked at random".
pub const RANDOM_SIZE: &str = "RA";

/// Raw CSV row. Every column defaults to empty so that a missing column
/// surfaces as a validation error naming the column instead of a CSV error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskRow {
    site: String,
    keyword: String,
    size: String,
    state: String,
    quantity: String,
    delay: String,
    address_line1: String,
    address_line2: String,
    city: String,
    zipcode: String,
    firstname: String,
    lastname: String,
    email: String,
    phone: String,
    cardno: String,
    expirydate: String,
    cvv: String,
}

/// One purchase attempt, built from a single CSV row.
///
/// Owned by exactly one execution unit. The only mutation after load is
/// [`Task::with_province_code`], which swaps the human-readable state name
/// for the storefront's province code.
#[derive(Clone)]
pub struct Task {
    /// 0-based position among the data rows.
    pub index: usize,
    pub site: String,
    /// Either a product URL (direct link) or a keyword expression.
    pub keyword: String,
    pub size: String,
    pub state: String,
    pub quantity: u32,
    pub delay_ms: u64,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub zipcode: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub card_number: Option<String>,
    pub card_expiry: Option<String>,
    pub card_cvv: Option<String>,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("Task")
            .field("index", &self.index)
            .field("site", &self.site)
            .field("keyword", &self.keyword)
            .field("size", &self.size)
            .field("state", &self.state)
            .field("quantity", &self.quantity)
            .field("delay_ms", &self.delay_ms)
            .field("city", &self.city)
            .field("zipcode", &self.zipcode)
            .field("card_number", &redact(&self.card_number))
            .field("card_expiry", &redact(&self.card_expiry))
            .field("card_cvv", &redact(&self.card_cvv))
            .finish_non_exhaustive()
    }
}

impl Task {
    /// 1-based task number used in logs and notifications.
    #[must_use]
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// A direct-link task names a product page instead of a keyword
    /// expression and skips collection search.
    #[must_use]
    pub fn is_direct_link(&self) -> bool {
        self.keyword.starts_with("https://") || self.keyword.starts_with("http://")
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Replace the state name with its resolved province code.
    #[must_use]
    pub fn with_province_code(mut self, code: &str) -> Self {
        self.state = code.to_string();
        self
    }

    fn from_row(index: usize, row: TaskRow) -> Result<Self, ConfigError> {
        let row_number = index + 1;
        let required = [
            ("site", &row.site),
            ("keyword", &row.keyword),
            ("size", &row.size),
            ("state", &row.state),
            ("quantity", &row.quantity),
            ("delay", &row.delay),
            ("address_line1", &row.address_line1),
            ("address_line2", &row.address_line2),
            ("city", &row.city),
            ("zipcode", &row.zipcode),
            ("firstname", &row.firstname),
            ("lastname", &row.lastname),
            ("email", &row.email),
            ("phone", &row.phone),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(ConfigError::InvalidTask {
                    row: row_number,
                    field: field.to_string(),
                    reason: "cannot be empty".to_string(),
                });
            }
        }

        let quantity = row
            .quantity
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| ConfigError::InvalidTask {
                row: row_number,
                field: "quantity".to_string(),
                reason: format!("must be a positive integer, got '{}'", row.quantity),
            })?;

        let delay_ms =
            row.delay
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidTask {
                    row: row_number,
                    field: "delay".to_string(),
                    reason: format!("must be milliseconds ({e}), got '{}'", row.delay),
                })?;

        let optional = |v: String| if v.is_empty() { None } else { Some(v) };

        Ok(Self {
            index,
            site: row.site,
            keyword: row.keyword,
            size: row.size,
            state: row.state,
            quantity,
            delay_ms,
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            city: row.city,
            zipcode: row.zipcode,
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
            phone: row.phone,
            card_number: optional(row.cardno),
            card_expiry: optional(row.expirydate),
            card_cvv: optional(row.cvv),
        })
    }
}

/// Result of loading a task file: the runnable tasks plus the rows that
/// failed validation.
#[derive(Debug, Default)]
pub struct TaskFile {
    pub tasks: Vec<Task>,
    pub rejected: Vec<ConfigError>,
}

/// Load tasks from a CSV file with a header row.
///
/// # Errors
///
/// Returns [`ConfigError::TasksFileRead`] if the file cannot be opened or is
/// not well-formed CSV. Per-row validation failures do not fail the load;
/// they are collected in [`TaskFile::rejected`].
pub fn load_tasks(path: &Path) -> Result<TaskFile, ConfigError> {
    let source = path.display().to_string();
    let reader = csv_builder()
        .from_path(path)
        .map_err(|e| ConfigError::TasksFileRead {
            path: source.clone(),
            source: e,
        })?;
    read_tasks(reader, &source)
}

/// Parse tasks from any CSV reader. See [`load_tasks`].
///
/// # Errors
///
/// Returns [`ConfigError::TasksFileRead`] if the input is not well-formed CSV.
pub fn parse_tasks<R: io::Read>(input: R) -> Result<TaskFile, ConfigError> {
    read_tasks(csv_builder().from_reader(input), "<input>")
}

fn csv_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::Headers);
    builder
}

fn read_tasks<R: io::Read>(
    mut reader: csv::Reader<R>,
    source: &str,
) -> Result<TaskFile, ConfigError> {
    let mut file = TaskFile::default();

    for (index, record) in reader.deserialize::<TaskRow>().enumerate() {
        let row = record.map_err(|e| ConfigError::TasksFileRead {
            path: source.to_string(),
            source: e,
        })?;
        match Task::from_row(index, row) {
            Ok(task) => file.tasks.push(task),
            Err(e) => file.rejected.push(e),
        }
    }

    Ok(file)
}

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;
