use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{self, Write},
    path::Path,
    sync::Arc,
};

use csv::{Writer, WriterBuilder};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        field::Record,
        item::{ItemWriter, ItemWriterResult},
        registry::Registry,
        value::BoolTokens,
    },
    error::RecordError,
};

/// Options used to render a record as one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub delimiter: String,
    pub true_token: String,
    pub false_token: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            delimiter: ",".to_string(),
            true_token: "true".to_string(),
            false_token: "false".to_string(),
        }
    }
}

impl WriterConfig {
    /// Creates a configuration from a delimiter and the tokens written for
    /// `true` and `false`.
    pub fn new(delimiter: &str, true_token: &str, false_token: &str) -> Self {
        WriterConfig {
            delimiter: delimiter.to_string(),
            true_token: true_token.to_string(),
            false_token: false_token.to_string(),
        }
    }
}

/// Renders records field by field, in the order the reader sets them.
///
/// Lines are plain joins: values are neither quoted nor escaped and no line
/// terminator is appended. Use [`CsvRecordWriter`] to produce quoted CSV.
pub struct RecordFormatter {
    delimiter: String,
    tokens: BoolTokens,
    registry: Arc<Registry>,
}

impl RecordFormatter {
    pub fn new(config: WriterConfig) -> Self {
        Self::with_registry(config, Registry::global())
    }

    pub fn with_registry(config: WriterConfig, registry: Arc<Registry>) -> Self {
        RecordFormatter {
            delimiter: config.delimiter,
            tokens: BoolTokens::new(config.true_token, config.false_token),
            registry,
        }
    }

    /// Renders every eligible field of `record`, embedded records flattened.
    pub fn values<T: Record>(&self, record: &T) -> Result<Vec<String>, RecordError> {
        render_values(&self.registry, &self.tokens, record)
    }

    /// Renders `record` as one delimited line.
    pub fn format<T: Record>(&self, record: &T) -> Result<String, RecordError> {
        Ok(self.values(record)?.join(&self.delimiter))
    }
}

/// Renders `record` as one delimited line using the global registry.
///
/// # Examples
///
/// ```
/// use csv_record::core::field::{FieldSet, Record};
/// use csv_record::item::csv::csv_writer::{to_csv, WriterConfig};
///
/// struct Base {
///     field1: String,
///     field2: String,
/// }
///
/// impl Record for Base {
///     fn describe(fields: &mut FieldSet<'_, Self>) {
///         fields
///             .field("Field1", |b| &b.field1, |b| &mut b.field1)
///             .field("Field2", |b| &b.field2, |b| &mut b.field2);
///     }
/// }
///
/// struct Line {
///     base: Base,
///     field3: String,
/// }
///
/// impl Record for Line {
///     fn describe(fields: &mut FieldSet<'_, Self>) {
///         fields
///             .embed("Base", |l| &l.base, |l| &mut l.base)
///             .field("Field3", |l| &l.field3, |l| &mut l.field3);
///     }
/// }
///
/// let line = Line {
///     base: Base { field1: "F1".to_string(), field2: "F2".to_string() },
///     field3: "F3".to_string(),
/// };
///
/// assert_eq!(to_csv(&line, &WriterConfig::default()).unwrap(), "F1,F2,F3");
/// ```
pub fn to_csv<T: Record>(record: &T, config: &WriterConfig) -> Result<String, RecordError> {
    RecordFormatter::new(config.clone()).format(record)
}

fn render_values<T: Record>(
    registry: &Registry,
    tokens: &BoolTokens,
    record: &T,
) -> Result<Vec<String>, RecordError> {
    registry
        .fields::<T>()
        .iter()
        .map(|field| {
            field
                .render(record, tokens)
                .map_err(|error| RecordError::from_render(field.name(), error))
        })
        .collect()
}

/// Writes records to any `Write` sink as CSV, quoting values when needed.
pub struct CsvRecordWriter<W: Write> {
    wrapper: RefCell<Writer<W>>,
    tokens: BoolTokens,
    registry: Arc<Registry>,
    has_headers: bool,
    header_written: Cell<bool>,
}

impl<W: Write> CsvRecordWriter<W> {
    /// Writes one record. The header row, when enabled, is written before the
    /// first record from the record type's field names.
    ///
    /// Every field is rendered before anything is written, so a field that
    /// fails to render leaves the output untouched.
    pub fn write_record<T: Record>(&self, record: &T) -> Result<(), RecordError> {
        let values = render_values(&self.registry, &self.tokens, record)?;
        let mut writer = self.wrapper.borrow_mut();

        if self.has_headers && !self.header_written.get() {
            let fields = self.registry.fields::<T>();
            debug!("Writing header row for {}", fields.type_name());
            writer.write_record(fields.names())?;
            self.header_written.set(true);
        }

        writer.write_record(&values)?;
        Ok(())
    }

    /// Flushes the internal buffer and the underlying writer.
    pub fn flush(&self) -> Result<(), RecordError> {
        self.wrapper.borrow_mut().flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, RecordError> {
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| RecordError::Io(error.into_error()))
    }
}

impl<W: Write, T: Record> ItemWriter<T> for CsvRecordWriter<W> {
    fn write(&self, item: &T) -> ItemWriterResult {
        self.write_record(item)
    }

    fn flush(&self) -> ItemWriterResult {
        CsvRecordWriter::flush(self)
    }
}

/// A builder for configuring CSV record writing.
pub struct CsvRecordWriterBuilder {
    delimiter: u8,
    has_headers: bool,
    tokens: BoolTokens,
    registry: Option<Arc<Registry>>,
}

impl Default for CsvRecordWriterBuilder {
    fn default() -> Self {
        CsvRecordWriterBuilder {
            delimiter: b',',
            has_headers: false,
            tokens: BoolTokens::default(),
            registry: None,
        }
    }
}

impl CsvRecordWriterBuilder {
    pub fn new() -> CsvRecordWriterBuilder {
        CsvRecordWriterBuilder::default()
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvRecordWriterBuilder {
        self.delimiter = delimiter;
        self
    }

    pub fn has_headers(mut self, yes: bool) -> CsvRecordWriterBuilder {
        self.has_headers = yes;
        self
    }

    /// Tokens written for `true` and `false` boolean fields.
    pub fn bool_tokens(mut self, true_token: &str, false_token: &str) -> CsvRecordWriterBuilder {
        self.tokens = BoolTokens::new(true_token, false_token);
        self
    }

    pub fn registry(mut self, registry: Arc<Registry>) -> CsvRecordWriterBuilder {
        self.registry = Some(registry);
        self
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvRecordWriter<File>, RecordError> {
        let wtr = self.csv_builder().from_path(path)?;
        Ok(self.build(wtr))
    }

    /// Creates a writer over any `Write` sink.
    ///
    /// ```
    /// # use std::error::Error;
    /// use csv_record::core::field::{FieldSet, Record};
    /// use csv_record::item::csv::csv_writer::CsvRecordWriterBuilder;
    ///
    /// struct City {
    ///     name: String,
    ///     population: u64,
    ///     capital: bool,
    /// }
    ///
    /// impl Record for City {
    ///     fn describe(fields: &mut FieldSet<'_, Self>) {
    ///         fields
    ///             .field("city", |c| &c.name, |c| &mut c.name)
    ///             .field("pop", |c| &c.population, |c| &mut c.population)
    ///             .field("capital", |c| &c.capital, |c| &mut c.capital);
    ///     }
    /// }
    ///
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// let wtr = CsvRecordWriterBuilder::new()
    ///     .has_headers(true)
    ///     .bool_tokens("Y", "N")
    ///     .from_writer(vec![]);
    ///
    /// wtr.write_record(&City {
    ///     name: "Boston".to_string(),
    ///     population: 4628910,
    ///     capital: true,
    /// })?;
    /// wtr.write_record(&City {
    ///     name: "Concord, MA".to_string(),
    ///     population: 42695,
    ///     capital: false,
    /// })?;
    ///
    /// let data = String::from_utf8(wtr.into_inner()?)?;
    /// assert_eq!(data, "\
    /// city,pop,capital
    /// Boston,4628910,Y
    /// \"Concord, MA\",42695,N
    /// ");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_writer<W: io::Write>(self, wtr: W) -> CsvRecordWriter<W> {
        let wtr = self.csv_builder().from_writer(wtr);
        self.build(wtr)
    }

    fn csv_builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .flexible(false)
            .has_headers(false)
            .delimiter(self.delimiter);
        builder
    }

    fn build<W: Write>(self, wtr: Writer<W>) -> CsvRecordWriter<W> {
        CsvRecordWriter {
            wrapper: RefCell::new(wtr),
            tokens: self.tokens,
            registry: self.registry.unwrap_or_else(Registry::global),
            has_headers: self.has_headers,
            header_written: Cell::new(false),
        }
    }
}
