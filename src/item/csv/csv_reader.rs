use csv::{Reader, ReaderBuilder, StringRecord, Terminator};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, fs::File, io::Read, marker::PhantomData, path::Path, sync::Arc};

use crate::{
    core::{
        field::Record,
        header::Header,
        item::{ItemReader, ItemReaderResult},
        registry::Registry,
        value::BoolVocabulary,
    },
    error::RecordError,
};

use super::serde_byte;

/// How many fields every record must have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCount {
    /// Every record must have as many fields as the first one.
    #[default]
    FirstRecord,
    /// Every record must have exactly this many fields.
    Fixed(usize),
    /// Records may have any number of fields.
    Variable,
}

/// Reader configuration, built once and handed to the reader.
///
/// Every field has a default, so a configuration can be loaded from a
/// partial document:
///
/// ```
/// use csv_record::item::csv::csv_reader::{FieldCount, ReaderConfig};
///
/// let config: ReaderConfig = serde_json::from_str(
///     r#"{ "delimiter": "|", "true_values": ["Y"], "false_values": ["N"] }"#,
/// ).unwrap();
///
/// assert_eq!(config.delimiter, b'|');
/// assert_eq!(config.fields_per_record, FieldCount::FirstRecord);
/// assert!(config.header.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    #[serde(with = "serde_byte")]
    pub delimiter: u8,
    /// Lines starting with this byte are ignored.
    #[serde(with = "serde_byte::option")]
    pub comment: Option<u8>,
    /// When disabled, quotes have no special meaning.
    pub quoting: bool,
    /// Record terminator, `None` accepts `\r`, `\n` and `\r\n`.
    #[serde(with = "serde_byte::option")]
    pub terminator: Option<u8>,
    pub fields_per_record: FieldCount,
    /// Consume the first row as the header.
    pub has_headers: bool,
    /// Characters stripped from both ends of every column value.
    pub trim: Option<String>,
    pub true_values: Vec<String>,
    pub false_values: Vec<String>,
    /// Explicit header. Takes precedence over a header row and over the
    /// header derived from the record type.
    pub header: Option<Header>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            delimiter: b',',
            comment: None,
            quoting: true,
            terminator: None,
            fields_per_record: FieldCount::FirstRecord,
            has_headers: false,
            trim: None,
            true_values: Vec::new(),
            false_values: Vec::new(),
            header: None,
        }
    }
}

impl ReaderConfig {
    fn csv_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .comment(self.comment)
            .quoting(self.quoting)
            .has_headers(self.has_headers)
            .flexible(self.fields_per_record != FieldCount::FirstRecord)
            .terminator(match self.terminator {
                Some(byte) => Terminator::Any(byte),
                None => Terminator::CRLF,
            });
        builder
    }
}

struct ReaderState<R> {
    reader: Reader<R>,
    record: StringRecord,
    header_row: Option<Arc<Header>>,
}

/// Reads CSV records into typed records.
///
/// Each call to [`read_into`](CsvRecordReader::read_into) pulls the next raw
/// record and sets every field of the destination, in declaration order, from
/// the column its name maps to.
///
/// Fields are assigned one by one: when a column cannot be coerced the call
/// stops there, leaving the fields already assigned with their new values and
/// the remaining ones untouched. A failed read of the raw record leaves the
/// destination untouched.
///
/// A reader holds mutable session state and is meant for one caller at a time.
///
/// # Examples
///
/// ```
/// use csv_record::core::field::{FieldSet, Record};
/// use csv_record::item::csv::csv_reader::CsvRecordReaderBuilder;
///
/// #[derive(Debug, Default)]
/// struct Account {
///     name: String,
///     age: i32,
///     balance: f64,
///     low_balance: bool,
/// }
///
/// impl Record for Account {
///     fn describe(fields: &mut FieldSet<'_, Self>) {
///         fields
///             .field("Name", |a| &a.name, |a| &mut a.name)
///             .field("Age", |a| &a.age, |a| &mut a.age)
///             .field("Balance", |a| &a.balance, |a| &mut a.balance)
///             .field("LowBalance", |a| &a.low_balance, |a| &mut a.low_balance);
///     }
/// }
///
/// let reader = CsvRecordReaderBuilder::new()
///     .delimiter(b'|')
///     .custom_bool(["Y"], ["N"])
///     .from_reader("Tony|23|123.456|Y\nJohn|34|234.567|N".as_bytes());
///
/// let mut account = Account::default();
/// reader.read_into(&mut account).unwrap();
/// assert_eq!(account.name, "Tony");
/// assert_eq!(account.age, 23);
/// assert!(account.low_balance);
///
/// reader.read_into(&mut account).unwrap();
/// assert_eq!(account.name, "John");
/// assert!(!account.low_balance);
///
/// assert!(reader.read_into(&mut account).unwrap_err().is_end_of_data());
/// assert_eq!(account.name, "John");
/// ```
pub struct CsvRecordReader<R> {
    state: RefCell<ReaderState<R>>,
    delimiter: u8,
    has_headers: bool,
    fields_per_record: FieldCount,
    trim: Option<Vec<char>>,
    bools: BoolVocabulary,
    header: Option<Arc<Header>>,
    registry: Arc<Registry>,
}

impl<R: Read> CsvRecordReader<R> {
    /// Reads the next record into `dest`.
    ///
    /// # Errors
    ///
    /// - [`RecordError::EndOfData`] when the source is exhausted
    /// - [`RecordError::Csv`] when the record cannot be tokenized or read
    /// - [`RecordError::FieldCount`] when a fixed field count is not met
    /// - [`RecordError::MissingColumn`] / [`RecordError::ColumnOutOfRange`]
    ///   when a field has no column in the current record
    /// - [`RecordError::Coercion`] / [`RecordError::UnsupportedKind`] when a
    ///   column cannot be converted to its field
    pub fn read_into<T: Record>(&self, dest: &mut T) -> Result<(), RecordError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        if self.has_headers && self.header.is_none() && state.header_row.is_none() {
            let row = state.reader.headers()?;
            debug!("Using header row: {:?}", row);
            state.header_row = Some(Arc::new(Header::from_record(row)));
        }

        if !state.reader.read_record(&mut state.record)? {
            debug!("End of data");
            return Err(RecordError::EndOfData);
        }
        trace!("Read record: {:?}", state.record);

        if let FieldCount::Fixed(expected) = self.fields_per_record {
            if state.record.len() != expected {
                return Err(RecordError::FieldCount {
                    expected,
                    found: state.record.len(),
                    line: state.record.position().map_or(0, |p| p.line()),
                });
            }
        }

        let fields = self.registry.fields::<T>();
        let header = self
            .header
            .clone()
            .or_else(|| state.header_row.clone())
            .unwrap_or_else(|| self.registry.header::<T>());

        for field in fields.iter() {
            let value = self.column(&state.record, &header, field.name())?;
            field
                .assign(dest, value, &self.bools)
                .map_err(|error| RecordError::from_value(field.name(), value, error))?;
        }

        Ok(())
    }

    /// Iterates over the remaining records, stopping at the end of data.
    pub fn records<T: Record + Default>(&self) -> RecordIter<'_, R, T> {
        RecordIter {
            reader: self,
            _record: PhantomData,
        }
    }

    /// The most recently read raw record, joined with the delimiter.
    pub fn last_line(&self) -> String {
        let delimiter = (self.delimiter as char).to_string();
        self.state
            .borrow()
            .record
            .iter()
            .collect::<Vec<&str>>()
            .join(&delimiter)
    }

    /// Position of the most recently read raw record.
    pub fn position(&self) -> Option<csv::Position> {
        self.state.borrow().record.position().cloned()
    }

    /// The header used when the record type's own header is not applicable:
    /// the explicit header if one was set, else the header row once read.
    pub fn header(&self) -> Option<Arc<Header>> {
        self.header
            .clone()
            .or_else(|| self.state.borrow().header_row.clone())
    }

    fn column<'a>(
        &self,
        record: &'a StringRecord,
        header: &Header,
        field: &str,
    ) -> Result<&'a str, RecordError> {
        let position = header
            .position(field)
            .ok_or_else(|| RecordError::MissingColumn {
                field: field.to_string(),
            })?;

        let value = record
            .get(position)
            .ok_or_else(|| RecordError::ColumnOutOfRange {
                field: field.to_string(),
                position,
                len: record.len(),
            })?;

        Ok(match &self.trim {
            Some(chars) => value.trim_matches(|c: char| chars.contains(&c)),
            None => value,
        })
    }
}

impl<R: Read, T: Record + Default> ItemReader<T> for CsvRecordReader<R> {
    /// Reads the next record into a default `T`.
    ///
    /// Returns `Ok(None)` at the end of data.
    fn read(&self) -> ItemReaderResult<T> {
        let mut item = T::default();
        match self.read_into(&mut item) {
            Ok(()) => Ok(Some(item)),
            Err(RecordError::EndOfData) => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// Iterator returned by [`CsvRecordReader::records`].
///
/// An item that fails to read is yielded as an error and iteration carries on
/// with the next record.
pub struct RecordIter<'a, R, T> {
    reader: &'a CsvRecordReader<R>,
    _record: PhantomData<fn() -> T>,
}

impl<R: Read, T: Record + Default> Iterator for RecordIter<'_, R, T> {
    type Item = Result<T, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        ItemReader::<T>::read(self.reader).transpose()
    }
}

/// A builder for configuring CSV record reading.
///
/// Every setter fills the underlying [`ReaderConfig`]; all of them must be
/// called before the reader is created.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Terminator: any of `\r`, `\n`, `\r\n`
/// - Headers: no header row, header derived from the record type
/// - Field count: fixed by the first record
/// - Trimming: none
#[derive(Default)]
pub struct CsvRecordReaderBuilder {
    config: ReaderConfig,
    registry: Option<Arc<Registry>>,
}

impl CsvRecordReaderBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `registry` instead of the global one for field and header caching.
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the field delimiter.
    ///
    /// # Parameters
    /// - `delimiter`: The byte separating columns
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_record::item::csv::csv_reader::CsvRecordReaderBuilder;
    ///
    /// let builder = CsvRecordReaderBuilder::new().delimiter(b'|');
    /// ```
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Lines starting with `comment` are skipped.
    pub fn comment(mut self, comment: u8) -> Self {
        self.config.comment = Some(comment);
        self
    }

    /// Enables or disables quote handling.
    ///
    /// # Parameters
    /// - `yes`: When `false`, quote characters are ordinary field content
    pub fn quoting(mut self, yes: bool) -> Self {
        self.config.quoting = yes;
        self
    }

    /// Sets the record terminator.
    ///
    /// # Parameters
    /// - `terminator`: The byte ending each record, in place of `\r`, `\n`
    ///   and `\r\n`
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_record::item::csv::csv_reader::CsvRecordReaderBuilder;
    ///
    /// let builder = CsvRecordReaderBuilder::new().terminator(b';');
    /// ```
    pub fn terminator(mut self, terminator: u8) -> Self {
        self.config.terminator = Some(terminator);
        self
    }

    /// Sets how many columns every record must have.
    ///
    /// # Parameters
    /// - `count`: See [`FieldCount`]; the default fixes it from the first record
    pub fn fields_per_record(mut self, count: FieldCount) -> Self {
        self.config.fields_per_record = count;
        self
    }

    /// Consume the first row as the header.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.config.has_headers = yes;
        self
    }

    /// Characters to strip from both ends of every column value.
    ///
    /// ```
    /// use csv_record::item::csv::csv_reader::CsvRecordReaderBuilder;
    ///
    /// let builder = CsvRecordReaderBuilder::new().trim(" \t");
    /// ```
    pub fn trim(mut self, chars: &str) -> Self {
        self.config.trim = Some(chars.to_string());
        self
    }

    /// Adds strings read as `true` and `false` by boolean fields.
    pub fn custom_bool<T, F>(mut self, truthy: T, falsy: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        self.config.true_values.extend(truthy.into_iter().map(Into::into));
        self.config.false_values.extend(falsy.into_iter().map(Into::into));
        self
    }

    /// Sets an explicit header, disabling header derivation.
    pub fn header(mut self, header: Header) -> Self {
        self.config.header = Some(header);
        self
    }

    /// Creates a reader over any `Read` source.
    pub fn from_reader<R: Read>(self, rdr: R) -> CsvRecordReader<R> {
        let reader = self.config.csv_builder().from_reader(rdr);
        self.build(reader)
    }

    /// Creates a reader over a file.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Csv`] if the file cannot be opened.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvRecordReader<File>, RecordError> {
        let reader = self.config.csv_builder().from_path(path)?;
        Ok(self.build(reader))
    }

    fn build<R>(self, reader: Reader<R>) -> CsvRecordReader<R> {
        let ReaderConfig {
            delimiter,
            has_headers,
            fields_per_record,
            trim,
            true_values,
            false_values,
            header,
            ..
        } = self.config;

        CsvRecordReader {
            state: RefCell::new(ReaderState {
                reader,
                record: StringRecord::new(),
                header_row: None,
            }),
            delimiter,
            has_headers,
            fields_per_record,
            trim: trim
                .filter(|chars| !chars.is_empty())
                .map(|chars| chars.chars().collect()),
            bools: BoolVocabulary::new(true_values, false_values),
            header: header.map(Arc::new),
            registry: self.registry.unwrap_or_else(Registry::global),
        }
    }
}
