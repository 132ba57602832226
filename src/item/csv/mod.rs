//! CSV support for reading and writing typed records.
//!
//! This module connects the record engine in [`crate::core`] to the `csv`
//! crate, which does the tokenizing and quoting.
//!
//! # Module Architecture
//!
//! 1. **CsvRecordReader**: pulls one raw record per call from a `csv::Reader`
//!    and sets each field of the destination record from the column its name
//!    maps to, coercing the text to the field's type.
//!
//! 2. **RecordFormatter** / **to_csv**: render a record as one delimited line,
//!    fields in the same order the reader sets them.
//!
//! 3. **CsvRecordWriter**: streams records to any `Write` sink through a
//!    `csv::Writer`, with an optional header row.
//!
//! Reader and writer follow the builder pattern for configuration.
//!
//! # Examples
//!
//! ```
//! use csv_record::core::field::{FieldSet, Record};
//! use csv_record::item::csv::csv_reader::CsvRecordReaderBuilder;
//! use csv_record::item::csv::csv_writer::{RecordFormatter, WriterConfig};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u8,
//! }
//!
//! impl Record for Person {
//!     fn describe(fields: &mut FieldSet<'_, Self>) {
//!         fields
//!             .field("Name", |p| &p.name, |p| &mut p.name)
//!             .field("Age", |p| &p.age, |p| &mut p.age);
//!     }
//! }
//!
//! let formatter = RecordFormatter::new(WriterConfig::default());
//! let line = formatter
//!     .format(&Person { name: "Alice".to_string(), age: 28 })
//!     .unwrap();
//! assert_eq!(line, "Alice,28");
//!
//! let reader = CsvRecordReaderBuilder::new().from_reader(line.as_bytes());
//! let mut person = Person::default();
//! reader.read_into(&mut person).unwrap();
//! assert_eq!(person, Person { name: "Alice".to_string(), age: 28 });
//! ```

/// A module providing facilities for reading CSV records into typed records.
pub mod csv_reader;

/// A module providing facilities for rendering typed records as CSV.
pub mod csv_writer;

/// Serializes single byte settings (delimiters, comment markers) as one
/// character strings.
pub(crate) mod serde_byte {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(byte: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(char::from(*byte))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let c = char::deserialize(deserializer)?;
        u8::try_from(c)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| D::Error::custom(format!("{c:?} is not a single byte character")))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            byte: &Option<u8>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match byte {
                Some(byte) => serializer.serialize_some(&char::from(*byte)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u8>, D::Error> {
            match Option::<char>::deserialize(deserializer)? {
                Some(c) => u8::try_from(c)
                    .ok()
                    .filter(u8::is_ascii)
                    .map(Some)
                    .ok_or_else(|| {
                        D::Error::custom(format!("{c:?} is not a single byte character"))
                    }),
                None => Ok(None),
            }
        }
    }
}
