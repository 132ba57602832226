#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # CSV Record for Rust

 Map CSV lines to typed records and back, without writing per-field
 marshaling code.

 ## Core Concepts

- **Record:** A type that lists its fields, in declaration order, through
  [`Record::describe`](core::field::Record::describe). Embedded records are
  flattened into their parent; fields tagged `-` are skipped in both directions.
- **Registry:** Caches each record type's field list and derived header. A
  process wide registry is used by default, and readers and writers accept
  their own for isolation.
- **Header:** Maps column names to positions. Derived from the field order,
  read from a header row, or supplied explicitly to pick a subset of columns.
- **CsvRecordReader:** Reads one CSV record per call into a record, coercing
  each column to its field's type.
- **RecordFormatter / CsvRecordWriter:** Render records back to CSV.

 ## Coercion

| **Kind**          | **Reading**                                         | **Writing**                  |
|-------------------|-----------------------------------------------------|------------------------------|
| string            | verbatim                                            | verbatim                     |
| signed / unsigned | base 10 at the field's width, empty reads as `0`    | base 10                      |
| floating point    | base 10, empty reads as `0.0`                       | shortest round-trip decimal  |
| boolean           | custom true / false strings, then `1 t T TRUE true True 0 f F FALSE false False` | configured true / false token |
| `Option<_>`       | empty reads as `None`                               | `None` writes empty          |

 ## Getting Started

```rust
use csv_record::{
    core::field::{FieldSet, Record},
    item::csv::{
        csv_reader::CsvRecordReaderBuilder,
        csv_writer::{to_csv, WriterConfig},
    },
    RecordError,
};

#[derive(Debug, Default, PartialEq)]
struct Account {
    name: String,
    age: i32,
    balance: f64,
    low_balance: bool,
}

impl Record for Account {
    fn describe(fields: &mut FieldSet<'_, Self>) {
        fields
            .field("Name", |a| &a.name, |a| &mut a.name)
            .field("Age", |a| &a.age, |a| &mut a.age)
            .field("Balance", |a| &a.balance, |a| &mut a.balance)
            .field("LowBalance", |a| &a.low_balance, |a| &mut a.low_balance);
    }
}

fn main() -> Result<(), RecordError> {
    let reader = CsvRecordReaderBuilder::new()
        .delimiter(b'|')
        .custom_bool(["Y"], ["N"])
        .from_reader("Tony|23|123.456|Y".as_bytes());

    let mut account = Account::default();
    loop {
        match reader.read_into(&mut account) {
            Ok(()) => {
                let line = to_csv(&account, &WriterConfig::new("|", "Y", "N"))?;
                assert_eq!(line, "Tony|23|123.456|Y");
            }
            Err(error) if error.is_end_of_data() => break,
            Err(error) => return Err(error),
        }
    }

    assert_eq!(account.name, "Tony");
    assert_eq!(account.balance, 123.456);
    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Record descriptors, headers, caches and value coercion
pub mod core;

/// Error types for record mapping
pub mod error;

#[doc(inline)]
pub use error::*;

/// CSV readers and writers for records
pub mod item;
