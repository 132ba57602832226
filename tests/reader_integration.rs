pub mod common;

use std::{
    fs,
    io::{self, ErrorKind},
    sync::Arc,
};

use common::{Account, NameBalance, Signed, init_logger, mocks::MockSource};
use csv_record::{
    RecordError,
    core::{header::Header, item::ItemReader, registry::Registry},
    item::csv::csv_reader::{CsvRecordReaderBuilder, FieldCount, ReaderConfig},
};

const ACCOUNTS: &str = "Tony|23|123.456|Y\nJohn|34|234.567|N";

#[test]
fn accounts_are_read_with_custom_booleans() {
    init_logger();

    let reader = CsvRecordReaderBuilder::new()
        .delimiter(b'|')
        .custom_bool(["Y"], ["N"])
        .from_reader(ACCOUNTS.as_bytes());

    let mut account = Account::default();
    reader.read_into(&mut account).expect("first record");
    assert_eq!(
        account,
        Account {
            name: "Tony".to_string(),
            age: 23,
            balance: 123.456,
            low_balance: true,
        }
    );
    assert_eq!(reader.last_line(), "Tony|23|123.456|Y");

    reader.read_into(&mut account).expect("second record");
    assert_eq!(account.name, "John");
    assert!(!account.low_balance);
}

#[test]
fn end_of_data_keeps_the_last_record() {
    let reader = CsvRecordReaderBuilder::new()
        .delimiter(b'|')
        .custom_bool(["Y"], ["N"])
        .from_reader(ACCOUNTS.as_bytes());

    let mut account = Account::default();
    let mut count = 0;
    loop {
        match reader.read_into(&mut account) {
            Ok(()) => count += 1,
            Err(error) if error.is_end_of_data() => break,
            Err(error) => panic!("unexpected error: {error}"),
        }
    }

    assert_eq!(count, 2);
    assert_eq!(
        account,
        Account {
            name: "John".to_string(),
            age: 34,
            balance: 234.567,
            low_balance: false,
        }
    );

    // Still exhausted on the next call.
    assert!(matches!(
        reader.read_into(&mut account),
        Err(RecordError::EndOfData)
    ));
}

#[test]
fn selective_header_reads_a_subset_of_columns() {
    let reader = CsvRecordReaderBuilder::new()
        .delimiter(b'|')
        .header(Header::from_iter([("Name", 0), ("Balance", 2)]))
        .from_reader(ACCOUNTS.as_bytes());

    let records: Vec<NameBalance> = reader
        .records::<NameBalance>()
        .collect::<Result<_, _>>()
        .expect("both records read");

    assert_eq!(
        records,
        vec![
            NameBalance {
                name: "Tony".to_string(),
                balance: 123.456
            },
            NameBalance {
                name: "John".to_string(),
                balance: 234.567
            },
        ]
    );
}

#[test]
fn unknown_boolean_falls_back_and_fails() {
    let reader = CsvRecordReaderBuilder::new()
        .delimiter(b'|')
        .custom_bool(["Y"], ["N"])
        .from_reader("Tony|23|1|maybe\nJohn|34|2|true".as_bytes());

    let first: Result<Option<Account>, RecordError> = reader.read();
    match first {
        Err(RecordError::Coercion { field, value, .. }) => {
            assert_eq!(field, "LowBalance");
            assert_eq!(value, "maybe");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    // Standard spellings still work next to the custom ones.
    let second: Option<Account> = reader.read().expect("second record");
    assert_eq!(second.map(|a| a.low_balance), Some(true));
}

#[test]
fn trimming_strips_configured_characters() {
    let reader = CsvRecordReaderBuilder::new()
        .delimiter(b'|')
        .trim(" ")
        .from_reader(" Tom |  41 | 0.5 |  F".as_bytes());

    let account: Option<Account> = reader.read().expect("record");
    assert_eq!(
        account,
        Some(Account {
            name: "Tom".to_string(),
            age: 41,
            balance: 0.5,
            low_balance: false,
        })
    );
}

#[test]
fn empty_numeric_columns_read_as_zero() {
    let reader = CsvRecordReaderBuilder::new()
        .delimiter(b'|')
        .from_reader("Zed|||0".as_bytes());

    let mut account = Account {
        age: 99,
        balance: 99.9,
        ..Default::default()
    };
    reader.read_into(&mut account).expect("record");
    assert_eq!(account.age, 0);
    assert_eq!(account.balance, 0.0);
}

#[test]
fn io_errors_are_propagated_and_leave_destination_untouched() {
    let mut source = MockSource::new();
    source
        .expect_read()
        .returning(|_| Err(io::Error::new(ErrorKind::Other, "disk unplugged")));

    let reader = CsvRecordReaderBuilder::new().from_reader(source);

    let mut account = Account {
        name: "kept".to_string(),
        ..Default::default()
    };

    match reader.read_into(&mut account) {
        Err(RecordError::Csv(error)) => assert!(error.is_io_error()),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(account.name, "kept");
}

#[test]
fn write_only_fields_cannot_be_read() {
    let reader = CsvRecordReaderBuilder::new().from_reader("hello,0000002a".as_bytes());

    let mut signed = Signed::default();
    match reader.read_into(&mut signed) {
        Err(RecordError::UnsupportedKind { field }) => assert_eq!(field, "Checksum"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(signed.payload, "hello");
}

#[test]
fn reader_configuration_loads_from_json() {
    let config: ReaderConfig = serde_json::from_str(
        r##"{
            "delimiter": ";",
            "comment": "#",
            "fields_per_record": "variable",
            "trim": " ",
            "true_values": ["yes"],
            "false_values": ["no"],
            "header": { "Name": 1, "Age": 0, "Balance": 3, "LowBalance": 2 }
        }"##,
    )
    .expect("valid configuration");

    assert_eq!(config.comment, Some(b'#'));
    assert_eq!(config.fields_per_record, FieldCount::Variable);

    let reader = CsvRecordReaderBuilder::new()
        .config(config)
        .registry(Arc::new(Registry::new()))
        .from_reader("# age;name;low;balance\n 7 ; Ada ; yes ; 1.25 ; extra".as_bytes());

    let account: Option<Account> = reader.read().expect("record");
    assert_eq!(
        account,
        Some(Account {
            name: "Ada".to_string(),
            age: 7,
            balance: 1.25,
            low_balance: true,
        })
    );
}

#[test]
fn invalid_delimiter_in_configuration_is_rejected() {
    let result: Result<ReaderConfig, _> = serde_json::from_str(r#"{ "delimiter": "é" }"#);
    assert!(result.is_err());
}

#[test]
fn header_row_and_files() -> Result<(), RecordError> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("accounts.csv");
    fs::write(
        &path,
        "LowBalance,Balance,Age,Name\ntrue,10.5,30,Ann\nfalse,20,31,Bob\n",
    )?;

    let reader = CsvRecordReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)?;

    let names: Vec<String> = reader
        .records::<Account>()
        .map(|account| account.map(|a| a.name))
        .collect::<Result<_, _>>()?;

    assert_eq!(names, vec!["Ann", "Bob"]);
    assert_eq!(reader.header().and_then(|h| h.position("Name")), Some(3));
    Ok(())
}

#[test]
fn a_reader_can_fill_different_record_types() {
    let reader = CsvRecordReaderBuilder::new()
        .delimiter(b'|')
        .custom_bool(["Y"], ["N"])
        .from_reader(ACCOUNTS.as_bytes());

    let mut account = Account::default();
    reader.read_into(&mut account).expect("account");
    assert_eq!(account.balance, 123.456);

    // The derived header of NameBalance maps Balance to column 1.
    let mut partial = NameBalance::default();
    reader.read_into(&mut partial).expect("name and balance");
    assert_eq!(
        partial,
        NameBalance {
            name: "John".to_string(),
            balance: 34.0
        }
    );
}
