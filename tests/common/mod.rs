#![allow(dead_code)]

pub mod mocks;

use csv_record::{
    core::{
        field::{FieldSet, Record},
        value::{BoolTokens, BoolVocabulary, CsvValue, FieldKind},
    },
    error::ValueError,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Account {
    pub name: String,
    pub age: i32,
    pub balance: f64,
    pub low_balance: bool,
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

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NameBalance {
    pub name: String,
    pub balance: f64,
}

impl Record for NameBalance {
    fn describe(fields: &mut FieldSet<'_, Self>) {
        fields
            .field("Name", |p| &p.name, |p| &mut p.name)
            .field("Balance", |p| &p.balance, |p| &mut p.balance);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Base {
    pub field1: String,
    pub field2: String,
}

impl Record for Base {
    fn describe(fields: &mut FieldSet<'_, Self>) {
        fields
            .field("Field1", |b| &b.field1, |b| &mut b.field1)
            .field("Field2", |b| &b.field2, |b| &mut b.field2);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extended {
    pub base: Base,
    pub field3: String,
    pub internal: String,
}

impl Record for Extended {
    fn describe(fields: &mut FieldSet<'_, Self>) {
        fields
            .embed("Base", |e| &e.base, |e| &mut e.base)
            .field("Field3", |e| &e.field3, |e| &mut e.field3)
            .tagged("Internal", "-", |e| &e.internal, |e| &mut e.internal);
    }
}

/// A value that can be written but never read back.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Checksum(pub u32);

impl CsvValue for Checksum {
    const KIND: FieldKind = FieldKind::Custom;

    fn coerce(_raw: &str, _bools: &BoolVocabulary) -> Result<Self, ValueError> {
        Err(ValueError::Unsupported)
    }

    fn render(&self, _tokens: &BoolTokens) -> Result<String, ValueError> {
        Ok(format!("{:08x}", self.0))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Signed {
    pub payload: String,
    pub checksum: Checksum,
}

impl Record for Signed {
    fn describe(fields: &mut FieldSet<'_, Self>) {
        fields
            .field("Payload", |s| &s.payload, |s| &mut s.payload)
            .field("Checksum", |s| &s.checksum, |s| &mut s.checksum);
    }
}

/// A value that can be read but must never be written out.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Secret(pub String);

impl CsvValue for Secret {
    const KIND: FieldKind = FieldKind::Custom;

    fn coerce(raw: &str, _bools: &BoolVocabulary) -> Result<Self, ValueError> {
        Ok(Secret(raw.to_string()))
    }

    fn render(&self, _tokens: &BoolTokens) -> Result<String, ValueError> {
        Err(ValueError::Unsupported)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Login {
    pub user: String,
    pub password: Secret,
}

impl Record for Login {
    fn describe(fields: &mut FieldSet<'_, Self>) {
        fields
            .field("User", |l| &l.user, |l| &mut l.user)
            .field("Password", |l| &l.password, |l| &mut l.password);
    }
}

/// A percentage that refuses to render outside `0..=100`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Percent(pub u8);

impl CsvValue for Percent {
    const KIND: FieldKind = FieldKind::Custom;

    fn coerce(raw: &str, _bools: &BoolVocabulary) -> Result<Self, ValueError> {
        raw.trim_end_matches('%')
            .parse()
            .map(Percent)
            .map_err(ValueError::invalid)
    }

    fn render(&self, _tokens: &BoolTokens) -> Result<String, ValueError> {
        if self.0 > 100 {
            return Err(ValueError::invalid(format!("{} is above 100%", self.0)));
        }
        Ok(format!("{}%", self.0))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Score {
    pub name: String,
    pub percent: Percent,
}

impl Record for Score {
    fn describe(fields: &mut FieldSet<'_, Self>) {
        fields
            .field("Name", |s| &s.name, |s| &mut s.name)
            .field("Percent", |s| &s.percent, |s| &mut s.percent);
    }
}
