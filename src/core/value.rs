use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Canonical token substituted for a custom true string before parsing.
const CANONICAL_TRUE: &str = "T";
/// Canonical token substituted for a custom false string before parsing.
const CANONICAL_FALSE: &str = "F";

/// The closed set of field kinds a record field can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    String,
    SignedInteger,
    UnsignedInteger,
    FloatingPoint,
    Boolean,
    /// A user type implementing [`CsvValue`] itself.
    Custom,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::SignedInteger => "signed integer",
            FieldKind::UnsignedInteger => "unsigned integer",
            FieldKind::FloatingPoint => "floating point",
            FieldKind::Boolean => "boolean",
            FieldKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Caller supplied true / false synonyms, layered on top of [`parse_bool`].
///
/// A string present in both sets is read as `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolVocabulary {
    truthy: HashSet<String>,
    falsy: HashSet<String>,
}

impl BoolVocabulary {
    pub fn new<T, F>(truthy: T, falsy: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        BoolVocabulary {
            truthy: truthy.into_iter().map(Into::into).collect(),
            falsy: falsy.into_iter().map(Into::into).collect(),
        }
    }

    /// Translates a custom synonym to a token [`parse_bool`] understands.
    /// Anything else is passed through unchanged.
    pub fn translate<'a>(&self, value: &'a str) -> &'a str {
        if self.truthy.contains(value) {
            CANONICAL_TRUE
        } else if self.falsy.contains(value) {
            CANONICAL_FALSE
        } else {
            value
        }
    }

    pub fn parse(&self, value: &str) -> Result<bool, ValueError> {
        parse_bool(self.translate(value))
    }
}

/// Default boolean parser.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(value: &str) -> Result<bool, ValueError> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::invalid("invalid boolean")),
    }
}

/// Tokens used when rendering boolean fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolTokens {
    pub true_token: String,
    pub false_token: String,
}

impl BoolTokens {
    pub fn new(true_token: impl Into<String>, false_token: impl Into<String>) -> Self {
        BoolTokens {
            true_token: true_token.into(),
            false_token: false_token.into(),
        }
    }

    pub fn render(&self, value: bool) -> &str {
        if value {
            &self.true_token
        } else {
            &self.false_token
        }
    }
}

impl Default for BoolTokens {
    fn default() -> Self {
        BoolTokens::new("true", "false")
    }
}

/// A value that can be stored in a record field and exchanged with a CSV column.
///
/// Implemented for `String`, every primitive integer, `f32`, `f64`, `bool`
/// and `Option` of those. Implement it for your own types (with
/// [`FieldKind::Custom`]) to take part in record mapping; a type that can
/// only travel in one direction returns [`ValueError::Unsupported`] from the
/// other.
///
/// # Examples
///
/// ```
/// use csv_record::core::value::{BoolTokens, BoolVocabulary, CsvValue, FieldKind};
/// use csv_record::error::ValueError;
///
/// #[derive(Debug, PartialEq)]
/// struct Cents(u64);
///
/// impl CsvValue for Cents {
///     const KIND: FieldKind = FieldKind::Custom;
///
///     fn coerce(raw: &str, _bools: &BoolVocabulary) -> Result<Self, ValueError> {
///         let amount: f64 = raw.parse().map_err(ValueError::invalid)?;
///         Ok(Cents((amount * 100.0).round() as u64))
///     }
///
///     fn render(&self, _tokens: &BoolTokens) -> Result<String, ValueError> {
///         Ok(format!("{}.{:02}", self.0 / 100, self.0 % 100))
///     }
/// }
///
/// let cents = Cents::coerce("12.5", &BoolVocabulary::default()).unwrap();
/// assert_eq!(cents, Cents(1250));
/// assert_eq!(cents.render(&BoolTokens::default()).unwrap(), "12.50");
/// ```
pub trait CsvValue: Sized {
    const KIND: FieldKind;

    /// Converts a (trimmed) column value into the field's native type.
    fn coerce(raw: &str, bools: &BoolVocabulary) -> Result<Self, ValueError>;

    /// Renders the value to its column form.
    fn render(&self, tokens: &BoolTokens) -> Result<String, ValueError>;
}

impl CsvValue for String {
    const KIND: FieldKind = FieldKind::String;

    fn coerce(raw: &str, _bools: &BoolVocabulary) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }

    fn render(&self, _tokens: &BoolTokens) -> Result<String, ValueError> {
        Ok(self.clone())
    }
}

impl CsvValue for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn coerce(raw: &str, bools: &BoolVocabulary) -> Result<Self, ValueError> {
        bools.parse(raw)
    }

    fn render(&self, tokens: &BoolTokens) -> Result<String, ValueError> {
        Ok(tokens.render(*self).to_string())
    }
}

// Empty columns read as zero for every numeric kind.
macro_rules! impl_numeric {
    ($kind:expr => $($ty:ty),+) => {
        $(
            impl CsvValue for $ty {
                const KIND: FieldKind = $kind;

                fn coerce(raw: &str, _bools: &BoolVocabulary) -> Result<Self, ValueError> {
                    if raw.is_empty() {
                        return Ok(<$ty>::default());
                    }
                    raw.parse::<$ty>().map_err(ValueError::invalid)
                }

                fn render(&self, _tokens: &BoolTokens) -> Result<String, ValueError> {
                    Ok(self.to_string())
                }
            }
        )+
    };
}

impl_numeric!(FieldKind::SignedInteger => i8, i16, i32, i64, i128, isize);
impl_numeric!(FieldKind::UnsignedInteger => u8, u16, u32, u64, u128, usize);
impl_numeric!(FieldKind::FloatingPoint => f32, f64);

impl<V: CsvValue> CsvValue for Option<V> {
    const KIND: FieldKind = V::KIND;

    fn coerce(raw: &str, bools: &BoolVocabulary) -> Result<Self, ValueError> {
        if raw.is_empty() {
            return Ok(None);
        }
        V::coerce(raw, bools).map(Some)
    }

    fn render(&self, tokens: &BoolTokens) -> Result<String, ValueError> {
        match self {
            Some(value) => value.render(tokens),
            None => Ok(String::new()),
        }
    }
}
