use std::{fmt, sync::Arc};

use crate::{
    core::{
        registry::Registry,
        value::{BoolTokens, BoolVocabulary, CsvValue, FieldKind},
    },
    error::ValueError,
};

/// A record type that can be mapped to and from CSV lines.
///
/// `describe` is the record's descriptor table: it registers, in declaration
/// order, every field that takes part in CSV mapping. Fields that are not
/// registered, or that are registered with a skip tag, are left untouched by
/// readers and never rendered by writers.
///
/// # Examples
///
/// ```
/// use csv_record::core::field::{FieldSet, Record};
///
/// #[derive(Debug, Default)]
/// struct Person {
///     name: String,
///     age: i32,
///     balance: f32,
///     note: String,
/// }
///
/// impl Record for Person {
///     fn describe(fields: &mut FieldSet<'_, Self>) {
///         fields
///             .field("Name", |p| &p.name, |p| &mut p.name)
///             .field("Age", |p| &p.age, |p| &mut p.age)
///             .field("Balance", |p| &p.balance, |p| &mut p.balance)
///             .tagged("Note", "-", |p| &p.note, |p| &mut p.note);
///     }
/// }
/// ```
pub trait Record: Sized + 'static {
    fn describe(fields: &mut FieldSet<'_, Self>);
}

/// Returns `true` when a field tag excludes the field from CSV mapping.
pub fn is_skip_tag(tag: &str) -> bool {
    tag.starts_with('-')
}

/// Typed access to one field of a record, erased over the field's type.
pub(crate) trait FieldAccess<T>: Send + Sync {
    fn assign(&self, record: &mut T, raw: &str, bools: &BoolVocabulary) -> Result<(), ValueError>;

    fn render(&self, record: &T, tokens: &BoolTokens) -> Result<String, ValueError>;
}

struct Direct<T, V> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T, V: CsvValue> FieldAccess<T> for Direct<T, V> {
    fn assign(&self, record: &mut T, raw: &str, bools: &BoolVocabulary) -> Result<(), ValueError> {
        *(self.get_mut)(record) = V::coerce(raw, bools)?;
        Ok(())
    }

    fn render(&self, record: &T, tokens: &BoolTokens) -> Result<String, ValueError> {
        (self.get)(record).render(tokens)
    }
}

/// Access to a field of an embedded record, reached through its parent.
struct Embedded<T, U> {
    get: fn(&T) -> &U,
    get_mut: fn(&mut T) -> &mut U,
    inner: Arc<dyn FieldAccess<U>>,
}

impl<T, U> FieldAccess<T> for Embedded<T, U> {
    fn assign(&self, record: &mut T, raw: &str, bools: &BoolVocabulary) -> Result<(), ValueError> {
        self.inner.assign((self.get_mut)(record), raw, bools)
    }

    fn render(&self, record: &T, tokens: &BoolTokens) -> Result<String, ValueError> {
        self.inner.render((self.get)(record), tokens)
    }
}

/// Metadata about one eligible field of a record type.
pub struct FieldDescriptor<T> {
    name: String,
    kind: FieldKind,
    path: Vec<String>,
    access: Arc<dyn FieldAccess<T>>,
}

impl<T> FieldDescriptor<T> {
    /// Column name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Embedded fields traversed to reach this field, outermost first.
    /// Empty for fields declared directly on the record.
    pub fn embedding(&self) -> &[String] {
        &self.path
    }

    /// Dotted path of the field, e.g. `Base.Field1` for a flattened field.
    pub fn source_path(&self) -> String {
        let mut path = self.path.join(".");
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(&self.name);
        path
    }

    pub(crate) fn assign(
        &self,
        record: &mut T,
        raw: &str,
        bools: &BoolVocabulary,
    ) -> Result<(), ValueError> {
        self.access.assign(record, raw, bools)
    }

    pub(crate) fn render(&self, record: &T, tokens: &BoolTokens) -> Result<String, ValueError> {
        self.access.render(record, tokens)
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        FieldDescriptor {
            name: self.name.clone(),
            kind: self.kind,
            path: self.path.clone(),
            access: Arc::clone(&self.access),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("source_path", &self.source_path())
            .finish()
    }
}

impl<T> PartialEq for FieldDescriptor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind && self.path == other.path
    }
}

/// Collects the descriptors of a record type while its [`Record::describe`] runs.
pub struct FieldSet<'r, T> {
    registry: &'r Registry,
    fields: Vec<FieldDescriptor<T>>,
}

impl<'r, T: Record> FieldSet<'r, T> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        FieldSet {
            registry,
            fields: Vec::new(),
        }
    }

    /// Registers a field.
    pub fn field<V>(
        &mut self,
        name: &str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self
    where
        V: CsvValue + 'static,
    {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            kind: V::KIND,
            path: Vec::new(),
            access: Arc::new(Direct { get, get_mut }),
        });
        self
    }

    /// Registers a field carrying a `csv` tag. A tag of `-` (or starting with
    /// `-`) skips the field in both directions.
    pub fn tagged<V>(
        &mut self,
        name: &str,
        tag: &str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self
    where
        V: CsvValue + 'static,
    {
        if is_skip_tag(tag) {
            return self;
        }
        self.field(name, get, get_mut)
    }

    /// Flattens an embedded record: its fields are spliced in at this position
    /// as if they were declared on the parent.
    pub fn embed<U: Record>(
        &mut self,
        name: &str,
        get: fn(&T) -> &U,
        get_mut: fn(&mut T) -> &mut U,
    ) -> &mut Self {
        let inner = self.registry.fields::<U>();
        for field in inner.iter() {
            let mut path = Vec::with_capacity(field.path.len() + 1);
            path.push(name.to_string());
            path.extend(field.path.iter().cloned());

            self.fields.push(FieldDescriptor {
                name: field.name.clone(),
                kind: field.kind,
                path,
                access: Arc::new(Embedded {
                    get,
                    get_mut,
                    inner: Arc::clone(&field.access),
                }),
            });
        }
        self
    }

    pub(crate) fn finish(self) -> FieldList<T> {
        FieldList {
            type_name: std::any::type_name::<T>(),
            fields: self.fields,
        }
    }
}

/// The ordered, eligible fields of a record type.
pub struct FieldList<T> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> FieldList<T> {
    /// Stable name of the record type the list was built for.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldDescriptor<T>> {
        self.fields.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor<T>> {
        self.fields.iter()
    }

    /// Column names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(FieldDescriptor::name).collect()
    }
}

impl<T> fmt::Debug for FieldList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldList")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<T> PartialEq for FieldList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.fields == other.fields
    }
}

impl<'a, T> IntoIterator for &'a FieldList<T> {
    type Item = &'a FieldDescriptor<T>;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
