use std::{
    any::{Any, TypeId},
    sync::{Arc, LazyLock},
};

use dashmap::DashMap;
use log::debug;

use crate::core::{
    field::{FieldList, FieldSet, Record},
    header::Header,
};

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// Per type field and header caches.
///
/// Entries are computed on first use of a record type and never evicted or
/// replaced: when two threads populate the same type concurrently, the first
/// insert wins and both observe the same entry afterwards. Descriptor tables
/// run outside any map lock, so a record embedding another record can
/// resolve the embedded type through the same registry.
///
/// Readers and writers use [`Registry::global`] unless they are given their
/// own registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use csv_record::core::{field::{FieldSet, Record}, registry::Registry};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl Record for Point {
///     fn describe(fields: &mut FieldSet<'_, Self>) {
///         fields
///             .field("X", |p| &p.x, |p| &mut p.x)
///             .field("Y", |p| &p.y, |p| &mut p.y);
///     }
/// }
///
/// let registry = Registry::new();
/// let first = registry.fields::<Point>();
/// let second = registry.fields::<Point>();
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(registry.header::<Point>().position("Y"), Some(1));
/// ```
#[derive(Default)]
pub struct Registry {
    fields: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    headers: DashMap<TypeId, Arc<Header>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// The process wide registry.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Returns the ordered field list of `T`, building and caching it on first use.
    pub fn fields<T: Record>(&self) -> Arc<FieldList<T>> {
        let key = TypeId::of::<T>();

        if let Some(fields) = self.cached_fields::<T>(&key) {
            return fields;
        }

        let mut set = FieldSet::new(self);
        T::describe(&mut set);
        let built: Arc<FieldList<T>> = Arc::new(set.finish());
        debug!(
            "Caching {} fields for {}",
            built.len(),
            built.type_name()
        );

        let entry = self
            .fields
            .entry(key)
            .or_insert_with(|| built.clone() as Arc<dyn Any + Send + Sync>)
            .clone();

        entry.downcast::<FieldList<T>>().unwrap_or(built)
    }

    /// Returns the header derived from `T`'s field order, caching it on first use.
    pub fn header<T: Record>(&self) -> Arc<Header> {
        let key = TypeId::of::<T>();

        if let Some(header) = self.headers.get(&key) {
            return Arc::clone(header.value());
        }

        let fields = self.fields::<T>();
        let derived = Arc::new(Header::derive(&fields));
        debug!("Caching header for {}: {:?}", fields.type_name(), derived);

        Arc::clone(self.headers.entry(key).or_insert(derived).value())
    }

    /// Number of record types with a cached field list.
    pub fn cached_types(&self) -> usize {
        self.fields.len()
    }

    fn cached_fields<T: Record>(&self, key: &TypeId) -> Option<Arc<FieldList<T>>> {
        let cached = Arc::clone(self.fields.get(key)?.value());
        cached.downcast::<FieldList<T>>().ok()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use crate::core::field::{FieldSet, Record};

    use super::Registry;

    #[derive(Default)]
    struct Row {
        name: String,
        count: u32,
    }

    impl Record for Row {
        fn describe(fields: &mut FieldSet<'_, Self>) {
            fields
                .field("Name", |r| &r.name, |r| &mut r.name)
                .field("Count", |r| &r.count, |r| &mut r.count);
        }
    }

    #[test]
    fn cached_entries_are_reused() {
        let registry = Registry::new();
        assert_eq!(registry.cached_types(), 0);

        let first = registry.fields::<Row>();
        let second = registry.fields::<Row>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.cached_types(), 1);

        let header = registry.header::<Row>();
        assert!(Arc::ptr_eq(&header, &registry.header::<Row>()));
    }

    #[test]
    fn cached_and_fresh_results_are_equal() {
        let warm = Registry::new();
        let _ = warm.fields::<Row>();
        let _ = warm.header::<Row>();

        let cold = Registry::new();
        assert_eq!(*warm.fields::<Row>(), *cold.fields::<Row>());
        assert_eq!(*warm.header::<Row>(), *cold.header::<Row>());
    }

    #[test]
    fn registries_are_isolated() {
        let one = Registry::new();
        let two = Registry::new();
        let _ = one.fields::<Row>();
        assert_eq!(one.cached_types(), 1);
        assert_eq!(two.cached_types(), 0);
    }

    #[test]
    fn concurrent_first_use_converges_on_one_entry() {
        let registry = Arc::new(Registry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.header::<Row>())
            })
            .collect();

        let headers: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect();

        for header in &headers {
            assert!(Arc::ptr_eq(header, &headers[0]));
        }
        assert_eq!(registry.cached_types(), 1);
    }

    #[test]
    fn global_registry_is_shared() {
        assert!(Arc::ptr_eq(&Registry::global(), &Registry::global()));
    }
}
