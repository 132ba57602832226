use crate::error::RecordError;

/// Represents the result of reading an item from the reader.
///
/// `Ok(Some(item))` for a record, `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<T> = Result<Option<T>, RecordError>;

/// Represents the result of writing items.
pub type ItemWriterResult = Result<(), RecordError>;

/// A source of records, one at a time.
pub trait ItemReader<T> {
    fn read(&self) -> ItemReaderResult<T>;
}

/// A sink of records.
pub trait ItemWriter<T> {
    fn write(&self, item: &T) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }
}
