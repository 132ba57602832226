/// Reader and writer traits shared by the CSV components
pub mod item;

/// Record descriptor tables and field metadata
pub mod field;

/// Column name to position mapping
pub mod header;

/// Field and header caches
pub mod registry;

/// Field kinds and value coercion
pub mod value;
