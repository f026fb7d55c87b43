pub mod buffer;
pub mod checksum;
pub mod core_api;
pub mod field;
pub mod registry;
pub mod version;
