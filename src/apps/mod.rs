//! Applications served through the gateway.

pub mod static_files;

pub use static_files::StaticFiles;
