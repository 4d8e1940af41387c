//! Request handler module
//!
//! Maps request paths onto files under the base directory.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
