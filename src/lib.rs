pub mod config;
pub mod error;
pub mod ingest;

pub use config::Config;
pub use error::{ImportError, ImportErrors, Result};
pub use ingest::{
    from_directory, from_directory_match, from_file, from_zip, from_zip_by, from_zip_dirs,
    from_zip_dirs_by, Collections, PostRecord, DRAFTS_KEY,
};
