// Public modules
pub mod checksum;
pub mod codec;
pub mod csv;
pub mod dates;
pub mod dns;
pub mod error;
pub mod fsops;
pub mod glob;
pub mod hash;
pub mod http;
pub mod humanize;
pub mod modes;
pub mod netproc;
pub mod numfmt;
pub mod output;
pub mod procfs;
pub mod signals;
pub mod slugify;
pub mod template;
pub mod users;
pub mod walk;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Hint, Result};
