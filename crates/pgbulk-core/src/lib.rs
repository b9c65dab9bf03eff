#[macro_use]
mod macros;

pub mod driver;
pub use driver::Executor;

mod error;
pub use error::{Error, IntoError};

pub mod schema;
pub use schema::{Record, TableDescriptor};

pub mod stmt;

/// A Result type alias that uses pgbulk's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
