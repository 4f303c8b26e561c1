//! Project file structures

mod error;
mod repr;

pub use error::{Error, Result};
pub use repr::{Project, SubroutineAssertion};
