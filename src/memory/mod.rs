//! ROM image loading and bus-to-file address translation

mod rombin;

pub use rombin::{MappingType, Rom};

#[cfg(test)]
mod tests;
