#![doc = include_str!("../README.md")]

mod batch;
mod error;
pub mod geometry;
pub mod rtree;
mod r#type;

pub use batch::{build, knn, within_distance};
pub use error::{IndexError, Result};
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
