//! Packing strategies for bulk-loaded RTrees.

mod hilbert;
mod str;
mod r#trait;

pub use hilbert::HilbertSort;
pub use r#str::STRSort;
pub use r#trait::{Sort, SortEntry, SortParams};
