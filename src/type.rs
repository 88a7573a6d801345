use std::fmt::Debug;

use num_traits::Float;

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Only floating point
/// coordinates are supported: distances are compared as floats and radius queries need
/// fractional thresholds.
pub trait IndexableNum: private::Sealed + Float + Debug + Send + Sync + bytemuck::Pod {}

impl IndexableNum for f32 {}

impl IndexableNum for f64 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
