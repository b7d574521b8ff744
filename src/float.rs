use std::fmt::{Debug, Display, LowerExp};

use num_traits::{Float as NumFloat, FromPrimitive};

/// Marker trait for base floating-point types (`f32`, `f64`).
///
/// Bundles the numeric and utility traits the verification harness needs.
/// Only primitive float types implement this; complex scalars and other
/// matrix entry types go through [`crate::Scalar`] instead.
pub trait Float:
    NumFloat + FromPrimitive + Copy + Send + Sync + Default + Debug + Display + LowerExp + 'static
{
}

impl Float for f32 {}
impl Float for f64 {}
