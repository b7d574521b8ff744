//! The [`Scalar`] trait for matrix entry types.
//!
//! Kernels written over `T: Scalar` work transparently with plain `f32`/`f64`
//! and with `num_complex::Complex<F>`, which is what lets the complex-step
//! harness drive the whole derivative machinery on complex entries.

use std::fmt::{Debug, Display};

use num_traits::NumAssign;

/// Entry type of a matrix: ring arithmetic plus the utility bounds the
/// containers rely on.
///
/// Weaker than [`crate::Float`]: no ordering and no transcendentals, which
/// complex scalars cannot provide.
pub trait Scalar: NumAssign + Copy + Default + Debug + Display + Send + Sync + 'static {}

impl<T> Scalar for T where T: NumAssign + Copy + Default + Debug + Display + Send + Sync + 'static {}
