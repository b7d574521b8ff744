//! Automatic differentiation for small fixed-size matrix kernels.
//!
//! Element-assembly code builds differentiable containers ([`AdMat`] for
//! first-order work, [`Ad2Mat`] for second-order), wires them into
//! expression objects ([`matmul`], [`matsum`], ...), and drives the
//! explicit phase protocol: construction evaluates the primal value,
//! `forward`/`reverse` propagate tangents and adjoints, and
//! `hforward`/`hreverse` produce exact Hessian-vector products. The
//! caller invokes phases in dependency order; there is no graph scheduler.
//!
//! Every kernel is certified against complex-step differentiation through
//! the [`check`] harness.

pub mod admat;
pub mod check;
pub mod float;
pub mod mat;
pub mod matmul;
pub mod matsum;
pub mod scalar;
pub mod select;

pub use admat::{Ad2Mat, AdMat, Operand, Operand2, Seed, Tr};
pub use check::{run, CheckMode, DerivativeTest};
pub use float::Float;
pub use mat::{Accum, Mat, MatRead, MatWrite, Store, TrView, TrWrite};
pub use matmul::{matmul, matmul2, matmul_core, MatMul2Expr, MatMulExpr};
pub use matsum::{matcopy_core, matsum, matsum2, matsum_core, MatSum2Expr, MatSumExpr};
pub use scalar::Scalar;
pub use select::{Active, First, MatOf, Passive, Second, SelectMat};

/// Type alias for a square 2x2 matrix.
pub type Mat2<T> = Mat<T, 2, 2>;
/// Type alias for a square 3x3 matrix.
pub type Mat3<T> = Mat<T, 3, 3>;
