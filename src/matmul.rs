//! Matrix-matrix product with first- and second-order derivative
//! propagation.
//!
//! One primal kernel, [`matmul_core`], is the single source of truth:
//! every derivative phase re-invokes it with a different combination of
//! value/derivative views, transposed wrappers, and store/accumulate
//! targets. No phase carries a hand-derived formula of its own.
//!
//! The expression objects are transient. Construction evaluates the
//! primal product into the result container; the phase methods
//! (`forward`, `reverse`, and for second order `hforward`, `hreverse`)
//! only run when the caller invokes them, in whatever order matches the
//! data dependencies of the surrounding computation.

use crate::admat::{Ad2Mat, AdMat, Operand, Operand2};
use crate::mat::{Accum, MatRead, MatWrite, Store, TrView};
use crate::Scalar;

/// `C = A * B` over views: `A` is logically `M`-by-`K`, `B` is `K`-by-`N`.
///
/// Transposition is handled by wrapping an operand in
/// [`TrView`](crate::TrView), accumulation by passing an
/// [`Accum`](crate::Accum) target; conformability of every combination is
/// checked by the compiler.
#[inline]
pub fn matmul_core<T, A, B, C, const M: usize, const K: usize, const N: usize>(
    a: A,
    b: B,
    mut c: C,
) where
    T: Scalar,
    A: MatRead<T, M, K>,
    B: MatRead<T, K, N>,
    C: MatWrite<T, M, N>,
{
    for i in 0..M {
        for j in 0..N {
            let mut dot = T::zero();
            for k in 0..K {
                dot += a.at(i, k) * b.at(k, j);
            }
            c.put(i, j, dot);
        }
    }
}

/// First-order product expression: `C = op(A) * op(B)` with tangent and
/// adjoint propagation.
pub struct MatMulExpr<'c, 'm, T: Scalar, A, B, const M: usize, const K: usize, const N: usize> {
    a: A,
    b: B,
    c: &'c mut AdMat<'m, T, M, N>,
}

/// Build a first-order product expression and evaluate its primal value.
///
/// Operands may be `&Mat` (passive), `&mut AdMat` (active), or either
/// wrapped in [`Tr`](crate::Tr) for a transposed read; each combination
/// monomorphizes to exactly the code it needs.
pub fn matmul<'c, 'm, T, A, B, const M: usize, const K: usize, const N: usize>(
    a: A,
    b: B,
    c: &'c mut AdMat<'m, T, M, N>,
) -> MatMulExpr<'c, 'm, T, A, B, M, K, N>
where
    T: Scalar,
    A: Operand<T, M, K>,
    B: Operand<T, K, N>,
{
    let mut expr = MatMulExpr { a, b, c };
    matmul_core(expr.a.value(), expr.b.value(), Store(expr.c.value_mut()));
    expr
}

impl<'c, 'm, T, A, B, const M: usize, const K: usize, const N: usize>
    MatMulExpr<'c, 'm, T, A, B, M, K, N>
where
    T: Scalar,
    A: Operand<T, M, K>,
    B: Operand<T, K, N>,
{
    /// Tangent propagation: `dC = op(dA) * op(B) + op(A) * op(dB)`, each
    /// term present only for an active operand. The second term
    /// accumulates onto the first when both are active.
    pub fn forward(&mut self) {
        let Self { a, b, c } = self;
        if let Some(ad) = a.bvalue() {
            matmul_core(ad, b.value(), Store(c.bvalue_mut()));
        }
        if let Some(bd) = b.bvalue() {
            if A::ACTIVE {
                matmul_core(a.value(), bd, Accum(c.bvalue_mut()));
            } else {
                matmul_core(a.value(), bd, Store(c.bvalue_mut()));
            }
        }
    }

    /// Adjoint propagation, accumulate-only:
    /// `dA += dC * op(B)^T` and `dB += op(A)^T * dC`, with the transpose
    /// expressed by view-wrapping the partner operand.
    pub fn reverse(&mut self) {
        let Self { a, b, c } = self;
        if let Some(ab) = a.bvalue_add() {
            matmul_core(AdMat::bvalue(c), TrView(b.value()), ab);
        }
        if let Some(bb) = b.bvalue_add() {
            matmul_core(TrView(a.value()), AdMat::bvalue(c), bb);
        }
    }
}

/// Second-order product expression: adds projected-tangent and
/// Hessian-vector-product propagation on top of the first-order phases.
pub struct MatMul2Expr<'c, T: Scalar, A, B, const M: usize, const K: usize, const N: usize> {
    a: A,
    b: B,
    c: &'c mut Ad2Mat<T, M, N>,
}

/// Build a second-order product expression and evaluate its primal value.
///
/// Operands must be second-order capable: `&Mat` (passive),
/// `&mut Ad2Mat`, or a [`Tr`](crate::Tr) wrap of those. Handing a
/// first-order `AdMat` to this entry point does not compile.
pub fn matmul2<'c, T, A, B, const M: usize, const K: usize, const N: usize>(
    a: A,
    b: B,
    c: &'c mut Ad2Mat<T, M, N>,
) -> MatMul2Expr<'c, T, A, B, M, K, N>
where
    T: Scalar,
    A: Operand2<T, M, K>,
    B: Operand2<T, K, N>,
{
    let mut expr = MatMul2Expr { a, b, c };
    matmul_core(expr.a.value(), expr.b.value(), Store(expr.c.value_mut()));
    expr
}

impl<'c, T, A, B, const M: usize, const K: usize, const N: usize>
    MatMul2Expr<'c, T, A, B, M, K, N>
where
    T: Scalar,
    A: Operand2<T, M, K>,
    B: Operand2<T, K, N>,
{
    /// First-order tangent propagation through the `bvalue` buffers.
    pub fn forward(&mut self) {
        let Self { a, b, c } = self;
        if let Some(ad) = a.bvalue() {
            matmul_core(ad, b.value(), Store(c.bvalue_mut()));
        }
        if let Some(bd) = b.bvalue() {
            if A::ACTIVE {
                matmul_core(a.value(), bd, Accum(c.bvalue_mut()));
            } else {
                matmul_core(a.value(), bd, Store(c.bvalue_mut()));
            }
        }
    }

    /// First-adjoint propagation, accumulate-only.
    pub fn reverse(&mut self) {
        let Self { a, b, c } = self;
        if let Some(ab) = a.bvalue_add() {
            matmul_core(Ad2Mat::bvalue(c), TrView(b.value()), ab);
        }
        if let Some(bb) = b.bvalue_add() {
            matmul_core(TrView(a.value()), Ad2Mat::bvalue(c), bb);
        }
    }

    /// Projected-tangent propagation: the `forward` product rule over the
    /// `pvalue` buffers, producing the directional derivative of `C` that
    /// the Hessian-vector product consumes.
    pub fn hforward(&mut self) {
        let Self { a, b, c } = self;
        if let Some(ap) = a.pvalue() {
            matmul_core(ap, b.value(), Store(c.pvalue_mut()));
        }
        if let Some(bp) = b.pvalue() {
            if A::ACTIVE {
                matmul_core(a.value(), bp, Accum(c.pvalue_mut()));
            } else {
                matmul_core(a.value(), bp, Store(c.pvalue_mut()));
            }
        }
    }

    /// Second-adjoint propagation, accumulate-only.
    ///
    /// Each active operand receives the result's second adjoint through
    /// the partner's primal value, plus, when both operands are active,
    /// the cross term mixing the result's first adjoint with the
    /// partner's projected tangent. The cross terms are what make the
    /// Hessian-vector product exact for `d²(A*B)`.
    pub fn hreverse(&mut self) {
        let Self { a, b, c } = self;
        if let Some(ah) = a.hvalue_add() {
            matmul_core(c.hvalue(), TrView(b.value()), ah);
        }
        if let Some(bh) = b.hvalue_add() {
            matmul_core(TrView(a.value()), c.hvalue(), bh);
        }
        if A::ACTIVE && B::ACTIVE {
            if let (Some(bp), Some(ah)) = (b.pvalue(), a.hvalue_add()) {
                matmul_core(Ad2Mat::bvalue(c), TrView(bp), ah);
            }
            if let (Some(ap), Some(bh)) = (a.pvalue(), b.hvalue_add()) {
                matmul_core(TrView(ap), Ad2Mat::bvalue(c), bh);
            }
        }
    }
}
