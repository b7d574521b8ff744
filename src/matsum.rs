//! Matrix sum with first- and second-order derivative propagation.
//!
//! The linear counterpart of [`crate::matmul`]: same four-phase protocol,
//! but tangents and adjoints pass straight through and there are no
//! cross terms in the second-order reverse phase.

use crate::admat::{Ad2Mat, AdMat, Operand, Operand2};
use crate::mat::{MatRead, MatWrite, Store};
use crate::Scalar;

/// `C = A + B` elementwise over views.
#[inline]
pub fn matsum_core<T, A, B, C, const M: usize, const N: usize>(a: A, b: B, mut c: C)
where
    T: Scalar,
    A: MatRead<T, M, N>,
    B: MatRead<T, M, N>,
    C: MatWrite<T, M, N>,
{
    for i in 0..M {
        for j in 0..N {
            c.put(i, j, a.at(i, j) + b.at(i, j));
        }
    }
}

/// `C = A` elementwise over views.
#[inline]
pub fn matcopy_core<T, A, C, const M: usize, const N: usize>(a: A, mut c: C)
where
    T: Scalar,
    A: MatRead<T, M, N>,
    C: MatWrite<T, M, N>,
{
    for i in 0..M {
        for j in 0..N {
            c.put(i, j, a.at(i, j));
        }
    }
}

/// First-order sum expression: `C = op(A) + op(B)`.
pub struct MatSumExpr<'c, 'm, T: Scalar, A, B, const M: usize, const N: usize> {
    a: A,
    b: B,
    c: &'c mut AdMat<'m, T, M, N>,
}

/// Build a first-order sum expression and evaluate its primal value.
pub fn matsum<'c, 'm, T, A, B, const M: usize, const N: usize>(
    a: A,
    b: B,
    c: &'c mut AdMat<'m, T, M, N>,
) -> MatSumExpr<'c, 'm, T, A, B, M, N>
where
    T: Scalar,
    A: Operand<T, M, N>,
    B: Operand<T, M, N>,
{
    let mut expr = MatSumExpr { a, b, c };
    matsum_core(expr.a.value(), expr.b.value(), Store(expr.c.value_mut()));
    expr
}

impl<'c, 'm, T, A, B, const M: usize, const N: usize> MatSumExpr<'c, 'm, T, A, B, M, N>
where
    T: Scalar,
    A: Operand<T, M, N>,
    B: Operand<T, M, N>,
{
    /// Tangent propagation: `dC` is the sum of the active tangents.
    pub fn forward(&mut self) {
        let Self { a, b, c } = self;
        match (a.bvalue(), b.bvalue()) {
            (Some(ad), Some(bd)) => matsum_core(ad, bd, Store(c.bvalue_mut())),
            (Some(ad), None) => matcopy_core(ad, Store(c.bvalue_mut())),
            (None, Some(bd)) => matcopy_core(bd, Store(c.bvalue_mut())),
            (None, None) => {}
        }
    }

    /// Adjoint propagation, accumulate-only: each active operand receives
    /// `dC` unchanged.
    pub fn reverse(&mut self) {
        let Self { a, b, c } = self;
        if let Some(ab) = a.bvalue_add() {
            matcopy_core(AdMat::bvalue(c), ab);
        }
        if let Some(bb) = b.bvalue_add() {
            matcopy_core(AdMat::bvalue(c), bb);
        }
    }
}

/// Second-order sum expression.
pub struct MatSum2Expr<'c, T: Scalar, A, B, const M: usize, const N: usize> {
    a: A,
    b: B,
    c: &'c mut Ad2Mat<T, M, N>,
}

/// Build a second-order sum expression and evaluate its primal value.
pub fn matsum2<'c, T, A, B, const M: usize, const N: usize>(
    a: A,
    b: B,
    c: &'c mut Ad2Mat<T, M, N>,
) -> MatSum2Expr<'c, T, A, B, M, N>
where
    T: Scalar,
    A: Operand2<T, M, N>,
    B: Operand2<T, M, N>,
{
    let mut expr = MatSum2Expr { a, b, c };
    matsum_core(expr.a.value(), expr.b.value(), Store(expr.c.value_mut()));
    expr
}

impl<'c, T, A, B, const M: usize, const N: usize> MatSum2Expr<'c, T, A, B, M, N>
where
    T: Scalar,
    A: Operand2<T, M, N>,
    B: Operand2<T, M, N>,
{
    pub fn forward(&mut self) {
        let Self { a, b, c } = self;
        match (a.bvalue(), b.bvalue()) {
            (Some(ad), Some(bd)) => matsum_core(ad, bd, Store(c.bvalue_mut())),
            (Some(ad), None) => matcopy_core(ad, Store(c.bvalue_mut())),
            (None, Some(bd)) => matcopy_core(bd, Store(c.bvalue_mut())),
            (None, None) => {}
        }
    }

    pub fn reverse(&mut self) {
        let Self { a, b, c } = self;
        if let Some(ab) = a.bvalue_add() {
            matcopy_core(Ad2Mat::bvalue(c), ab);
        }
        if let Some(bb) = b.bvalue_add() {
            matcopy_core(Ad2Mat::bvalue(c), bb);
        }
    }

    /// Projected-tangent propagation over the `pvalue` buffers.
    pub fn hforward(&mut self) {
        let Self { a, b, c } = self;
        match (a.pvalue(), b.pvalue()) {
            (Some(ap), Some(bp)) => matsum_core(ap, bp, Store(c.pvalue_mut())),
            (Some(ap), None) => matcopy_core(ap, Store(c.pvalue_mut())),
            (None, Some(bp)) => matcopy_core(bp, Store(c.pvalue_mut())),
            (None, None) => {}
        }
    }

    /// Second-adjoint propagation, accumulate-only. The operation is
    /// linear, so there is no cross term.
    pub fn hreverse(&mut self) {
        let Self { a, b, c } = self;
        if let Some(ah) = a.hvalue_add() {
            matcopy_core(c.hvalue(), ah);
        }
        if let Some(bh) = b.hvalue_add() {
            matcopy_core(c.hvalue(), bh);
        }
    }
}
