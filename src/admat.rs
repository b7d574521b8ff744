//! Differentiable matrix containers and the operand traits that give
//! generic operation kernels compile-time access to their buffers.
//!
//! Two container flavors exist and stay distinct: [`AdMat`] borrows a
//! primal/adjoint pair owned by the caller (first-order work), while
//! [`Ad2Mat`] owns the four buffers of a second-order variable. Expression
//! objects see both through [`Operand`]/[`Operand2`], so a single phase
//! implementation covers every mix of passive and active operands.

use crate::mat::{Accum, Mat, MatWrite, TrView, TrWrite};
use crate::{MatRead, Scalar};

/// First-order differentiable matrix: a primal value paired with one
/// adjoint buffer, both owned by the caller.
///
/// The adjoint buffer doubles as the forward-mode tangent; which role it
/// plays depends on the phase the caller invokes.
pub struct AdMat<'a, T: Scalar, const M: usize, const N: usize> {
    value: &'a mut Mat<T, M, N>,
    bvalue: &'a mut Mat<T, M, N>,
}

impl<'a, T: Scalar, const M: usize, const N: usize> AdMat<'a, T, M, N> {
    pub fn new(value: &'a mut Mat<T, M, N>, bvalue: &'a mut Mat<T, M, N>) -> Self {
        AdMat { value, bvalue }
    }

    #[inline]
    pub fn value(&self) -> &Mat<T, M, N> {
        self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut Mat<T, M, N> {
        self.value
    }

    #[inline]
    pub fn bvalue(&self) -> &Mat<T, M, N> {
        self.bvalue
    }

    #[inline]
    pub fn bvalue_mut(&mut self) -> &mut Mat<T, M, N> {
        self.bvalue
    }
}

/// Derivative-kind tag: selects one of the three derivative buffers of an
/// [`Ad2Mat`]. Never stored; only used to pick a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seed {
    /// First adjoint (or first-order tangent).
    B,
    /// Projected tangent driving a Hessian-vector product.
    P,
    /// Second adjoint: the Hessian-vector product accumulator.
    H,
}

/// Second-order differentiable matrix owning its primal value, first
/// adjoint, projected tangent, and second adjoint.
///
/// All four buffers share the primal's shape and start at zero; buffers
/// not used by the derivative order in play simply stay zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ad2Mat<T: Scalar, const M: usize, const N: usize> {
    value: Mat<T, M, N>,
    bvalue: Mat<T, M, N>,
    pvalue: Mat<T, M, N>,
    hvalue: Mat<T, M, N>,
}

impl<T: Scalar, const M: usize, const N: usize> Ad2Mat<T, M, N> {
    /// Start from a primal value, all derivative buffers zero.
    pub fn new(value: Mat<T, M, N>) -> Self {
        Ad2Mat {
            value,
            ..Ad2Mat::default()
        }
    }

    /// Supply all four buffers at once.
    pub fn from_parts(
        value: Mat<T, M, N>,
        bvalue: Mat<T, M, N>,
        pvalue: Mat<T, M, N>,
        hvalue: Mat<T, M, N>,
    ) -> Self {
        Ad2Mat {
            value,
            bvalue,
            pvalue,
            hvalue,
        }
    }

    #[inline]
    pub fn value(&self) -> &Mat<T, M, N> {
        &self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut Mat<T, M, N> {
        &mut self.value
    }

    #[inline]
    pub fn bvalue(&self) -> &Mat<T, M, N> {
        &self.bvalue
    }

    #[inline]
    pub fn bvalue_mut(&mut self) -> &mut Mat<T, M, N> {
        &mut self.bvalue
    }

    #[inline]
    pub fn set_bvalue(&mut self, val: &Mat<T, M, N>) {
        self.bvalue.set(val);
    }

    #[inline]
    pub fn get_bvalue(&self, dst: &mut Mat<T, M, N>) {
        self.bvalue.get(dst);
    }

    #[inline]
    pub fn pvalue(&self) -> &Mat<T, M, N> {
        &self.pvalue
    }

    #[inline]
    pub fn pvalue_mut(&mut self) -> &mut Mat<T, M, N> {
        &mut self.pvalue
    }

    #[inline]
    pub fn set_pvalue(&mut self, val: &Mat<T, M, N>) {
        self.pvalue.set(val);
    }

    #[inline]
    pub fn get_pvalue(&self, dst: &mut Mat<T, M, N>) {
        self.pvalue.get(dst);
    }

    #[inline]
    pub fn hvalue(&self) -> &Mat<T, M, N> {
        &self.hvalue
    }

    #[inline]
    pub fn hvalue_mut(&mut self) -> &mut Mat<T, M, N> {
        &mut self.hvalue
    }

    #[inline]
    pub fn set_hvalue(&mut self, val: &Mat<T, M, N>) {
        self.hvalue.set(val);
    }

    #[inline]
    pub fn get_hvalue(&self, dst: &mut Mat<T, M, N>) {
        self.hvalue.get(dst);
    }

    /// Buffer selected by a derivative-kind tag.
    ///
    /// First-order [`AdMat`] has no such method: only `bvalue` exists
    /// there, so code that needs a projected tangent or second adjoint
    /// cannot be handed a first-order container.
    #[inline]
    pub fn seed(&self, seed: Seed) -> &Mat<T, M, N> {
        match seed {
            Seed::B => &self.bvalue,
            Seed::P => &self.pvalue,
            Seed::H => &self.hvalue,
        }
    }

    #[inline]
    pub fn seed_mut(&mut self, seed: Seed) -> &mut Mat<T, M, N> {
        match seed {
            Seed::B => &mut self.bvalue,
            Seed::P => &mut self.pvalue,
            Seed::H => &mut self.hvalue,
        }
    }
}

/// An operand of a first-order differentiable operation, logically
/// `R`-by-`C` after any transpose wrapping.
///
/// `ACTIVE` and the `Option` accessors are compile-time facts of the
/// implementing type: after monomorphization the passive branches of a
/// phase method vanish. Adjoint writes go through an accumulating view;
/// reverse-phase contributions always add, never overwrite.
pub trait Operand<T: Scalar, const R: usize, const C: usize> {
    const ACTIVE: bool;

    type Read<'v>: MatRead<T, R, C>
    where
        Self: 'v;
    type Write<'v>: MatWrite<T, R, C>
    where
        Self: 'v;

    /// Primal value.
    fn value(&self) -> Self::Read<'_>;

    /// Tangent / first-adjoint buffer, absent on passive operands.
    fn bvalue(&self) -> Option<Self::Read<'_>>;

    /// Accumulating view of the first-adjoint buffer.
    fn bvalue_add(&mut self) -> Option<Self::Write<'_>>;
}

/// An operand of a second-order differentiable operation.
///
/// Not implemented for `&mut AdMat`: a first-order container inside a
/// second-order expression is a type error, not a runtime surprise.
pub trait Operand2<T: Scalar, const R: usize, const C: usize>: Operand<T, R, C> {
    /// Projected-tangent buffer, absent on passive operands.
    fn pvalue(&self) -> Option<Self::Read<'_>>;

    /// Accumulating view of the second-adjoint buffer.
    fn hvalue_add(&mut self) -> Option<Self::Write<'_>>;
}

impl<'a, T: Scalar, const R: usize, const C: usize> Operand<T, R, C> for &'a Mat<T, R, C> {
    const ACTIVE: bool = false;

    type Read<'v>
        = &'v Mat<T, R, C>
    where
        Self: 'v;
    type Write<'v>
        = Accum<'v, T, R, C>
    where
        Self: 'v;

    #[inline]
    fn value(&self) -> Self::Read<'_> {
        self
    }

    #[inline]
    fn bvalue(&self) -> Option<Self::Read<'_>> {
        None
    }

    #[inline]
    fn bvalue_add(&mut self) -> Option<Self::Write<'_>> {
        None
    }
}

impl<'a, T: Scalar, const R: usize, const C: usize> Operand2<T, R, C> for &'a Mat<T, R, C> {
    #[inline]
    fn pvalue(&self) -> Option<Self::Read<'_>> {
        None
    }

    #[inline]
    fn hvalue_add(&mut self) -> Option<Self::Write<'_>> {
        None
    }
}

impl<'a, 'm, T: Scalar, const R: usize, const C: usize> Operand<T, R, C>
    for &'a mut AdMat<'m, T, R, C>
{
    const ACTIVE: bool = true;

    type Read<'v>
        = &'v Mat<T, R, C>
    where
        Self: 'v;
    type Write<'v>
        = Accum<'v, T, R, C>
    where
        Self: 'v;

    #[inline]
    fn value(&self) -> Self::Read<'_> {
        AdMat::value(self)
    }

    #[inline]
    fn bvalue(&self) -> Option<Self::Read<'_>> {
        Some(AdMat::bvalue(self))
    }

    #[inline]
    fn bvalue_add(&mut self) -> Option<Self::Write<'_>> {
        Some(Accum(AdMat::bvalue_mut(self)))
    }
}

impl<'a, T: Scalar, const R: usize, const C: usize> Operand<T, R, C> for &'a mut Ad2Mat<T, R, C> {
    const ACTIVE: bool = true;

    type Read<'v>
        = &'v Mat<T, R, C>
    where
        Self: 'v;
    type Write<'v>
        = Accum<'v, T, R, C>
    where
        Self: 'v;

    #[inline]
    fn value(&self) -> Self::Read<'_> {
        Ad2Mat::value(self)
    }

    #[inline]
    fn bvalue(&self) -> Option<Self::Read<'_>> {
        Some(Ad2Mat::bvalue(self))
    }

    #[inline]
    fn bvalue_add(&mut self) -> Option<Self::Write<'_>> {
        Some(Accum(Ad2Mat::bvalue_mut(self)))
    }
}

impl<'a, T: Scalar, const R: usize, const C: usize> Operand2<T, R, C> for &'a mut Ad2Mat<T, R, C> {
    #[inline]
    fn pvalue(&self) -> Option<Self::Read<'_>> {
        Some(Ad2Mat::pvalue(self))
    }

    #[inline]
    fn hvalue_add(&mut self) -> Option<Self::Write<'_>> {
        Some(Accum(Ad2Mat::hvalue_mut(self)))
    }
}

/// Transposed operand: reads and writes of the wrapped operand are
/// reoriented, turning an `R`-by-`C` operand into a `C`-by-`R` one.
pub struct Tr<X>(pub X);

impl<T: Scalar, X: Operand<T, R, C>, const R: usize, const C: usize> Operand<T, C, R> for Tr<X> {
    const ACTIVE: bool = X::ACTIVE;

    type Read<'v>
        = TrView<X::Read<'v>>
    where
        Self: 'v;
    type Write<'v>
        = TrWrite<X::Write<'v>>
    where
        Self: 'v;

    #[inline]
    fn value(&self) -> Self::Read<'_> {
        TrView(self.0.value())
    }

    #[inline]
    fn bvalue(&self) -> Option<Self::Read<'_>> {
        self.0.bvalue().map(TrView)
    }

    #[inline]
    fn bvalue_add(&mut self) -> Option<Self::Write<'_>> {
        self.0.bvalue_add().map(TrWrite)
    }
}

impl<T: Scalar, X: Operand2<T, R, C>, const R: usize, const C: usize> Operand2<T, C, R> for Tr<X> {
    #[inline]
    fn pvalue(&self) -> Option<Self::Read<'_>> {
        self.0.pvalue().map(TrView)
    }

    #[inline]
    fn hvalue_add(&mut self) -> Option<Self::Write<'_>> {
        self.0.hvalue_add().map(TrWrite)
    }
}
