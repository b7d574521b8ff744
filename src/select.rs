//! Compile-time selection of the container type for an operand, given its
//! activity and the derivative order in play.

use crate::admat::{Ad2Mat, AdMat};
use crate::mat::Mat;
use crate::Scalar;

/// Activity marker: the operand does not participate in differentiation.
#[derive(Clone, Copy, Debug)]
pub struct Passive;

/// Activity marker: the operand carries derivative buffers.
#[derive(Clone, Copy, Debug)]
pub struct Active;

/// Order marker: first derivatives only.
#[derive(Clone, Copy, Debug)]
pub struct First;

/// Order marker: first and second derivatives.
#[derive(Clone, Copy, Debug)]
pub struct Second;

/// Maps an (activity, order) marker pair to the container an operand of
/// that kind uses. Passive operands are plain values at either order.
pub trait SelectMat<T: Scalar, const M: usize, const N: usize> {
    type Container<'a>
    where
        T: 'a;
}

impl<T: Scalar, const M: usize, const N: usize> SelectMat<T, M, N> for (Passive, First) {
    type Container<'a>
        = Mat<T, M, N>
    where
        T: 'a;
}

impl<T: Scalar, const M: usize, const N: usize> SelectMat<T, M, N> for (Passive, Second) {
    type Container<'a>
        = Mat<T, M, N>
    where
        T: 'a;
}

impl<T: Scalar, const M: usize, const N: usize> SelectMat<T, M, N> for (Active, First) {
    type Container<'a>
        = AdMat<'a, T, M, N>
    where
        T: 'a;
}

impl<T: Scalar, const M: usize, const N: usize> SelectMat<T, M, N> for (Active, Second) {
    type Container<'a>
        = Ad2Mat<T, M, N>
    where
        T: 'a;
}

/// Container type for an operand with activity `D` and order `O`.
///
/// A generic kernel body written against `MatOf` instantiates uniformly
/// over every activity/order mix without per-combination code.
pub type MatOf<'a, D, O, T, const M: usize, const N: usize> =
    <(D, O) as SelectMat<T, M, N>>::Container<'a>;
