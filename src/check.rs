//! Complex-step verification harness.
//!
//! Any derivative kernel added to this crate is certified against
//! complex-step differentiation: perturb the inputs along the imaginary
//! axis by an infinitesimal step, evaluate the plain (non-derivative)
//! function on complex entries, and read the exact directional derivative
//! out of the imaginary part of the result. Unlike real finite
//! differences there is no subtractive cancellation, so a step of 1e-50
//! recovers derivatives to machine precision.
//!
//! Implementors describe one operation under test through
//! [`DerivativeTest`]; [`run`] drives the first- and second-order
//! comparisons, writes one pass/fail line per check, and returns the
//! conjunction of all of them.

use std::io::{self, Write};

use num_complex::Complex;
use num_traits::Zero;
use rand::{Rng, RngCore};

use crate::Float;

fn rand_unit<F: Float>(rng: &mut dyn RngCore) -> F {
    F::from(rng.gen_range(-1.0..1.0)).unwrap()
}

/// One operation under test, seen as a function from `INPUTS` flat input
/// components to `OUTPUTS` flat output components.
///
/// `eval` must be the plain forward evaluation on complex entries (it is
/// only used to produce complex-step references), while `deriv` and
/// `hprod` run the derivative machinery under test. The default
/// tolerances target `f64`; an `f32` test must override `step_size` with
/// a representable step.
pub trait DerivativeTest<F: Float> {
    /// Number of flat input components.
    const INPUTS: usize;

    /// Number of flat output components.
    const OUTPUTS: usize;

    /// Label used in the report lines.
    fn name(&self) -> String;

    /// Point at which to run the checks. Defaults to uniform random
    /// entries in `[-1, 1]` on the real axis.
    fn point(&self, x: &mut [Complex<F>], rng: &mut dyn RngCore) {
        for xi in x.iter_mut() {
            *xi = Complex::new(rand_unit(rng), F::zero());
        }
    }

    /// Reference forward evaluation: `y = f(x)`.
    fn eval(&self, x: &[Complex<F>], y: &mut [Complex<F>]);

    /// Reverse-mode product under test: `g = J(x)^T * seed`.
    fn deriv(&self, seed: &[Complex<F>], x: &[Complex<F>], g: &mut [Complex<F>]);

    /// Second-order product under test:
    /// `h = J(x)^T * hval + d/de [J(x + e p)^T * seed]`.
    fn hprod(
        &self,
        seed: &[Complex<F>],
        hval: &[Complex<F>],
        x: &[Complex<F>],
        p: &[Complex<F>],
        h: &mut [Complex<F>],
    );

    /// Complex-step size.
    fn step_size(&self) -> F {
        F::from(1e-50).unwrap()
    }

    /// Relative tolerance of the comparisons.
    fn rtol(&self) -> F {
        F::from(1e-10).unwrap()
    }

    /// Absolute tolerance of the comparisons.
    fn atol(&self) -> F {
        F::from(1e-30).unwrap()
    }

    /// Combined absolute/relative acceptance test.
    fn is_close(&self, test_value: F, ref_value: F) -> bool {
        (test_value - ref_value).abs() <= self.atol() + self.rtol() * ref_value.abs()
    }
}

/// How [`run`] chooses perturbation directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckMode {
    /// One random direction for the whole input.
    Directional,
    /// Every standard basis direction of the input in turn. Gradient
    /// failures short-circuit before the second-order sweep.
    PerComponent,
}

/// Set `x1 = re(x) + i * dh * re(p)`.
fn perturb<F: Float>(x: &[Complex<F>], p: &[Complex<F>], dh: F, x1: &mut [Complex<F>]) {
    for (x1i, (xi, pi)) in x1.iter_mut().zip(x.iter().zip(p)) {
        *x1i = Complex::new(xi.re, dh * pi.re);
    }
}

/// Complex-step directional derivative projected onto the seed:
/// `sum_i (im(y_i) / dh) * re(seed_i)`.
fn project_step<F: Float>(y: &[Complex<F>], seed: &[Complex<F>], dh: F) -> F {
    y.iter()
        .zip(seed)
        .fold(F::zero(), |acc, (yi, si)| acc + (yi.im / dh) * si.re)
}

fn write_result<F: Float, W: Write>(
    out: &mut W,
    label: &str,
    ad: F,
    cs: F,
    ok: bool,
) -> io::Result<()> {
    let abs_err = (ad - cs).abs();
    let rel_err = ((ad - cs) / cs).abs();
    writeln!(
        out,
        "{label}  AD: {ad:>16.9e}  CS: {cs:>16.9e}  rel: {rel_err:>12.3e}  abs: {abs_err:>12.3e}  {}",
        if ok { "PASSED" } else { "FAILED" }
    )
}

/// Run the first- and second-order checks for one test case.
///
/// Writes one line per comparison to `out` and returns whether every
/// comparison passed.
pub fn run<F, D, W>(test: &D, mode: CheckMode, out: &mut W) -> io::Result<bool>
where
    F: Float,
    D: DerivativeTest<F>,
    W: Write,
{
    let mut rng = rand::thread_rng();
    let n = D::INPUTS;
    let m = D::OUTPUTS;
    let dh = test.step_size();
    let zero = Complex::zero();

    let mut x = vec![zero; n];
    let mut x1 = vec![zero; n];
    let mut g = vec![zero; n];
    let mut p = vec![zero; n];
    let mut h = vec![zero; n];
    let mut y = vec![zero; m];
    let mut seed = vec![zero; m];
    let mut hval = vec![zero; m];
    let mut seedh = vec![zero; m];

    for si in seed.iter_mut() {
        *si = Complex::new(rand_unit(&mut rng), F::zero());
    }
    for hi in hval.iter_mut() {
        *hi = Complex::new(rand_unit(&mut rng), F::zero());
    }
    test.point(&mut x, &mut rng);

    let mut passed = true;

    match mode {
        CheckMode::PerComponent => {
            // Gradient, one basis direction at a time.
            for k in 0..n {
                for pi in p.iter_mut() {
                    *pi = zero;
                }
                p[k] = Complex::new(F::one(), F::zero());

                test.deriv(&seed, &x, &mut g);
                perturb(&x, &p, dh, &mut x1);
                test.eval(&x1, &mut y);

                let fd = project_step(&y, &seed, dh);
                let ans = g
                    .iter()
                    .zip(&p)
                    .fold(F::zero(), |acc, (gi, pi)| acc + (*gi * *pi).re);

                let ok = test.is_close(ans, fd);
                passed = passed && ok;
                write_result(out, &format!("{} first-order [{k}]", test.name()), ans, fd, ok)?;
            }

            // Hessian-vector products are meaningless once the gradient
            // is already wrong.
            if !passed {
                return Ok(false);
            }

            for k in 0..n {
                for pi in p.iter_mut() {
                    *pi = zero;
                }
                p[k] = Complex::new(F::one(), F::zero());

                test.hprod(&seed, &hval, &x, &p, &mut h);
                perturb(&x, &p, dh, &mut x1);
                for (shi, (si, hi)) in seedh.iter_mut().zip(seed.iter().zip(&hval)) {
                    *shi = *si + Complex::new(F::zero(), dh * hi.re);
                }
                test.deriv(&seedh, &x1, &mut g);

                for i in 0..n {
                    let ans = h[i].re;
                    let fd = g[i].im / dh;
                    let ok = test.is_close(ans, fd);
                    passed = passed && ok;
                    write_result(
                        out,
                        &format!("{} second-order [{k},{i}]", test.name()),
                        ans,
                        fd,
                        ok,
                    )?;
                }
            }
        }
        CheckMode::Directional => {
            for pi in p.iter_mut() {
                *pi = Complex::new(rand_unit(&mut rng), F::zero());
            }

            test.deriv(&seed, &x, &mut g);
            test.hprod(&seed, &hval, &x, &p, &mut h);

            perturb(&x, &p, dh, &mut x1);
            test.eval(&x1, &mut y);

            let fd = project_step(&y, &seed, dh);
            let ans = g
                .iter()
                .zip(&p)
                .fold(F::zero(), |acc, (gi, pi)| acc + (*gi * *pi).re);

            let ok = test.is_close(ans, fd);
            passed = ok;
            write_result(out, &format!("{} first-order", test.name()), ans, fd, ok)?;

            for (shi, (si, hi)) in seedh.iter_mut().zip(seed.iter().zip(&hval)) {
                *shi = *si + Complex::new(F::zero(), dh * hi.re);
            }
            test.deriv(&seedh, &x1, &mut g);

            for i in 0..n {
                let ans = h[i].re;
                let fd = g[i].im / dh;
                let ok = test.is_close(ans, fd);
                passed = passed && ok;
                write_result(
                    out,
                    &format!("{} second-order [{i}]", test.name()),
                    ans,
                    fd,
                    ok,
                )?;
            }
        }
    }

    Ok(passed)
}
