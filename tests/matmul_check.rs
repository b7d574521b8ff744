//! Complex-step certification of the matrix-product derivative phases,
//! over every activity combination and transposed-operand layout.

use std::io;

use num_complex::Complex;

use admat::{
    matmul, matmul2, matmul_core, run, Ad2Mat, AdMat, CheckMode, DerivativeTest, Mat, Store, Tr,
    TrView,
};

type C64 = Complex<f64>;

fn pack<const M: usize, const N: usize>(m: &Mat<C64, M, N>, out: &mut [C64]) {
    for i in 0..M {
        for j in 0..N {
            out[N * i + j] = m[(i, j)];
        }
    }
}

fn unpack<const M: usize, const N: usize>(vals: &[C64]) -> Mat<C64, M, N> {
    Mat::from_slice(vals)
}

fn fixed<const M: usize, const N: usize>() -> Mat<C64, M, N> {
    Mat::from_fn(|i, j| Complex::new(0.3 + 0.25 * i as f64 - 0.15 * j as f64, 0.0))
}

// ── C = A * B, both operands active ──

struct MulBothActive;

impl DerivativeTest<f64> for MulBothActive {
    const INPUTS: usize = 2 * 3 + 3 * 2;
    const OUTPUTS: usize = 2 * 2;

    fn name(&self) -> String {
        "matmul both-active".to_string()
    }

    fn eval(&self, x: &[C64], y: &mut [C64]) {
        let a: Mat<C64, 2, 3> = unpack(&x[..6]);
        let b: Mat<C64, 3, 2> = unpack(&x[6..]);
        let mut c = Mat::<C64, 2, 2>::default();
        matmul_core(&a, &b, Store(&mut c));
        pack(&c, y);
    }

    fn deriv(&self, seed: &[C64], x: &[C64], g: &mut [C64]) {
        let mut a: Mat<C64, 2, 3> = unpack(&x[..6]);
        let mut ab = Mat::default();
        let mut b: Mat<C64, 3, 2> = unpack(&x[6..]);
        let mut bb = Mat::default();
        let mut c = Mat::<C64, 2, 2>::default();
        let mut cb: Mat<C64, 2, 2> = unpack(seed);
        {
            let mut a_ad = AdMat::new(&mut a, &mut ab);
            let mut b_ad = AdMat::new(&mut b, &mut bb);
            let mut c_ad = AdMat::new(&mut c, &mut cb);
            let mut expr = matmul(&mut a_ad, &mut b_ad, &mut c_ad);
            expr.reverse();
        }
        pack(&ab, &mut g[..6]);
        pack(&bb, &mut g[6..]);
    }

    fn hprod(&self, seed: &[C64], hval: &[C64], x: &[C64], p: &[C64], h: &mut [C64]) {
        let mut a2 = Ad2Mat::new(unpack::<2, 3>(&x[..6]));
        a2.set_pvalue(&unpack(&p[..6]));
        let mut b2 = Ad2Mat::new(unpack::<3, 2>(&x[6..]));
        b2.set_pvalue(&unpack(&p[6..]));
        let mut c2 = Ad2Mat::<C64, 2, 2>::default();
        c2.set_bvalue(&unpack(seed));
        c2.set_hvalue(&unpack(hval));
        {
            let mut expr = matmul2(&mut a2, &mut b2, &mut c2);
            expr.reverse();
            expr.hforward();
            expr.hreverse();
        }
        pack(a2.hvalue(), &mut h[..6]);
        pack(b2.hvalue(), &mut h[6..]);
    }
}

// ── C = A * B, A passive ──

struct MulPassiveA {
    a: Mat<C64, 2, 3>,
}

impl DerivativeTest<f64> for MulPassiveA {
    const INPUTS: usize = 3 * 2;
    const OUTPUTS: usize = 2 * 2;

    fn name(&self) -> String {
        "matmul passive-a".to_string()
    }

    fn eval(&self, x: &[C64], y: &mut [C64]) {
        let b: Mat<C64, 3, 2> = unpack(x);
        let mut c = Mat::<C64, 2, 2>::default();
        matmul_core(&self.a, &b, Store(&mut c));
        pack(&c, y);
    }

    fn deriv(&self, seed: &[C64], x: &[C64], g: &mut [C64]) {
        let mut b: Mat<C64, 3, 2> = unpack(x);
        let mut bb = Mat::default();
        let mut c = Mat::<C64, 2, 2>::default();
        let mut cb: Mat<C64, 2, 2> = unpack(seed);
        {
            let mut b_ad = AdMat::new(&mut b, &mut bb);
            let mut c_ad = AdMat::new(&mut c, &mut cb);
            let mut expr = matmul(&self.a, &mut b_ad, &mut c_ad);
            expr.reverse();
        }
        pack(&bb, g);
    }

    fn hprod(&self, seed: &[C64], hval: &[C64], x: &[C64], p: &[C64], h: &mut [C64]) {
        let mut b2 = Ad2Mat::new(unpack::<3, 2>(x));
        b2.set_pvalue(&unpack(p));
        let mut c2 = Ad2Mat::<C64, 2, 2>::default();
        c2.set_bvalue(&unpack(seed));
        c2.set_hvalue(&unpack(hval));
        {
            let mut expr = matmul2(&self.a, &mut b2, &mut c2);
            expr.reverse();
            expr.hforward();
            expr.hreverse();
        }
        pack(b2.hvalue(), h);
    }
}

// ── C = A * B, B passive ──

struct MulPassiveB {
    b: Mat<C64, 3, 2>,
}

impl DerivativeTest<f64> for MulPassiveB {
    const INPUTS: usize = 2 * 3;
    const OUTPUTS: usize = 2 * 2;

    fn name(&self) -> String {
        "matmul passive-b".to_string()
    }

    fn eval(&self, x: &[C64], y: &mut [C64]) {
        let a: Mat<C64, 2, 3> = unpack(x);
        let mut c = Mat::<C64, 2, 2>::default();
        matmul_core(&a, &self.b, Store(&mut c));
        pack(&c, y);
    }

    fn deriv(&self, seed: &[C64], x: &[C64], g: &mut [C64]) {
        let mut a: Mat<C64, 2, 3> = unpack(x);
        let mut ab = Mat::default();
        let mut c = Mat::<C64, 2, 2>::default();
        let mut cb: Mat<C64, 2, 2> = unpack(seed);
        {
            let mut a_ad = AdMat::new(&mut a, &mut ab);
            let mut c_ad = AdMat::new(&mut c, &mut cb);
            let mut expr = matmul(&mut a_ad, &self.b, &mut c_ad);
            expr.reverse();
        }
        pack(&ab, g);
    }

    fn hprod(&self, seed: &[C64], hval: &[C64], x: &[C64], p: &[C64], h: &mut [C64]) {
        let mut a2 = Ad2Mat::new(unpack::<2, 3>(x));
        a2.set_pvalue(&unpack(p));
        let mut c2 = Ad2Mat::<C64, 2, 2>::default();
        c2.set_bvalue(&unpack(seed));
        c2.set_hvalue(&unpack(hval));
        {
            let mut expr = matmul2(&mut a2, &self.b, &mut c2);
            expr.reverse();
            expr.hforward();
            expr.hreverse();
        }
        pack(a2.hvalue(), h);
    }
}

// ── C = A^T * B, both active, A stored 3x2 ──

struct MulTransposeA;

impl DerivativeTest<f64> for MulTransposeA {
    const INPUTS: usize = 3 * 2 + 3 * 2;
    const OUTPUTS: usize = 2 * 2;

    fn name(&self) -> String {
        "matmul transpose-a".to_string()
    }

    fn eval(&self, x: &[C64], y: &mut [C64]) {
        let a: Mat<C64, 3, 2> = unpack(&x[..6]);
        let b: Mat<C64, 3, 2> = unpack(&x[6..]);
        let mut c = Mat::<C64, 2, 2>::default();
        matmul_core(TrView(&a), &b, Store(&mut c));
        pack(&c, y);
    }

    fn deriv(&self, seed: &[C64], x: &[C64], g: &mut [C64]) {
        let mut a: Mat<C64, 3, 2> = unpack(&x[..6]);
        let mut ab = Mat::default();
        let mut b: Mat<C64, 3, 2> = unpack(&x[6..]);
        let mut bb = Mat::default();
        let mut c = Mat::<C64, 2, 2>::default();
        let mut cb: Mat<C64, 2, 2> = unpack(seed);
        {
            let mut a_ad = AdMat::new(&mut a, &mut ab);
            let mut b_ad = AdMat::new(&mut b, &mut bb);
            let mut c_ad = AdMat::new(&mut c, &mut cb);
            let mut expr = matmul(Tr(&mut a_ad), &mut b_ad, &mut c_ad);
            expr.reverse();
        }
        pack(&ab, &mut g[..6]);
        pack(&bb, &mut g[6..]);
    }

    fn hprod(&self, seed: &[C64], hval: &[C64], x: &[C64], p: &[C64], h: &mut [C64]) {
        let mut a2 = Ad2Mat::new(unpack::<3, 2>(&x[..6]));
        a2.set_pvalue(&unpack(&p[..6]));
        let mut b2 = Ad2Mat::new(unpack::<3, 2>(&x[6..]));
        b2.set_pvalue(&unpack(&p[6..]));
        let mut c2 = Ad2Mat::<C64, 2, 2>::default();
        c2.set_bvalue(&unpack(seed));
        c2.set_hvalue(&unpack(hval));
        {
            let mut expr = matmul2(Tr(&mut a2), &mut b2, &mut c2);
            expr.reverse();
            expr.hforward();
            expr.hreverse();
        }
        pack(a2.hvalue(), &mut h[..6]);
        pack(b2.hvalue(), &mut h[6..]);
    }
}

// ── C = A^T * B^T, both active, A stored 3x2 and B stored 2x3 ──

struct MulTransposeBoth;

impl DerivativeTest<f64> for MulTransposeBoth {
    const INPUTS: usize = 3 * 2 + 2 * 3;
    const OUTPUTS: usize = 2 * 2;

    fn name(&self) -> String {
        "matmul transpose-both".to_string()
    }

    fn eval(&self, x: &[C64], y: &mut [C64]) {
        let a: Mat<C64, 3, 2> = unpack(&x[..6]);
        let b: Mat<C64, 2, 3> = unpack(&x[6..]);
        let mut c = Mat::<C64, 2, 2>::default();
        matmul_core(TrView(&a), TrView(&b), Store(&mut c));
        pack(&c, y);
    }

    fn deriv(&self, seed: &[C64], x: &[C64], g: &mut [C64]) {
        let mut a: Mat<C64, 3, 2> = unpack(&x[..6]);
        let mut ab = Mat::default();
        let mut b: Mat<C64, 2, 3> = unpack(&x[6..]);
        let mut bb = Mat::default();
        let mut c = Mat::<C64, 2, 2>::default();
        let mut cb: Mat<C64, 2, 2> = unpack(seed);
        {
            let mut a_ad = AdMat::new(&mut a, &mut ab);
            let mut b_ad = AdMat::new(&mut b, &mut bb);
            let mut c_ad = AdMat::new(&mut c, &mut cb);
            let mut expr = matmul(Tr(&mut a_ad), Tr(&mut b_ad), &mut c_ad);
            expr.reverse();
        }
        pack(&ab, &mut g[..6]);
        pack(&bb, &mut g[6..]);
    }

    fn hprod(&self, seed: &[C64], hval: &[C64], x: &[C64], p: &[C64], h: &mut [C64]) {
        let mut a2 = Ad2Mat::new(unpack::<3, 2>(&x[..6]));
        a2.set_pvalue(&unpack(&p[..6]));
        let mut b2 = Ad2Mat::new(unpack::<2, 3>(&x[6..]));
        b2.set_pvalue(&unpack(&p[6..]));
        let mut c2 = Ad2Mat::<C64, 2, 2>::default();
        c2.set_bvalue(&unpack(seed));
        c2.set_hvalue(&unpack(hval));
        {
            let mut expr = matmul2(Tr(&mut a2), Tr(&mut b2), &mut c2);
            expr.reverse();
            expr.hforward();
            expr.hreverse();
        }
        pack(a2.hvalue(), &mut h[..6]);
        pack(b2.hvalue(), &mut h[6..]);
    }
}

#[test]
fn both_active_directional() {
    let ok = run(&MulBothActive, CheckMode::Directional, &mut io::stdout()).unwrap();
    assert!(ok);
}

#[test]
fn both_active_components() {
    let ok = run(&MulBothActive, CheckMode::PerComponent, &mut io::stdout()).unwrap();
    assert!(ok);
}

#[test]
fn passive_a_directional() {
    let test = MulPassiveA { a: fixed() };
    let ok = run(&test, CheckMode::Directional, &mut io::stdout()).unwrap();
    assert!(ok);
}

#[test]
fn passive_a_components() {
    let test = MulPassiveA { a: fixed() };
    let ok = run(&test, CheckMode::PerComponent, &mut io::stdout()).unwrap();
    assert!(ok);
}

#[test]
fn passive_b_directional() {
    let test = MulPassiveB { b: fixed() };
    let ok = run(&test, CheckMode::Directional, &mut io::stdout()).unwrap();
    assert!(ok);
}

#[test]
fn passive_b_components() {
    let test = MulPassiveB { b: fixed() };
    let ok = run(&test, CheckMode::PerComponent, &mut io::stdout()).unwrap();
    assert!(ok);
}

#[test]
fn transpose_a_components() {
    let ok = run(&MulTransposeA, CheckMode::PerComponent, &mut io::stdout()).unwrap();
    assert!(ok);
}

#[test]
fn transpose_both_components() {
    let ok = run(&MulTransposeBoth, CheckMode::PerComponent, &mut io::stdout()).unwrap();
    assert!(ok);
}
