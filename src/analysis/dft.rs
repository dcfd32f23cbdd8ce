use core::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

use crate::equalizer::TapCoefficient;

/// Forward DFT of the taps, zero-padded to `size`, without scaling
pub(crate) fn tap_spectrum(taps: &[TapCoefficient], size: usize) -> Vec<Complex<f64>> {
    let mut buffer = vec![Complex::new(0.0, 0.0); size];
    for (slot, tap) in buffer.iter_mut().zip(taps) {
        *slot = Complex::new(f64::from(tap.real), f64::from(tap.imag));
    }

    if size > 0 {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        fft.process(&mut buffer);
    }
    buffer
}

/// Remove 2π jumps so consecutive samples differ by at most π
///
/// Jumps smaller than π are left alone; a jump landing exactly on -π after
/// wrapping is kept positive when the raw step was positive.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let Some(&first) = phase.first() else {
        return out;
    };
    out.push(first);

    let mut correction = 0.0;
    for pair in phase.windows(2) {
        let delta = pair[1] - pair[0];
        let mut wrapped = (delta + PI).rem_euclid(2.0 * PI) - PI;
        if wrapped == -PI && delta > 0.0 {
            wrapped = PI;
        }
        if delta.abs() >= PI {
            correction += wrapped - delta;
        }
        out.push(pair[1] + correction);
    }
    out
}

/// Numerical derivative of `values` with respect to `coords`
///
/// One-sided first differences at the ends, second-order centered differences
/// (valid for uneven spacing) in between. Fewer than two points give zeros.
pub fn gradient(values: &[f64], coords: &[f64]) -> Vec<f64> {
    let n = values.len().min(coords.len());
    if n < 2 {
        return vec![0.0; n];
    }

    let mut out = vec![0.0; n];
    out[0] = (values[1] - values[0]) / (coords[1] - coords[0]);
    out[n - 1] = (values[n - 1] - values[n - 2]) / (coords[n - 1] - coords[n - 2]);

    for i in 1..n - 1 {
        let h1 = coords[i] - coords[i - 1];
        let h2 = coords[i + 1] - coords[i];
        let a = -h2 / (h1 * (h1 + h2));
        let b = (h2 - h1) / (h1 * h2);
        let c = h1 / (h2 * (h1 + h2));
        out[i] = a * values[i - 1] + b * values[i] + c * values[i + 1];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_of_constant_is_dc_only() {
        let taps = vec![TapCoefficient::new(1, 0); 8];
        let spectrum = tap_spectrum(&taps, 8);
        assert!((spectrum[0].re - 8.0).abs() < 1e-12);
        for bin in &spectrum[1..] {
            assert!(bin.norm() < 1e-12);
        }
    }

    #[test]
    fn test_spectrum_zero_pads() {
        let taps = vec![TapCoefficient::new(0, 1)];
        let spectrum = tap_spectrum(&taps, 5);
        assert_eq!(spectrum.len(), 5);
        for bin in &spectrum {
            assert!((bin.re).abs() < 1e-12);
            assert!((bin.im - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unwrap_removes_jumps() {
        let wrapped = [0.0, 3.0, -3.0, 3.1];
        let unwrapped = unwrap_phase(&wrapped);
        assert_eq!(unwrapped[0], 0.0);
        assert_eq!(unwrapped[1], 3.0);
        assert!((unwrapped[2] - (-3.0 + 2.0 * PI)).abs() < 1e-12);
        assert!((unwrapped[3] - 3.1).abs() < 1e-12);
        for pair in unwrapped.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= PI);
        }
    }

    #[test]
    fn test_unwrap_linear_ramp() {
        let slope = -1.2;
        let truth: Vec<f64> = (0..20).map(|k| slope * k as f64).collect();
        let wrapped: Vec<f64> = truth.iter().map(|p| (p + PI).rem_euclid(2.0 * PI) - PI).collect();
        let unwrapped = unwrap_phase(&wrapped);
        for (u, t) in unwrapped.iter().zip(&truth) {
            assert!((u - t).abs() < 1e-9, "{} vs {}", u, t);
        }
    }

    #[test]
    fn test_unwrap_empty() {
        assert!(unwrap_phase(&[]).is_empty());
    }

    #[test]
    fn test_gradient_uniform() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 2.0, 4.0, 7.0, 11.0];
        let g = gradient(&y, &x);
        assert_eq!(g, vec![1.0, 1.5, 2.5, 3.5, 4.0]);
    }

    #[test]
    fn test_gradient_uneven_spacing_is_exact_for_quadratics() {
        let x = [0.0, 1.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let g = gradient(&y, &x);
        assert!((g[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_short_inputs() {
        assert_eq!(gradient(&[5.0], &[0.0]), vec![0.0]);
        assert!(gradient(&[], &[]).is_empty());
    }
}
