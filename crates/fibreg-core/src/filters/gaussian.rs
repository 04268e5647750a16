use crate::consts::GAUSSIAN_TRUNCATE;

/// Smooth a 1D signal with a Gaussian of standard deviation `sigma`.
///
/// The kernel is truncated at `GAUSSIAN_TRUNCATE` sigmas and samples past
/// either end are mirrored (`d c b a | a b c d | d c b a`), so a constant
/// signal is returned unchanged.
pub fn gaussian_smooth_1d(signal: &[f64], sigma: f64) -> Vec<f64> {
    if signal.is_empty() || sigma <= 0.0 {
        return signal.to_vec();
    }

    let kernel = make_gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let n = signal.len();

    (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(ki, &kv)| {
                    let src = i as isize + ki as isize - radius;
                    signal[reflect_index(src, n)] * kv
                })
                .sum()
        })
        .collect()
}

fn make_gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f64; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f64;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f64 - radius as f64;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Map an out-of-range index into `[0, n)` by half-sample mirroring.
fn reflect_index(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period);
    if m >= n as isize {
        (period - m - 1) as usize
    } else {
        m as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_mirrors_both_ends() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(2, 4), 2);
    }

    #[test]
    fn kernel_is_normalized() {
        let k = make_gaussian_kernel(2.0);
        assert_eq!(k.len(), 17);
        let sum: f64 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }
}
