//! Properties of the encode → reconstruct → score path
//!
//! Exercised on a spread of frame sizes with deterministic pseudo-random
//! content, no simulator involved.

use sobel_core::{
    compare, mse, psnr_from_mse, stream, BorderRule, FrameDims, IntensityGrid, Reconstructor,
    SobelError,
};
use sobel_design::pipeline::PipelineGeometry;

const SIZES: &[(usize, usize)] = &[(3, 3), (4, 4), (5, 9), (16, 7), (32, 32), (128, 128)];

/// Small xorshift generator so the tests need no RNG crate
struct XorShift(u64);

impl XorShift {
    fn next_u8(&mut self) -> u8 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 32) as u8
    }
}

fn random_grid(dims: FrameDims, seed: u64) -> IntensityGrid {
    let mut rng = XorShift(seed | 1);
    IntensityGrid::from_fn(dims, |_, _| rng.next_u8())
}

fn flat_reconstructor(dims: FrameDims) -> Reconstructor {
    Reconstructor::new(dims, PipelineGeometry::default(), BorderRule::FlatPrefix)
        .expect("frame large enough for 3×3 latency")
}

#[test]
fn test_stream_round_trip_at_zero_latency() {
    for (i, &(h, w)) in SIZES.iter().enumerate() {
        let dims = FrameDims::new(h, w).unwrap();
        let grid = random_grid(dims, i as u64 + 1);

        let text = stream::encode_stream(&grid);
        assert_eq!(text.lines().count(), h * w);

        let samples = stream::parse_samples(&text).unwrap();
        let rec = Reconstructor::with_latency(
            dims,
            PipelineGeometry::default(),
            0,
            BorderRule::FlatPrefix,
        )
        .unwrap();
        assert_eq!(rec.reconstruct(&samples).unwrap(), grid, "{h}×{w}");
    }
}

#[test]
fn test_encoding_is_deterministic() {
    let grid = random_grid(FrameDims::new(16, 7).unwrap(), 99);
    assert_eq!(stream::encode_stream(&grid), stream::encode_stream(&grid));
}

#[test]
fn test_latency_invariant() {
    for (i, &(h, w)) in SIZES.iter().enumerate() {
        let dims = FrameDims::new(h, w).unwrap();
        let rec = flat_reconstructor(dims);
        let latency = 2 * w + 2;
        assert_eq!(rec.latency(), latency);
        assert_eq!(rec.expected_samples(), h * w - latency);

        // Non-zero samples so a stray zero in the interior would be visible.
        let samples: Vec<u8> = random_grid(dims, i as u64 + 7)
            .as_slice()
            .iter()
            .take(h * w - latency)
            .map(|&p| p | 1)
            .collect();

        let grid = rec.reconstruct(&samples).unwrap();
        let flat = grid.as_slice();
        assert!(flat[..latency].iter().all(|&p| p == 0), "{h}×{w} border");
        assert_eq!(&flat[latency..], samples.as_slice(), "{h}×{w} interior");
    }
}

#[test]
fn test_shape_rejection() {
    for &(h, w) in SIZES {
        let dims = FrameDims::new(h, w).unwrap();
        let rec = flat_reconstructor(dims);
        let n = rec.expected_samples();

        for len in [n - 1, n + 1, 0] {
            let result = rec.reconstruct(&vec![0x10; len]);
            assert!(
                matches!(result, Err(SobelError::Shape { .. })),
                "{h}×{w}: {len} samples accepted"
            );
        }
    }
}

#[test]
fn test_metric_symmetry_and_bounds() {
    for (i, &(h, w)) in SIZES.iter().enumerate() {
        let dims = FrameDims::new(h, w).unwrap();
        let a = random_grid(dims, 2 * i as u64 + 3);
        let b = random_grid(dims, 2 * i as u64 + 4);

        assert_eq!(mse(&a, &b).unwrap(), mse(&b, &a).unwrap());
        assert!(mse(&a, &b).unwrap() >= 0.0);
        assert_eq!(mse(&a, &a).unwrap(), 0.0);
        assert_eq!(compare(&a, &a).unwrap().psnr, f64::INFINITY);
        assert_eq!(compare(&a, &b).unwrap().psnr, compare(&b, &a).unwrap().psnr);
    }
}

#[test]
fn test_metric_monotonicity() {
    let dims = FrameDims::new(8, 8).unwrap();
    let base = IntensityGrid::filled(dims, 100);
    let mut last = 0.0;

    for delta in [0u8, 1, 5, 20, 100, 155] {
        let mut other = base.clone();
        other.as_mut_slice()[9] = 100 + delta;
        other.as_mut_slice()[40] = 100 - delta.min(100);
        let m = mse(&base, &other).unwrap();
        assert!(m >= last, "delta {delta}: {m} < {last}");
        last = m;
    }
}

#[test]
fn test_end_to_end_4x4_example() {
    let dims = FrameDims::new(4, 4).unwrap();
    let rec = flat_reconstructor(dims);
    assert_eq!(rec.latency(), 10);

    let samples = stream::parse_samples("10\n10\n10\n10\n10\n10\n").unwrap();
    assert_eq!(samples.len(), 6);

    let rebuilt = rec.reconstruct(&samples).unwrap();
    assert!(rebuilt.as_slice()[..10].iter().all(|&p| p == 0x00));
    assert!(rebuilt.as_slice()[10..].iter().all(|&p| p == 0x10));

    let reference = IntensityGrid::filled(dims, 0x10);
    let cmp = compare(&rebuilt, &reference).unwrap();
    assert_eq!(cmp.mse, 10.0 * 16.0 * 16.0 / 16.0);
    assert_eq!(cmp.mse, 160.0);
    assert!(cmp.psnr.is_finite());
    assert!((cmp.psnr - psnr_from_mse(160.0)).abs() < 1e-12);
    // 10·log10(65025 / 160)
    assert!((cmp.psnr - 26.089).abs() < 1e-3, "psnr = {}", cmp.psnr);
}

#[test]
fn test_off_by_one_latency_is_visible() {
    // Shifting the offset by one sample must change the reconstruction.
    let dims = FrameDims::new(6, 6).unwrap();
    let geom = PipelineGeometry::default();
    let correct = Reconstructor::new(dims, geom, BorderRule::FlatPrefix).unwrap();
    let shifted =
        Reconstructor::with_latency(dims, geom, correct.latency() + 1, BorderRule::FlatPrefix)
            .unwrap();

    let samples: Vec<u8> = (1..=correct.expected_samples() as u8).collect();
    assert!(correct.reconstruct(&samples).is_ok());
    assert!(shifted.reconstruct(&samples).is_err());
    assert!(shifted.reconstruct(&samples[1..]).unwrap() != correct.reconstruct(&samples).unwrap());
}
