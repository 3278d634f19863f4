//! Per-segment acoustic features.
//!
//! A segment is described by 29 numbers: mean and standard deviation of 13
//! MFCCs, then the mean spectral centroid, 85% roll-off and zero-crossing
//! rate over its frames.

use std::f32::consts::PI;

pub const FRAME_LEN: usize = 512;
pub const HOP_LEN: usize = 256;
pub const N_MFCC: usize = 13;
pub const N_MELS: usize = 26;
pub const FEATURE_LEN: usize = N_MFCC * 2 + 3;

const ROLLOFF_PERCENT: f32 = 0.85;
const LOG_FLOOR: f32 = 1e-10;

/// In-place iterative radix-2 FFT. `re.len()` must be a power of two.
fn fft(re: &mut [f32], im: &mut [f32]) {
    let n = re.len();

    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let angle = -2.0 * PI / len as f32;
        for start in (0..n).step_by(len) {
            for k in 0..len / 2 {
                let (sin, cos) = (angle * k as f32).sin_cos();
                let a = start + k;
                let b = a + len / 2;
                let tr = re[b] * cos - im[b] * sin;
                let ti = re[b] * sin + im[b] * cos;
                re[b] = re[a] - tr;
                im[b] = im[a] - ti;
                re[a] += tr;
                im[a] += ti;
            }
        }
        len <<= 1;
    }
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Extracts fixed-length feature vectors from mono PCM.
pub struct FeatureExtractor {
    sample_rate: u32,
    window: Vec<f32>,
    /// Triangular filters over the `FRAME_LEN / 2 + 1` spectrum bins.
    mel_filters: Vec<Vec<f32>>,
    /// DCT-II basis, `N_MFCC` rows of `N_MELS`.
    dct: Vec<Vec<f32>>,
}

impl FeatureExtractor {
    pub fn new(sample_rate: u32) -> Self {
        let window = (0..FRAME_LEN)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / FRAME_LEN as f32).cos())
            .collect();

        Self {
            sample_rate,
            window,
            mel_filters: Self::mel_filterbank(sample_rate),
            dct: Self::dct_basis(),
        }
    }

    fn n_bins() -> usize {
        FRAME_LEN / 2 + 1
    }

    fn mel_filterbank(sample_rate: u32) -> Vec<Vec<f32>> {
        let nyquist = sample_rate as f32 / 2.0;
        let max_mel = hz_to_mel(nyquist);
        let points: Vec<f32> = (0..N_MELS + 2)
            .map(|i| mel_to_hz(max_mel * i as f32 / (N_MELS + 1) as f32))
            .collect();
        let bin_hz = |b: usize| b as f32 * sample_rate as f32 / FRAME_LEN as f32;

        (0..N_MELS)
            .map(|m| {
                let (lo, mid, hi) = (points[m], points[m + 1], points[m + 2]);
                (0..Self::n_bins())
                    .map(|b| {
                        let f = bin_hz(b);
                        if f <= lo || f >= hi {
                            0.0
                        } else if f <= mid {
                            (f - lo) / (mid - lo)
                        } else {
                            (hi - f) / (hi - mid)
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn dct_basis() -> Vec<Vec<f32>> {
        let n = N_MELS as f32;
        (0..N_MFCC)
            .map(|k| {
                let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                (0..N_MELS)
                    .map(|m| scale * (PI * k as f32 * (m as f32 + 0.5) / n).cos())
                    .collect()
            })
            .collect()
    }

    /// Frame start offsets; short signals get a single zero-padded frame.
    fn frame_starts(len: usize) -> Vec<usize> {
        if len <= FRAME_LEN {
            return vec![0];
        }
        (0..=(len - FRAME_LEN)).step_by(HOP_LEN).collect()
    }

    /// Feature vector for `samples`, or `None` when it is shorter than one frame.
    pub fn extract(&self, samples: &[f32]) -> Option<Vec<f32>> {
        if samples.len() < FRAME_LEN {
            return None;
        }

        let n_bins = Self::n_bins();
        let bin_hz = self.sample_rate as f32 / FRAME_LEN as f32;

        let mut mfcc_frames: Vec<[f32; N_MFCC]> = Vec::new();
        let mut centroid_sum = 0.0;
        let mut rolloff_sum = 0.0;
        let mut zcr_sum = 0.0;

        let mut re = vec![0.0f32; FRAME_LEN];
        let mut im = vec![0.0f32; FRAME_LEN];

        let starts = Self::frame_starts(samples.len());
        for &start in &starts {
            let end = (start + FRAME_LEN).min(samples.len());
            let frame = &samples[start..end];

            let crossings = frame
                .windows(2)
                .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
                .count();
            zcr_sum += crossings as f32 / FRAME_LEN as f32;

            re.fill(0.0);
            im.fill(0.0);
            for (i, s) in frame.iter().enumerate() {
                re[i] = s * self.window[i];
            }
            fft(&mut re, &mut im);

            let magnitude: Vec<f32> = (0..n_bins)
                .map(|b| (re[b] * re[b] + im[b] * im[b]).sqrt())
                .collect();
            let total: f32 = magnitude.iter().sum();

            if total > 0.0 {
                let weighted: f32 = magnitude
                    .iter()
                    .enumerate()
                    .map(|(b, m)| b as f32 * bin_hz * m)
                    .sum();
                centroid_sum += weighted / total;

                let threshold = ROLLOFF_PERCENT * total;
                let mut cumulative = 0.0;
                let mut rolloff_bin = n_bins - 1;
                for (b, m) in magnitude.iter().enumerate() {
                    cumulative += m;
                    if cumulative >= threshold {
                        rolloff_bin = b;
                        break;
                    }
                }
                rolloff_sum += rolloff_bin as f32 * bin_hz;
            }

            let log_mel: Vec<f32> = self
                .mel_filters
                .iter()
                .map(|filter| {
                    let energy: f32 = filter
                        .iter()
                        .zip(&magnitude)
                        .map(|(w, m)| w * m * m)
                        .sum();
                    (energy + LOG_FLOOR).ln()
                })
                .collect();

            let mut coeffs = [0.0f32; N_MFCC];
            for (c, basis) in coeffs.iter_mut().zip(&self.dct) {
                *c = basis.iter().zip(&log_mel).map(|(b, l)| b * l).sum();
            }
            mfcc_frames.push(coeffs);
        }

        let frames = mfcc_frames.len() as f32;
        let mut features = Vec::with_capacity(FEATURE_LEN);

        let means: Vec<f32> = (0..N_MFCC)
            .map(|c| mfcc_frames.iter().map(|f| f[c]).sum::<f32>() / frames)
            .collect();
        let stds: Vec<f32> = (0..N_MFCC)
            .map(|c| {
                let var = mfcc_frames
                    .iter()
                    .map(|f| (f[c] - means[c]).powi(2))
                    .sum::<f32>()
                    / frames;
                var.sqrt()
            })
            .collect();

        features.extend(means);
        features.extend(stds);
        features.push(centroid_sum / frames);
        features.push(rolloff_sum / frames);
        features.push(zcr_sum / frames);

        Some(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 16_000;

    fn sine(freq: f32, samples: usize) -> Vec<f32> {
        (0..samples)
            .map(|i| (2.0 * PI * freq * i as f32 / SR as f32).sin())
            .collect()
    }

    #[test]
    fn test_fft_single_tone() {
        let mut re: Vec<f32> = (0..64).map(|i| (2.0 * PI * 4.0 * i as f32 / 64.0).cos()).collect();
        let mut im = vec![0.0; 64];
        fft(&mut re, &mut im);

        let peak = (0..32)
            .max_by(|&a, &b| re[a].hypot(im[a]).total_cmp(&re[b].hypot(im[b])))
            .unwrap();
        assert_eq!(peak, 4);
        assert!((re[4].hypot(im[4]) - 32.0).abs() < 1e-3);
    }

    #[test]
    fn test_too_short_segment() {
        let extractor = FeatureExtractor::new(SR);
        assert!(extractor.extract(&vec![0.1; FRAME_LEN - 1]).is_none());
        assert!(extractor.extract(&vec![0.1; FRAME_LEN]).is_some());
    }

    #[test]
    fn test_feature_shape_and_centroid() {
        let extractor = FeatureExtractor::new(SR);
        let low = extractor.extract(&sine(300.0, 4000)).unwrap();
        let high = extractor.extract(&sine(3000.0, 4000)).unwrap();

        assert_eq!(low.len(), FEATURE_LEN);
        assert!(low.iter().all(|v| v.is_finite()));

        let centroid = N_MFCC * 2;
        let zcr = N_MFCC * 2 + 2;
        assert!(high[centroid] > low[centroid] * 3.0);
        assert!(high[zcr] > low[zcr]);
    }

    #[test]
    fn test_silence_is_finite() {
        let extractor = FeatureExtractor::new(SR);
        let features = extractor.extract(&vec![0.0; 2048]).unwrap();
        assert!(features.iter().all(|v| v.is_finite()));
    }
}
