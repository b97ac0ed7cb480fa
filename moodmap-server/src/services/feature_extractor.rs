//! Mood feature extraction from uploaded audio
//!
//! Features are coarse signal-level proxies, each mapped into [0, 1]:
//! - energy: `tanh(10 * mean frame RMS)`
//! - valence: `1 - tanh(mean spectral centroid / 8000 Hz)` (darker = sadder)
//! - tempo: autocorrelation of the spectral-flux onset envelope, 60-200 BPM
//! - danceability: `clamp(tempo / 200, 0, 1)`

use moodmap_common::mood::DEFAULT_TEMPO_BPM;
use moodmap_common::FeatureVector;
use rustfft::{num_complex::Complex, FftPlanner};
use thiserror::Error;
use tracing::debug;

use super::audio_loader;

pub const FRAME_SIZE: usize = 2048;
pub const HOP_SIZE: usize = 512;
pub const MIN_TEMPO_BPM: f64 = 60.0;
pub const MAX_TEMPO_BPM: f64 = 200.0;

/// Centroid that maps to valence `1 - tanh(1)`
const CENTROID_SCALE_HZ: f64 = 8000.0;

/// Feature extraction errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Container or codec could not be read
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// Decoded stream holds no samples
    #[error("Audio contains no samples")]
    Empty,

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

/// Frame-based extractor; stateless, shared behind an `Arc`
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    frame_size: usize,
    hop_size: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FRAME_SIZE, HOP_SIZE)
    }
}

/// Per-frame analysis results
struct FrameAnalysis {
    mean_rms: f64,
    /// Mean over non-silent frames, 0 if every frame is silent
    mean_centroid_hz: f64,
    onset_envelope: Vec<f64>,
}

impl FeatureExtractor {
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        Self {
            frame_size: frame_size.max(16),
            hop_size: hop_size.max(1),
        }
    }

    /// Decode an uploaded file and extract its feature vector.
    ///
    /// CPU bound; call from a blocking thread.
    pub fn extract(&self, bytes: Vec<u8>, file_name: Option<&str>) -> Result<FeatureVector, ExtractionError> {
        let audio = audio_loader::decode_bytes(bytes, file_name)
            .map_err(|e| ExtractionError::Decode(format!("{:#}", e)))?;
        self.analyze_samples(&audio.samples, audio.sample_rate)
    }

    /// Extract features from mono samples
    pub fn analyze_samples(&self, samples: &[f32], sample_rate: u32) -> Result<FeatureVector, ExtractionError> {
        if samples.is_empty() {
            return Err(ExtractionError::Empty);
        }
        if sample_rate == 0 {
            return Err(ExtractionError::InvalidSampleRate(sample_rate));
        }

        let analysis = self.analyze_frames(samples, sample_rate);
        let frame_rate = sample_rate as f64 / self.hop_size as f64;
        let tempo = estimate_tempo(&analysis.onset_envelope, frame_rate);

        let features = FeatureVector {
            energy: (10.0 * analysis.mean_rms).tanh(),
            valence: 1.0 - (analysis.mean_centroid_hz / CENTROID_SCALE_HZ).tanh(),
            danceability: (tempo / MAX_TEMPO_BPM).clamp(0.0, 1.0),
            tempo,
        };

        debug!(
            rms = analysis.mean_rms,
            centroid_hz = analysis.mean_centroid_hz,
            energy = features.energy,
            valence = features.valence,
            tempo = features.tempo,
            "Extracted audio features"
        );

        Ok(features)
    }

    fn analyze_frames(&self, samples: &[f32], sample_rate: u32) -> FrameAnalysis {
        let n = self.frame_size;

        // Short clips are zero padded to a single frame
        let padded;
        let samples = if samples.len() < n {
            padded = {
                let mut v = samples.to_vec();
                v.resize(n, 0.0);
                v
            };
            &padded[..]
        } else {
            samples
        };

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); n];
        let mut scratch = vec![Complex::new(0.0f32, 0.0); fft.get_inplace_scratch_len()];
        let window = hann_window(n);

        let bins = n / 2 + 1;
        let bin_hz = sample_rate as f64 / n as f64;
        let mut previous: Option<Vec<f64>> = None;
        let mut magnitudes = vec![0.0f64; bins];

        let mut rms_sum = 0.0;
        let mut frames = 0usize;
        let mut centroid_sum = 0.0;
        let mut centroid_frames = 0usize;
        let mut onset_envelope = Vec::new();

        let mut start = 0;
        while start + n <= samples.len() {
            let frame = &samples[start..start + n];

            let sum_squares: f64 = frame.iter().map(|&s| (s as f64).powi(2)).sum();
            rms_sum += (sum_squares / n as f64).sqrt();
            frames += 1;

            for (slot, (&s, &w)) in buffer.iter_mut().zip(frame.iter().zip(window.iter())) {
                *slot = Complex::new(s * w, 0.0);
            }
            fft.process_with_scratch(&mut buffer, &mut scratch);

            for (m, c) in magnitudes.iter_mut().zip(buffer.iter().take(bins)) {
                *m = c.norm() as f64;
            }

            let total: f64 = magnitudes.iter().sum();
            if total > 1e-10 {
                let weighted: f64 = magnitudes
                    .iter()
                    .enumerate()
                    .map(|(k, &m)| k as f64 * bin_hz * m)
                    .sum();
                centroid_sum += weighted / total;
                centroid_frames += 1;
            }

            // Half-wave rectified spectral flux; the first frame has no predecessor
            let flux = match &previous {
                Some(prev) => magnitudes
                    .iter()
                    .zip(prev.iter())
                    .map(|(&m, &p)| (m - p).max(0.0))
                    .sum(),
                None => 0.0,
            };
            onset_envelope.push(flux);
            previous = Some(magnitudes.clone());

            start += self.hop_size;
        }

        FrameAnalysis {
            mean_rms: if frames > 0 { rms_sum / frames as f64 } else { 0.0 },
            mean_centroid_hz: if centroid_frames > 0 {
                centroid_sum / centroid_frames as f64
            } else {
                0.0
            },
            onset_envelope,
        }
    }
}

fn hann_window(n: usize) -> Vec<f32> {
    let denom = (n - 1).max(1) as f32;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
        .collect()
}

/// Tempo in BPM from an onset envelope sampled at `frame_rate` Hz.
///
/// Picks the autocorrelation lag in the 60-200 BPM window with the highest
/// correlation, weighted by a log-normal prior centred on 120 BPM (one
/// octave standard deviation) so that 60 and 120 do not tie on a steady
/// beat. Returns 120 when the envelope is too short or has no periodicity.
pub fn estimate_tempo(onset_envelope: &[f64], frame_rate: f64) -> f64 {
    if frame_rate <= 0.0 || onset_envelope.len() < 4 {
        return DEFAULT_TEMPO_BPM;
    }

    let len = onset_envelope.len();
    let mean = onset_envelope.iter().sum::<f64>() / len as f64;
    let centered: Vec<f64> = onset_envelope.iter().map(|&x| x - mean).collect();

    let zero_lag: f64 = centered.iter().map(|x| x * x).sum::<f64>() / len as f64;
    if zero_lag <= 1e-12 {
        return DEFAULT_TEMPO_BPM;
    }

    let min_lag = ((60.0 * frame_rate / MAX_TEMPO_BPM).ceil() as usize).max(1);
    let max_lag = ((60.0 * frame_rate / MIN_TEMPO_BPM).floor() as usize).min(len / 2);
    if min_lag > max_lag {
        return DEFAULT_TEMPO_BPM;
    }

    let mut best: Option<(usize, f64)> = None;
    for lag in min_lag..=max_lag {
        let correlation: f64 = centered[..len - lag]
            .iter()
            .zip(centered[lag..].iter())
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / (len - lag) as f64;

        let bpm = 60.0 * frame_rate / lag as f64;
        let octaves = (bpm / DEFAULT_TEMPO_BPM).log2();
        let weighted = correlation * (-0.5 * octaves * octaves).exp();

        if best.map_or(true, |(_, score)| weighted > score) {
            best = Some((lag, weighted));
        }
    }

    match best {
        // Require a clear periodic peak relative to the signal's own energy
        Some((lag, score)) if score > 0.1 * zero_lag => 60.0 * frame_rate / lag as f64,
        _ => DEFAULT_TEMPO_BPM,
    }
}
