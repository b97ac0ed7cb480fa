//! WAV post-processing for generated clips
//!
//! The model returns WAV of arbitrary channel count and sample format.
//! Clips are flattened to one channel, peak normalized to 0.9 full scale
//! and re-encoded as 16-bit PCM.

use anyhow::{Context, Result};
use std::io::Cursor;

/// Target peak as a fraction of full scale
pub const PEAK_LEVEL: f32 = 0.9;

/// A normalized 16-bit mono clip
#[derive(Debug, Clone)]
pub struct NormalizedWav {
    pub bytes: Vec<u8>,
    pub sample_rate: u32,
    /// Seconds
    pub duration: f64,
}

/// Decode `wav_bytes`, normalize the peak and re-encode.
///
/// Interleaved channels are flattened into one stream, so a stereo clip
/// plays back twice as long. Silence is left silent.
pub fn normalize_to_wav(wav_bytes: &[u8]) -> Result<NormalizedWav> {
    let mut reader =
        hound::WavReader::new(Cursor::new(wav_bytes)).context("Generated audio is not a WAV file")?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to read float samples")?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .context("Failed to read integer samples")?
        }
    };

    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    let gain = if peak > 0.0 { PEAK_LEVEL / peak } else { 1.0 };

    let pcm: Vec<i16> = samples
        .iter()
        .map(|&s| (s * gain * i16::MAX as f32) as i16)
        .collect();

    let bytes = encode_wav_i16(&pcm, spec.sample_rate)?;
    let duration = pcm.len() as f64 / spec.sample_rate as f64;

    Ok(NormalizedWav {
        bytes,
        sample_rate: spec.sample_rate,
        duration,
    })
}

/// Encode mono 16-bit PCM as a WAV file in memory
pub fn encode_wav_i16(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).context("Failed to start WAV")?;
        for &s in samples {
            writer.write_sample(s).context("Failed to write sample")?;
        }
        writer.finalize().context("Failed to finalize WAV")?;
    }
    Ok(cursor.into_inner())
}
