//! Mood coordinates to text prompt for the generative model
//!
//! Valence picks the mood phrase, energy picks the style family, and
//! valence below 0.5 selects the darker style of that family.

use serde::Serialize;

/// Token budget for a ~5 second preview clip
pub const PREVIEW_TOKENS: u32 = 256;
/// Token budget for a ~10 second clip
pub const FULL_TOKENS: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodPrompt {
    pub mood: &'static str,
    pub style: &'static str,
}

impl MoodPrompt {
    pub fn text(&self) -> String {
        format!("{}. {} music with clear melody and rhythm.", self.mood, self.style)
    }
}

pub fn map_mood(energy: f64, valence: f64) -> MoodPrompt {
    let mood = if valence < 0.33 {
        "melancholic and emotional"
    } else if valence < 0.66 {
        "contemplative and balanced"
    } else {
        "uplifting and joyful"
    };

    let dark = valence < 0.5;
    let style = if energy < 0.33 {
        if dark { "Ambient electronic" } else { "Soft piano" }
    } else if energy < 0.66 {
        if dark { "Melodic synthesizer" } else { "Modern classical" }
    } else if dark {
        "Electronic dance"
    } else {
        "Upbeat pop"
    };

    MoodPrompt { mood, style }
}

/// Sampling seed, distinct per mood coordinate: `(e*1000 + v*2000) mod 2^32`
pub fn generation_seed(energy: f64, valence: f64) -> u64 {
    const MODULUS: f64 = 4_294_967_296.0;
    (energy * 1000.0 + valence * 2000.0).rem_euclid(MODULUS) as u64
}

pub fn token_budget(preview: bool) -> u32 {
    if preview {
        PREVIEW_TOKENS
    } else {
        FULL_TOKENS
    }
}
