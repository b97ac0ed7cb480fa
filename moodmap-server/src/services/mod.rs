//! Audio collaborators: upload decoding and feature extraction, and the
//! generative model client with its prompt mapping and WAV post-processing.

pub mod audio_loader;
pub mod feature_extractor;
pub mod mood_prompt;
pub mod music_gen_client;
pub mod wav;

pub use feature_extractor::{ExtractionError, FeatureExtractor};
pub use music_gen_client::{AudioGenerator, GeneratedClip, GenerationError, GenerationRequest, MusicGenClient};
