mod core;

pub use core::{Message, Role, SamplingParams, completion, transcription};
