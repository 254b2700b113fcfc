pub mod file_entry;
pub mod pipeline;
pub mod search;
pub mod transcription;
