pub mod indexing_service;
pub mod pipeline_service;
pub mod postprocess;
pub mod search_service;
pub mod speech_engine;
pub mod transcription_service;
