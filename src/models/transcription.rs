use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the speech engine should run inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Device {
    Cpu,
    Cuda(u32),
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
        }
    }
}

impl std::str::FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|n| n.parse::<u32>().ok())
                .map(Self::Cuda)
                .ok_or_else(|| format!("unknown device: {s}")),
        }
    }
}

/// Parameters forwarded to the speech engine with every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    /// `auto` lets the engine detect the spoken language.
    pub language: String,
    pub use_itn: bool,
    pub max_segment_seconds: u32,
    pub batch_seconds: u32,
    pub merge_vad: bool,
    pub merge_seconds: u32,
    pub device: Device,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            use_itn: true,
            max_segment_seconds: 30,
            batch_seconds: 60,
            merge_vad: true,
            merge_seconds: 15,
            device: Device::Cuda(0),
        }
    }
}

impl GenerationConfig {
    pub fn with_device(device: Device) -> Self {
        Self {
            device,
            ..Self::default()
        }
    }
}

/// Raw engine output for one merged segment, markup included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub key: Option<String>,
    pub text: String,
}

/// Audio handed to the transcriber.
#[derive(Debug, Clone)]
pub enum AudioInput {
    File(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl AudioInput {
    pub fn name(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "audio".to_string()),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::File(path) => tokio::fs::read(path).await,
            Self::Bytes { data, .. } => Ok(data.clone()),
        }
    }
}
