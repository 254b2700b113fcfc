use serde::{Deserialize, Serialize};

/// Fixed number of file references returned for every voice query.
pub const RESULT_SLOTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Start,
    Transcribing,
    Searching,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Transcribing => write!(f, "transcribing"),
            Self::Searching => write!(f, "searching"),
            Self::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Matched {
        transcript: String,
        total_matches: usize,
    },
    NoMatches {
        transcript: String,
    },
    RecognitionFailed,
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn transcript(&self) -> Option<&str> {
        match self {
            Self::Matched { transcript, .. } | Self::NoMatches { transcript } => Some(transcript),
            Self::RecognitionFailed => None,
        }
    }

    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if let Some(transcript) = self.transcript() {
            notices.push(Notice::new(
                NoticeLevel::Info,
                format!("transcript: {transcript}"),
            ));
        }
        match self {
            Self::Matched { total_matches, .. } => notices.push(Notice::new(
                NoticeLevel::Info,
                format!(
                    "found {total_matches} matching files, showing the top {}",
                    (*total_matches).min(RESULT_SLOTS)
                ),
            )),
            Self::NoMatches { .. } => notices.push(Notice::new(
                NoticeLevel::Warning,
                "no matching files, check the keywords",
            )),
            Self::RecognitionFailed => notices.push(Notice::new(
                NoticeLevel::Error,
                "speech recognition failed, check the audio file",
            )),
        }
        notices
    }
}

/// Always exactly [`RESULT_SLOTS`] entries; unused slots are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub slots: [Option<String>; RESULT_SLOTS],
    pub outcome: PipelineOutcome,
}

impl PipelineResult {
    pub fn empty(outcome: PipelineOutcome) -> Self {
        Self {
            slots: Default::default(),
            outcome,
        }
    }

    /// Fills slots from ranked paths, keeping the first [`RESULT_SLOTS`].
    pub fn from_ranked(paths: &[String], outcome: PipelineOutcome) -> Self {
        let mut result = Self::empty(outcome);
        for (slot, path) in result.slots.iter_mut().zip(paths) {
            *slot = Some(path.clone());
        }
        result
    }

    pub fn paths(&self) -> Vec<&str> {
        self.slots.iter().flatten().map(String::as_str).collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.outcome.notices()
    }
}
