use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub file_path: String,
    pub score: f64,
}

impl SearchHit {
    pub fn new(file_path: impl Into<String>, score: f64) -> Self {
        Self {
            file_path: file_path.into(),
            score,
        }
    }
}
