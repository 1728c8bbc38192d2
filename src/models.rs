use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub term: String,
    pub meaning: String,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub ipa: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub level: Option<Level>,
}

impl Word {
    pub fn new(id: impl Into<String>, term: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
            meaning: meaning.into(),
            part_of_speech: None,
            example: None,
            ipa: None,
            image_url: None,
            topic: None,
            level: None,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStat {
    pub name: String,
    pub icon: String,
    pub description: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            _ => Err(()),
        }
    }
}

/// Which vocabulary collection a progress or status record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Oxford,
    Topics,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Oxford, Source::Topics];

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Oxford => "oxford",
            Source::Topics => "topics",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "oxford" => Ok(Source::Oxford),
            "topics" => Ok(Source::Topics),
            other => Err(format!("unknown source '{other}', expected oxford or topics")),
        }
    }
}
