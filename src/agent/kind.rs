//! Agent kinds: the fixed set of worker categories the hub can start.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Category of a worker.
///
/// Serialized as the human-facing token (`"Research Agent"`, ...), which is
/// also what `start` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    #[serde(rename = "Research Agent")]
    Research,
    #[serde(rename = "Code Analysis Agent")]
    CodeAnalysis,
    #[serde(rename = "Documentation Agent")]
    Documentation,
    #[serde(rename = "Test Generation Agent")]
    TestGeneration,
}

impl AgentKind {
    /// Every kind the coordinator accepts, in display order.
    pub const ALL: [AgentKind; 4] = [
        Self::Research,
        Self::CodeAnalysis,
        Self::Documentation,
        Self::TestGeneration,
    ];

    /// Token used on the control surface.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Research => "Research Agent",
            Self::CodeAnalysis => "Code Analysis Agent",
            Self::Documentation => "Documentation Agent",
            Self::TestGeneration => "Test Generation Agent",
        }
    }

    /// Identifier prefix: the token lowercased, spaces replaced by `-`.
    pub fn slug(&self) -> String {
        self.token().to_lowercase().replace(' ', "-")
    }

    /// Label shown while a worker of this kind has a task in flight.
    pub fn busy_label(&self) -> &'static str {
        match self {
            Self::Research => "researching",
            Self::CodeAnalysis => "analyzing",
            Self::Documentation => "documenting",
            Self::TestGeneration => "testing",
        }
    }

    /// Capability tags advertised to the editor.
    pub fn capabilities(&self) -> &'static [&'static str] {
        match self {
            Self::Research => &["research", "analysis"],
            Self::CodeAnalysis => &["code-analysis", "refactoring"],
            Self::Documentation => &["documentation", "explanation"],
            Self::TestGeneration => &["test-generation", "coverage"],
        }
    }

    /// Whether completed results are kept on the worker.
    pub fn accumulates_results(&self) -> bool {
        matches!(self, Self::Research)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for AgentKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.token() == s)
            .ok_or_else(|| AgentError::UnknownKind {
                kind: s.to_string(),
            })
    }
}
