//! Task inputs and kind-specific task results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::AgentKind;

/// Input to a worker task: free-form text plus optional caller context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl TaskRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// Result of a completed task, one variant per agent kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskOutput {
    Research(ResearchReport),
    CodeAnalysis(CodeAnalysis),
    Documentation(Documentation),
    TestGeneration(TestSuite),
}

impl TaskOutput {
    /// The agent kind this output belongs to.
    pub fn kind(&self) -> AgentKind {
        match self {
            Self::Research(_) => AgentKind::Research,
            Self::CodeAnalysis(_) => AgentKind::CodeAnalysis,
            Self::Documentation(_) => AgentKind::Documentation,
            Self::TestGeneration(_) => AgentKind::TestGeneration,
        }
    }

    /// Editor-facing suggestions derived from this output.
    ///
    /// Research and documentation outputs carry no suggestions.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        match self {
            Self::CodeAnalysis(analysis) => analysis
                .suggestions
                .all()
                .map(|text| Suggestion {
                    label: text.clone(),
                    detail: "AI Suggestion".to_string(),
                    documentation: "Suggested improvement based on code analysis".to_string(),
                    priority: None,
                })
                .collect(),
            Self::TestGeneration(suite) => suite
                .coverage
                .missing_scenarios
                .iter()
                .map(|scenario| Suggestion {
                    label: format!("Add test for: {scenario}"),
                    detail: "Improves test coverage".to_string(),
                    documentation: format!(
                        "Current coverage is {:.0}%; this scenario is not exercised",
                        suite.coverage.coverage * 100.0
                    ),
                    priority: Some(Priority::High),
                })
                .collect(),
            Self::Research(_) | Self::Documentation(_) => Vec::new(),
        }
    }
}

// ── Research ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub topic: String,
    pub findings: Vec<ResearchFinding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStage {
    /// Raw material gathered on the topic.
    Information,
    /// Conclusions drawn from the gathered material.
    Analysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchFinding {
    pub stage: ResearchStage,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

// ── Code analysis ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    pub complexity: Complexity,
    pub patterns: Patterns,
    pub suggestions: SuggestionBuckets,
    pub ai_insights: AiInsights,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Complexity {
    pub cyclomatic_complexity: u32,
    pub maintainability_index: f64,
    pub lines_of_code: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patterns {
    pub design_patterns: Vec<String>,
    pub anti_patterns: Vec<String>,
    pub code_smells: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionBuckets {
    pub improvements: Vec<String>,
    pub refactoring: Vec<String>,
    pub best_practices: Vec<String>,
}

impl SuggestionBuckets {
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.improvements
            .iter()
            .chain(&self.refactoring)
            .chain(&self.best_practices)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiInsights {
    pub potential_improvements: Vec<String>,
    pub security_considerations: Vec<String>,
    pub performance_optimizations: Vec<String>,
}

// ── Documentation ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Documentation {
    pub summary: DocSummary,
    pub params: Vec<ParamDoc>,
    pub returns: ReturnDoc,
    pub examples: Vec<Example>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocSummary {
    pub description: String,
    pub purpose: String,
    pub usage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDoc {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnDoc {
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub code: String,
    pub description: String,
}

// ── Test generation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub unit_tests: Vec<UnitTest>,
    pub integration_tests: Vec<IntegrationTest>,
    pub test_cases: Vec<TestCase>,
    pub coverage: CoverageAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTest {
    pub name: String,
    pub code: String,
    pub assertions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationTest {
    pub name: String,
    pub code: String,
    pub setup: Vec<String>,
    pub teardown: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub description: String,
    pub input: String,
    pub expected_output: String,
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageAnalysis {
    /// Fraction of paths covered, 0.0..=1.0.
    pub coverage: f64,
    pub uncovered_paths: Vec<String>,
    pub missing_scenarios: Vec<String>,
}

// ── Suggestions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A completion-style suggestion surfaced in the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub detail: String,
    pub documentation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}
