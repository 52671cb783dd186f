//! Placeholder capabilities.
//!
//! These return correctly shaped but content-free results so the lifecycle can
//! be driven end to end without a real analysis backend. The only measured
//! value is the line count of the submitted code.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::capability::Capability;
use super::output::{
    CodeAnalysis, Complexity, CoverageAnalysis, DocSummary, Documentation, Example,
    IntegrationTest, ResearchFinding, ResearchReport, ResearchStage, ReturnDoc, TaskOutput,
    TaskRequest, TestCase, TestSuite, UnitTest,
};
use crate::error::CapabilityError;

async fn simulate(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

fn require_text(capability: &str, request: &TaskRequest) -> Result<(), CapabilityError> {
    if request.text.trim().is_empty() {
        return Err(CapabilityError::InvalidInput {
            capability: capability.to_string(),
            reason: "input text is empty".to_string(),
        });
    }
    Ok(())
}

/// Gathers then analyzes information on a topic.
pub struct PlaceholderResearch {
    latency: Duration,
}

impl PlaceholderResearch {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Capability for PlaceholderResearch {
    fn name(&self) -> &str {
        "placeholder-research"
    }

    async fn invoke(&self, request: &TaskRequest) -> Result<TaskOutput, CapabilityError> {
        require_text(self.name(), request)?;

        simulate(self.latency).await;
        let gathered = ResearchFinding {
            stage: ResearchStage::Information,
            timestamp: Utc::now(),
            insights: Vec::new(),
            data: serde_json::json!({}),
        };

        simulate(self.latency / 2).await;
        let analysed = ResearchFinding {
            stage: ResearchStage::Analysis,
            timestamp: Utc::now(),
            insights: Vec::new(),
            data: serde_json::Value::Null,
        };

        Ok(TaskOutput::Research(ResearchReport {
            topic: request.text.clone(),
            findings: vec![gathered, analysed],
        }))
    }
}

/// Static analysis plus an (empty) insight pass.
pub struct PlaceholderCodeAnalysis {
    latency: Duration,
}

impl PlaceholderCodeAnalysis {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Capability for PlaceholderCodeAnalysis {
    fn name(&self) -> &str {
        "placeholder-code-analysis"
    }

    async fn invoke(&self, request: &TaskRequest) -> Result<TaskOutput, CapabilityError> {
        let analysis = CodeAnalysis {
            complexity: Complexity {
                lines_of_code: request.text.split('\n').count(),
                ..Default::default()
            },
            ..Default::default()
        };
        simulate(self.latency).await;
        Ok(TaskOutput::CodeAnalysis(analysis))
    }
}

pub struct PlaceholderDocumentation {
    latency: Duration,
}

impl PlaceholderDocumentation {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Capability for PlaceholderDocumentation {
    fn name(&self) -> &str {
        "placeholder-documentation"
    }

    async fn invoke(&self, request: &TaskRequest) -> Result<TaskOutput, CapabilityError> {
        require_text(self.name(), request)?;
        simulate(self.latency).await;

        Ok(TaskOutput::Documentation(Documentation {
            summary: DocSummary {
                description: "Generated description".to_string(),
                purpose: "Function/class purpose".to_string(),
                usage: "How to use this code".to_string(),
            },
            params: Vec::new(),
            returns: ReturnDoc {
                type_name: "unknown".to_string(),
                description: "Return value description".to_string(),
            },
            examples: vec![Example {
                code: "// Example usage".to_string(),
                description: "How to use this code".to_string(),
            }],
        }))
    }
}

pub struct PlaceholderTestGeneration {
    latency: Duration,
}

impl PlaceholderTestGeneration {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Capability for PlaceholderTestGeneration {
    fn name(&self) -> &str {
        "placeholder-test-generation"
    }

    async fn invoke(&self, request: &TaskRequest) -> Result<TaskOutput, CapabilityError> {
        require_text(self.name(), request)?;
        simulate(self.latency).await;

        Ok(TaskOutput::TestGeneration(TestSuite {
            unit_tests: vec![UnitTest {
                name: "Test basic functionality".to_string(),
                code: "// Generated test code".to_string(),
                assertions: Vec::new(),
            }],
            integration_tests: vec![IntegrationTest {
                name: "Test component integration".to_string(),
                code: "// Generated integration test".to_string(),
                setup: Vec::new(),
                teardown: Vec::new(),
            }],
            test_cases: vec![TestCase {
                description: "Test case description".to_string(),
                input: "test input".to_string(),
                expected_output: "expected output".to_string(),
                conditions: Vec::new(),
            }],
            coverage: CoverageAnalysis::default(),
        }))
    }
}
