//! Portfolio tool: grounded answers over the ingested summaries

use async_trait::async_trait;
use portfolio_core::Result as AgentResult;
use portfolio_llm::tools::schema;
use portfolio_rag::RagService;
use portfolio_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct QuestionParams {
    question: String,
}

/// Answer investment questions from previously ingested PDFs
///
/// Before any PDF has been ingested this returns the service's sentinel
/// message rather than an error, so the agent can relay it to the user.
pub struct AnswerInvestmentQuestionTool {
    service: Arc<RagService>,
}

impl AnswerInvestmentQuestionTool {
    /// Create the tool over a shared RAG service
    pub fn new(service: Arc<RagService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for AnswerInvestmentQuestionTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: QuestionParams = serde_json::from_value(params).map_err(|e| {
            portfolio_core::Error::ProcessingFailed(format!("Invalid parameters: {e}"))
        })?;

        let answer = self
            .service
            .answer(&params.question)
            .await
            .map_err(|e| portfolio_core::Error::ProcessingFailed(e.to_string()))?;
        Ok(Value::String(answer))
    }

    fn name(&self) -> &str {
        "answer_investment_question"
    }

    fn description(&self) -> &str {
        "Answers investment-related questions using previously summarized PDFs: purchase \
         history, portfolio composition and document commentary."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "question": schema::string("The portfolio question to answer"),
            }),
            vec!["question"],
        )
    }
}
