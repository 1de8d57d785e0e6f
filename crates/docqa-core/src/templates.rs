//! Question-answering prompt templates
//!
//! Five fixed templates, each with a `{context_str}` and a `{query_str}` slot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

const CONTEXT_SLOT: &str = "{context_str}";
const QUERY_SLOT: &str = "{query_str}";

const DEFAULT_QA_TEMPLATE: &str = "Use the provided context to answer the question and do not use any markdown formatting in your response. Be clear and comprehensive.

Context information is below:
---------------
{context_str}
---------------

Given the context information, answer the following question:
{query_str}

Answer:";

const PROFESSIONAL_QA_TEMPLATE: &str = "As an expert analyst, provide a detailed professional response based on the given context and do not use any markdown formatting in your response.

Context information:
---------------
{context_str}
---------------

Question:
{query_str}

Expert Analysis:";

const CONCISE_QA_TEMPLATE: &str = "Provide a brief, direct answer based on the following context and do not use any markdown formatting in your response.

Context:
---------------
{context_str}
---------------

Question:
{query_str}

Concise Answer:";

const STEP_BY_STEP_QA_TEMPLATE: &str = "Break down your answer into clear steps, using the provided context and do not use any markdown formatting in your response.

Context:
---------------
{context_str}
---------------

Question:
{query_str}

Step-by-step response:
1.";

const BANK_TELLER_TEMPLATE: &str = "Act as a helpful bank teller and your name is Genbot. Use the provided context to assist the customer with their banking query.
And please do not use any markdown formatting in your response. And also make it short and concise and if possible less than 50 words.

Context:
---------------
{context_str}
---------------

Customer Question:
{query_str}

Bank Teller Response:";

/// The registered QA templates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaTemplate {
    #[default]
    Default,
    Professional,
    Concise,
    StepByStep,
    BankTeller,
}

impl QaTemplate {
    /// All templates in registration order
    pub const ALL: [QaTemplate; 5] = [
        QaTemplate::Default,
        QaTemplate::Professional,
        QaTemplate::Concise,
        QaTemplate::StepByStep,
        QaTemplate::BankTeller,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QaTemplate::Default => "default",
            QaTemplate::Professional => "professional",
            QaTemplate::Concise => "concise",
            QaTemplate::StepByStep => "step_by_step",
            QaTemplate::BankTeller => "bank_teller",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(QaTemplate::name).collect()
    }

    /// Raw template text with its slots
    pub fn text(&self) -> &'static str {
        match self {
            QaTemplate::Default => DEFAULT_QA_TEMPLATE,
            QaTemplate::Professional => PROFESSIONAL_QA_TEMPLATE,
            QaTemplate::Concise => CONCISE_QA_TEMPLATE,
            QaTemplate::StepByStep => STEP_BY_STEP_QA_TEMPLATE,
            QaTemplate::BankTeller => BANK_TELLER_TEMPLATE,
        }
    }

    /// Fill both slots in one pass, so slot markers inside the context or the
    /// question are left as literal text.
    pub fn format(&self, context: &str, question: &str) -> String {
        let template = self.text();
        let mut rendered = String::with_capacity(template.len() + context.len() + question.len());
        let mut rest = template;

        loop {
            let next_context = rest.find(CONTEXT_SLOT);
            let next_query = rest.find(QUERY_SLOT);

            let (pos, slot, value) = match (next_context, next_query) {
                (Some(c), Some(q)) if c < q => (c, CONTEXT_SLOT, context),
                (Some(c), None) => (c, CONTEXT_SLOT, context),
                (_, Some(q)) => (q, QUERY_SLOT, question),
                (None, None) => break,
            };

            rendered.push_str(&rest[..pos]);
            rendered.push_str(value);
            rest = &rest[pos + slot.len()..];
        }

        rendered.push_str(rest);
        rendered
    }
}

impl FromStr for QaTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|template| template.name() == s)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Invalid template type. Choose from: {}",
                    Self::names().join(", ")
                ))
            })
    }
}

impl fmt::Display for QaTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
