//! Domain guardrail: keep the assistant on customer-support topics.

use crate::rag::completion::PromptRunner;
use helpdesk_core::AppResult;
use helpdesk_prompt::defaults::{DOMAIN_PROMPT_ID, NOT_FOUND_SENTENCE};
use serde::{Deserialize, Serialize};

/// Label the model must reply with to reject a query.
const OUT_OF_DOMAIN_LABEL: &str = "out-of-domain";

/// Answer returned verbatim for out-of-domain queries.
pub fn refusal_answer() -> String {
    format!(
        "{} This assistant only answers topics related to billing, internet, TV service, \
mobility, device support, and technical troubleshooting.",
        NOT_FOUND_SENTENCE
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainVerdict {
    InDomain,
    OutOfDomain,
}

/// Fail-open reading of the classifier reply.
///
/// Only an exact (trimmed, case-folded) "out-of-domain" rejects the query.
/// Empty, malformed or chatty replies let it through: a wrongly answered
/// off-topic question costs less than refusing a real customer.
pub fn parse_verdict(reply: &str) -> DomainVerdict {
    if reply.trim().to_lowercase() == OUT_OF_DOMAIN_LABEL {
        DomainVerdict::OutOfDomain
    } else {
        DomainVerdict::InDomain
    }
}

/// Classifies queries as in or out of the support domain.
#[derive(Clone)]
pub struct DomainGate {
    runner: PromptRunner,
}

impl DomainGate {
    pub fn new(runner: PromptRunner) -> Self {
        Self { runner }
    }

    /// One completion call; a service failure propagates.
    pub async fn classify(&self, query: &str) -> AppResult<DomainVerdict> {
        let reply = self
            .runner
            .complete(DOMAIN_PROMPT_ID, &[("query", query)], Vec::new())
            .await?;
        let verdict = parse_verdict(&reply);

        if verdict == DomainVerdict::InDomain && reply.trim().to_lowercase() != "in-domain" {
            tracing::warn!(reply = %reply.trim(), "Unexpected domain verdict, treating as in-domain");
        }

        Ok(verdict)
    }
}
