//! Collects per-item outcomes into the outward-facing response envelope

use crate::types::{Business, ItemOutcome};
use serde::{Deserialize, Serialize};

/// Successful search envelope: `{ "businesses": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub businesses: Vec<Business>,
    /// Number of upstream places that could not be mapped
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dropped: usize,
}

fn is_zero(count: &usize) -> bool {
    *count == 0
}

impl SearchResponse {
    /// Keep mapped records in upstream order and count the rest
    pub fn assemble(provider: &str, outcomes: Vec<ItemOutcome>) -> Self {
        let mut businesses = Vec::with_capacity(outcomes.len());
        let mut dropped = 0;

        for outcome in outcomes {
            match outcome {
                ItemOutcome::Mapped(business) => businesses.push(business),
                ItemOutcome::Dropped { id, reason } => {
                    dropped += 1;
                    log::warn!(
                        "{provider}: dropped place {}: {reason}",
                        id.as_deref().unwrap_or("<no id>")
                    );
                }
            }
        }

        Self {
            businesses,
            dropped,
        }
    }
}
