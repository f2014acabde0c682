//! Choosing one image out of all candidates.
//!
//! The selector merges duplicate URLs, ranks what is left by score and walks
//! the ranking, asking a [`SizeValidator`] about each candidate that clears
//! the score floor. The first one it accepts wins.

use crate::candidate::ImageCandidate;
use crate::error::{LeadImageError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

/// Decides whether an image is large enough to use.
#[async_trait]
pub trait SizeValidator: Send + Sync {
    async fn is_acceptable_size(&self, url: &str) -> bool;
}

/// Result of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected(ImageCandidate),
    /// No extractor produced a candidate.
    NoCandidates,
    /// Candidates existed but none cleared the score floor and validation.
    Rejected { best_score: u8, considered: usize },
}

impl SelectionOutcome {
    pub fn selected(&self) -> Option<&ImageCandidate> {
        match self {
            SelectionOutcome::Selected(candidate) => Some(candidate),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<ImageCandidate> {
        match self {
            SelectionOutcome::Selected(candidate) => Ok(candidate),
            SelectionOutcome::NoCandidates => Err(LeadImageError::NoCandidate),
            SelectionOutcome::Rejected { best_score, .. } => {
                Err(LeadImageError::BelowThreshold { best_score })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageSelector {
    min_score: u8,
}

impl ImageSelector {
    pub fn new(min_score: u8) -> Self {
        Self { min_score }
    }

    /// Merge duplicate URLs, keeping the higher score at the position where the
    /// URL first appeared.
    pub fn merge(candidates: Vec<ImageCandidate>) -> Vec<ImageCandidate> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut merged: Vec<ImageCandidate> = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            match index.get(&candidate.url) {
                Some(&i) => {
                    if candidate.score > merged[i].score {
                        merged[i] = candidate;
                    }
                }
                None => {
                    index.insert(candidate.url.clone(), merged.len());
                    merged.push(candidate);
                }
            }
        }

        merged
    }

    pub async fn select(
        &self,
        candidates: Vec<ImageCandidate>,
        validator: &dyn SizeValidator,
    ) -> SelectionOutcome {
        let mut ranked = Self::merge(candidates);
        if ranked.is_empty() {
            info!("no candidate images found");
            return SelectionOutcome::NoCandidates;
        }

        // Stable: equal scores keep discovery order.
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        let best_score = ranked[0].score;
        let considered = ranked.len();

        for candidate in ranked {
            if candidate.score < self.min_score {
                break;
            }
            if validator.is_acceptable_size(&candidate.url).await {
                info!(
                    url = %candidate.url,
                    score = candidate.score,
                    source = %candidate.source,
                    "selected image"
                );
                return SelectionOutcome::Selected(candidate);
            }
            debug!(url = %candidate.url, "candidate failed size validation");
        }

        info!(
            best_score,
            considered,
            min_score = self.min_score,
            "no candidate cleared the score floor and validation"
        );
        SelectionOutcome::Rejected {
            best_score,
            considered,
        }
    }
}
