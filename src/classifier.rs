// 🏷️ Eligibility Classifier - Rules as Data
// Maps a player's fact record to a keeper round and a reason code

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{KeeperError, Result};
use crate::linker::EligibilityFacts;

// ============================================================================
// KEEPER ROUND
// ============================================================================

/// Round at which a player may be kept.
///
/// Variant order matters: every `Round` sorts before `Ineligible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeeperRound {
    Round(u8),
    Ineligible,
}

impl KeeperRound {
    pub fn is_eligible(&self) -> bool {
        matches!(self, KeeperRound::Round(_))
    }

    pub fn round(&self) -> Option<u8> {
        match self {
            KeeperRound::Round(r) => Some(*r),
            KeeperRound::Ineligible => None,
        }
    }
}

impl fmt::Display for KeeperRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeeperRound::Round(r) => write!(f, "{}", r),
            KeeperRound::Ineligible => f.write_str("n/a"),
        }
    }
}

// ============================================================================
// REASON CODES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    /// Kept three seasons running without a drop
    ThreeYearLock,
    UndraftedDropped,
    Undrafted,
    /// Dropped, but the history needs a human to confirm the round
    DroppedNeedsReview,
    Dropped,
    /// Plain carry-forward of last season's draft round
    Drafted,
    Kept,
    KeptRoundOne,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::ThreeYearLock => "kept 3 years non-D",
            Reason::UndraftedDropped => "undrafted/dropped",
            Reason::Undrafted => "undrafted",
            Reason::DroppedNeedsReview => "dropped, flagged for manual review",
            Reason::Dropped => "dropped",
            Reason::Drafted => "",
            Reason::Kept => "kept",
            Reason::KeptRoundOne => "kept round 1",
        }
    }

    pub fn needs_review(&self) -> bool {
        matches!(self, Reason::DroppedNeedsReview)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a single classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub round: KeeperRound,
    pub reason: Reason,
}

impl Classification {
    fn new(round: KeeperRound, reason: Reason) -> Self {
        Classification { round, reason }
    }
}

// ============================================================================
// RULE TABLE
// ============================================================================

/// League constants for the keeper rules.
///
/// The decision order is fixed; only these numbers vary between rule-table
/// versions. A kept player always moves up exactly one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleTable {
    /// Label recorded in the run manifest
    pub version: String,

    /// Last round of the draft
    pub max_round: u8,

    /// Round for a rostered player nobody drafted
    pub undrafted_round: u8,

    /// Round for an undrafted player who was also dropped
    pub undrafted_dropped_round: u8,

    /// Rounds added when a drafted player was dropped
    pub drop_penalty: u8,
}

impl Default for RuleTable {
    fn default() -> Self {
        RuleTable {
            version: "2023".to_string(),
            max_round: 16,
            undrafted_round: 9,
            undrafted_dropped_round: 11,
            drop_penalty: 2,
        }
    }
}

impl RuleTable {
    /// Every fixed round the table hands out must be a real draft round.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> Result<()> { Err(KeeperError::InvalidRuleTable { message }) };

        if self.max_round == 0 {
            return invalid("max_round must be at least 1".to_string());
        }
        for (field, round) in [
            ("undrafted_round", self.undrafted_round),
            ("undrafted_dropped_round", self.undrafted_dropped_round),
        ] {
            if round == 0 || round > self.max_round {
                return invalid(format!(
                    "{} is {}, must be between 1 and max_round ({})",
                    field, round, self.max_round
                ));
            }
        }

        Ok(())
    }

    /// Apply the keeper rules. First matching rule wins.
    pub fn classify(&self, facts: &EligibilityFacts) -> Classification {
        let kept1 = facts.kept[0];
        let dropped1 = facts.dropped[0];
        let defense = facts.is_defense();
        let streak = facts.kept_every_season() && !facts.dropped_before_latest() && !defense;

        // Rule 1: three-year lock (defenses may be kept indefinitely)
        if streak && !dropped1 {
            return Classification::new(KeeperRound::Ineligible, Reason::ThreeYearLock);
        }

        // Rule 2: undrafted
        let round = match facts.prior_draft_round {
            Some(round) => round,
            None if dropped1 => {
                return Classification::new(
                    KeeperRound::Round(self.undrafted_dropped_round),
                    Reason::UndraftedDropped,
                )
            }
            None => {
                return Classification::new(
                    KeeperRound::Round(self.undrafted_round),
                    Reason::Undrafted,
                )
            }
        };

        // Rule 3: dropped this cycle
        if dropped1 {
            let target = round.saturating_add(self.drop_penalty).min(self.max_round);
            // Would have been locked without this drop
            let reason = if streak || round == 1 {
                Reason::DroppedNeedsReview
            } else {
                Reason::Dropped
            };
            return Classification::new(KeeperRound::Round(target), reason);
        }

        // Rule 4: drafted, not kept
        if !kept1 {
            return Classification::new(KeeperRound::Round(round), Reason::Drafted);
        }

        // Rules 5 and 6: kept, move up a round unless already in the first
        if round > 1 {
            Classification::new(KeeperRound::Round(round - 1), Reason::Kept)
        } else {
            Classification::new(KeeperRound::Ineligible, Reason::KeptRoundOne)
        }
    }
}

/// Classify with the default league rules.
pub fn classify(facts: &EligibilityFacts) -> Classification {
    RuleTable::default().classify(facts)
}

// ============================================================================
// TESTS
// ============================================================================
