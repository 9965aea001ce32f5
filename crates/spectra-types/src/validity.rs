use serde::{Deserialize, Serialize};

/// Why a frame failed validation before the replay check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum InvalidReason {
    /// Every player slot reported dead.
    NoLivePlayers,
    /// The validation region is not a uniform UI element.
    CornerNotUniform { max_std_dev: f64 },
    /// The validation region is too dark to be the in-game HUD.
    CornerTooDark { mean: f64 },
}

/// Outcome of the per-frame validity pipeline.
///
/// A snapshot starts `Pending` and moves to exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FrameValidity {
    #[default]
    Pending,
    Valid,
    Invalid { reason: InvalidReason },
    Replay { similarity: f64 },
}

impl FrameValidity {
    pub fn invalid(reason: InvalidReason) -> Self {
        FrameValidity::Invalid { reason }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, FrameValidity::Valid)
    }

    pub fn is_replay(&self) -> bool {
        matches!(self, FrameValidity::Replay { .. })
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, FrameValidity::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FrameValidity::Pending => "pending",
            FrameValidity::Valid => "valid",
            FrameValidity::Invalid { .. } => "invalid",
            FrameValidity::Replay { .. } => "invalid-replay",
        }
    }
}
