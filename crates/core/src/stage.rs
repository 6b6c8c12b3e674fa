//! The fixed, ordered stages of a remix run and their progress checkpoints.

/// Checkpoint reported once the finalize stage has transcoded the output,
/// before the artifact is uploaded and the result recorded.
pub const CHECKPOINT_TRANSCODED: u8 = 85;

/// One step of the remix pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Analyze,
    Separate,
    Generate,
    Mix,
    Finalize,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Fetch,
        Stage::Analyze,
        Stage::Separate,
        Stage::Generate,
        Stage::Mix,
        Stage::Finalize,
    ];

    /// Progress value reported when this stage completes.
    ///
    /// Finalize completes at 100, which is written together with the
    /// `finished` status rather than as a plain progress update.
    pub fn checkpoint(self) -> u8 {
        match self {
            Self::Fetch => 15,
            Self::Analyze => 25,
            Self::Separate => 40,
            Self::Generate => 60,
            Self::Mix => 75,
            Self::Finalize => 100,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Analyze => "analyze",
            Self::Separate => "separate",
            Self::Generate => "generate",
            Self::Mix => "mix",
            Self::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
