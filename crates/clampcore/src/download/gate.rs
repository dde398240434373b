use std::path::{Path, PathBuf};

/// Verdict on a final artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Deliverable(PathBuf),
    TooLarge { size_bytes: u64, ceiling_bytes: u64 },
}

/// Final accept/reject against the hard ceiling. There is no retry after a
/// rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGate {
    ceiling_bytes: u64,
}

impl SizeGate {
    pub fn new(ceiling_bytes: u64) -> Self {
        Self { ceiling_bytes }
    }

    pub fn ceiling_bytes(&self) -> u64 {
        self.ceiling_bytes
    }

    pub fn gate(&self, path: &Path, size_bytes: u64) -> GateOutcome {
        if size_bytes <= self.ceiling_bytes {
            GateOutcome::Deliverable(path.to_path_buf())
        } else {
            GateOutcome::TooLarge {
                size_bytes,
                ceiling_bytes: self.ceiling_bytes,
            }
        }
    }
}
