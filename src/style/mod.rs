//! Style-side seams of the frame pipeline

pub mod catalog;
pub mod raster;

use crate::traits::AnnotationManager;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal [`AnnotationManager`]: a revision counter the owner bumps on edits
#[derive(Debug, Default)]
pub struct AnnotationRevision {
    revision: AtomicU64,
}

impl AnnotationRevision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an annotation change and return the new revision
    pub fn bump(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl AnnotationManager for AnnotationRevision {
    fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }
}
