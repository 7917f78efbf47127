//! Layer placement engine.
//!
//! Owns two lanes of placed comments and a single staging slot, and runs the
//! measure → place → evict protocol:
//!
//! 1. [`PlacementEngine::offer`] stages a comment (`Idle` → `Staged`).
//! 2. The host renders the staged comment off-layout and measures it with a
//!    [`HeightOracle`].
//! 3. [`PlacementEngine::resolve_height`] places it into the appending lane,
//!    evicting the oldest entries of the other lane as needed
//!    (`Staged` → `Idle`).
//!
//! Every failure is recoverable: the engine always ends a call in a defined
//! state and reports what happened through its return value and a `warn!`.
//!
//! # Invariants
//! - At most one comment is staged.
//! - Every placement has `height >= 1`.
//! - Within a lane placements are sorted by `top` and never overlap.
//! - The appending lane grows from offset 0 without gaps, so a new placement's
//!   `top` equals the sum of the heights already resident in that lane.

pub mod geometry;
pub mod layer;
pub mod oracle;

pub use geometry::ContainerGeometry;
pub use layer::{Layer, LayerIndex, PlacedComment};
pub use oracle::HeightOracle;

use crate::model::{Comment, CommentId};
use thiserror::Error;
use tracing::{debug, warn};

/// Observable state of the measure/place protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing awaits measurement.
    Idle,
    /// One comment awaits `resolve_height`.
    Staged,
}

/// A comment arrived while another was still awaiting measurement.
///
/// The newer comment wins; the older one is lost.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("comment {} was still awaiting measurement when {incoming} arrived and has been dropped", .dropped.id())]
pub struct StagingCollision {
    /// The comment that was overwritten.
    pub dropped: Comment,
    /// Id of the comment now staged.
    pub incoming: CommentId,
}

/// Result of [`PlacementEngine::offer`].
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferOutcome {
    /// The slot was empty and now holds the comment.
    Staged,
    /// The slot was occupied; the previous comment was overwritten.
    Replaced(StagingCollision),
}

impl OfferOutcome {
    /// The collision, if one happened.
    pub fn collision(&self) -> Option<&StagingCollision> {
        match self {
            OfferOutcome::Staged => None,
            OfferOutcome::Replaced(collision) => Some(collision),
        }
    }
}

/// Why a staged comment was not placed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// `resolve_height` was called with nothing staged.
    #[error("no comment is staged for measurement")]
    NothingStaged,

    /// The measurement was zero. The comment has been dropped.
    #[error("comment {} measured {height} rows high and has been dropped", .dropped.id())]
    DegenerateMeasurement {
        /// The dropped comment.
        dropped: Comment,
        /// The rejected measurement.
        height: u16,
    },

    /// The container has no height yet. The comment stays staged.
    #[error("container is not ready; comment {id} stays staged")]
    ContainerNotReady {
        /// Id of the comment still staged.
        id: CommentId,
    },
}

/// What a successful placement did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    /// Id of the placed comment.
    pub id: CommentId,
    /// Lane it was placed into.
    pub layer: LayerIndex,
    /// Offset within the container.
    pub top: u16,
    /// Measured height.
    pub height: u16,
    /// Whether the appending lane switched for this placement.
    pub swapped: bool,
    /// Comments removed to make room, oldest first.
    pub evicted: Vec<Comment>,
}

/// Running totals, for status display and logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Comments placed.
    pub placed: u64,
    /// Comments evicted from a lane.
    pub evicted: u64,
    /// Appending-lane switches.
    pub swaps: u64,
    /// Staged comments lost to a newer offer.
    pub collisions: u64,
    /// Comments dropped for a zero measurement.
    pub degenerate: u64,
}

/// Two-lane placement and eviction engine for one overlay surface.
#[derive(Debug, Clone, Default)]
pub struct PlacementEngine {
    layers: [Layer; 2],
    appending: LayerIndex,
    staged: Option<Comment>,
    stats: EngineStats,
}

impl PlacementEngine {
    /// Empty engine: both lanes empty, lane 0 appending, nothing staged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `comment` for measurement.
    ///
    /// If a comment is already staged it is overwritten (last offer wins) and
    /// the collision is reported and logged.
    pub fn offer(&mut self, comment: Comment) -> OfferOutcome {
        let incoming = comment.id().clone();
        match self.staged.replace(comment) {
            None => {
                debug!(id = %incoming, "staged comment for measurement");
                OfferOutcome::Staged
            }
            Some(dropped) => {
                self.stats.collisions += 1;
                let collision = StagingCollision { dropped, incoming };
                warn!("{collision}");
                OfferOutcome::Replaced(collision)
            }
        }
    }

    /// Place the staged comment now that its `height` is known.
    ///
    /// # Errors
    ///
    /// - [`PlacementError::NothingStaged`] if nothing is staged.
    /// - [`PlacementError::ContainerNotReady`] if `container.height` is zero;
    ///   the comment stays staged for the next measurement.
    /// - [`PlacementError::DegenerateMeasurement`] if `height` is zero; the
    ///   comment is dropped and the engine returns to `Idle`.
    pub fn resolve_height(
        &mut self,
        height: u16,
        container: ContainerGeometry,
    ) -> Result<PlacementReport, PlacementError> {
        let Some(staged) = self.staged.as_ref() else {
            return Err(PlacementError::NothingStaged);
        };

        if !container.is_ready() {
            let err = PlacementError::ContainerNotReady {
                id: staged.id().clone(),
            };
            warn!("{err}");
            return Err(err);
        }

        let Some(comment) = self.staged.take() else {
            return Err(PlacementError::NothingStaged);
        };

        if height == 0 {
            self.stats.degenerate += 1;
            let err = PlacementError::DegenerateMeasurement {
                dropped: comment,
                height,
            };
            warn!("{err}");
            return Err(err);
        }

        Ok(self.place(comment, height, container.height))
    }

    fn place(&mut self, comment: Comment, height: u16, container_height: u16) -> PlacementReport {
        let mut target = self.appending;
        let mut used = self.layers[target.index()].used();

        // An empty lane cannot gain anything by switching.
        let swapped = !self.layers[target.index()].is_empty()
            && used + u32::from(height) > u32::from(container_height);

        let mut evicted = Vec::new();
        let old = if swapped {
            let previous = target;
            target = previous.other();
            self.appending = target;
            used = 0;
            // Whatever still drains in the new appending lane is older than
            // everything in the lane just filled.
            evicted.extend(self.layers[target.index()].clear());
            self.stats.swaps += 1;
            previous
        } else {
            target.other()
        };

        let count = self.layers[old.index()].eviction_count(used, height);
        evicted.extend(self.layers[old.index()].evict_front(count));

        // used <= container height here: either it fit, or it was reset to 0.
        let top = u16::try_from(used).unwrap_or(u16::MAX);
        let id = comment.id().clone();
        self.layers[target.index()].push(PlacedComment::new(comment, top, height));
        for layer in &mut self.layers {
            layer.normalize();
        }

        self.stats.placed += 1;
        self.stats.evicted += evicted.len() as u64;
        debug!(
            id = %id,
            layer = target.index(),
            top,
            height,
            swapped,
            evicted = evicted.len(),
            "placed comment"
        );

        PlacementReport {
            id,
            layer: target,
            top,
            height,
            swapped,
            evicted,
        }
    }

    /// Current protocol phase.
    pub fn phase(&self) -> Phase {
        if self.staged.is_some() {
            Phase::Staged
        } else {
            Phase::Idle
        }
    }

    /// The comment awaiting measurement, if any.
    pub fn staged(&self) -> Option<&Comment> {
        self.staged.as_ref()
    }

    /// Lane that receives the next placement.
    pub fn appending_layer(&self) -> LayerIndex {
        self.appending
    }

    /// Borrow one lane.
    pub fn layer(&self, index: LayerIndex) -> &Layer {
        &self.layers[index.index()]
    }

    /// Both lanes, indexed by [`LayerIndex::index`].
    pub fn layers(&self) -> &[Layer; 2] {
        &self.layers
    }

    /// Number of placed comments across both lanes.
    pub fn placed_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    /// Running totals since construction.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
