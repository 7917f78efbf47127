//! Layout projector: engine state → renderable set.
//!
//! Pure function of the engine state and the container geometry. The staged
//! comment (if any) is surfaced separately as a hint the host must render
//! off-layout to measure; placed comments get absolute screen offsets.

use crate::engine::{ContainerGeometry, LayerIndex, PlacementEngine};
use crate::model::Comment;
use thiserror::Error;

/// A placed comment positioned on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedComment {
    /// The comment to draw.
    pub comment: Comment,
    /// Lane it lives in.
    pub layer: LayerIndex,
    /// `top + content_offset`.
    pub absolute_top: u32,
    /// Measured height.
    pub height: u16,
}

/// Everything the host needs for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    /// Staged comment to render invisibly and measure.
    pub pending: Option<Comment>,
    /// Placed comments, grouped by lane then ascending `top`.
    pub placements: Vec<ProjectedComment>,
}

/// Projection was requested before the container had a height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// Container height is zero.
    #[error("container is not ready (zero height)")]
    ContainerNotReady,
}

/// Derive the renderable set from `engine` for a container of `geometry`.
///
/// # Errors
///
/// Returns [`ProjectionError::ContainerNotReady`] if `geometry.height` is 0.
pub fn project(
    engine: &PlacementEngine,
    geometry: ContainerGeometry,
) -> Result<Projection, ProjectionError> {
    if !geometry.is_ready() {
        return Err(ProjectionError::ContainerNotReady);
    }

    let offset = u32::from(geometry.content_offset);
    let placements = LayerIndex::ALL
        .into_iter()
        .flat_map(|layer| {
            engine
                .layer(layer)
                .entries()
                .map(move |entry| ProjectedComment {
                    comment: entry.comment().clone(),
                    layer,
                    absolute_top: u32::from(entry.top()) + offset,
                    height: entry.height(),
                })
        })
        .collect();

    Ok(Projection {
        pending: engine.staged().cloned(),
        placements,
    })
}
