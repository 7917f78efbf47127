//! Height measurement capability injected by the host renderer.

use crate::model::Comment;

/// Renders a comment off-layout and reports its realized height
/// (content plus vertical margins).
///
/// The engine never measures anything itself. A return value of `0` is a
/// measurement failure and is rejected by
/// [`PlacementEngine::resolve_height`](super::PlacementEngine::resolve_height).
pub trait HeightOracle {
    /// Measure `comment` as it would be rendered right now.
    fn measure(&self, comment: &Comment) -> u16;
}

impl<F> HeightOracle for F
where
    F: Fn(&Comment) -> u16,
{
    fn measure(&self, comment: &Comment) -> u16 {
        self(comment)
    }
}
