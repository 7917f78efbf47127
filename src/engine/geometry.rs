//! Container geometry supplied by the host per call.

/// Size and position of the surface comments are laid out on.
///
/// Passed into every placement and projection call instead of being stored,
/// so the engine never depends on a particular UI tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerGeometry {
    /// Height of the container. Zero means the container is not laid out yet.
    pub height: u16,
    /// Offset of the container's content from the top of the screen.
    pub content_offset: u16,
}

impl ContainerGeometry {
    /// Create geometry from height and content offset.
    pub fn new(height: u16, content_offset: u16) -> Self {
        Self {
            height,
            content_offset,
        }
    }

    /// Whether placement math is meaningful (non-zero height).
    pub fn is_ready(&self) -> bool {
        self.height > 0
    }
}
