//! Overlay wiring: ingestion → bus → engine → height oracle.
//!
//! `Overlay` is the pure core of one overlay surface. It assigns identities
//! at the ingestion boundary, publishes on the comment bus (to which its
//! placement engine is subscribed), and drives the measure-then-commit
//! protocol through an injected [`HeightOracle`]. Nothing here touches a
//! terminal, so it is testable without I/O.

use crate::bus::{CommentBus, SubscriptionId};
use crate::engine::{
    ContainerGeometry, EngineStats, HeightOracle, PlacementEngine, PlacementError,
    PlacementReport,
};
use crate::model::{Comment, CommentIdGenerator, RawComment};
use crate::projector::{self, Projection, ProjectionError};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::trace;

/// One overlay surface: a bus, the engine subscribed to it, and the oracle
/// that measures staged comments.
pub struct Overlay<O> {
    bus: CommentBus,
    engine: Rc<RefCell<PlacementEngine>>,
    subscription: SubscriptionId,
    ids: CommentIdGenerator,
    oracle: O,
    geometry: ContainerGeometry,
}

impl<O: HeightOracle> Overlay<O> {
    /// Create an overlay whose engine listens on a fresh bus.
    pub fn new(oracle: O, geometry: ContainerGeometry) -> Self {
        let bus = CommentBus::new();
        let engine = Rc::new(RefCell::new(PlacementEngine::new()));
        let subscription = {
            let engine = Rc::clone(&engine);
            bus.subscribe(move |comment: &Comment| {
                // Collisions are logged and counted by the engine itself.
                let _ = engine.borrow_mut().offer(comment.clone());
            })
        };

        Self {
            bus,
            engine,
            subscription,
            ids: CommentIdGenerator::default(),
            oracle,
            geometry,
        }
    }

    /// Assign an identity to `raw` and publish it to every subscriber.
    ///
    /// The engine stages it; call [`Overlay::settle`] to measure and place.
    pub fn publish(&mut self, raw: RawComment) -> Comment {
        let comment = Comment::from_raw(self.ids.next_id(), raw);
        let delivered = self.bus.publish(&comment);
        trace!(id = %comment.id(), delivered, "published comment");
        comment
    }

    /// Measure the staged comment, if any, and hand its height back.
    ///
    /// Returns `None` when nothing is staged.
    pub fn settle(&mut self) -> Option<Result<PlacementReport, PlacementError>> {
        let pending = self.engine.borrow().staged().cloned()?;
        let height = self.oracle.measure(&pending);
        Some(
            self.engine
                .borrow_mut()
                .resolve_height(height, self.geometry),
        )
    }

    /// Publish then settle: the full path of one inbound comment.
    pub fn deliver(&mut self, raw: RawComment) -> Result<PlacementReport, PlacementError> {
        self.publish(raw);
        self.settle().unwrap_or(Err(PlacementError::NothingStaged))
    }

    /// Renderable set for the current geometry.
    ///
    /// # Errors
    ///
    /// Fails while the container has no height.
    pub fn projection(&self) -> Result<Projection, ProjectionError> {
        projector::project(&self.engine.borrow(), self.geometry)
    }

    /// Update container geometry (e.g. after a resize).
    pub fn set_geometry(&mut self, geometry: ContainerGeometry) {
        self.geometry = geometry;
    }

    /// Current container geometry.
    pub fn geometry(&self) -> ContainerGeometry {
        self.geometry
    }

    /// The measuring oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Mutable access to the oracle (e.g. to change wrap width).
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// The bus comments are published on. Extra listeners may subscribe.
    pub fn bus(&self) -> &CommentBus {
        &self.bus
    }

    /// Borrow the engine state.
    pub fn engine(&self) -> Ref<'_, PlacementEngine> {
        self.engine.borrow()
    }

    /// Engine totals.
    pub fn stats(&self) -> EngineStats {
        self.engine.borrow().stats()
    }

    /// Detach the engine from the bus; later publishes no longer stage.
    pub fn detach(&mut self) -> bool {
        self.bus.unsubscribe(self.subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LayerIndex, Phase};
    use crate::model::CommentElement;
    use std::cell::Cell;

    fn raw(text: &str) -> RawComment {
        RawComment::new(vec![CommentElement::text(text)])
    }

    /// Oracle measuring one row per character.
    fn by_length(comment: &Comment) -> u16 {
        comment
            .elements()
            .iter()
            .map(|e| match e {
                CommentElement::Text { content } => content.chars().count() as u16,
                CommentElement::Emoji { .. } => 1,
                CommentElement::Unknown => 0,
            })
            .sum()
    }

    fn overlay(height: u16) -> Overlay<fn(&Comment) -> u16> {
        Overlay::new(by_length as fn(&Comment) -> u16, ContainerGeometry::new(height, 0))
    }

    #[test]
    fn deliver_places_comment_with_fresh_id() {
        let mut overlay = overlay(100);
        let first = overlay.deliver(raw("abcd")).unwrap();
        let second = overlay.deliver(raw("xy")).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!((first.top, first.height), (0, 4));
        assert_eq!((second.top, second.height), (4, 2));
        assert_eq!(overlay.engine().phase(), Phase::Idle);
    }

    #[test]
    fn publish_without_settle_leaves_comment_staged() {
        let mut overlay = overlay(100);
        let comment = overlay.publish(raw("wait"));
        assert_eq!(overlay.engine().staged(), Some(&comment));

        let projection = overlay.projection().unwrap();
        assert_eq!(projection.pending, Some(comment));
    }

    #[test]
    fn second_publish_before_settle_collides() {
        let mut overlay = overlay(100);
        overlay.publish(raw("first"));
        overlay.publish(raw("second"));
        assert_eq!(overlay.stats().collisions, 1);

        let report = overlay.settle().unwrap().unwrap();
        assert_eq!(report.height, 6, "\"second\" is what got measured");
    }

    #[test]
    fn empty_comment_is_dropped_as_degenerate() {
        let mut overlay = overlay(100);
        let result = overlay.deliver(RawComment::new(vec![]));
        assert!(matches!(
            result,
            Err(PlacementError::DegenerateMeasurement { .. })
        ));
        assert_eq!(overlay.engine().placed_count(), 0);
    }

    #[test]
    fn not_ready_container_defers_until_geometry_arrives() {
        let mut overlay = overlay(0);
        assert!(matches!(
            overlay.deliver(raw("abc")),
            Err(PlacementError::ContainerNotReady { .. })
        ));
        assert!(overlay.projection().is_err());

        overlay.set_geometry(ContainerGeometry::new(10, 0));
        let report = overlay.settle().unwrap().unwrap();
        assert_eq!(report.layer, LayerIndex::First);
    }

    #[test]
    fn settle_with_nothing_staged_is_none() {
        let mut overlay = overlay(10);
        assert!(overlay.settle().is_none());
    }

    #[test]
    fn extra_subscribers_see_every_comment() {
        let mut overlay = overlay(10);
        let seen = Rc::new(Cell::new(0));
        {
            let seen = Rc::clone(&seen);
            overlay.bus().subscribe(move |_| seen.set(seen.get() + 1));
        }
        overlay.deliver(raw("a")).unwrap();
        overlay.deliver(raw("b")).unwrap();
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn detached_engine_stops_staging() {
        let mut overlay = overlay(10);
        assert!(overlay.detach());
        assert!(matches!(
            overlay.deliver(raw("lost")),
            Err(PlacementError::NothingStaged)
        ));
    }
}
