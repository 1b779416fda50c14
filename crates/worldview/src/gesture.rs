//! Pointer gesture recognition: one finger rotates, two fingers zoom, a
//! still single finger taps.

use foundation::math::Vec2;

/// Identifies one contact (finger or mouse button) for its whole lifetime.
pub type PointerId = u64;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    Down { id: PointerId, position: Vec2 },
    Move { id: PointerId, position: Vec2 },
    Up { id: PointerId, position: Vec2 },
    /// The host lost the pointer stream; forget every contact.
    Cancel,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    SingleDrag,
    PinchZoom,
    /// One finger left a pinch; the next move only re-reads the anchor.
    PostPinchSettle,
}

/// What the view should do in response to one pointer event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GestureAction {
    None,
    /// Pointer travel since the previous reading, `anchor - current`, in pixels.
    Rotate(Vec2),
    /// Multiply the zoom scale by this ratio of previous to current finger distance.
    Zoom(f64),
    /// A tap at this screen position (top-left origin).
    Tap(Vec2),
}

#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    state: GestureState,
    contacts: Vec<(PointerId, Vec2)>,
    anchor: Vec2,
    down_position: Vec2,
    last_distance: f64,
    moved: bool,
    tap_slop: f64,
}

impl GestureTracker {
    pub fn new(tap_slop: f64) -> Self {
        Self {
            tap_slop: tap_slop.max(0.0),
            ..Self::default()
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn movement_detected(&self) -> bool {
        self.moved
    }

    pub fn handle(&mut self, event: PointerEvent) -> GestureAction {
        match event {
            PointerEvent::Down { id, position } => self.on_down(id, position),
            PointerEvent::Move { id, position } => self.on_move(id, position),
            PointerEvent::Up { id, .. } => self.on_up(id),
            PointerEvent::Cancel => {
                self.contacts.clear();
                self.state = GestureState::Idle;
                self.moved = false;
                GestureAction::None
            }
        }
    }

    fn on_down(&mut self, id: PointerId, position: Vec2) -> GestureAction {
        self.contacts.retain(|(cid, _)| *cid != id);
        self.contacts.push((id, position));

        if self.contacts.len() == 1 {
            self.state = GestureState::SingleDrag;
            self.anchor = position;
            self.down_position = position;
            self.moved = false;
        } else {
            self.state = GestureState::PinchZoom;
            self.last_distance = self.pinch_distance();
            self.moved = true;
        }
        GestureAction::None
    }

    fn on_move(&mut self, id: PointerId, position: Vec2) -> GestureAction {
        let Some(slot) = self.contacts.iter_mut().find(|(cid, _)| *cid == id) else {
            return GestureAction::None;
        };
        slot.1 = position;

        match self.state {
            GestureState::Idle => GestureAction::None,
            GestureState::PostPinchSettle => {
                self.anchor = position;
                self.state = GestureState::SingleDrag;
                GestureAction::None
            }
            GestureState::SingleDrag => {
                if !self.moved && position.distance(self.down_position) > self.tap_slop {
                    self.moved = true;
                }
                let delta = self.anchor - position;
                self.anchor = position;
                if self.moved {
                    GestureAction::Rotate(delta)
                } else {
                    GestureAction::None
                }
            }
            GestureState::PinchZoom => {
                self.anchor = self.contacts[0].1;
                let d = self.pinch_distance();
                let prev = self.last_distance;
                self.last_distance = d;
                if prev > 0.0 && d > 0.0 {
                    GestureAction::Zoom(prev / d)
                } else {
                    GestureAction::None
                }
            }
        }
    }

    fn on_up(&mut self, id: PointerId) -> GestureAction {
        let before = self.contacts.len();
        self.contacts.retain(|(cid, _)| *cid != id);
        if self.contacts.len() == before && before > 0 {
            return GestureAction::None;
        }

        match self.contacts.len() {
            0 => {
                let tap = self.state == GestureState::SingleDrag && !self.moved;
                self.state = GestureState::Idle;
                self.moved = false;
                if tap {
                    GestureAction::Tap(self.down_position)
                } else {
                    GestureAction::None
                }
            }
            1 => {
                if self.state == GestureState::PinchZoom {
                    self.state = GestureState::PostPinchSettle;
                }
                self.anchor = self.contacts[0].1;
                GestureAction::None
            }
            _ => {
                self.last_distance = self.pinch_distance();
                GestureAction::None
            }
        }
    }

    fn pinch_distance(&self) -> f64 {
        match self.contacts.as_slice() {
            [(_, a), (_, b), ..] => a.distance(*b),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GestureAction, GestureState, GestureTracker, PointerEvent};
    use foundation::math::Vec2;

    fn down(id: u64, x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            id,
            position: Vec2::new(x, y),
        }
    }

    fn mv(id: u64, x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            id,
            position: Vec2::new(x, y),
        }
    }

    fn up(id: u64, x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            id,
            position: Vec2::new(x, y),
        }
    }

    #[test]
    fn still_finger_is_a_tap() {
        let mut g = GestureTracker::new(0.0);
        assert_eq!(g.handle(down(1, 40.0, 60.0)), GestureAction::None);
        assert_eq!(g.state(), GestureState::SingleDrag);
        assert_eq!(
            g.handle(up(1, 40.0, 60.0)),
            GestureAction::Tap(Vec2::new(40.0, 60.0))
        );
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn drag_rotates_and_suppresses_the_tap() {
        let mut g = GestureTracker::new(0.0);
        g.handle(down(1, 100.0, 100.0));
        assert_eq!(
            g.handle(mv(1, 90.0, 105.0)),
            GestureAction::Rotate(Vec2::new(10.0, -5.0))
        );
        assert_eq!(
            g.handle(mv(1, 80.0, 105.0)),
            GestureAction::Rotate(Vec2::new(10.0, 0.0))
        );
        assert_eq!(g.handle(up(1, 80.0, 105.0)), GestureAction::None);
    }

    #[test]
    fn slop_absorbs_jitter() {
        let mut g = GestureTracker::new(4.0);
        g.handle(down(1, 100.0, 100.0));
        assert_eq!(g.handle(mv(1, 102.0, 101.0)), GestureAction::None);
        assert_eq!(
            g.handle(up(1, 102.0, 101.0)),
            GestureAction::Tap(Vec2::new(100.0, 100.0))
        );
    }

    #[test]
    fn two_fingers_zoom_then_settle_back_to_drag() {
        let mut g = GestureTracker::new(0.0);
        g.handle(down(1, 100.0, 100.0));
        g.handle(down(2, 200.0, 100.0));
        assert_eq!(g.state(), GestureState::PinchZoom);
        assert!(g.movement_detected());

        assert_eq!(g.handle(mv(2, 300.0, 100.0)), GestureAction::Zoom(0.5));
        assert_eq!(g.handle(mv(2, 200.0, 100.0)), GestureAction::Zoom(2.0));

        g.handle(up(2, 300.0, 100.0));
        assert_eq!(g.state(), GestureState::PostPinchSettle);

        // The first move after a pinch only re-reads the anchor.
        assert_eq!(g.handle(mv(1, 150.0, 100.0)), GestureAction::None);
        assert_eq!(g.state(), GestureState::SingleDrag);
        assert_eq!(
            g.handle(mv(1, 140.0, 100.0)),
            GestureAction::Rotate(Vec2::new(10.0, 0.0))
        );

        // Movement happened, so lifting the last finger is not a tap.
        assert_eq!(g.handle(up(1, 140.0, 100.0)), GestureAction::None);
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn cancel_forgets_everything() {
        let mut g = GestureTracker::new(0.0);
        g.handle(down(1, 0.0, 0.0));
        g.handle(down(2, 10.0, 0.0));
        assert_eq!(g.handle(PointerEvent::Cancel), GestureAction::None);
        assert_eq!(g.contact_count(), 0);
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn unknown_pointer_moves_are_ignored() {
        let mut g = GestureTracker::new(0.0);
        g.handle(down(1, 0.0, 0.0));
        assert_eq!(g.handle(mv(9, 50.0, 50.0)), GestureAction::None);
        assert!(!g.movement_detected());
    }
}
