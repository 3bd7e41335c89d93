//! Stickers placed on the overlay surface, with pointer dragging.

use crate::raster::{OverlaySize, Point};

/// Nominal on-screen box of a placed sticker, in surface pixels.
pub const STICKER_BOX: f32 = 48.0;

pub type StickerId = u64;

/// A sticker on the overlay surface. Session memory only.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSticker {
    pub id: StickerId,
    pub glyph: String,
    /// Top-left offset within the overlay surface
    pub position: Point,
}

impl PlacedSticker {
    fn contains(&self, p: Point) -> bool {
        p.x >= self.position.x
            && p.x < self.position.x + STICKER_BOX
            && p.y >= self.position.y
            && p.y < self.position.y + STICKER_BOX
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    sticker: StickerId,
    pointer_origin: Point,
    start: Point,
}

/// The tracked list of placed stickers.
#[derive(Debug, Default)]
pub struct StickerBoard {
    stickers: Vec<PlacedSticker>,
    drag: Option<Drag>,
    next_id: StickerId,
}

impl StickerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stickers in stacking order, bottom first.
    pub fn stickers(&self) -> &[PlacedSticker] {
        &self.stickers
    }

    pub fn get(&self, id: StickerId) -> Option<&PlacedSticker> {
        self.stickers.iter().find(|s| s.id == id)
    }

    /// Place `glyph` centered on the surface.
    pub fn add(&mut self, glyph: &str, surface: OverlaySize) -> StickerId {
        self.next_id += 1;
        let id = self.next_id;
        self.stickers.push(PlacedSticker {
            id,
            glyph: glyph.to_string(),
            position: Point {
                x: surface.width / 2.0 - STICKER_BOX / 2.0,
                y: surface.height / 2.0 - STICKER_BOX / 2.0,
            },
        });
        id
    }

    /// The top-most sticker under `p`.
    pub fn sticker_at(&self, p: Point) -> Option<StickerId> {
        self.stickers.iter().rev().find(|s| s.contains(p)).map(|s| s.id)
    }

    /// Pointer-down on a sticker: remember where the pointer and sticker
    /// started. Returns false for an unknown id.
    pub fn begin_drag(&mut self, id: StickerId, pointer: Point) -> bool {
        let Some(sticker) = self.get(id) else {
            return false;
        };
        self.drag = Some(Drag {
            sticker: id,
            pointer_origin: pointer,
            start: sticker.position,
        });
        true
    }

    /// Pointer-move: follow the pointer delta. No clamping; stickers may
    /// leave the surface. Returns false when no drag is active.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let Some(sticker) = self.stickers.iter_mut().find(|s| s.id == drag.sticker) else {
            self.drag = None;
            return false;
        };
        sticker.position = Point {
            x: drag.start.x + (pointer.x - drag.pointer_origin.x),
            y: drag.start.y + (pointer.y - drag.pointer_origin.y),
        };
        true
    }

    /// Pointer-up.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Double activation removes the sticker.
    pub fn remove(&mut self, id: StickerId) -> bool {
        let before = self.stickers.len();
        self.stickers.retain(|s| s.id != id);
        if self.drag.is_some_and(|d| d.sticker == id) {
            self.drag = None;
        }
        self.stickers.len() != before
    }

    pub fn clear(&mut self) {
        self.stickers.clear();
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: OverlaySize = OverlaySize {
        width: 640.0,
        height: 480.0,
    };

    #[test]
    fn test_add_centers_sticker() {
        let mut board = StickerBoard::new();
        let id = board.add("🎈", SURFACE);
        let s = board.get(id).unwrap();
        assert_eq!(s.position, Point::new(296.0, 216.0));
        assert_eq!(s.glyph, "🎈");
    }

    #[test]
    fn test_drag_moves_by_pointer_delta_without_clamping() {
        let mut board = StickerBoard::new();
        let id = board.add("⭐", SURFACE);
        assert!(board.begin_drag(id, Point::new(300.0, 220.0)));
        assert!(board.drag_to(Point::new(310.0, 200.0)));
        assert_eq!(board.get(id).unwrap().position, Point::new(306.0, 196.0));

        assert!(board.drag_to(Point::new(-1000.0, 220.0)));
        assert_eq!(board.get(id).unwrap().position, Point::new(-1004.0, 216.0));

        board.end_drag();
        assert!(!board.drag_to(Point::new(0.0, 0.0)));
        assert_eq!(board.get(id).unwrap().position, Point::new(-1004.0, 216.0));
    }

    #[test]
    fn test_sticker_at_prefers_top_most() {
        let mut board = StickerBoard::new();
        let bottom = board.add("a", SURFACE);
        let top = board.add("b", SURFACE);
        assert_eq!(board.sticker_at(Point::new(320.0, 240.0)), Some(top));
        board.remove(top);
        assert_eq!(board.sticker_at(Point::new(320.0, 240.0)), Some(bottom));
        assert_eq!(board.sticker_at(Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_remove_during_drag_ends_drag() {
        let mut board = StickerBoard::new();
        let id = board.add("a", SURFACE);
        board.begin_drag(id, Point::new(0.0, 0.0));
        assert!(board.remove(id));
        assert!(!board.is_dragging());
        assert!(!board.remove(id));
    }

    #[test]
    fn test_begin_drag_unknown_id() {
        let mut board = StickerBoard::new();
        assert!(!board.begin_drag(42, Point::default()));
    }

    #[test]
    fn test_clear() {
        let mut board = StickerBoard::new();
        board.add("a", SURFACE);
        board.add("b", SURFACE);
        board.clear();
        assert!(board.stickers().is_empty());
    }
}
