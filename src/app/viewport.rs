use eframe::egui::{Pos2, Rect, Vec2};

pub(in crate::app) const MIN_ZOOM: f32 = 0.1;
pub(in crate::app) const MAX_ZOOM: f32 = 8.0;

/// Translate + uniform scale applied to the whole scene. World origin maps to
/// the canvas center when `pan` is zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Viewport {
    pub(in crate::app) pan: Vec2,
    pub(in crate::app) zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub(in crate::app) fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub(in crate::app) fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Scales around `pointer` so the world point under it stays put.
    pub(in crate::app) fn zoom_at(&mut self, rect: Rect, pointer: Pos2, scroll: f32) {
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let world_before = self.screen_to_world(rect, pointer);
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    #[test]
    fn origin_maps_to_canvas_center() {
        let viewport = Viewport::default();
        assert_eq!(viewport.world_to_screen(canvas(), Vec2::ZERO), pos2(400.0, 300.0));
    }

    #[test]
    fn screen_and_world_round_trip() {
        let viewport = Viewport {
            pan: vec2(35.0, -12.0),
            zoom: 2.5,
        };
        let world = vec2(-40.0, 17.5);
        let screen = viewport.world_to_screen(canvas(), world);
        assert!((viewport.screen_to_world(canvas(), screen) - world).length() < 1e-4);
    }

    #[test]
    fn zoom_keeps_pointer_anchor_and_clamps() {
        let mut viewport = Viewport::default();
        let pointer = pos2(620.0, 140.0);
        let anchored = viewport.screen_to_world(canvas(), pointer);

        viewport.zoom_at(canvas(), pointer, 120.0);
        assert!(viewport.zoom > 1.0);
        assert!((viewport.screen_to_world(canvas(), pointer) - anchored).length() < 1e-3);

        for _ in 0..500 {
            viewport.zoom_at(canvas(), pointer, 10_000.0);
        }
        assert_eq!(viewport.zoom, MAX_ZOOM);
        for _ in 0..500 {
            viewport.zoom_at(canvas(), pointer, -10_000.0);
        }
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn pan_shifts_the_projection_only() {
        let mut viewport = Viewport::default();
        viewport.pan_by(vec2(10.0, 20.0));
        assert_eq!(viewport.world_to_screen(canvas(), Vec2::ZERO), pos2(410.0, 320.0));

        viewport.reset();
        assert_eq!(viewport, Viewport::default());
    }
}
