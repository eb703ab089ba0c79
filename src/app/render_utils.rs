use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use super::viewport::Viewport;

const RISING: Color32 = Color32::from_rgb(76, 186, 116);
const FALLING: Color32 = Color32::from_rgb(226, 92, 86);
const NEUTRAL: Color32 = Color32::from_rgb(128, 138, 150);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Fill for a price-change ratio: above 1 rises, below 1 falls. Saturates at
/// a ±20% move.
pub(super) fn price_change_color(ratio: f64) -> Color32 {
    if !ratio.is_finite() {
        return NEUTRAL;
    }

    let delta = ratio - 1.0;
    let intensity = ((delta.abs() / 0.2) as f32).clamp(0.0, 1.0);
    if delta > f64::EPSILON {
        blend_color(NEUTRAL, RISING, 0.35 + intensity * 0.65)
    } else if delta < -f64::EPSILON {
        blend_color(NEUTRAL, FALLING, 0.35 + intensity * 0.65)
    } else {
        NEUTRAL
    }
}

/// Positive weights draw green, negative red; width grows with `|weight|`.
pub(super) fn edge_stroke(weight: f64, zoom: f32) -> Stroke {
    let magnitude = (weight.abs() as f32).clamp(0.0, 1.0);
    let base = if weight >= 0.0 { RISING } else { FALLING };
    let alpha = (110.0 + magnitude * 120.0) as u8;
    let color = Color32::from_rgba_unmultiplied(base.r(), base.g(), base.b(), alpha);
    let width = ((0.6 + magnitude * 3.4) * zoom.sqrt()).clamp(0.4, 6.0);
    Stroke::new(width, color)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, viewport: &Viewport) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * viewport.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + viewport.pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

/// Cheap bounding-box cull for a segment against the canvas.
pub(super) fn segment_near(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    bounds.intersects(rect)
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn price_change_picks_direction() {
        assert_eq!(price_change_color(1.0), NEUTRAL);
        assert_eq!(price_change_color(f64::NAN), NEUTRAL);

        let up = price_change_color(1.3);
        let down = price_change_color(0.7);
        assert!(up.g() > up.r());
        assert!(down.r() > down.g());
        assert_eq!(up, blend_color(NEUTRAL, RISING, 1.0));
    }

    #[test]
    fn edge_stroke_tracks_sign_and_magnitude() {
        let strong = edge_stroke(0.9, 1.0);
        let weak = edge_stroke(0.1, 1.0);
        let negative = edge_stroke(-0.9, 1.0);

        assert!(strong.width > weak.width);
        assert_eq!(strong.width, negative.width);
        assert!(strong.color.g() > strong.color.r());
        assert!(negative.color.r() > negative.color.g());
    }

    #[test]
    fn far_segments_are_culled() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(segment_near(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 1.0));
        assert!(!segment_near(rect, pos2(200.0, 200.0), pos2(300.0, 250.0), 1.0));
    }
}
