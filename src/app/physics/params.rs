use std::ops::RangeInclusive;

pub(in crate::app) const CHARGE_RANGE: RangeInclusive<f32> = -1000.0..=0.0;
pub(in crate::app) const LINK_DISTANCE_RANGE: RangeInclusive<f32> = 10.0..=400.0;
pub(in crate::app) const LINK_STRENGTH_RANGE: RangeInclusive<f32> = 0.0..=5.0;
pub(in crate::app) const GRAVITY_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub(in crate::app) const ALPHA_DECAY_RANGE: RangeInclusive<f32> = 0.0..=0.1;

/// Live-tunable force parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SimParams {
    /// Many-body strength; more negative pushes vertices further apart.
    pub(crate) charge: f32,
    pub(crate) link_distance: f32,
    /// Scales `|weight|` before it is clamped into a link strength.
    pub(crate) link_strength_scale: f32,
    /// Pull toward the vertical midline (acts on x).
    pub(crate) gravity_x: f32,
    /// Pull toward the horizontal midline (acts on y).
    pub(crate) gravity_y: f32,
    pub(crate) alpha_decay: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            charge: -300.0,
            link_distance: 100.0,
            link_strength_scale: 1.0,
            gravity_x: 0.05,
            gravity_y: 0.05,
            // cools from 1 to alpha_min in ~300 steps
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
        }
    }
}

fn clamp_into(value: f32, range: &RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        return fallback;
    }
    value.clamp(*range.start(), *range.end())
}

impl SimParams {
    pub(crate) fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            charge: clamp_into(self.charge, &CHARGE_RANGE, defaults.charge),
            link_distance: clamp_into(
                self.link_distance,
                &LINK_DISTANCE_RANGE,
                defaults.link_distance,
            ),
            link_strength_scale: clamp_into(
                self.link_strength_scale,
                &LINK_STRENGTH_RANGE,
                defaults.link_strength_scale,
            ),
            gravity_x: clamp_into(self.gravity_x, &GRAVITY_RANGE, defaults.gravity_x),
            gravity_y: clamp_into(self.gravity_y, &GRAVITY_RANGE, defaults.gravity_y),
            alpha_decay: clamp_into(self.alpha_decay, &ALPHA_DECAY_RANGE, defaults.alpha_decay),
        }
    }

    /// Sets both axis pulls to one strength.
    pub(crate) fn set_gravity(&mut self, strength: f32) {
        self.gravity_x = strength;
        self.gravity_y = strength;
    }

    /// Strength of a single link; never exceeds 1 and ignores the weight's sign.
    pub(in crate::app) fn link_strength(self, weight: f64) -> f32 {
        link_strength(weight, self.link_strength_scale)
    }
}

pub(in crate::app) fn link_strength(weight: f64, scale: f32) -> f32 {
    let raw = weight.abs() as f32 * scale;
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}
