use std::ops::RangeInclusive;

use eframe::egui::{self, RichText, Ui};

use crate::market::SignFilter;

use super::super::ViewModel;
use super::super::physics::{
    ALPHA_DECAY_RANGE, CHARGE_RANGE, GRAVITY_RANGE, LINK_DISTANCE_RANGE, LINK_STRENGTH_RANGE,
    SimParams,
};

fn param_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    text: &str,
    hover: &str,
) -> bool {
    ui.add(
        egui::Slider::new(value, range)
            .text(text)
            .clamping(egui::SliderClamping::Always),
    )
    .on_hover_text(hover)
    .changed()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Simulation Controls");
        ui.separator();
        ui.add_space(4.0);

        let mut params = self.params;
        let mut changed = false;

        changed |= param_slider(
            ui,
            &mut params.charge,
            CHARGE_RANGE,
            "Repulsion",
            "Many-body strength; more negative pushes vertices further apart.",
        );
        changed |= param_slider(
            ui,
            &mut params.link_distance,
            LINK_DISTANCE_RANGE,
            "Link distance",
            "Rest length of every visible edge.",
        );
        changed |= param_slider(
            ui,
            &mut params.link_strength_scale,
            LINK_STRENGTH_RANGE,
            "Link strength",
            "Multiplies |weight| before it is clamped into a link strength of at most 1.",
        );
        let mut gravity = params.gravity_x.max(params.gravity_y);
        if param_slider(
            ui,
            &mut gravity,
            GRAVITY_RANGE,
            "Gravity",
            "Sets the pull toward both midlines at once.",
        ) {
            params.set_gravity(gravity);
            changed = true;
        }
        ui.collapsing("Per-axis gravity", |ui| {
            changed |= param_slider(
                ui,
                &mut params.gravity_x,
                GRAVITY_RANGE,
                "Gravity X",
                "Pull toward the vertical midline.",
            );
            changed |= param_slider(
                ui,
                &mut params.gravity_y,
                GRAVITY_RANGE,
                "Gravity Y",
                "Pull toward the horizontal midline.",
            );
        });
        changed |= ui
            .add(
                egui::Slider::new(&mut params.alpha_decay, ALPHA_DECAY_RANGE)
                    .text("Convergence rate")
                    .fixed_decimals(4)
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("How fast the layout cools; zero keeps it moving forever.")
            .changed();

        let mut scheduler = ui.ctx().clone();
        if changed {
            self.apply_params(params, &mut scheduler);
        }

        ui.separator();
        ui.label(RichText::new("Edge sign").strong());
        let mut filter = self.sign_filter;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut filter, SignFilter::Positive, "Positive")
                .on_hover_text("Show and attract along positive-weight edges only.");
            ui.selectable_value(&mut filter, SignFilter::Negative, "Negative")
                .on_hover_text("Show and attract along negative-weight edges only.");
        });
        if filter != self.sign_filter {
            self.set_sign_filter(filter, &mut scheduler);
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui
                .button("Reset defaults")
                .on_hover_text("Restore every force parameter to its default.")
                .clicked()
            {
                self.apply_params(SimParams::default(), &mut scheduler);
            }
            if ui
                .button("Reset view")
                .on_hover_text("Recenter the canvas at zoom 1.")
                .clicked()
            {
                self.viewport.reset();
            }
        });

        ui.add_space(8.0);
        match self.driver.field() {
            Some(field) if field.is_running() => {
                ui.label(format!("Simulating (alpha {:.3})", field.alpha()));
            }
            Some(field) if field.is_stopped() => {
                ui.label("Simulation stopped");
            }
            Some(_) => {
                ui.label("Layout settled");
            }
            None => {
                ui.label("No simulation");
            }
        }
        ui.small(format!("zoom {:.2}x", self.viewport.zoom));
    }
}
