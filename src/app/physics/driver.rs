use eframe::egui::Context;
use log::{debug, info};

use super::{ForceField, Reheat, StepObserver, StepOutcome};

/// Something that can arrange for `SimulationDriver::pump` to be called again.
pub(in crate::app) trait StepScheduler {
    fn schedule_next(&mut self);
}

impl StepScheduler for Context {
    fn schedule_next(&mut self) {
        self.request_repaint();
    }
}

/// Owns the one live force field and its single pending step.
///
/// A field is only ever replaced through [`SimulationDriver::install`], which
/// stops and drops the previous one first, so two integration loops can never
/// share a vertex set.
#[derive(Default)]
pub(in crate::app) struct SimulationDriver {
    field: Option<ForceField>,
    generation: u64,
    pending: Option<u64>,
}

impl SimulationDriver {
    pub(in crate::app) fn install(&mut self, field: ForceField, scheduler: &mut dyn StepScheduler) {
        self.shutdown();
        self.generation = self.generation.wrapping_add(1);
        info!("simulation {} installed", self.generation);
        self.field = Some(field);
        self.arm(scheduler);
    }

    /// Stops the running field and drops it along with any pending step.
    pub(in crate::app) fn shutdown(&mut self) {
        self.pending = None;
        if let Some(mut field) = self.field.take() {
            field.stop();
            info!("simulation {} shut down", self.generation);
        }
    }

    fn arm(&mut self, scheduler: &mut dyn StepScheduler) {
        if self.pending.is_some() {
            return;
        }
        self.pending = Some(self.generation);
        scheduler.schedule_next();
    }

    /// Runs the pending step, if any, and re-arms while the field is running.
    pub(in crate::app) fn pump(
        &mut self,
        observer: &mut dyn StepObserver,
        scheduler: &mut dyn StepScheduler,
    ) -> Option<StepOutcome> {
        let ticket = self.pending.take()?;
        if ticket != self.generation {
            return None;
        }
        let field = self.field.as_mut()?;

        let outcome = field.tick(observer);
        match outcome {
            StepOutcome::Running => self.arm(scheduler),
            StepOutcome::Settled => debug!("simulation {} settled", self.generation),
            StepOutcome::Stopped => {}
        }
        Some(outcome)
    }

    /// Re-arms the loop after the field was reheated.
    pub(in crate::app) fn wake(&mut self, reheat: Reheat, scheduler: &mut dyn StepScheduler) {
        if reheat == Reheat::Resumed && self.field.as_ref().is_some_and(ForceField::is_running) {
            self.arm(scheduler);
        }
    }

    pub(in crate::app) fn field(&self) -> Option<&ForceField> {
        self.field.as_ref()
    }

    pub(in crate::app) fn field_mut(&mut self) -> Option<&mut ForceField> {
        self.field.as_mut()
    }

    /// Number of armed step loops; never more than one.
    #[cfg(test)]
    pub(in crate::app) fn active_loops(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    #[cfg(test)]
    pub(in crate::app) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
pub(in crate::app) mod tests {
    use eframe::egui::Vec2;

    use super::*;
    use crate::app::physics::tests::CountingObserver;
    use crate::app::physics::{SimParams, seed_positions};

    #[derive(Default)]
    pub(in crate::app) struct CountingScheduler {
        pub(in crate::app) scheduled: usize,
    }

    impl StepScheduler for CountingScheduler {
        fn schedule_next(&mut self) {
            self.scheduled += 1;
        }
    }

    fn field(count: usize) -> ForceField {
        ForceField::new(
            seed_positions(count, Vec2::ZERO),
            &[],
            SimParams::default(),
            Vec2::ZERO,
        )
    }

    #[test]
    fn install_arms_exactly_one_step() {
        let mut driver = SimulationDriver::default();
        let mut scheduler = CountingScheduler::default();

        driver.install(field(3), &mut scheduler);

        assert_eq!(driver.active_loops(), 1);
        assert_eq!(scheduler.scheduled, 1);
    }

    #[test]
    fn each_pump_schedules_one_follow_up() {
        let mut driver = SimulationDriver::default();
        let mut scheduler = CountingScheduler::default();
        let mut observer = CountingObserver::new();
        driver.install(field(3), &mut scheduler);

        for _ in 0..10 {
            assert_eq!(
                driver.pump(&mut observer, &mut scheduler),
                Some(StepOutcome::Running)
            );
            assert_eq!(driver.active_loops(), 1);
        }
        assert_eq!(scheduler.scheduled, 11);
        assert_eq!(observer.calls, 10);

        // extra repaints without a ticket do nothing
        driver.pending = None;
        assert_eq!(driver.pump(&mut observer, &mut scheduler), None);
        assert_eq!(observer.calls, 10);
    }

    #[test]
    fn replacing_a_running_field_leaves_one_loop() {
        let mut driver = SimulationDriver::default();
        let mut scheduler = CountingScheduler::default();
        let mut observer = CountingObserver::new();

        driver.install(field(4), &mut scheduler);
        driver.pump(&mut observer, &mut scheduler);
        driver.pump(&mut observer, &mut scheduler);
        let first_generation = driver.generation();

        driver.install(field(7), &mut scheduler);

        assert_eq!(driver.generation(), first_generation + 1);
        assert_eq!(driver.active_loops(), 1);
        assert_eq!(driver.field().map(|field| field.positions().len()), Some(7));

        let scheduled_before = scheduler.scheduled;
        driver.pump(&mut observer, &mut scheduler);
        assert_eq!(scheduler.scheduled, scheduled_before + 1);
        assert_eq!(observer.last.len(), 7);
    }

    #[test]
    fn settled_loop_stops_scheduling_until_woken() {
        let mut driver = SimulationDriver::default();
        let mut scheduler = CountingScheduler::default();
        let mut observer = CountingObserver::new();
        driver.install(field(3), &mut scheduler);

        let mut steps = 0;
        while driver.pump(&mut observer, &mut scheduler) == Some(StepOutcome::Running) {
            steps += 1;
            assert!(steps < 2_000);
        }
        assert_eq!(driver.active_loops(), 0);
        let scheduled = scheduler.scheduled;
        assert_eq!(driver.pump(&mut observer, &mut scheduler), None);

        let reheat = driver
            .field_mut()
            .map(|field| field.set_parameters(SimParams::default()))
            .unwrap();
        driver.wake(reheat, &mut scheduler);
        driver.wake(reheat, &mut scheduler);

        assert_eq!(scheduler.scheduled, scheduled + 1);
        assert_eq!(driver.active_loops(), 1);
    }

    #[test]
    fn shutdown_releases_pending_step() {
        let mut driver = SimulationDriver::default();
        let mut scheduler = CountingScheduler::default();
        let mut observer = CountingObserver::new();
        driver.install(field(3), &mut scheduler);

        driver.shutdown();

        assert_eq!(driver.active_loops(), 0);
        assert!(driver.field().is_none());
        assert_eq!(driver.pump(&mut observer, &mut scheduler), None);
        assert_eq!(observer.calls, 0);
    }
}
