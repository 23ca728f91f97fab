//! Randomized greedy construction.
//!
//! A random cap is built by repeatedly adding a point drawn uniformly from the
//! values that are still free, until none remain. Each step mutates the cap
//! once and returns, so callers can interleave their own work between steps.

use std::iter::FusedIterator;

use rand::Rng;
use tracing::{debug, trace};

use crate::cap::CapSet;
use crate::error::CapError;

/// Outcome of one construction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The point that was added.
    Added(u32),
    /// No free value was left; the cap is complete.
    Done,
}

impl CapSet {
    /// Adds one point chosen uniformly among the free values.
    pub fn random_step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Step, CapError> {
        let free: Vec<u32> = self.free_points().collect();
        if free.is_empty() {
            return Ok(Step::Done);
        }
        let point = free[rng.gen_range(0..free.len())];
        self.add(point)?;
        trace!(point, size = self.len(), free = free.len() - 1, "random step");
        Ok(Step::Added(point))
    }

    /// Runs one step and reports it through exactly one of the callbacks:
    /// `on_progress` with the added point, or `on_done` once the cap is
    /// complete.
    pub fn step_with<R, P, D>(
        &mut self,
        rng: &mut R,
        on_progress: P,
        on_done: D,
    ) -> Result<(), CapError>
    where
        R: Rng + ?Sized,
        P: FnOnce(u32),
        D: FnOnce(),
    {
        match self.random_step(rng)? {
            Step::Added(point) => on_progress(point),
            Step::Done => on_done(),
        }
        Ok(())
    }

    /// Iterator over the points added by successive random steps. It ends
    /// when the cap is complete, or after yielding the first error.
    pub fn random_steps<'a, R: Rng + ?Sized>(&'a mut self, rng: &'a mut R) -> RandomSteps<'a, R> {
        RandomSteps {
            cap: self,
            rng,
            finished: false,
        }
    }

    /// Clears the cap and grows a random complete one from scratch. Returns
    /// the number of points added.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, CapError> {
        self.clear();
        let mut added = 0;
        for step in self.random_steps(rng) {
            step?;
            added += 1;
        }
        debug!(dim = self.dim(), size = added, "random cap complete");
        Ok(added)
    }
}

pub struct RandomSteps<'a, R: ?Sized> {
    cap: &'a mut CapSet,
    rng: &'a mut R,
    finished: bool,
}

impl<R: Rng + ?Sized> Iterator for RandomSteps<'_, R> {
    type Item = Result<u32, CapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.cap.random_step(&mut *self.rng) {
            Ok(Step::Added(point)) => Some(Ok(point)),
            Ok(Step::Done) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: Rng + ?Sized> FusedIterator for RandomSteps<'_, R> {}
