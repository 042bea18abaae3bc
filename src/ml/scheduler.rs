// ============================================================
// Layer 5 — Learning-rate Schedule
// ============================================================
// Linear warmup followed by linear decay to zero:
//
//   lr
//    │     /\
//    │    /  \
//    │   /    \
//    │  /      \
//    └─┴────────┴──► optimizer step
//      0  warmup  total
//
//   step < warmup:  lr = base * step / warmup
//   otherwise:      lr = base * (total - step) / (total - warmup)
//
// One "step" is one optimizer update, i.e. one full group of
// accumulated micro-batches, not one micro-batch.

#[derive(Debug, Clone)]
pub struct WarmupLinearSchedule {
    base_lr:      f64,
    warmup_steps: usize,
    total_steps:  usize,
    current_step: usize,
}

impl WarmupLinearSchedule {
    pub fn new(base_lr: f64, warmup_steps: usize, total_steps: usize) -> Self {
        Self { base_lr, warmup_steps, total_steps, current_step: 0 }
    }

    /// Learning rate for a given optimizer step.
    pub fn lr_at(&self, step: usize) -> f64 {
        if step < self.warmup_steps {
            return self.base_lr * step as f64 / self.warmup_steps as f64;
        }

        let decay_steps = self.total_steps.saturating_sub(self.warmup_steps);
        if decay_steps == 0 {
            return if step < self.total_steps.max(1) { self.base_lr } else { 0.0 };
        }

        let remaining = self.total_steps.saturating_sub(step) as f64;
        (self.base_lr * remaining / decay_steps as f64).max(0.0)
    }

    /// Return the rate for the current step and advance.
    pub fn next_lr(&mut self) -> f64 {
        let lr = self.lr_at(self.current_step);
        self.current_step += 1;
        lr
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }
}
