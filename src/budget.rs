/// Time budget for work that may be spread over several simulation steps.
pub struct CpuBudget {
    /// Function that returns true if the caller may keep working.
    should_continue: Box<dyn Fn() -> bool>,
}

impl CpuBudget {
    pub fn new<F: Fn() -> bool + 'static>(should_continue: F) -> Self {
        CpuBudget {
            should_continue: Box::new(should_continue),
        }
    }

    /// Returns true if there is budget remaining to continue work.
    pub fn has_budget(&self) -> bool {
        (self.should_continue)()
    }

    /// Unlimited budget (for one-shot calls and offline use).
    pub fn unlimited() -> Self {
        CpuBudget {
            should_continue: Box::new(|| true),
        }
    }

    /// Budget that allows `units` checks to pass before running out.
    pub fn units(units: usize) -> Self {
        let remaining = std::cell::Cell::new(units);
        CpuBudget::new(move || {
            let left = remaining.get();
            if left == 0 {
                false
            } else {
                remaining.set(left - 1);
                true
            }
        })
    }
}

/// Result of advancing an incremental computation.
#[derive(Debug)]
pub enum PhaseResult<T> {
    /// More steps are needed.
    Running,
    /// Finished with output.
    Complete(T),
}
