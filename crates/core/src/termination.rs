use std::time::{Duration, Instant};

/// A terminator indicates when the solver should stop.
pub trait Terminator {
    /// Indicates whether the solver should stop or may continue.
    fn should_stop(&self) -> bool;
}

impl<T: Terminator + ?Sized> Terminator for &T {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

/// A time budget can be used to stop the solver after some duration.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    end_time: Option<Instant>,
}

impl TimeBudget {
    /// Create a time budget that starts now and gives the solver `duration` time to find a
    /// solution.
    pub fn starting_now(duration: Duration) -> TimeBudget {
        TimeBudget {
            end_time: Some(Instant::now() + duration),
        }
    }

    /// Create an infinite time budget. The solver will not terminate before it finds a solution or
    /// concludes unsat.
    pub fn infinite() -> TimeBudget {
        TimeBudget { end_time: None }
    }

    /// A budget of `timeout`, or an infinite one when no timeout is given.
    pub fn from_timeout(timeout: Option<Duration>) -> TimeBudget {
        timeout
            .map(TimeBudget::starting_now)
            .unwrap_or(TimeBudget::infinite())
    }
}

impl Terminator for TimeBudget {
    fn should_stop(&self) -> bool {
        self.end_time
            .map(|end_time| Instant::now() > end_time)
            .unwrap_or(false)
    }
}
