use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use classtable_core::termination::Terminator;

/// Stops the solver once a shared flag is raised, e.g. by a SIGINT handler.
#[derive(Clone, Debug, Default)]
pub struct SignalTerminator {
    exit_signal_received: Arc<AtomicBool>,
}

impl SignalTerminator {
    /// Register a SIGINT listener. In case registering fails, this terminator will never cause the
    /// solver to stop running.
    pub fn register() -> SignalTerminator {
        let exit_signal_received = Arc::new(AtomicBool::new(false));

        if let Err(e) = signal_hook::flag::register(
            signal_hook::consts::SIGINT,
            Arc::clone(&exit_signal_received),
        ) {
            log::warn!("failed to register the interrupt handler: {e}");
        }

        SignalTerminator {
            exit_signal_received,
        }
    }

    /// Observe an existing flag.
    pub fn from_flag(exit_signal_received: Arc<AtomicBool>) -> SignalTerminator {
        SignalTerminator {
            exit_signal_received,
        }
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.exit_signal_received)
    }
}

impl Terminator for SignalTerminator {
    fn should_stop(&self) -> bool {
        self.exit_signal_received.load(Ordering::Relaxed)
    }
}

pub struct OrTerminator<A, B> {
    a: A,
    b: B,
}

impl<A, B> OrTerminator<A, B> {
    pub fn new(a: A, b: B) -> Self {
        OrTerminator { a, b }
    }
}

impl<A: Terminator, B: Terminator> Terminator for OrTerminator<A, B> {
    fn should_stop(&self) -> bool {
        self.a.should_stop() || self.b.should_stop()
    }
}
