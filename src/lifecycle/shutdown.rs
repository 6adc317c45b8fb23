//! Latched stop flag shared by the signal task, the server and tests.

use std::sync::Arc;

use tokio::sync::watch;

/// Stop flag that stays set once raised.
///
/// A waiter that arrives after `trigger` resolves immediately, so a server
/// started late still stops.
#[derive(Debug, Clone)]
pub struct Shutdown {
    flag: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag: Arc::new(flag) }
    }

    /// Raise the flag. Repeated calls are no-ops.
    pub fn trigger(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolve once the flag is raised.
    pub async fn wait(self) {
        let mut rx = self.flag.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Tasks currently parked in `wait`.
    pub fn waiters(&self) -> usize {
        self.flag.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
