//! Cooperative stop between units of work.

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::info;

/// Receiving end of the shutdown channel, checked between files and
/// documents.
#[derive(Debug)]
pub struct StopSignal {
    rx: Option<broadcast::Receiver<()>>,
    stopped: bool,
}

impl StopSignal {
    pub fn new(rx: broadcast::Receiver<()>) -> Self {
        Self {
            rx: Some(rx),
            stopped: false,
        }
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        Self {
            rx: None,
            stopped: false,
        }
    }

    /// True once a stop has been requested. Stays true afterwards.
    pub fn is_requested(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if let Some(rx) = &mut self.rx {
            match rx.try_recv() {
                Ok(()) | Err(TryRecvError::Lagged(_)) => self.stopped = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => {}
            }
        }
        self.stopped
    }
}

/// Forward the first Ctrl+C to the shutdown channel.
pub fn spawn_ctrl_c_handler(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal, stopping after the current unit");
        shutdown_tx.send(()).ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_fires() {
        let mut stop = StopSignal::never();
        assert!(!stop.is_requested());
    }

    #[test]
    fn test_latches_after_signal() {
        let (tx, rx) = broadcast::channel::<()>(1);
        let mut stop = StopSignal::new(rx);
        assert!(!stop.is_requested());

        tx.send(()).unwrap();
        assert!(stop.is_requested());
        assert!(stop.is_requested());
    }

    #[test]
    fn test_dropped_sender_is_not_a_stop() {
        let (tx, rx) = broadcast::channel::<()>(1);
        let mut stop = StopSignal::new(rx);
        drop(tx);
        assert!(!stop.is_requested());
    }
}
