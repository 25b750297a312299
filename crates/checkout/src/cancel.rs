//! Caller-supplied cancellation and deadlines.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Returned by [`CancelSignal::run`] when the signal fired first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canceled;

/// Fires the [`CancelSignal`]s created alongside it.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Cancellation observed by a checkout: an explicit cancel, a deadline, both,
/// or neither.
///
/// Cheap to clone; clones observe the same handle and deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    receiver: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    /// A signal plus the handle that fires it.
    pub fn new() -> (CancelHandle, CancelSignal) {
        let (sender, receiver) = watch::channel(false);
        let signal = CancelSignal {
            receiver: Some(receiver),
            deadline: None,
        };
        (CancelHandle { sender }, signal)
    }

    /// A signal that fires once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::never().deadline(Instant::now() + timeout)
    }

    /// Adds (or tightens) a deadline on this signal.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn is_canceled(&self) -> bool {
        let fired = self
            .receiver
            .as_ref()
            .is_some_and(|receiver| *receiver.borrow());
        let expired = self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline);
        fired || expired
    }

    /// Resolves once the signal fires. Pends forever for [`CancelSignal::never`].
    pub async fn canceled(&self) {
        let explicit = async {
            match self.receiver.clone() {
                Some(mut receiver) => {
                    let handle_dropped = receiver.wait_for(|fired| *fired).await.is_err();
                    // A dropped handle can no longer cancel.
                    if handle_dropped {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };

        let timed_out = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            () = explicit => {}
            () = timed_out => {}
        }
    }

    /// Runs `future` unless the signal fires first, in which case the future is
    /// dropped and [`Canceled`] returned.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, Canceled>
    where
        F: Future,
    {
        if self.is_canceled() {
            return Err(Canceled);
        }

        tokio::select! {
            biased;
            () = self.canceled() => Err(Canceled),
            output = future => Ok(output),
        }
    }
}
