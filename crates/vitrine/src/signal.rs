//! Bounded-wait capture of one-shot signals such as alert dialogs.
//!
//! A listener must be armed strictly before the action that may fire the
//! signal; a signal that fires before arming is never delivered to it.
//! [`capture_during`] bundles the arm-act-capture sequence for callers that
//! do not need to interleave other work.

use crate::dialog::{AutoDialogBehavior, Dialog, DialogLog};
use crate::result::ProbeResult;
use crate::session::UiSession;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Kinds of one-shot signals a session can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SignalKind {
    /// A modal dialog (alert, confirm, prompt)
    Dialog,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dialog => write!(f, "dialog"),
        }
    }
}

/// An armed one-shot listener.
///
/// Dropping it disarms the listener.
#[derive(Debug)]
pub struct ArmedSignal {
    kind: SignalKind,
    receiver: oneshot::Receiver<String>,
}

impl ArmedSignal {
    /// Wrap the receiving half of a one-shot channel
    #[must_use]
    pub fn new(kind: SignalKind, receiver: oneshot::Receiver<String>) -> Self {
        Self { kind, receiver }
    }

    /// Signal kind this listener is armed for
    #[must_use]
    pub const fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Take the payload if the signal has already arrived
    pub fn try_take(&mut self) -> Option<String> {
        self.receiver.try_recv().ok()
    }
}

/// Outcome of a bounded wait for a signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// The signal payload (e.g. the alert message)
    pub payload: Option<String>,
    /// No signal arrived within the budget
    pub timed_out: bool,
}

impl CapturedEvent {
    fn captured(payload: String) -> Self {
        Self {
            payload: Some(payload),
            timed_out: false,
        }
    }

    fn absent() -> Self {
        Self {
            payload: None,
            timed_out: true,
        }
    }

    /// Payload text, empty when nothing arrived
    #[must_use]
    pub fn message(&self) -> &str {
        self.payload.as_deref().unwrap_or_default()
    }

    /// Whether the payload contains `needle`
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.payload.as_deref().is_some_and(|p| p.contains(needle))
    }
}

/// Race an armed listener against a timer.
///
/// A timeout is not an error: for many flows no signal is the expected path.
/// A listener whose source has gone away reports as timed out immediately.
pub async fn capture_event(mut armed: ArmedSignal, timeout: Duration) -> CapturedEvent {
    match tokio::time::timeout(timeout, &mut armed.receiver).await {
        Ok(Ok(payload)) => {
            debug!(kind = %armed.kind, %payload, "signal captured");
            CapturedEvent::captured(payload)
        }
        Ok(Err(_)) => {
            warn!(kind = %armed.kind, "signal source closed before delivering");
            CapturedEvent::absent()
        }
        Err(_) => {
            debug!(kind = %armed.kind, timeout_ms = timeout.as_millis() as u64, "no signal before timeout");
            CapturedEvent::absent()
        }
    }
}

/// Arm a listener, run the triggering action, then capture.
///
/// Errors come only from arming or from the action itself.
pub async fn capture_during<S, F, Fut>(
    session: &S,
    kind: SignalKind,
    action: F,
    timeout: Duration,
) -> ProbeResult<CapturedEvent>
where
    S: UiSession + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ProbeResult<()>>,
{
    let armed = session.on_next_signal(kind).await?;
    action().await?;
    Ok(capture_event(armed, timeout).await)
}

// =============================================================================
// SIGNAL HUB
// =============================================================================

/// Routes dialogs raised by a session to armed listeners.
///
/// Each listener receives at most one dialog; the dialog is accepted before
/// its message is delivered. Dialogs with no listener fall back to the
/// configured [`AutoDialogBehavior`].
#[derive(Debug, Default)]
pub struct SignalHub {
    waiting: Mutex<Vec<oneshot::Sender<String>>>,
    log: DialogLog,
    auto_behavior: AutoDialogBehavior,
}

impl SignalHub {
    /// Create a hub with the given fallback behaviour
    #[must_use]
    pub fn new(auto_behavior: AutoDialogBehavior) -> Self {
        Self {
            auto_behavior,
            ..Self::default()
        }
    }

    /// Arm a listener for the next dialog
    pub fn arm(&self) -> ArmedSignal {
        let (sender, receiver) = oneshot::channel();
        if let Ok(mut waiting) = self.waiting.lock() {
            waiting.retain(|s| !s.is_closed());
            waiting.push(sender);
        }
        ArmedSignal::new(SignalKind::Dialog, receiver)
    }

    /// Handle a dialog raised by the page and return how it was handled
    pub fn deliver(&self, mut dialog: Dialog) -> Dialog {
        let listener = self.waiting.lock().ok().and_then(|mut waiting| {
            waiting.retain(|s| !s.is_closed());
            (!waiting.is_empty()).then(|| waiting.remove(0))
        });

        match listener {
            Some(sender) => {
                dialog.accept();
                if sender.send(dialog.message().to_string()).is_err() {
                    debug!("listener dropped while dialog was delivered");
                }
            }
            None => {
                debug!(message = dialog.message(), "dialog raised with no listener armed");
                self.auto_behavior.apply(&mut dialog);
            }
        }
        self.log.record(dialog.clone());
        dialog
    }

    /// History of dialogs seen by this hub
    #[must_use]
    pub fn log(&self) -> &DialogLog {
        &self.log
    }
}
