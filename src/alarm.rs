use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

enum Msg {
    Schedule,
    Shutdown,
}

/// Restartable, cancelable single-shot timer.
///
/// `schedule()` arms the alarm; scheduling again before it fires restarts the
/// countdown, so a burst of calls coalesces into one callback invocation
/// (classic debounce, not a queue). After firing the alarm is disarmed and can
/// be scheduled again.
///
/// `shutdown_now()` joins the timer thread, so once it returns no callback
/// invocation can start; an invocation already in flight is waited out. This
/// makes cancellation linearizable with firing.
pub struct Alarm {
    tx: Sender<Msg>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Alarm {
    pub fn new<F>(name: &str, interval: Duration, callback: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                loop {
                    // Disarmed: block until the next schedule request.
                    match rx.recv() {
                        Ok(Msg::Schedule) => {}
                        Ok(Msg::Shutdown) | Err(_) => return,
                    }
                    // Armed: every further schedule restarts the countdown.
                    loop {
                        match rx.recv_timeout(interval) {
                            Ok(Msg::Schedule) => continue,
                            Ok(Msg::Shutdown) => return,
                            Err(RecvTimeoutError::Timeout) => {
                                callback();
                                break;
                            }
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    }
                }
            })
            .expect("failed to spawn alarm thread");
        Self {
            tx,
            thread: Some(thread),
        }
    }

    /// Arm the alarm, or restart the countdown if it is already armed.
    /// A no-op after shutdown.
    pub fn schedule(&self) {
        let _ = self.tx.send(Msg::Schedule);
    }

    /// Stop the alarm and wait for the timer thread to exit. Idempotent.
    pub fn shutdown_now(&mut self) {
        let _ = self.tx.send(Msg::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Alarm {
    fn drop(&mut self) {
        self.shutdown_now();
    }
}
