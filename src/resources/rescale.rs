//! Background sprite rescaling.
//!
//! A resize hands a job to a worker thread that reads the immutable source
//! sheets and builds a fresh scaled set. Only the newest request counts:
//! issuing another request signals the previous worker to stop, and anything
//! it still delivers is dropped because its generation is stale. The frame
//! loop keeps drawing the old set until [`Rescaler::poll`] hands over the new
//! one.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Cooperative cancellation flag shared with a worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Rescaler<T> {
    name: &'static str,
    generation: u64,
    current: Option<CancelToken>,
    tx: Sender<(u64, T)>,
    rx: Receiver<(u64, T)>,
}

impl<T: Send + 'static> Rescaler<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, rx) = unbounded();
        Self {
            name,
            generation: 0,
            current: None,
            tx,
            rx,
        }
    }

    /// Start `job` on a worker, superseding any request still in flight.
    /// The job should check the token between units of work and return
    /// `None` once it is cancelled.
    pub fn request<F>(&mut self, job: F)
    where
        F: FnOnce(&CancelToken) -> Option<T> + Send + 'static,
    {
        if let Some(stale) = self.current.take() {
            debug!("{}: cancelling rescale generation {}", self.name, self.generation);
            stale.cancel();
        }

        self.generation += 1;
        let generation = self.generation;
        let token = CancelToken::new();
        let worker_token = token.clone();
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("{}-rescale-{}", self.name, generation))
            .spawn(move || {
                if let Some(result) = job(&worker_token) {
                    if !worker_token.is_cancelled() {
                        // Receiver gone means the game was dropped
                        let _ = tx.send((generation, result));
                    }
                }
            });

        match spawned {
            Ok(_) => self.current = Some(token),
            Err(e) => warn!("{}: could not start rescale worker: {}", self.name, e),
        }
    }

    /// Drop the request in flight, if any. Whatever it still delivers is
    /// stale.
    pub fn cancel(&mut self) {
        if let Some(stale) = self.current.take() {
            debug!("{}: cancelling rescale generation {}", self.name, self.generation);
            stale.cancel();
            self.generation += 1;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.current.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Non-blocking: the result of the newest request, if it has finished.
    pub fn poll(&mut self) -> Option<T> {
        let mut latest = None;
        for (generation, result) in self.rx.try_iter() {
            if generation == self.generation {
                latest = Some(result);
            } else {
                debug!("{}: dropping stale rescale generation {}", self.name, generation);
            }
        }
        if latest.is_some() {
            self.current = None;
        }
        latest
    }

    /// Block up to `timeout` for the newest request's result.
    pub fn wait(&mut self, timeout: Duration) -> Option<T> {
        if !self.is_pending() {
            return None;
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok((generation, result)) if generation == self.generation => {
                    self.current = None;
                    return Some(result);
                }
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }
}

impl<T> Drop for Rescaler<T> {
    fn drop(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_request_delivers() {
        let mut rescaler = Rescaler::new("test");
        rescaler.request(|_| Some(42u32));
        assert!(rescaler.is_pending());
        assert_eq!(rescaler.wait(Duration::from_secs(5)), Some(42));
        assert!(!rescaler.is_pending());
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let (gate_tx, gate_rx) = unbounded::<()>();
        let mut rescaler = Rescaler::new("test");

        rescaler.request(move |_| {
            // Finishes only after the second request has been issued
            let _ = gate_rx.recv_timeout(Duration::from_secs(5));
            Some("first")
        });
        rescaler.request(|_| Some("second"));
        gate_tx.send(()).unwrap();

        assert_eq!(rescaler.wait(Duration::from_secs(5)), Some("second"));
        thread::sleep(Duration::from_millis(50));
        assert_eq!(rescaler.poll(), None);
    }

    #[test]
    fn test_cancel_drops_result_in_flight() {
        let (gate_tx, gate_rx) = unbounded::<()>();
        let mut rescaler = Rescaler::new("test");
        rescaler.request(move |_| {
            let _ = gate_rx.recv_timeout(Duration::from_secs(5));
            Some(7u32)
        });
        let before = rescaler.generation();
        rescaler.cancel();
        assert!(!rescaler.is_pending());
        assert_eq!(rescaler.generation(), before + 1);

        gate_tx.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(rescaler.poll(), None);
        assert_eq!(rescaler.wait(Duration::from_millis(10)), None);
    }

    #[test]
    fn test_superseded_worker_sees_cancel() {
        let (seen_tx, seen_rx) = unbounded::<bool>();
        let (gate_tx, gate_rx) = unbounded::<()>();
        let mut rescaler: Rescaler<u8> = Rescaler::new("test");

        rescaler.request(move |token| {
            let _ = gate_rx.recv_timeout(Duration::from_secs(5));
            let _ = seen_tx.send(token.is_cancelled());
            None
        });
        rescaler.request(|_| Some(1));
        gate_tx.send(()).unwrap();

        assert_eq!(seen_rx.recv_timeout(Duration::from_secs(5)), Ok(true));
    }

    #[test]
    fn test_wait_without_request_returns_none() {
        let mut rescaler: Rescaler<u8> = Rescaler::new("test");
        assert_eq!(rescaler.wait(Duration::from_millis(10)), None);
        assert_eq!(rescaler.poll(), None);
    }
}
