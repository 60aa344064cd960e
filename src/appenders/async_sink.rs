//! Asynchronous sink wrapper
//!
//! Wraps any appender in a bounded channel plus a worker thread, so the
//! logging call site never blocks on destination I/O. The inner appender is
//! shared behind a mutex: the worker drains batches through it, and critical
//! entries (Error, Fatal) are force-written through it synchronously when
//! the queue is full, so they are never dropped.

use crate::core::{Appender, LogEntry, LoggerError, PipelineMetrics, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default queue capacity for asynchronous sinks
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Timeout for draining the worker when the sink is dropped
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

enum Command {
    Entry(LogEntry),
    Flush(Sender<()>),
}

pub struct AsyncSink {
    sender: Option<Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
    inner: Arc<Mutex<Box<dyn Appender>>>,
    metrics: Arc<PipelineMetrics>,
    name: String,
}

impl AsyncSink {
    pub fn new(appender: Box<dyn Appender>, metrics: Arc<PipelineMetrics>) -> Self {
        Self::with_capacity(appender, metrics, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(
        appender: Box<dyn Appender>,
        metrics: Arc<PipelineMetrics>,
        capacity: usize,
    ) -> Self {
        let name = format!("async({})", appender.name());
        let (sender, receiver) = bounded(capacity);
        let inner = Arc::new(Mutex::new(appender));
        let worker_inner = Arc::clone(&inner);

        let worker = thread::spawn(move || Self::run_worker(&receiver, &worker_inner));

        Self {
            sender: Some(sender),
            worker: Some(worker),
            inner,
            metrics,
            name,
        }
    }

    /// Worker loop: block for one command, then drain whatever else is
    /// already queued before touching the lock, to amortize lock traffic
    /// and I/O.
    fn run_worker(receiver: &Receiver<Command>, inner: &Mutex<Box<dyn Appender>>) {
        const BATCH_SIZE: usize = 50;

        loop {
            let first = match receiver.recv() {
                Ok(command) => command,
                // Channel closed; the sender side already drained
                Err(_) => break,
            };

            let mut batch = vec![first];
            while batch.len() < BATCH_SIZE {
                match receiver.try_recv() {
                    Ok(command) => batch.push(command),
                    Err(_) => break,
                }
            }

            let mut appender = inner.lock();
            let mut flush_acks = Vec::new();
            for command in batch {
                match command {
                    Command::Entry(entry) => {
                        if let Err(e) = appender.append(&entry) {
                            eprintln!("[PIPELOG ERROR] Async appender failed: {}", e);
                        }
                    }
                    Command::Flush(ack) => flush_acks.push(ack),
                }
            }
            if !flush_acks.is_empty() {
                if let Err(e) = appender.flush() {
                    eprintln!("[PIPELOG ERROR] Async appender flush failed: {}", e);
                }
                for ack in flush_acks {
                    let _ = ack.send(());
                }
            }
        }

        // Final flush before the worker exits
        if let Err(e) = inner.lock().flush() {
            eprintln!("[PIPELOG ERROR] Async appender flush failed on shutdown: {}", e);
        }
    }

    /// Queue-full handling: critical entries are written synchronously
    /// through the shared appender, everything else is dropped with an
    /// alert.
    fn handle_overflow(&self, entry: LogEntry) {
        self.metrics.record_queue_full();

        if entry.level.is_critical() {
            self.metrics.record_critical_preserved();
            let mut appender = self.inner.lock();
            if let Err(e) = appender.append(&entry) {
                eprintln!("[PIPELOG ERROR] Forced critical write failed: {}", e);
                self.metrics.record_dropped();
            }
            return;
        }

        let dropped = self.metrics.record_dropped();
        // Alert on the first drop and periodically thereafter
        if dropped == 0 || (dropped + 1).is_multiple_of(1000) {
            eprintln!(
                "[PIPELOG WARNING] Async queue full, {} logs dropped. \
                 Consider increasing the queue capacity.",
                dropped + 1
            );
        }
    }
}

impl Appender for AsyncSink {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(LoggerError::ChannelSendError);
        };
        match sender.try_send(Command::Entry(entry.clone())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(Command::Entry(entry))) => {
                self.handle_overflow(entry);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Ok(()),
            // Worker is gone; shutting down
            Err(TrySendError::Disconnected(_)) => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        let Some(sender) = self.sender.as_ref() else {
            return Ok(());
        };
        let (ack_tx, ack_rx) = bounded(1);
        if sender.send(Command::Flush(ack_tx)).is_err() {
            return Ok(());
        }
        ack_rx
            .recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT)
            .map_err(|_| LoggerError::writer("Async flush timed out"))?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        // Close the channel first to signal the worker to drain and finish
        drop(self.sender.take());

        if let Some(worker) = self.worker.take() {
            let start = std::time::Instant::now();
            loop {
                if worker.is_finished() {
                    if let Err(e) = worker.join() {
                        eprintln!(
                            "[PIPELOG ERROR] Async worker panicked during shutdown: {:?}",
                            e
                        );
                    }
                    break;
                }
                if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                    eprintln!(
                        "[PIPELOG WARNING] Async worker did not finish within {:?}. \
                         Some logs may be lost.",
                        DEFAULT_SHUTDOWN_TIMEOUT
                    );
                    break;
                }
                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}
