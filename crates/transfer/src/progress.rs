use std::borrow::{Borrow, BorrowMut};
use std::io::{self, Read};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use tokio::io::{AsyncRead, ReadBuf};

use crate::ProgressSnapshot;

/// Receives a snapshot for every read that passes through a tracker.
///
/// Implementations run inline on the I/O path (possibly inside a blocking
/// task or a `poll_read`), so they must be cheap and must not block.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

/// Observer handle shared between the tracker and whoever created it.
pub type SharedObserver = Arc<dyn ProgressObserver>;

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressSnapshot) + Send + Sync,
{
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self(snapshot)
    }
}

impl ProgressObserver for tokio::sync::mpsc::UnboundedSender<ProgressSnapshot> {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        // A dropped receiver only means nobody is watching.
        let _ = self.send(*snapshot);
    }
}

/// Running byte counter for one transfer.
///
/// The clock starts when the tracker is created.
pub struct ProgressTracker {
    transferred: u64,
    total: u64,
    started: Instant,
    observer: SharedObserver,
}

impl ProgressTracker {
    /// Starts tracking a transfer of `total_bytes`.
    pub fn new(total_bytes: u64, observer: SharedObserver) -> Self {
        Self {
            transferred: 0,
            total: total_bytes,
            started: Instant::now(),
            observer,
        }
    }

    /// Adds `bytes` to the running total and notifies the observer.
    ///
    /// Called once per underlying read, including zero-length reads at EOF.
    pub fn record(&mut self, bytes: usize) -> ProgressSnapshot {
        self.transferred = self
            .transferred
            .saturating_add(bytes as u64)
            .min(self.total);
        let snapshot = ProgressSnapshot::new(self.transferred, self.total, self.started.elapsed());
        self.observer.on_progress(&snapshot);
        snapshot
    }

    /// Bytes counted so far.
    pub fn bytes_transferred(&self) -> u64 {
        self.transferred
    }
}

/// Reader adapter that reports every read to a [`ProgressTracker`].
///
/// `T` is either an owned tracker (one reader per transfer) or a
/// `&mut ProgressTracker` when several readers feed one transfer, as when
/// many source files stream into a single archive.
pub struct ProgressReader<R, T = ProgressTracker> {
    inner: R,
    tracker: T,
}

impl<R> ProgressReader<R, ProgressTracker> {
    /// Wraps `inner`, whose full length is `total_bytes`.
    pub fn new(inner: R, total_bytes: u64, observer: SharedObserver) -> Self {
        Self {
            inner,
            tracker: ProgressTracker::new(total_bytes, observer),
        }
    }
}

impl<R, T: BorrowMut<ProgressTracker>> ProgressReader<R, T> {
    /// Wraps `inner` and reports into an existing tracker.
    pub fn with_tracker(inner: R, tracker: T) -> Self {
        Self { inner, tracker }
    }

    /// Bytes read so far through this reader's tracker.
    pub fn bytes_transferred(&self) -> u64 {
        <T as Borrow<ProgressTracker>>::borrow(&self.tracker).bytes_transferred()
    }
}

impl<R: Read, T: BorrowMut<ProgressTracker>> Read for ProgressReader<R, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        <T as BorrowMut<ProgressTracker>>::borrow_mut(&mut self.tracker).record(n);
        Ok(n)
    }
}

impl<R, T> AsyncRead for ProgressReader<R, T>
where
    R: AsyncRead + Unpin,
    T: BorrowMut<ProgressTracker> + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            let n = buf.filled().len() - before;
            <T as BorrowMut<ProgressTracker>>::borrow_mut(&mut this.tracker).record(n);
        }
        poll
    }
}
