//! Channel sync buffer (spec.md §4.7): a bounded FIFO decoupling a provider
//! scan producer from parallel persistence consumers, with atomic counters
//! in the style of the teacher's aggregated cache-stats structs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::models::NormalizedRecord;

/// Default bounded capacity (§4.7). Low-RAM devices use half.
pub const DEFAULT_CAPACITY: usize = 1000;
pub const LOW_RAM_CAPACITY: usize = 500;

/// Snapshot of buffer counters at one point in time.
#[derive(Debug, Clone, Copy)]
pub struct BufferStats {
    pub sent: u64,
    pub received: u64,
    pub in_buffer: u64,
    pub backpressure_events: u64,
    pub elapsed_ms: u64,
}

impl BufferStats {
    #[must_use]
    pub fn throughput_per_sec(&self) -> f64 {
        if self.elapsed_ms == 0 {
            return 0.0;
        }
        (self.received as f64) / (self.elapsed_ms as f64 / 1000.0)
    }
}

#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    received: AtomicU64,
    backpressure_events: AtomicU64,
}

/// Producer handle: `send` suspends when the buffer is full and increments
/// `backpressure_events` on every suspension (§4.7, §8 boundary behavior).
#[derive(Clone)]
pub struct BufferSender {
    tx: mpsc::Sender<NormalizedRecord>,
    counters: Arc<Counters>,
}

impl BufferSender {
    pub async fn send(&self, item: NormalizedRecord) -> Result<(), NormalizedRecord> {
        if self.tx.capacity() == 0 {
            self.counters.backpressure_events.fetch_add(1, Ordering::Relaxed);
        }
        self.tx.send(item).await.map_err(|e| e.0)?;
        self.counters.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Consumer handle. `receive` awaits the next item; after `close()` on the
/// sender side, `receive` drains whatever was already sent, then reports the
/// channel closed (§4.7, §8: "close while consumer drains yields exactly the
/// items sent before close").
pub struct BufferReceiver {
    rx: mpsc::Receiver<NormalizedRecord>,
    counters: Arc<Counters>,
}

impl BufferReceiver {
    pub async fn receive(&mut self) -> Option<NormalizedRecord> {
        let item = self.rx.recv().await;
        if item.is_some() {
            self.counters.received.fetch_add(1, Ordering::Relaxed);
        }
        item
    }

    pub fn try_receive(&mut self) -> Option<NormalizedRecord> {
        match self.rx.try_recv() {
            Ok(item) => {
                self.counters.received.fetch_add(1, Ordering::Relaxed);
                Some(item)
            }
            Err(_) => None,
        }
    }

    /// Stops the channel from accepting further sends; items already queued
    /// are still returned by subsequent `receive`/`try_receive` calls until
    /// the buffer is empty (§4.7, §8 boundary behavior).
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// A bounded producer/consumer channel plus metrics (§4.7). `close()` drops
/// the sender side, which is how `tokio::mpsc` signals producers are done;
/// `BufferReceiver::receive` keeps draining buffered items until empty.
pub struct SyncBuffer {
    sender: BufferSender,
    receiver: Option<BufferReceiver>,
    counters: Arc<Counters>,
    started_at: Instant,
}

impl SyncBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let counters = Arc::new(Counters::default());
        Self {
            sender: BufferSender {
                tx,
                counters: counters.clone(),
            },
            receiver: Some(BufferReceiver {
                rx,
                counters: counters.clone(),
            }),
            counters,
            started_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn sender(&self) -> BufferSender {
        self.sender.clone()
    }

    /// Takes ownership of the receiver half; may only be called once.
    pub fn take_receiver(&mut self) -> Option<BufferReceiver> {
        self.receiver.take()
    }

    #[must_use]
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            received: self.counters.received.load(Ordering::Relaxed),
            in_buffer: self
                .counters
                .sent
                .load(Ordering::Relaxed)
                .saturating_sub(self.counters.received.load(Ordering::Relaxed)),
            backpressure_events: self.counters.backpressure_events.load(Ordering::Relaxed),
            elapsed_ms: self.started_at.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;
    use crate::models::{ExternalIds, PlaybackHints};
    use crate::models::source_ref::PlaybackMethod;

    fn sample(i: u32) -> NormalizedRecord {
        NormalizedRecord {
            canonical_title: format!("Item {i}"),
            work_key_candidate: key::format_work(
                crate::key::WorkType::Movie,
                &format!("Item {i}"),
                Some(2020),
                None,
                None,
            )
            .unwrap(),
            season: None,
            episode: None,
            year: Some(2020),
            external_ids: ExternalIds::default(),
            playback_hints: PlaybackHints {
                method: PlaybackMethod::Direct,
                url_hint: "http://host/x.mkv".to_string(),
                container: None,
                codec: None,
                bitrate: None,
                language: "en".to_string(),
                quality: "1080p".to_string(),
            },
            duration_ms: Some(7_200_000),
            source_id: i.to_string(),
            raw_title: format!("Item {i}"),
        }
    }

    #[tokio::test]
    async fn send_then_receive_round_trips_one_item() {
        let mut buf = SyncBuffer::new(4);
        let mut receiver = buf.take_receiver().unwrap();
        buf.sender().send(sample(1)).await.unwrap();
        let item = receiver.receive().await.unwrap();
        assert_eq!(item.canonical_title, "Item 1");
        assert_eq!(buf.stats().sent, 1);
        assert_eq!(buf.stats().received, 1);
    }

    #[tokio::test]
    async fn close_then_drain_yields_exactly_items_sent_before_close() {
        let mut buf = SyncBuffer::new(4);
        let mut receiver = buf.take_receiver().unwrap();
        let sender = buf.sender();
        sender.send(sample(1)).await.unwrap();
        sender.send(sample(2)).await.unwrap();
        drop(sender);
        receiver.close();

        let mut drained = Vec::new();
        while let Some(item) = receiver.receive().await {
            drained.push(item);
        }
        assert_eq!(drained.len(), 2);
    }
}
