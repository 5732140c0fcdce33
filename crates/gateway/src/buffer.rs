//! Inbound event buffer.
//!
//! A bounded multi-producer/single-consumer queue between the vendor
//! callback threads and the dispatcher thread. Enqueue blocks the calling
//! vendor thread when the buffer is full: event loss is never acceptable,
//! so a slow consumer back-pressures into the vendor layer instead of
//! dropping. Capacity is fixed at construction.
//!
//! Both ends use the channel's sync-context API; no async runtime is
//! involved on either side.

use crate::error::GatewayError;
use crate::messages::QueuedEvent;
use tokio::sync::mpsc;

/// Default number of slots when the config does not override it
pub const DEFAULT_CAPACITY: usize = 64;

/// Producer handle, cloned into each session state machine
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<QueuedEvent>,
}

impl EventSender {
    /// Enqueue one event, blocking the calling thread while the buffer is
    /// full. Fails only when the consumer side has been dropped.
    pub fn send(&self, event: QueuedEvent) -> Result<(), GatewayError> {
        self.tx
            .blocking_send(event)
            .map_err(|_| GatewayError::BufferClosed)
    }
}

/// Consumer handle, owned by exactly one dispatcher
pub struct EventReceiver {
    rx: mpsc::Receiver<QueuedEvent>,
}

impl EventReceiver {
    /// Dequeue the next event in FIFO order, blocking until one arrives.
    /// Returns `None` once every producer has been dropped and the buffer
    /// is drained.
    pub fn recv(&mut self) -> Option<QueuedEvent> {
        self.rx.blocking_recv()
    }

    /// Non-blocking dequeue, for drain loops in tests
    pub fn try_recv(&mut self) -> Option<QueuedEvent> {
        self.rx.try_recv().ok()
    }
}

/// Create a buffer with the given capacity
pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender { tx }, EventReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Channel, ConnectionEvent, RspMessage};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    fn md_event() -> QueuedEvent {
        QueuedEvent::of(RspMessage::Connection(ConnectionEvent::disabled(
            Channel::MarketData,
        )))
    }

    fn trader_event() -> QueuedEvent {
        QueuedEvent::of(RspMessage::Connection(ConnectionEvent::disabled(
            Channel::Trader,
        )))
    }

    #[test]
    fn test_fifo_single_producer() {
        let (tx, mut rx) = bounded(8);
        for i in 0..5 {
            let mut ev = md_event();
            ev.is_last = i == 4;
            tx.send(ev).unwrap();
        }
        drop(tx);

        let mut seen = 0;
        while let Some(ev) = rx.recv() {
            seen += 1;
            assert_eq!(ev.is_last, seen == 5);
        }
        assert_eq!(seen, 5);
    }

    #[test]
    fn test_fifo_preserved_per_producer_under_concurrency() {
        let (tx, mut rx) = bounded(4);
        let tx2 = tx.clone();

        let md = thread::spawn(move || {
            for _ in 0..100 {
                tx.send(md_event()).unwrap();
            }
        });
        let trader = thread::spawn(move || {
            for _ in 0..100 {
                tx2.send(trader_event()).unwrap();
            }
        });

        let mut md_seen = 0;
        let mut trader_seen = 0;
        for _ in 0..200 {
            match rx.recv().unwrap().msg {
                RspMessage::Connection(ev) if ev.channel == Channel::MarketData => md_seen += 1,
                RspMessage::Connection(_) => trader_seen += 1,
                other => panic!("unexpected message {:?}", other.kind()),
            }
        }
        assert_eq!(md_seen, 100);
        assert_eq!(trader_seen, 100);
        assert!(rx.try_recv().is_none());

        md.join().unwrap();
        trader.join().unwrap();
    }

    #[test]
    fn test_enqueue_blocks_when_full_then_proceeds() {
        let (tx, mut rx) = bounded(2);
        tx.send(md_event()).unwrap();
        tx.send(md_event()).unwrap();

        let delivered = Arc::new(AtomicBool::new(false));
        let delivered_clone = delivered.clone();
        let producer = thread::spawn(move || {
            // Buffer is full: this blocks until the consumer drains a slot
            tx.send(trader_event()).unwrap();
            delivered_clone.store(true, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(100));
        assert!(
            !delivered.load(Ordering::SeqCst),
            "producer should be blocked while buffer is full"
        );

        // Drain one slot; the blocked producer must now complete
        assert!(rx.recv().is_some());
        producer.join().unwrap();
        assert!(delivered.load(Ordering::SeqCst));

        // Nothing was lost and order is preserved
        assert!(matches!(
            rx.recv().unwrap().msg,
            RspMessage::Connection(ev) if ev.channel == Channel::MarketData
        ));
        assert!(matches!(
            rx.recv().unwrap().msg,
            RspMessage::Connection(ev) if ev.channel == Channel::Trader
        ));
    }
}
