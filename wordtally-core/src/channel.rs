//! Bounded channels for inter-task communication.
//!
//! Uses crossbeam-channel for bounded, backpressure-aware communication
//! between pipeline tasks running in different threads.

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::types::StreamElement;

/// Sender side of a local channel.
#[derive(Clone)]
pub struct LocalChannelSender<T> {
    sender: Sender<StreamElement<T>>,
}

impl<T> LocalChannelSender<T> {
    /// Send a stream element. Blocks if the channel is full (backpressure).
    pub fn send(&self, element: StreamElement<T>) -> Result<()> {
        self.sender
            .send(element)
            .map_err(|_| anyhow!("channel closed: receiver dropped"))
    }

    /// Try to send without blocking. Errors if the channel is full or closed.
    pub fn try_send(&self, element: StreamElement<T>) -> Result<()> {
        self.sender
            .try_send(element)
            .map_err(|e| anyhow!("failed to send: {e:?}"))
    }
}

/// Receiver side of a local channel.
pub struct LocalChannelReceiver<T> {
    receiver: Receiver<StreamElement<T>>,
}

impl<T> LocalChannelReceiver<T> {
    /// Receive the next stream element. Blocks until one is available.
    pub fn recv(&self) -> Result<StreamElement<T>> {
        self.receiver
            .recv()
            .map_err(|_| anyhow!("channel closed: sender dropped"))
    }
}

/// Create a bounded local channel pair with the given capacity.
///
/// When the channel is full, `send()` blocks until space is available,
/// propagating backpressure through the pipeline.
pub fn local_channel<T>(capacity: usize) -> (LocalChannelSender<T>, LocalChannelReceiver<T>) {
    let (sender, receiver) = bounded(capacity);
    (
        LocalChannelSender { sender },
        LocalChannelReceiver { receiver },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StreamRecord;

    #[test]
    fn test_send_recv() {
        let (sender, receiver) = local_channel::<i32>(10);
        sender.send(StreamElement::record(42)).unwrap();
        match receiver.recv().unwrap() {
            StreamElement::Record(rec) => assert_eq!(rec.value, 42),
            _ => panic!("expected Record"),
        }
    }

    #[test]
    fn test_end_marker() {
        let (sender, receiver) = local_channel::<i32>(10);
        sender.send(StreamElement::End).unwrap();
        assert_eq!(receiver.recv().unwrap(), StreamElement::End);
    }

    #[test]
    fn test_backpressure() {
        let (sender, receiver) = local_channel::<i32>(2);
        sender.send(StreamElement::record(1)).unwrap();
        sender.send(StreamElement::record(2)).unwrap();

        // Channel full: non-blocking send fails.
        assert!(sender.try_send(StreamElement::record(3)).is_err());

        receiver.recv().unwrap();
        sender.try_send(StreamElement::record(3)).unwrap();
    }

    #[test]
    fn test_closed_channel() {
        let (sender, receiver) = local_channel::<i32>(10);
        sender.send(StreamElement::record(42)).unwrap();
        drop(sender);

        // Buffered element still arrives, then recv fails.
        assert_eq!(
            receiver.recv().unwrap(),
            StreamElement::Record(StreamRecord::new(42))
        );
        assert!(receiver.recv().is_err());
    }

    #[test]
    fn test_cloned_senders_share_channel() {
        let (sender, receiver) = local_channel::<i32>(10);
        let sender2 = sender.clone();
        sender.send(StreamElement::record(1)).unwrap();
        sender2.send(StreamElement::record(2)).unwrap();

        assert_eq!(
            receiver.recv().unwrap(),
            StreamElement::Record(StreamRecord::new(1))
        );
        assert_eq!(
            receiver.recv().unwrap(),
            StreamElement::Record(StreamRecord::new(2))
        );
    }
}
