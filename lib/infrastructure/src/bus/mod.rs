use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

pub struct EventBus<T> {
    tx: broadcast::Sender<T>,
}

pub struct EventListener<T> {
    rx: broadcast::Receiver<T>,
}

#[derive(Clone)]
pub struct EventEmitter<T> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone + std::fmt::Debug> EventBus<T> {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    pub fn subscribe(&self) -> EventListener<T> {
        EventListener { rx: self.tx.subscribe() }
    }

    pub fn emitter(&self) -> EventEmitter<T> {
        EventEmitter { tx: self.tx.clone() }
    }
}

impl<T: Clone> EventListener<T> {
    //None only when all emitters are gone. Lagged listeners skip to the oldest retained event
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Closed) => {
                    tracing::debug!("Channel for event receiver of {} is closed", std::any::type_name::<T>());
                    return None;
                }
                Err(RecvError::Lagged(count)) => {
                    tracing::warn!(
                        "Channel for event receiver of {} lagged by {} messages",
                        std::any::type_name::<T>(),
                        count
                    );
                }
            }
        }
    }
}

impl<T: Clone + std::fmt::Debug> EventEmitter<T> {
    pub fn send(&self, event: T) {
        if self.tx.receiver_count() == 0 {
            tracing::debug!("No listener for event {:?}", event);
            return;
        }

        if let Err(e) = self.tx.send(event) {
            tracing::error!("Error sending event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listener_receives_emitted_event() {
        let bus = EventBus::<u32>::new(4);
        let mut listener = bus.subscribe();

        bus.emitter().send(42);

        assert_eq!(listener.recv().await, Some(42));
    }

    #[tokio::test]
    async fn test_lagged_listener_continues_with_retained_events() {
        let bus = EventBus::<u32>::new(2);
        let mut listener = bus.subscribe();
        let emitter = bus.emitter();

        for i in 0..5 {
            emitter.send(i);
        }

        assert_eq!(listener.recv().await, Some(3));
        assert_eq!(listener.recv().await, Some(4));
    }

    #[tokio::test]
    async fn test_closed_when_all_senders_dropped() {
        let bus = EventBus::<u32>::new(2);
        let mut listener = bus.subscribe();
        drop(bus);

        assert_eq!(listener.recv().await, None);
    }
}
