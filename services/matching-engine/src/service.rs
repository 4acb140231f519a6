//! Single-writer owner task for one book
//!
//! The engine is moved onto a dedicated thread that drains a bounded command
//! queue one command at a time. Readers never touch the engine: they read the
//! latest published snapshot or subscribe to the event stream.
//!
//! ```text
//! BookHandle ──mpsc──► owner thread ──oneshot──► caller
//!                          │
//!                          ├──watch────► Arc<BookSnapshot>
//!                          └──broadcast► BookEvent
//! ```

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info};

use lob_types::errors::BookError;
use lob_types::ids::OrderId;
use lob_types::order::Order;
use lob_types::trade::Trade;

use crate::config::ConfigError;
use crate::engine::MatchingEngine;
use crate::events::BookEvent;
use crate::view::{BookSnapshot, BookView};

/// Commands accepted by the owner thread
#[derive(Debug)]
enum Command {
    Submit {
        order: Order,
        reply: oneshot::Sender<Result<Vec<Trade>, BookError>>,
    },
    Cancel {
        order_id: OrderId,
        reply: oneshot::Sender<Result<Order, BookError>>,
    },
}

/// Failure to start the owner thread
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to spawn book thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Running owner thread plus a handle to it
pub struct BookService {
    handle: BookHandle,
    worker: JoinHandle<MatchingEngine>,
}

impl BookService {
    /// Move `engine` onto its own thread and start serving commands
    pub fn spawn(engine: MatchingEngine) -> Result<Self, ServiceError> {
        let config = engine.config().clone();
        config.validate()?;

        let (commands, queue) = mpsc::channel(config.command_queue_capacity);
        let (snapshot_tx, snapshots) = watch::channel(Arc::new(engine.snapshot()));
        let (events, _) = broadcast::channel(config.event_buffer);

        let owner = Owner {
            engine,
            queue,
            snapshot_tx,
            events: events.clone(),
        };
        let worker = thread::Builder::new()
            .name("book-owner".to_string())
            .spawn(move || owner.run())?;

        info!(
            command_queue_capacity = config.command_queue_capacity,
            event_buffer = config.event_buffer,
            "BookService started"
        );

        Ok(Self {
            handle: BookHandle {
                commands,
                snapshots,
                events,
            },
            worker,
        })
    }

    /// A new handle to the running book
    pub fn handle(&self) -> BookHandle {
        self.handle.clone()
    }

    /// Stop accepting commands from this service's handle and wait for the
    /// owner thread to drain its queue
    ///
    /// The thread exits once every other handle has been dropped too.
    /// Returns the engine in its final state, or `None` if the owner thread
    /// panicked.
    pub fn shutdown(self) -> Option<MatchingEngine> {
        drop(self.handle);
        self.worker.join().ok()
    }
}

/// Cloneable handle used to talk to the owner thread
#[derive(Clone)]
pub struct BookHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<BookSnapshot>>,
    events: broadcast::Sender<BookEvent>,
}

impl BookHandle {
    /// Submit an order and wait for its trades
    pub async fn submit(&self, order: Order) -> Result<Vec<Trade>, BookError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Submit { order, reply })
            .await
            .map_err(|_| BookError::ServiceClosed)?;
        response.await.map_err(|_| BookError::ServiceClosed)?
    }

    /// Cancel a resting order and wait for the result
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order, BookError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Cancel { order_id, reply })
            .await
            .map_err(|_| BookError::ServiceClosed)?;
        response.await.map_err(|_| BookError::ServiceClosed)?
    }

    /// Blocking variant of [`BookHandle::submit`] for callers outside a runtime
    pub fn submit_blocking(&self, order: Order) -> Result<Vec<Trade>, BookError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .blocking_send(Command::Submit { order, reply })
            .map_err(|_| BookError::ServiceClosed)?;
        response.blocking_recv().map_err(|_| BookError::ServiceClosed)?
    }

    /// Blocking variant of [`BookHandle::cancel`]
    pub fn cancel_blocking(&self, order_id: OrderId) -> Result<Order, BookError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .blocking_send(Command::Cancel { order_id, reply })
            .map_err(|_| BookError::ServiceClosed)?;
        response.blocking_recv().map_err(|_| BookError::ServiceClosed)?
    }

    /// Latest published snapshot
    ///
    /// Reflects every command whose reply has been received.
    pub fn snapshot(&self) -> Arc<BookSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified whenever a new snapshot is published
    pub fn watch(&self) -> watch::Receiver<Arc<BookSnapshot>> {
        self.snapshots.clone()
    }

    /// Subscribe to book events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<BookEvent> {
        self.events.subscribe()
    }

    /// False once the owner thread has stopped
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

/// State owned by the book thread
struct Owner {
    engine: MatchingEngine,
    queue: mpsc::Receiver<Command>,
    snapshot_tx: watch::Sender<Arc<BookSnapshot>>,
    events: broadcast::Sender<BookEvent>,
}

impl Owner {
    fn run(mut self) -> MatchingEngine {
        while let Some(command) = self.queue.blocking_recv() {
            self.apply(command);
        }
        info!(
            resting_orders = self.engine.order_count(),
            "BookService stopped"
        );
        self.engine
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Submit { order, reply } => {
                let result = self.engine.submit(order.clone());
                let mut events = Vec::new();
                if let Ok(trades) = &result {
                    let resting = self.engine.get_order(order.order_id);
                    events = BookEvent::for_submit(&order, trades, resting);
                }
                self.publish(result.is_ok(), events);
                if reply.send(result).is_err() {
                    debug!(order_id = %order.order_id, "Submit caller went away");
                }
            }
            Command::Cancel { order_id, reply } => {
                let result = self.engine.cancel(order_id);
                let events = match &result {
                    Ok(order) => vec![BookEvent::for_cancel(order)],
                    Err(_) => Vec::new(),
                };
                self.publish(result.is_ok(), events);
                if reply.send(result).is_err() {
                    debug!(order_id = %order_id, "Cancel caller went away");
                }
            }
        }
    }

    /// Publish the new state before the caller is answered
    fn publish(&self, changed: bool, events: Vec<BookEvent>) {
        if changed {
            self.snapshot_tx.send_replace(Arc::new(self.engine.snapshot()));
        }
        for event in events {
            // No subscribers is not an error
            let _ = self.events.send(event);
        }
    }
}
