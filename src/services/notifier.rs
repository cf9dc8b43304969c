use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::models::BlockView;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum ScheduleEventKind {
    BlockAdded(BlockView),
    BlockUpdated(BlockView),
    BlockDeleted { id: i64 },
}

impl ScheduleEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScheduleEventKind::BlockAdded(_) => "block_added",
            ScheduleEventKind::BlockUpdated(_) => "block_updated",
            ScheduleEventKind::BlockDeleted { .. } => "block_deleted",
        }
    }

    pub fn payload_json(&self) -> Result<String, serde_json::Error> {
        match self {
            ScheduleEventKind::BlockAdded(view) | ScheduleEventKind::BlockUpdated(view) => {
                serde_json::to_string(view)
            }
            ScheduleEventKind::BlockDeleted { id } => {
                serde_json::to_string(&serde_json::json!({ "id": id }))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEvent {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: ScheduleEventKind,
}

/// Fan-out of schedule changes to connected clients.
///
/// Publishing never fails: with no subscribers the event is dropped.
#[derive(Clone)]
pub struct ScheduleNotifier {
    tx: broadcast::Sender<ScheduleEvent>,
}

impl ScheduleNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScheduleEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, kind: ScheduleEventKind) -> usize {
        let event = ScheduleEvent {
            id: Uuid::new_v4(),
            kind,
        };
        let name = event.kind.name();
        match self.tx.send(event) {
            Ok(n) => {
                debug!("published {} to {} subscriber(s)", name, n);
                n
            }
            Err(_) => {
                debug!("published {} with no subscribers", name);
                0
            }
        }
    }
}
