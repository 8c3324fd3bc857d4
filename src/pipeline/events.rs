use crate::pipeline::{OutcomeCategory, Statistics};
use tokio::sync::mpsc::UnboundedSender;

/// Semantic progress events emitted by the pipeline. Front ends (CLI
/// progress bar, a form) render these instead of reconfiguring global
/// logging.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    BatchStarted { total: usize },
    FileStarted { name: String },
    FileFinished {
        name: String,
        category: OutcomeCategory,
        message: Option<String>,
    },
    BatchFinished { stats: Statistics },
}

/// Optional sink for pipeline events; a dropped receiver is ignored.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<UnboundedSender<PipelineEvent>>,
}

impl EventSink {
    pub fn new(sender: UnboundedSender<PipelineEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: PipelineEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn events_reach_the_receiver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(tx);
        sink.emit(PipelineEvent::BatchStarted { total: 2 });

        match rx.recv().await {
            Some(PipelineEvent::BatchStarted { total }) => assert_eq!(total, 2),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn disabled_sink_swallows_events() {
        let sink = EventSink::disabled();
        sink.emit(PipelineEvent::FileStarted {
            name: "mod.jar".to_string(),
        });
    }
}
