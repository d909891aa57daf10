//! Observable display state shared by the subscriber and the render loop.
//!
//! `main` owns the [`DisplayState`]; the subscriber writes through a shared
//! reference and the render loop reads a [`DisplayView`]. Every published
//! sample is queued for the view, so each one gets its own redraw; once the
//! queue is full the subscriber waits for the renderer to catch up.

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::sample::Sample;

/// Samples the render loop may fall behind by before publishing waits
pub const RENDER_QUEUE: usize = 64;

/// Where the event stream connection currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    /// Waiting out the reconnection delay after a drop
    Reconnecting { delay: Duration },
    /// The stream failed permanently and will not be retried
    Closed { reason: String },
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "live"),
            ConnectionState::Reconnecting { delay } => {
                write!(f, "reconnecting in {:.1}s", delay.as_secs_f64())
            }
            ConnectionState::Closed { reason } => write!(f, "closed: {}", reason),
        }
    }
}

/// What the render loop has to react to
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Sample(Sample),
    Connection(ConnectionState),
}

/// Latest sample plus connection status, with change delivery to one view.
pub struct DisplayState {
    sample: watch::Sender<Sample>,
    connection: watch::Sender<ConnectionState>,
    renderer: Mutex<Option<mpsc::Sender<Sample>>>,
}

impl DisplayState {
    pub fn new() -> Self {
        let (sample, _) = watch::channel(Sample::default());
        let (connection, _) = watch::channel(ConnectionState::Connecting);
        Self {
            sample,
            connection,
            renderer: Mutex::new(None),
        }
    }

    /// Replace the current sample and hand it to the view.
    ///
    /// Identical samples are delivered too: one accepted message, one redraw.
    /// Waits while the view's queue is full.
    pub async fn publish(&self, sample: Sample) {
        self.sample.send_replace(sample.clone());

        let Some(queue) = self.renderer_queue() else {
            return;
        };
        if queue.send(sample).await.is_err() {
            tracing::debug!("display view dropped, sample not delivered");
        }
    }

    /// Update the connection status; the view is only woken on a real change.
    pub fn set_connection(&self, state: ConnectionState) {
        self.connection.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    pub fn sample(&self) -> Sample {
        self.sample.borrow().clone()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection.borrow().clone()
    }

    /// Attach the render loop. There is one view; subscribing again detaches
    /// the previous one.
    pub fn subscribe(&self) -> DisplayView {
        let (tx, rx) = mpsc::channel(RENDER_QUEUE);
        if let Ok(mut renderer) = self.renderer.lock() {
            *renderer = Some(tx);
        }
        DisplayView {
            samples: rx,
            connection: self.connection.subscribe(),
        }
    }

    fn renderer_queue(&self) -> Option<mpsc::Sender<Sample>> {
        self.renderer.lock().ok().and_then(|renderer| renderer.clone())
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of [`DisplayState`], held by the render loop
pub struct DisplayView {
    samples: mpsc::Receiver<Sample>,
    connection: watch::Receiver<ConnectionState>,
}

impl DisplayView {
    /// Wait for the next change. Returns `None` once the state is gone.
    ///
    /// Cancel safe, so it can sit in a `select!` loop.
    pub async fn changed(&mut self) -> Option<Change> {
        tokio::select! {
            sample = self.samples.recv() => sample.map(Change::Sample),
            r = self.connection.changed() => match r {
                Ok(()) => Some(Change::Connection(self.connection.borrow_and_update().clone())),
                Err(_) => None,
            },
        }
    }

    /// Next queued sample, if one is waiting
    pub fn try_sample(&mut self) -> Option<Sample> {
        self.samples.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_connecting() {
        let state = DisplayState::new();
        assert!(state.sample().is_empty());
        assert_eq!(state.connection(), ConnectionState::Connecting);
    }

    #[tokio::test]
    async fn publish_without_view_only_updates_current() {
        let state = DisplayState::new();
        for i in 0..(RENDER_QUEUE * 2) {
            state.publish(Sample::new(vec![i as f64])).await;
        }
        assert_eq!(state.sample().cores(), &[(RENDER_QUEUE * 2 - 1) as f64]);
    }

    #[tokio::test]
    async fn every_sample_reaches_the_view_in_order() {
        let state = DisplayState::new();
        let mut view = state.subscribe();

        state.publish(Sample::new(vec![1.0, 2.0])).await;
        state.publish(Sample::new(vec![3.0])).await;

        assert_eq!(view.try_sample().unwrap().cores(), &[1.0, 2.0]);
        assert_eq!(view.try_sample().unwrap().cores(), &[3.0]);
        assert_eq!(view.try_sample(), None);
        assert_eq!(state.sample().cores(), &[3.0]);
    }

    #[tokio::test]
    async fn identical_samples_are_each_delivered() {
        let state = DisplayState::new();
        let mut view = state.subscribe();

        state.publish(Sample::new(vec![42.0])).await;
        state.publish(Sample::new(vec![42.0])).await;

        assert!(view.try_sample().is_some());
        assert!(view.try_sample().is_some());
    }

    #[tokio::test]
    async fn full_queue_waits_for_the_view() {
        let state = DisplayState::new();
        let mut view = state.subscribe();
        let total = RENDER_QUEUE + 10;

        let publisher = async {
            for i in 0..total {
                state.publish(Sample::new(vec![i as f64])).await;
            }
        };
        let reader = async {
            let mut seen = Vec::new();
            while seen.len() < total {
                if let Some(Change::Sample(s)) = view.changed().await {
                    seen.push(s.cores()[0] as usize);
                }
            }
            seen
        };

        let ((), seen) = tokio::join!(publisher, reader);
        assert_eq!(seen, (0..total).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn connection_change_wakes_view() {
        let state = DisplayState::new();
        let mut view = state.subscribe();

        state.set_connection(ConnectionState::Open);
        assert_eq!(
            view.changed().await,
            Some(Change::Connection(ConnectionState::Open))
        );
    }

    #[tokio::test]
    async fn sample_change_wakes_view() {
        let state = DisplayState::new();
        let mut view = state.subscribe();

        state.publish(Sample::new(vec![5.0])).await;
        assert_eq!(
            view.changed().await,
            Some(Change::Sample(Sample::new(vec![5.0])))
        );
    }

    #[test]
    fn repeated_connection_state_is_not_a_change() {
        let state = DisplayState::new();
        let view = state.subscribe();
        state.set_connection(ConnectionState::Connecting);
        assert!(!view.connection.has_changed().unwrap());
    }

    #[test]
    fn connection_display() {
        assert_eq!(ConnectionState::Open.to_string(), "live");
        assert_eq!(
            ConnectionState::Reconnecting { delay: Duration::from_millis(3000) }.to_string(),
            "reconnecting in 3.0s"
        );
        assert_eq!(
            ConnectionState::Closed { reason: "HTTP 404".into() }.to_string(),
            "closed: HTTP 404"
        );
    }
}
