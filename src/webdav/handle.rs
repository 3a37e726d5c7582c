use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::DavError;
use crate::webdav::operations::OperationKind;
use crate::webdav::types::Payload;

/// Lifecycle of one operation: `Pending -> Dispatched -> Succeeded | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperationState {
    Pending = 0,
    Dispatched = 1,
    Succeeded = 2,
    Failed = 3,
}

impl OperationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationState::Succeeded | OperationState::Failed)
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => OperationState::Pending,
            1 => OperationState::Dispatched,
            2 => OperationState::Succeeded,
            _ => OperationState::Failed,
        }
    }
}

/// Shared state cell; once terminal it never changes again.
#[derive(Debug, Default)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn get(&self) -> OperationState {
        OperationState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn advance(&self, next: OperationState) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if OperationState::from_u8(current).is_terminal() {
                    None
                } else {
                    Some(next as u8)
                }
            });
    }
}

/// Future for a dispatched operation.
///
/// The work runs on a Tokio worker task, never on the awaiting task. Dropping
/// the handle detaches: the request still runs to completion, its result is
/// discarded. Nothing is retried.
#[derive(Debug)]
pub struct OperationHandle {
    kind: OperationKind,
    state: Arc<StateCell>,
    task: JoinHandle<Result<Payload, DavError>>,
}

impl OperationHandle {
    pub(crate) fn new(
        kind: OperationKind,
        state: Arc<StateCell>,
        task: JoinHandle<Result<Payload, DavError>>,
    ) -> Self {
        Self { kind, state, task }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn state(&self) -> OperationState {
        self.state.get()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for OperationHandle {
    type Output = Result<Payload, DavError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join_err)) => {
                self.state.advance(OperationState::Failed);
                Poll::Ready(Err(DavError::transport(format!(
                    "{} task failed: {join_err}",
                    self.kind
                ))))
            }
        }
    }
}
