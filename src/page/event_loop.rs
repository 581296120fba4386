use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use crate::page::page::Page;

/// Work to run on the page's own thread once a background task finishes.
pub type Completion = Box<dyn FnOnce(&mut Page) + Send>;

/// Background tasks run on worker threads; their completions queue up here
/// until the page drains them.
pub struct EventLoop {
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    pending: usize,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        EventLoop {
            sender,
            receiver,
            pending: 0,
        }
    }

    pub fn spawn<F>(&mut self, work: F)
    where
        F: FnOnce() -> Completion + Send + 'static,
    {
        self.pending += 1;
        let sender = self.sender.clone();

        thread::spawn(move || {
            let completion = catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|_| {
                log::error!("background task panicked; its completion is dropped");
                let noop: Completion = Box::new(|_: &mut Page| {});
                noop
            });
            // the receiver lives as long as the page; a send error means the page is gone
            let _ = sender.send(completion);
        });
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Block until the next completion arrives. `None` when nothing is pending.
    pub(crate) fn next_completion(&mut self) -> Option<Completion> {
        if self.pending == 0 {
            return None;
        }
        let completion = self.receiver.recv().ok()?;
        self.pending -= 1;
        Some(completion)
    }
}
