//! The change event stream (spec §5, §6): a synchronous, single-producer,
//! multi-consumer broadcast with no per-subscriber buffering, synthesized
//! from a list of subscriber callbacks invoked in registration order — the
//! approach spec §9's "broadcast channel semantics" note prescribes for
//! runtimes without a built-in broadcast primitive.

use vellum_delta::Delta;

/// Where an edit originated. Carried through untouched so hosts can tell
/// their own edits apart from ones replayed from elsewhere (e.g. a
/// collaboration peer) without re-deriving it from context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Local,
    Remote,
}

/// `{before, change, source}` — the Delta as of the previous emission, the
/// change just composed into it, and where the edit came from.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub before: Delta,
    pub change: Delta,
    pub source: Source,
}

type Listener = Box<dyn FnMut(&ChangeEvent)>;

/// A document's change stream. Subscribers are plain callbacks; `emit`
/// invokes every one of them synchronously, in subscription order.
#[derive(Default)]
pub struct ChangeStream {
    listeners: Vec<Listener>,
}

impl ChangeStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. There is no unsubscribe — callers that need
    /// one should filter on a flag captured in their closure.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub(crate) fn emit(&mut self, event: &ChangeEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}
