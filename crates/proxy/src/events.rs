//! Synchronous listener registry for proxy lifecycle events.

use std::{fmt, path::Path};

use asset::{ImportError, Mesh};
use corelib::Vec3;

/// Which event a listener is registered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProxyEventKind {
    MeshLoaded,
    MeshChanged,
    LoadFailed,
}

/// Event payloads borrow the proxy's state; listeners only get read access.
#[derive(Debug)]
pub enum ProxyEvent<'a> {
    /// Import succeeded; fired once per source path.
    MeshLoaded { path: &'a Path, mesh: &'a Mesh },
    /// The displayed mesh or its scale was (re)applied.
    MeshChanged {
        mesh: &'a Mesh,
        /// `false` while the placeholder is shown.
        showing_real: bool,
        proxy_mode: bool,
        scale: Vec3,
    },
    /// Import failed; fired once, then latched until the path changes.
    LoadFailed {
        path: &'a Path,
        error: &'a ImportError,
    },
}

impl ProxyEvent<'_> {
    pub fn kind(&self) -> ProxyEventKind {
        match self {
            ProxyEvent::MeshLoaded { .. } => ProxyEventKind::MeshLoaded,
            ProxyEvent::MeshChanged { .. } => ProxyEventKind::MeshChanged,
            ProxyEvent::LoadFailed { .. } => ProxyEventKind::LoadFailed,
        }
    }
}

pub type Listener = Box<dyn FnMut(&ProxyEvent<'_>)>;

/// Handle returned by [`Listeners::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

#[derive(Default)]
pub struct Listeners {
    entries: Vec<(ListenerId, ProxyEventKind, Listener)>,
    next_id: u32,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: ProxyEventKind,
        listener: impl FnMut(&ProxyEvent<'_>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, kind, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    /// Calls every listener registered for the event's kind, in registration order.
    pub fn notify(&mut self, event: &ProxyEvent<'_>) {
        let kind = event.kind();
        for (_, _, listener) in self.entries.iter_mut().filter(|(_, k, _)| *k == kind) {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("subscribers_count", &self.entries.len())
            .finish()
    }
}
