use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Called with the new "prefers dark" value whenever the OS preference flips.
pub type SchemeListener = Rc<dyn Fn(bool)>;

/// Host-provided view of the OS "prefers dark color scheme" setting.
pub trait SystemColorScheme {
    fn prefers_dark(&self) -> bool;

    /// Registers `listener` until the returned guard is dropped.
    fn subscribe(&self, listener: SchemeListener) -> SchemeSubscription;
}

/// Unregisters its listener on drop.
#[must_use = "dropping the subscription unregisters the listener"]
pub struct SchemeSubscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl SchemeSubscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// For sources that never change and so keep no listeners.
    pub fn detached() -> Self {
        Self { cancel: None }
    }
}

impl Drop for SchemeSubscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for SchemeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeSubscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Default)]
struct ManualSchemeState {
    prefers_dark: bool,
    next_listener_id: u64,
    listeners: Vec<(u64, SchemeListener)>,
}

/// A scheme source the host drives by pushing OS changes into it.
#[derive(Clone, Default)]
pub struct ManualColorScheme {
    state: Rc<RefCell<ManualSchemeState>>,
}

impl ManualColorScheme {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(ManualSchemeState {
                prefers_dark,
                ..ManualSchemeState::default()
            })),
        }
    }

    /// Records the new OS preference and notifies listeners if it changed.
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        let listeners: Vec<SchemeListener> = {
            let mut state = self.state.borrow_mut();
            if state.prefers_dark == prefers_dark {
                return;
            }
            state.prefers_dark = prefers_dark;
            state
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect()
        };
        tracing::debug!(
            prefers_dark,
            listeners = listeners.len(),
            "system color scheme changed"
        );
        for listener in listeners {
            listener(prefers_dark);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

impl SystemColorScheme for ManualColorScheme {
    fn prefers_dark(&self) -> bool {
        self.state.borrow().prefers_dark
    }

    fn subscribe(&self, listener: SchemeListener) -> SchemeSubscription {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_listener_id;
            state.next_listener_id += 1;
            state.listeners.push((id, listener));
            id
        };
        let weak: Weak<RefCell<ManualSchemeState>> = Rc::downgrade(&self.state);
        SchemeSubscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state
                    .borrow_mut()
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }
}

impl fmt::Debug for ManualColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualColorScheme")
            .field("prefers_dark", &state.prefers_dark)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}
