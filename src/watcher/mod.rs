mod subscription;

pub(crate) use subscription::{ChangeSource, DomMutations, SubscriptionHandle};

use crate::util::{clear_timeout, reset_timeout};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use web_sys::Element;

/// Where the overlay is in its lifecycle: looking for an editor container,
/// or attached to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum WatchState {
    Searching,
    Watching,
}

/// One active observation: a subscription on one container plus the single
/// pending debounce timer. Torn down as a unit.
struct WatchSession {
    subscription: Box<dyn SubscriptionHandle>,
    pending_timer: Rc<Cell<Option<i32>>>,
}

impl WatchSession {
    fn stop(&self) {
        self.subscription.cancel();
        clear_timeout(&self.pending_timer);
    }
}

/// Watches a container for subtree changes and invokes a render callback at
/// most once per settling period.
///
/// Each delivered mutation batch resets the pending timer, so `on_change`
/// fires only after `debounce_ms` of quiescence (trailing edge; a long burst
/// postpones the callback for as long as it lasts). At most one session is
/// active; `start` on an active watcher replaces the session.
#[derive(Clone)]
pub(crate) struct HeadingWatcher {
    debounce_ms: i32,
    source: Rc<dyn ChangeSource>,
    session: Rc<RefCell<Option<WatchSession>>>,
}

impl HeadingWatcher {
    pub fn new(debounce_ms: i32) -> Self {
        Self::with_source(debounce_ms, Rc::new(DomMutations))
    }

    pub fn with_source(debounce_ms: i32, source: Rc<dyn ChangeSource>) -> Self {
        Self {
            debounce_ms,
            source,
            session: Rc::new(RefCell::new(None)),
        }
    }

    #[allow(dead_code)]
    pub fn is_watching(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// Begin observing `container`, replacing any active session.
    ///
    /// A no-op when the subscription cannot be established; the caller's
    /// retry loop will get another chance later.
    pub fn start(&self, container: &Element, on_change: Rc<dyn Fn()>) {
        self.stop();

        let pending_timer: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let debounce_ms = self.debounce_ms;

        let timer = Rc::clone(&pending_timer);
        let on_batch = Box::new(move || {
            let on_change = Rc::clone(&on_change);
            reset_timeout(&timer, debounce_ms, move || on_change());
        });

        let Some(subscription) = self.source.subscribe(container, on_batch) else {
            return;
        };

        *self.session.borrow_mut() = Some(WatchSession {
            subscription,
            pending_timer,
        });
    }

    /// Cancel the active subscription and any pending timer. Idempotent.
    pub fn stop(&self) {
        if let Some(session) = self.session.borrow_mut().take() {
            session.stop();
        }
    }
}
