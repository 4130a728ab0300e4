use crate::config::OverlayConfig;
use crate::models::HeadingDescriptor;
use crate::outline::collect_headings;
use crate::util::reset_timeout;
use crate::watcher::{ChangeSource, DomMutations, HeadingWatcher, SubscriptionHandle, WatchState};
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::{window_event_listener, WindowListenerHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use web_sys::Element;

/// Overlay lifecycle: find the editor container, keep the outline in sync
/// while it lives, fall back to searching when it goes away.
///
/// While `Searching`, the container lookup retries every `poll_ms`; an
/// absent container is a silent no-op (the host may simply be on a page
/// without an editor). While `Watching`, renders are driven by the
/// debounced watcher, plus one immediately after attach.
#[derive(Clone)]
pub(crate) struct OverlayController {
    config: OverlayConfig,
    headings: RwSignal<Vec<HeadingDescriptor>>,
    state: RwSignal<WatchState>,
    watcher: HeadingWatcher,

    /// The container the active session is bound to.
    watched: Rc<RefCell<Option<Element>>>,

    /// One-shot slot shared by the searching poll and navigation re-init.
    retry_timer: Rc<Cell<Option<i32>>>,

    /// Last seen href, for SPA navigation detection.
    last_href: Rc<RefCell<String>>,

    /// Global hooks (keep handles alive).
    _title_subscription: Rc<RefCell<Option<Box<dyn SubscriptionHandle>>>>,
    _popstate_handle: Rc<RefCell<Option<WindowListenerHandle>>>,
}

impl OverlayController {
    pub fn new(
        config: OverlayConfig,
        headings: RwSignal<Vec<HeadingDescriptor>>,
        state: RwSignal<WatchState>,
    ) -> Self {
        let watcher = HeadingWatcher::new(config.debounce_ms);
        Self {
            config,
            headings,
            state,
            watcher,
            watched: Rc::new(RefCell::new(None)),
            retry_timer: Rc::new(Cell::new(None)),
            last_href: Rc::new(RefCell::new(String::new())),
            _title_subscription: Rc::new(RefCell::new(None)),
            _popstate_handle: Rc::new(RefCell::new(None)),
        }
    }

    /// Install the navigation hooks and run the first container lookup.
    pub fn boot(&self) {
        *self.last_href.borrow_mut() = current_href();

        // The host swaps pages without reloading; the <title> node is the
        // cheapest change signal for that.
        if let Ok(Some(title_el)) = document().query_selector("title") {
            let s2 = self.clone();
            *self._title_subscription.borrow_mut() =
                DomMutations.subscribe(&title_el, Box::new(move || s2.check_href_changed()));
        }

        let s3 = self.clone();
        let popstate = window_event_listener(ev::popstate, move |_ev: web_sys::PopStateEvent| {
            // The host needs a beat to rebuild the editor after popstate.
            let s4 = s3.clone();
            reset_timeout(&s3.retry_timer, s3.config.poll_ms, move || s4.init());
        });
        *self._popstate_handle.borrow_mut() = Some(popstate);

        self.init();
    }

    /// Look up the container and attach. Absent container is a no-op that
    /// leaves the overlay searching.
    pub fn init(&self) {
        match document().query_selector(&self.config.container_selector) {
            Ok(Some(container)) => self.attach(container),
            _ => self.to_searching(),
        }
    }

    fn attach(&self, container: Element) {
        *self.watched.borrow_mut() = Some(container.clone());
        if self.state.get_untracked() != WatchState::Watching {
            self.state.set(WatchState::Watching);
        }

        let s2 = self.clone();
        self.watcher.start(&container, Rc::new(move || s2.refresh()));

        // First render right away; the watcher only reacts to later
        // mutations.
        self.refresh();
    }

    fn to_searching(&self) {
        self.watcher.stop();
        *self.watched.borrow_mut() = None;

        if self.state.get_untracked() != WatchState::Searching {
            self.state.set(WatchState::Searching);
        }
        if !self.headings.get_untracked().is_empty() {
            self.headings.set(vec![]);
        }

        let s2 = self.clone();
        reset_timeout(&self.retry_timer, self.config.poll_ms, move || s2.init());
    }

    /// Rebuild the outline from the live container. Runs on the debounce
    /// edge and once immediately after attach.
    fn refresh(&self) {
        let container = self.watched.borrow().clone();
        let Some(container) = container else {
            return;
        };

        if !container.is_connected() {
            // Container removed or replaced under us; the poll will bind
            // whatever takes its place.
            self.to_searching();
            return;
        }

        self.headings
            .set(collect_headings(&container, &self.config));
    }

    fn check_href_changed(&self) {
        let href = current_href();
        if *self.last_href.borrow() == href {
            return;
        }
        *self.last_href.borrow_mut() = href;
        self.init();
    }
}

fn current_href() -> String {
    window().location().href().unwrap_or_default()
}
