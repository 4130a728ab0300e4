use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, MutationObserver, MutationObserverInit};

/// Handle to an active change subscription. `cancel` is idempotent.
pub(crate) trait SubscriptionHandle {
    fn cancel(&self);
}

/// A source of batched structural-change notifications for a DOM subtree.
///
/// `on_batch` is invoked once per delivered batch, however many individual
/// mutations the batch carries. Returns `None` when the subscription cannot
/// be established; callers treat that as a degraded state, not an error.
pub(crate) trait ChangeSource {
    fn subscribe(
        &self,
        target: &Element,
        on_batch: Box<dyn FnMut()>,
    ) -> Option<Box<dyn SubscriptionHandle>>;
}

/// MutationObserver-backed source: child list and character data, whole
/// subtree.
pub(crate) struct DomMutations;

struct DomSubscription {
    observer: MutationObserver,
    // Keeps the callback alive for as long as the observer may fire.
    _on_mutate: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl SubscriptionHandle for DomSubscription {
    fn cancel(&self) {
        self.observer.disconnect();
    }
}

impl ChangeSource for DomMutations {
    fn subscribe(
        &self,
        target: &Element,
        mut on_batch: Box<dyn FnMut()>,
    ) -> Option<Box<dyn SubscriptionHandle>> {
        let on_mutate = Closure::wrap(Box::new(
            move |_records: js_sys::Array, _observer: MutationObserver| {
                on_batch();
            },
        )
            as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(on_mutate.as_ref().unchecked_ref()).ok()?;

        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_character_data(true);
        observer.observe_with_options(target, &init).ok()?;

        Some(Box::new(DomSubscription {
            observer,
            _on_mutate: on_mutate,
        }))
    }
}
