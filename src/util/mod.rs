use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Cancel whatever one-shot is pending in `slot`.
pub(crate) fn clear_timeout(slot: &Rc<Cell<Option<i32>>>) {
    if let Some(tid) = slot.take() {
        if let Some(win) = web_sys::window() {
            win.clear_timeout_with_handle(tid);
        }
    }
}

/// Replace whatever one-shot is pending in `slot` with a fresh timer.
///
/// The slot is emptied before `f` runs, so `f` may re-arm it.
pub(crate) fn reset_timeout(
    slot: &Rc<Cell<Option<i32>>>,
    delay_ms: i32,
    f: impl FnOnce() + 'static,
) {
    let Some(win) = web_sys::window() else {
        return;
    };

    if let Some(tid) = slot.take() {
        win.clear_timeout_with_handle(tid);
    }

    let slot2 = Rc::clone(slot);
    let cb = Closure::once_into_js(move || {
        slot2.set(None);
        f();
    });

    let tid = win
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), delay_ms)
        .unwrap_or(0);
    slot.set(Some(tid));
}
