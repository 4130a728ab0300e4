mod app;
mod config;
mod models;
mod outline;
mod overlay;
mod panel;
mod storage;
mod util;
mod watcher;

use crate::app::TocApp;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(TocApp);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` +
// wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::config::OverlayConfig;
    use crate::models::{HeadingDescriptor, PanelPosition};
    use crate::outline::collect_headings;
    use crate::overlay::OverlayController;
    use crate::storage::{load_panel_position, save_panel_position};
    use crate::watcher::{ChangeSource, HeadingWatcher, SubscriptionHandle, WatchState};
    use leptos::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen_test::*;
    use web_sys::Element;

    wasm_bindgen_test_configure!(run_in_browser);

    // Short enough to keep the suite quick, long enough that browser timer
    // jitter cannot reorder the asserts.
    const TEST_DEBOUNCE_MS: i32 = 80;

    async fn sleep_ms(ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            web_sys::window()
                .unwrap()
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                .unwrap();
        });
        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    }

    fn test_document() -> web_sys::Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn make_container() -> Element {
        let el = test_document().create_element("div").unwrap();
        test_document().body().unwrap().append_child(&el).unwrap();
        el
    }

    fn append_heading(container: &Element, text: &str) {
        let line = test_document().create_element("div").unwrap();
        line.set_class_name("line section-title");
        let t = test_document().create_element("span").unwrap();
        t.set_class_name("text");
        t.set_text_content(Some(text));
        line.append_child(&t).unwrap();
        container.append_child(&line).unwrap();
    }

    fn counting_callback() -> (Rc<dyn Fn()>, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0usize));
        let c2 = Rc::clone(&count);
        (Rc::new(move || c2.set(c2.get() + 1)), count)
    }

    #[wasm_bindgen_test]
    async fn test_burst_within_debounce_fires_once() {
        let container = make_container();
        let watcher = HeadingWatcher::new(TEST_DEBOUNCE_MS);
        let (cb, count) = counting_callback();

        watcher.start(&container, cb);
        append_heading(&container, "One");
        append_heading(&container, "Two");
        append_heading(&container, "Three");

        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(count.get(), 1);

        watcher.stop();
        container.remove();
    }

    #[wasm_bindgen_test]
    async fn test_separated_bursts_fire_once_each() {
        let container = make_container();
        let watcher = HeadingWatcher::new(TEST_DEBOUNCE_MS);
        let (cb, count) = counting_callback();

        watcher.start(&container, cb);

        append_heading(&container, "One");
        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(count.get(), 1);

        append_heading(&container, "Two");
        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(count.get(), 2);

        watcher.stop();
        container.remove();
    }

    #[wasm_bindgen_test]
    async fn test_ongoing_burst_postpones_the_callback() {
        let container = make_container();
        let watcher = HeadingWatcher::new(TEST_DEBOUNCE_MS);
        let (cb, count) = counting_callback();

        watcher.start(&container, cb);

        // Mutations spaced at half the window keep resetting the timer.
        append_heading(&container, "One");
        sleep_ms(TEST_DEBOUNCE_MS / 2).await;
        append_heading(&container, "Two");
        sleep_ms(TEST_DEBOUNCE_MS / 2).await;
        assert_eq!(count.get(), 0);

        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(count.get(), 1);

        watcher.stop();
        container.remove();
    }

    #[wasm_bindgen_test]
    async fn test_stop_cancels_pending_timer_and_subscription() {
        let container = make_container();
        let watcher = HeadingWatcher::new(TEST_DEBOUNCE_MS);
        let (cb, count) = counting_callback();

        watcher.start(&container, cb);
        assert!(watcher.is_watching());

        append_heading(&container, "One");
        watcher.stop();
        assert!(!watcher.is_watching());
        // Idempotent.
        watcher.stop();

        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(count.get(), 0);

        // Mutations after stop never fire either.
        append_heading(&container, "Two");
        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(count.get(), 0);

        container.remove();
    }

    #[wasm_bindgen_test]
    async fn test_restart_on_new_container_drops_the_old_session() {
        let old = make_container();
        let new = make_container();
        let watcher = HeadingWatcher::new(TEST_DEBOUNCE_MS);
        let (old_cb, old_count) = counting_callback();
        let (new_cb, new_count) = counting_callback();

        watcher.start(&old, old_cb);
        watcher.start(&new, new_cb);

        // Mutations on the old container reach neither callback.
        append_heading(&old, "Stale");
        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(old_count.get(), 0);
        assert_eq!(new_count.get(), 0);

        append_heading(&new, "Fresh");
        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(new_count.get(), 1);

        watcher.stop();
        old.remove();
        new.remove();
    }

    /// Change source the test drives by hand, independent of the DOM.
    #[derive(Clone, Default)]
    struct ManualSource {
        handler: Rc<RefCell<Option<Box<dyn FnMut()>>>>,
        canceled: Rc<Cell<bool>>,
    }

    struct ManualHandle {
        handler: Rc<RefCell<Option<Box<dyn FnMut()>>>>,
        canceled: Rc<Cell<bool>>,
    }

    impl SubscriptionHandle for ManualHandle {
        fn cancel(&self) {
            self.canceled.set(true);
            self.handler.borrow_mut().take();
        }
    }

    impl ChangeSource for ManualSource {
        fn subscribe(
            &self,
            _target: &Element,
            on_batch: Box<dyn FnMut()>,
        ) -> Option<Box<dyn SubscriptionHandle>> {
            *self.handler.borrow_mut() = Some(on_batch);
            self.canceled.set(false);
            Some(Box::new(ManualHandle {
                handler: Rc::clone(&self.handler),
                canceled: Rc::clone(&self.canceled),
            }))
        }
    }

    impl ManualSource {
        fn fire(&self) {
            if let Some(h) = self.handler.borrow_mut().as_mut() {
                h();
            }
        }
    }

    #[wasm_bindgen_test]
    async fn test_watcher_debounces_batches_from_any_source() {
        let container = make_container();
        let source = ManualSource::default();
        let watcher = HeadingWatcher::with_source(TEST_DEBOUNCE_MS, Rc::new(source.clone()));
        let (cb, count) = counting_callback();

        watcher.start(&container, cb);
        source.fire();
        source.fire();
        source.fire();

        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(count.get(), 1);

        watcher.stop();
        assert!(source.canceled.get());
        container.remove();
    }

    #[wasm_bindgen_test]
    fn test_collect_headings_filters_and_keeps_document_order() {
        let container = make_container();
        append_heading(&container, "My Page"); // leading page-title line
        append_heading(&container, "Intro");
        append_heading(&container, "   ");
        append_heading(&container, "#tagged");
        append_heading(&container, "Setup");

        let config = OverlayConfig::default();
        let out = collect_headings(&container, &config);
        let titles: Vec<&str> = out.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro", "Setup"]);
        assert!(out.iter().all(|h| !h.id.is_empty()));

        // Ids are written back to the elements, so a second collection
        // sees the same outline.
        let again = collect_headings(&container, &config);
        assert_eq!(out, again);

        container.remove();
    }

    #[wasm_bindgen_test]
    fn test_collect_headings_empty_container_yields_empty_outline() {
        let container = make_container();
        let out = collect_headings(&container, &OverlayConfig::default());
        assert!(out.is_empty());
        container.remove();
    }

    #[wasm_bindgen_test]
    fn test_panel_position_storage_roundtrip() {
        let pos = PanelPosition {
            left: 120.0,
            top: 64.0,
        };
        save_panel_position(&pos);
        let loaded = load_panel_position().expect("should load panel position");
        assert_eq!(loaded, pos);
    }

    #[wasm_bindgen_test]
    async fn test_overlay_attaches_when_container_appears_and_detaches_on_removal() {
        let mut config = OverlayConfig::default();
        config.container_selector = "#toc-test-editor .lines".to_string();
        config.debounce_ms = TEST_DEBOUNCE_MS;
        config.poll_ms = TEST_DEBOUNCE_MS;
        config.skip_page_title = false;

        let headings: RwSignal<Vec<HeadingDescriptor>> = RwSignal::new(vec![]);
        let state: RwSignal<WatchState> = RwSignal::new(WatchState::Searching);
        let controller = OverlayController::new(config, headings, state);

        // No editor on the page yet.
        controller.init();
        assert_eq!(state.get_untracked(), WatchState::Searching);

        // The editor shows up between polls.
        let editor = test_document().create_element("div").unwrap();
        editor.set_id("toc-test-editor");
        let lines = test_document().create_element("div").unwrap();
        lines.set_class_name("lines");
        editor.append_child(&lines).unwrap();
        test_document().body().unwrap().append_child(&editor).unwrap();
        append_heading(&lines, "First");

        sleep_ms(TEST_DEBOUNCE_MS * 3).await;
        assert_eq!(state.get_untracked(), WatchState::Watching);
        let out = headings.get_untracked();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "First");

        // Removing the editor sends the overlay back to searching with an
        // empty outline.
        editor.remove();
        controller.init();
        assert_eq!(state.get_untracked(), WatchState::Searching);
        assert!(headings.get_untracked().is_empty());
    }
}
