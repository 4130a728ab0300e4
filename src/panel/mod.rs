use crate::models::{HeadingDescriptor, PanelPosition};
use crate::storage::{load_panel_position, save_panel_position};
use crate::watcher::WatchState;
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;

const PANEL_WIDTH_PX: f64 = 260.0;

/// Keep at least this much of the panel on-screen so the header stays
/// grabbable.
const PANEL_MIN_VISIBLE_PX: f64 = 40.0;

/// The host editor keeps a fixed toolbar at the top; scroll targets land
/// below it.
const SCROLL_OFFSET_PX: f64 = 80.0;

const DEFAULT_POSITION: PanelPosition = PanelPosition {
    left: 16.0,
    top: 72.0,
};

const PANEL_CSS: &str = r#"
#toc-panel {
    position: fixed;
    z-index: 100;
    max-height: 70vh;
    overflow-y: auto;
    padding: 12px 15px 16px;
    background-color: #fefefe;
    border: 1px solid rgba(0,0,0,0.08);
    border-radius: 6px;
    box-shadow: 0 4px 16px rgba(0,0,0,0.08);
    font-size: 13.5px;
}

#toc-panel[data-state="searching"] {
    opacity: 0.75;
}

#toc-panel-header {
    margin: 0 0 12px 0;
    font-size: 12px;
    font-weight: bold;
    color: #999;
    text-transform: uppercase;
    letter-spacing: 0.1em;
    border-bottom: 1px solid #eee;
    padding-bottom: 8px;
    cursor: move;
    user-select: none;
    touch-action: none;
}

#toc-list {
    list-style: none;
    padding: 0;
    margin: 0;
    counter-reset: toc-counter;
}

#toc-list li {
    margin-bottom: 4px;
    counter-increment: toc-counter;
}

#toc-list .no-item {
    color: #ccc;
    padding: 6px 8px;
    font-style: italic;
}

#toc-list li a {
    text-decoration: none;
    color: #444;
    display: block;
    padding: 6px 8px;
    border-radius: 4px;
    white-space: nowrap;
    overflow: hidden;
    text-overflow: ellipsis;
    transition: all 0.2s ease;
}

#toc-list li a::before {
    content: counter(toc-counter) ". ";
    margin-right: 8px;
    font-family: monospace;
    color: #888;
    font-weight: bold;
}

#toc-list li a:hover {
    background-color: #f0f0f0;
    color: #000;
    padding-left: 12px;
}

body.dark #toc-panel { background-color: #1d1f21; border-color: #333; }
body.dark #toc-panel-header { color: #666; border-bottom-color: #333; }
body.dark #toc-list li a { color: #aaa; }
body.dark #toc-list li a::before { color: #666; }
body.dark #toc-list li a:hover { background-color: #2d2f31; color: #fff; }
"#;

/// Keep the panel reachable: its top-left corner must stay inside the
/// viewport, with a margin so the header can always be grabbed.
pub(crate) fn clamp_to_viewport(
    pos: PanelPosition,
    viewport_w: f64,
    viewport_h: f64,
) -> PanelPosition {
    let max_left = (viewport_w - PANEL_MIN_VISIBLE_PX).max(0.0);
    let max_top = (viewport_h - PANEL_MIN_VISIBLE_PX).max(0.0);
    PanelPosition {
        left: pos.left.clamp(0.0, max_left),
        top: pos.top.clamp(0.0, max_top),
    }
}

fn viewport_size() -> (f64, f64) {
    let win = window();
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

fn scroll_to_heading(id: &str) {
    let Some(target) = document().get_element_by_id(id) else {
        return;
    };

    let win = window();
    let page_offset = win.page_y_offset().unwrap_or(0.0);
    let top = target.get_bounding_client_rect().top() + page_offset - SCROLL_OFFSET_PX;

    let opts = web_sys::ScrollToOptions::new();
    opts.set_top(top);
    opts.set_behavior(web_sys::ScrollBehavior::Smooth);
    win.scroll_to_with_scroll_to_options(&opts);
}

/// Pointer offset from the panel origin at grab time.
#[derive(Clone, Copy, Debug)]
struct DragGrip {
    dx: f64,
    dy: f64,
}

#[component]
pub fn TocPanel(
    headings: RwSignal<Vec<HeadingDescriptor>>,
    state: RwSignal<WatchState>,
) -> impl IntoView {
    let initial = {
        let (vw, vh) = viewport_size();
        clamp_to_viewport(load_panel_position().unwrap_or(DEFAULT_POSITION), vw, vh)
    };
    let position: RwSignal<PanelPosition> = RwSignal::new(initial);
    let grip: RwSignal<Option<DragGrip>> = RwSignal::new(None);

    let on_header_pointerdown = move |ev: web_sys::PointerEvent| {
        ev.prevent_default();
        let pos = position.get_untracked();
        grip.set(Some(DragGrip {
            dx: ev.client_x() as f64 - pos.left,
            dy: ev.client_y() as f64 - pos.top,
        }));
    };

    // Window-level listeners so a drag survives the pointer leaving the
    // panel. The overlay never unmounts; keep the handles for app lifetime.
    let move_handle = window_event_listener(ev::pointermove, move |ev: web_sys::PointerEvent| {
        let Some(g) = grip.get_untracked() else {
            return;
        };
        let (vw, vh) = viewport_size();
        position.set(clamp_to_viewport(
            PanelPosition {
                left: ev.client_x() as f64 - g.dx,
                top: ev.client_y() as f64 - g.dy,
            },
            vw,
            vh,
        ));
    });
    let up_handle = window_event_listener(ev::pointerup, move |_ev: web_sys::PointerEvent| {
        if grip.get_untracked().is_none() {
            return;
        }
        grip.set(None);
        save_panel_position(&position.get_untracked());
    });
    let _move_handle = StoredValue::new(Some(move_handle));
    let _up_handle = StoredValue::new(Some(up_handle));

    view! {
        <style>{PANEL_CSS}</style>
        <div
            id="toc-panel"
            data-state=move || state.get().as_ref().to_string()
            style=move || {
                let p = position.get();
                format!("left: {}px; top: {}px; width: {}px;", p.left, p.top, PANEL_WIDTH_PX)
            }
        >
            <h3 id="toc-panel-header" on:pointerdown=on_header_pointerdown>
                "Table of Contents"
            </h3>
            <ul id="toc-list">
                <Show
                    when=move || !headings.get().is_empty()
                    fallback=|| view! { <li class="no-item">"No contents"</li> }
                >
                    {move || {
                        headings
                            .get()
                            .into_iter()
                            .map(|h| {
                                let id = h.id.clone();
                                view! {
                                    <li>
                                        <a
                                            href=format!("#{}", h.id)
                                            on:click=move |ev: web_sys::MouseEvent| {
                                                ev.prevent_default();
                                                scroll_to_heading(&id);
                                            }
                                        >
                                            {h.title}
                                        </a>
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </Show>
            </ul>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_keeps_position_inside_viewport() {
        let pos = clamp_to_viewport(PanelPosition { left: 100.0, top: 50.0 }, 1280.0, 720.0);
        assert_eq!(pos, PanelPosition { left: 100.0, top: 50.0 });
    }

    #[test]
    fn test_clamp_pulls_back_offscreen_right_and_bottom() {
        let pos = clamp_to_viewport(
            PanelPosition {
                left: 5000.0,
                top: 5000.0,
            },
            1280.0,
            720.0,
        );
        assert_eq!(pos.left, 1280.0 - PANEL_MIN_VISIBLE_PX);
        assert_eq!(pos.top, 720.0 - PANEL_MIN_VISIBLE_PX);
    }

    #[test]
    fn test_clamp_pulls_back_negative_coordinates() {
        let pos = clamp_to_viewport(
            PanelPosition {
                left: -300.0,
                top: -10.0,
            },
            1280.0,
            720.0,
        );
        assert_eq!(pos, PanelPosition { left: 0.0, top: 0.0 });
    }

    #[test]
    fn test_clamp_handles_tiny_viewport() {
        let pos = clamp_to_viewport(PanelPosition { left: 16.0, top: 72.0 }, 20.0, 20.0);
        assert_eq!(pos, PanelPosition { left: 0.0, top: 0.0 });
    }
}
