use crate::config::OverlayConfig;
use crate::models::HeadingDescriptor;
use crate::overlay::OverlayController;
use crate::panel::TocPanel;
use crate::watcher::WatchState;
use leptos::prelude::*;

/// Overlay root: builds the shared signals, starts the lifecycle
/// controller, and renders the panel.
///
/// The controller's clones live on inside its timer and listener closures,
/// so dropping the local handle here is fine.
#[component]
pub fn TocApp() -> impl IntoView {
    let config = OverlayConfig::from_window();
    let headings: RwSignal<Vec<HeadingDescriptor>> = RwSignal::new(vec![]);
    let state: RwSignal<WatchState> = RwSignal::new(WatchState::Searching);

    OverlayController::new(config, headings, state).boot();

    view! { <TocPanel headings=headings state=state /> }
}
