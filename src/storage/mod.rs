use crate::models::PanelPosition;
use serde::{Deserialize, Serialize};

pub(crate) const PANEL_POS_KEY: &str = "scrapbox_toc_panel_pos";

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn load_panel_position() -> Option<PanelPosition> {
    load_json_from_storage::<PanelPosition>(PANEL_POS_KEY)
}

pub(crate) fn save_panel_position(pos: &PanelPosition) {
    save_json_to_storage(PANEL_POS_KEY, pos);
}
