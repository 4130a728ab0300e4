use serde::{Deserialize, Serialize};

/// Overlay tuning. Defaults target the Scrapbox editor; a host page can
/// override individual fields via a `window.TOC_ENV` object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct OverlayConfig {
    /// Selector for the editor's line container.
    pub container_selector: String,

    /// Selector for heading lines inside the container.
    pub heading_selector: String,

    /// Selector for the display-text node inside a heading line.
    pub text_selector: String,

    /// Quiet period after the last observed mutation before a re-render.
    pub debounce_ms: i32,

    /// Container lookup retry interval while no editor is on the page.
    pub poll_ms: i32,

    /// The editor styles the page title like a section heading; skip the
    /// first heading match when building the outline.
    pub skip_page_title: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            container_selector: ".editor .lines".to_string(),
            heading_selector: ".line.section-title".to_string(),
            text_selector: ".text".to_string(),
            debounce_ms: 500,
            poll_ms: 500,
            skip_page_title: true,
        }
    }
}

/// Partial overrides as read from the host page. Missing or malformed
/// fields stay `None` and leave the default untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ConfigOverrides {
    pub container_selector: Option<String>,
    pub heading_selector: Option<String>,
    pub text_selector: Option<String>,
    pub debounce_ms: Option<i32>,
    pub poll_ms: Option<i32>,
    pub skip_page_title: Option<bool>,
}

impl OverlayConfig {
    pub fn from_window() -> Self {
        let mut cfg = Self::default();
        cfg.apply(ConfigOverrides::from_window());
        cfg
    }

    /// Merge overrides into the config. Blank selectors and non-positive
    /// intervals are rejected rather than propagated.
    pub fn apply(&mut self, o: ConfigOverrides) {
        if let Some(v) = o.container_selector {
            if !v.trim().is_empty() {
                self.container_selector = v;
            }
        }
        if let Some(v) = o.heading_selector {
            if !v.trim().is_empty() {
                self.heading_selector = v;
            }
        }
        if let Some(v) = o.text_selector {
            if !v.trim().is_empty() {
                self.text_selector = v;
            }
        }
        if let Some(v) = o.debounce_ms {
            if v > 0 {
                self.debounce_ms = v;
            }
        }
        if let Some(v) = o.poll_ms {
            if v > 0 {
                self.poll_ms = v;
            }
        }
        if let Some(v) = o.skip_page_title {
            self.skip_page_title = v;
        }
    }
}

impl ConfigOverrides {
    fn from_window() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };

        let Some(env) = window.get("TOC_ENV") else {
            return Self::default();
        };

        if env.is_undefined() || !env.is_object() {
            return Self::default();
        }

        Self {
            container_selector: string_field(&env, "CONTAINER_SELECTOR"),
            heading_selector: string_field(&env, "HEADING_SELECTOR"),
            text_selector: string_field(&env, "TEXT_SELECTOR"),
            debounce_ms: i32_field(&env, "DEBOUNCE_MS"),
            poll_ms: i32_field(&env, "POLL_MS"),
            skip_page_title: bool_field(&env, "SKIP_PAGE_TITLE"),
        }
    }
}

fn string_field(env: &js_sys::Object, key: &str) -> Option<String> {
    js_sys::Reflect::get(env, &key.into())
        .ok()
        .and_then(|v| v.as_string())
}

fn i32_field(env: &js_sys::Object, key: &str) -> Option<i32> {
    js_sys::Reflect::get(env, &key.into())
        .ok()
        .and_then(|v| v.as_f64())
        .map(|v| v as i32)
}

fn bool_field(env: &js_sys::Object, key: &str) -> Option<bool> {
    js_sys::Reflect::get(env, &key.into())
        .ok()
        .and_then(|v| v.as_bool())
}
