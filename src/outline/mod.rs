use crate::config::OverlayConfig;
use crate::models::HeadingDescriptor;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use wasm_bindgen::JsCast;
use web_sys::Element;

/// Display text for one heading line, or `None` when the line carries
/// nothing worth listing.
///
/// Rules:
/// - Whitespace-only lines are dropped.
/// - Lines starting with `#` are hashtag rows the editor styles like
///   headings; they are dropped too.
pub(crate) fn displayable_title(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() || t.starts_with('#') {
        return None;
    }
    Some(t.to_string())
}

/// Build the outline from `(id, raw_text)` pairs in document order.
///
/// Output order follows input order; entries whose text filters out are
/// omitted entirely. Duplicate titles are allowed, ids are assumed unique.
pub(crate) fn headings_from_lines<I>(lines: I) -> Vec<HeadingDescriptor>
where
    I: IntoIterator<Item = (String, String)>,
{
    lines
        .into_iter()
        .filter_map(|(id, raw)| displayable_title(&raw).map(|title| HeadingDescriptor { id, title }))
        .collect()
}

/// Collect the outline from the live container.
///
/// Queries the DOM at call time, so every descriptor corresponds to an
/// element present in the document right now. Returns an empty list when
/// nothing matches (the panel renders its explicit empty row for that).
pub(crate) fn collect_headings(container: &Element, config: &OverlayConfig) -> Vec<HeadingDescriptor> {
    let Ok(nodes) = container.query_selector_all(&config.heading_selector) else {
        return vec![];
    };

    let mut lines: Vec<(String, String)> = Vec::with_capacity(nodes.length() as usize);
    for i in 0..nodes.length() {
        let Some(node) = nodes.item(i) else {
            continue;
        };
        let Ok(el) = node.dyn_into::<Element>() else {
            continue;
        };

        let id = ensure_heading_id(&el);
        lines.push((id, heading_text(&el, &config.text_selector)));
    }

    let skip = if config.skip_page_title { 1 } else { 0 };
    headings_from_lines(lines.into_iter().skip(skip))
}

/// Raw text of a heading line: the `.text` child when the editor provides
/// one, the element's own text content otherwise.
fn heading_text(el: &Element, text_selector: &str) -> String {
    let text_el = el.query_selector(text_selector).ok().flatten();
    match text_el {
        Some(t) => t.text_content().unwrap_or_default(),
        None => el.text_content().unwrap_or_default(),
    }
}

/// Return the element's id, assigning a generated one first if it has none.
///
/// The id is written back onto the element, so repeated collections see the
/// same id for as long as the element lives.
pub(crate) fn ensure_heading_id(el: &Element) -> String {
    let existing = el.id();
    if !existing.is_empty() {
        return existing;
    }

    let id = format!("toc_{:x}", generate_hash());
    el.set_id(&id);
    id
}

static COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_hash() -> u64 {
    let mut hasher = DefaultHasher::new();
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    counter.hash(&mut hasher);
    hasher.finish()
}
