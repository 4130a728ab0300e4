use serde::{Deserialize, Serialize};

/// One entry in the rendered outline.
///
/// `id` is the DOM id of the heading line and is unique and stable for the
/// lifetime of that element. Titles are trimmed display text; duplicates
/// across entries are allowed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeadingDescriptor {
    pub id: String,
    pub title: String,
}

/// Persisted panel placement, in viewport pixels.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub(crate) struct PanelPosition {
    pub left: f64,
    pub top: f64,
}
