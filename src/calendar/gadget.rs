use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GadgetDisplay {
    Icon,
    Chip,
}

/// Legacy attachment-like record still returned by the Calendar API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gadget {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub link: String,
    pub icon_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<GadgetDisplay>,
}

impl Gadget {
    pub fn new(
        title: impl Into<String>,
        kind: impl Into<String>,
        link: impl Into<String>,
        icon_link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            kind: kind.into(),
            link: link.into(),
            icon_link: icon_link.into(),
            width: None,
            height: None,
            display: None,
        }
    }

    pub fn with_display(mut self, display: GadgetDisplay) -> Self {
        self.display = Some(display);
        self
    }
}
