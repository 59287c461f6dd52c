use serde::{Deserialize, Serialize};

/// A file attached to an event, typically a Drive document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub title: String,
    pub file_url: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_link: Option<String>,
}

impl Attachment {
    pub fn new(
        title: impl Into<String>,
        file_url: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            file_url: file_url.into(),
            mime_type: mime_type.into(),
            icon_link: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attachment_uses_camel_case_keys() {
        let attachment = Attachment::new(
            "My file1",
            "https://file.url1",
            "application/vnd.google-apps.document",
        );

        assert_eq!(
            serde_json::to_value(&attachment).unwrap(),
            json!({
                "title": "My file1",
                "fileUrl": "https://file.url1",
                "mimeType": "application/vnd.google-apps.document"
            })
        );
    }
}
