use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One imported post, shaped after the publishing API's post parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostRecord {
    /// Text of a leading `# ` heading, empty when there was none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub body: String,
    /// Modification time of the file or archive entry the post came from.
    #[serde(rename = "created", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(rename = "collection", default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl PostRecord {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_created_at(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_with_api_field_names() {
        let mut post = PostRecord::new("Hello", "world")
            .with_created_at(Some(Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap()));
        post.slug = Some("hello-world".to_string());
        post.collection_id = Some("blog".to_string());
        post.source_id = Some("abc123".to_string());

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["title"], "Hello");
        assert_eq!(json["body"], "world");
        assert_eq!(json["created"], "2020-05-01T12:00:00Z");
        assert_eq!(json["slug"], "hello-world");
        assert_eq!(json["collection"], "blog");
        assert_eq!(json["id"], "abc123");
    }

    #[test]
    fn test_omits_absent_fields() {
        let post = PostRecord::new("", "just a body");
        let json = serde_json::to_value(&post).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["body"], "just a body");
    }
}
