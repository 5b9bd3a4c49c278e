//! Data models for the blog

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Free-form JSON object stored for a post
pub type Document = Map<String, Value>;

/// A blog post: a store-assigned id plus an arbitrary document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: Document,
}

impl Post {
    pub fn new(id: Uuid, fields: Document) -> Self {
        Self { id, fields }
    }

    /// Look up a single top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Public view of a user account.
///
/// The password hash never leaves the backend, so it has no place here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_serializes_flat() {
        let id = Uuid::new_v4();
        let mut fields = Document::new();
        fields.insert("title".into(), json!("t"));
        fields.insert("body".into(), json!("b"));

        let value = serde_json::to_value(Post::new(id, fields)).unwrap();
        assert_eq!(value, json!({ "id": id, "title": "t", "body": "b" }));
    }

    #[test]
    fn test_post_deserializes_flat() {
        let id = Uuid::new_v4();
        let post: Post =
            serde_json::from_value(json!({ "id": id, "title": "t", "tags": ["a"] })).unwrap();

        assert_eq!(post.id, id);
        assert_eq!(post.get("title"), Some(&json!("t")));
        assert_eq!(post.get("tags"), Some(&json!(["a"])));
        assert!(post.get("id").is_none());
    }
}
