use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response of the `/api/v1/access_token` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

#[derive(Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<Thing<T>>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        self.data
            .children
            .into_iter()
            .map(|thing| thing.data)
            .collect()
    }
}

/// A link submission (`t3`). Missing fields deserialize to defaults so a
/// single odd entry never fails a whole listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub ups: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub permalink: String,
}

impl Post {
    /// Fullname used by `by_id` lookups, e.g. `t3_abc123`.
    pub fn fullname(&self) -> String {
        if self.name.is_empty() {
            format!("t3_{}", self.id)
        } else {
            self.name.clone()
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_utc as i64, 0)
    }
}

/// A comment (`t1`) from the community comment stream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    /// Fullname of the post the comment belongs to (`t3_...`).
    #[serde(default)]
    pub link_id: String,
    #[serde(default)]
    pub link_title: String,
}

impl Comment {
    /// Bare ID of the parent post, without the `t3_` prefix.
    pub fn post_id(&self) -> &str {
        self.link_id
            .strip_prefix("t3_")
            .unwrap_or(&self.link_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP_LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_b2",
            "children": [
                {"kind": "t3", "data": {"id": "a1", "name": "t3_a1", "title": "Post A", "author": "alice", "ups": 10, "score": 10, "created_utc": 1700000000.0}},
                {"kind": "t3", "data": {"id": "b2", "title": "Post B", "author": "bob", "ups": 20}}
            ]
        }
    }"#;

    #[test]
    fn test_listing_into_items() {
        let listing: Listing<Post> = serde_json::from_str(TOP_LISTING).unwrap();
        assert_eq!(listing.data.after.as_deref(), Some("t3_b2"));

        let posts = listing.into_items();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Post A");
        assert_eq!(posts[1].ups, 20);
        assert_eq!(posts[1].score, 0);
    }

    #[test]
    fn test_fullname_falls_back_to_id() {
        let listing: Listing<Post> = serde_json::from_str(TOP_LISTING).unwrap();
        let posts = listing.into_items();

        assert_eq!(posts[0].fullname(), "t3_a1");
        assert_eq!(posts[1].fullname(), "t3_b2");
    }

    #[test]
    fn test_created_at() {
        let post = Post {
            created_utc: 1_700_000_000.0,
            ..Default::default()
        };
        assert_eq!(
            post.created_at().map(|t| t.to_rfc3339()),
            Some("2023-11-14T22:13:20+00:00".to_string())
        );
    }

    #[test]
    fn test_comment_post_id() {
        let comment = Comment {
            link_id: "t3_xyz".to_string(),
            ..Default::default()
        };
        assert_eq!(comment.post_id(), "xyz");

        let bare = Comment {
            link_id: "xyz".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.post_id(), "xyz");
    }

    #[test]
    fn test_access_token_missing_fields() {
        let token: AccessToken = serde_json::from_str(r#"{"error": 401}"#).unwrap();
        assert!(token.access_token.is_empty());
    }
}
