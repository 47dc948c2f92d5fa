//! Wire types for the tweet search API.

use buzz_core::Post;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAuthor {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub followers_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTweet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub author: ApiAuthor,
}

impl ApiTweet {
    /// Canonical status URL, preferring the one the API supplied.
    #[must_use]
    pub fn status_url(&self) -> Option<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_owned());
        }
        if self.author.user_name.is_empty() || self.id.is_empty() {
            return None;
        }
        Some(format!(
            "https://x.com/{}/status/{}",
            self.author.user_name, self.id
        ))
    }

    #[must_use]
    pub fn into_post(self, source: &str) -> Post {
        let url = self.status_url();
        Post {
            text: self.text,
            account: self.author.user_name,
            likes: self.like_count,
            retweets: self.retweet_count,
            replies: self.reply_count,
            impressions: self.view_count,
            created_at: self.created_at,
            url,
            source: Some(source.to_owned()),
        }
    }
}

/// `data` envelope used by the timeline endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetData {
    #[serde(default)]
    pub tweets: Vec<ApiTweet>,
}

/// One page of results. Search returns `tweets` at the top level; the user
/// timeline nests them under `data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetPage {
    #[serde(default)]
    pub tweets: Vec<ApiTweet>,
    #[serde(default)]
    pub data: Option<TweetData>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl TweetPage {
    /// Cursor for the following page, if the API reports one.
    #[must_use]
    pub fn next(&self) -> Option<&str> {
        if !self.has_next_page {
            return None;
        }
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }

    #[must_use]
    pub fn into_tweets(self) -> Vec<ApiTweet> {
        let mut tweets = self.tweets;
        if let Some(data) = self.data {
            tweets.extend(data.tweets);
        }
        tweets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_page() {
        let json = r#"{
            "tweets": [{
                "id": "123",
                "text": "3つの方法",
                "likeCount": 420,
                "retweetCount": 12,
                "replyCount": 3,
                "viewCount": 9000,
                "createdAt": "Tue Feb 17 12:05:00 +0000 2026",
                "author": { "userName": "alice", "followersCount": 1500 },
                "lang": "ja"
            }],
            "has_next_page": true,
            "next_cursor": "abc"
        }"#;
        let page: TweetPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.next(), Some("abc"));

        let post = page.into_tweets().remove(0).into_post("api:test");
        assert_eq!(post.account, "alice");
        assert_eq!(post.likes, 420);
        assert_eq!(post.impressions, 9000);
        assert_eq!(post.url.as_deref(), Some("https://x.com/alice/status/123"));
        assert_eq!(post.source.as_deref(), Some("api:test"));
        assert!(post.posted_at().is_some());
    }

    #[test]
    fn parses_nested_timeline_page() {
        let json = r#"{
            "status": "success",
            "data": { "tweets": [{ "id": "1", "text": "hi", "author": { "userName": "bob" } }] },
            "has_next_page": false
        }"#;
        let page: TweetPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.next(), None);
        assert_eq!(page.into_tweets().len(), 1);
    }

    #[test]
    fn empty_cursor_ends_pagination() {
        let page = TweetPage {
            has_next_page: true,
            next_cursor: Some(String::new()),
            ..TweetPage::default()
        };
        assert_eq!(page.next(), None);
    }

    #[test]
    fn status_url_needs_id_and_author() {
        let tweet = ApiTweet {
            id: "9".into(),
            ..ApiTweet::default()
        };
        assert_eq!(tweet.status_url(), None);
    }
}
