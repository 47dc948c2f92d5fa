//! Blocklist and duplicate filtering applied before posts are stored.

use std::collections::HashMap;

use buzz_core::Post;

/// Copyright disputes, demonetisation drama and impression-farming posts.
pub const COPYRIGHT_KEYWORDS: &[&str] = &[
    "著作権",
    "版権",
    "海賊版",
    "収益化停止",
    "収益化が停止",
    "剥奪",
    "侵害",
    "インプレゾンビ",
];

/// Giveaway campaigns and lead-magnet spam.
pub const GIVEAWAY_KEYWORDS: &[&str] = &[
    "プレゼント企画",
    "抽選で",
    "当選者",
    "フォロー&RT",
    "フォロー＆RT",
    "フォローとRT",
    "RTで応募",
    "応募方法",
    "無料配布",
    "配布中",
    "DMで受け取",
    "LINE登録で",
];

/// Substring blocklist. A post is blocked when its text contains any keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockList {
    keywords: Vec<String>,
}

impl Default for BlockList {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BlockList {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.is_empty())
                .collect(),
        }
    }

    /// Copyright and giveaway keywords.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(COPYRIGHT_KEYWORDS.iter().chain(GIVEAWAY_KEYWORDS).copied())
    }

    /// The first keyword found in `text`, if any.
    #[must_use]
    pub fn matched(&self, text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| text.contains(k.as_str()))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_blocked(&self, text: &str) -> bool {
        self.matched(text).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Collapse posts sharing `(account, text)` into one, keeping the row with
/// the most likes (the earliest on ties). Output keeps first-seen order.
///
/// Returns the surviving posts and the number removed.
#[must_use]
pub fn dedupe_posts(posts: Vec<Post>) -> (Vec<Post>, usize) {
    let before = posts.len();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut kept: Vec<Post> = Vec::with_capacity(posts.len());

    for post in posts {
        let key = (post.account.clone(), post.text.clone());
        match index.get(&key) {
            Some(&slot) => {
                if post.likes > kept[slot].likes {
                    kept[slot] = post;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(post);
            }
        }
    }

    let removed = before - kept.len();
    (kept, removed)
}

/// Keep only each account's most-liked post, ordered by likes descending.
///
/// Buzz corpora are meant to sample many authors; a single prolific account
/// otherwise dominates every aggregate.
#[must_use]
pub fn keep_top_per_account(posts: Vec<Post>) -> Vec<Post> {
    let mut best: HashMap<String, Post> = HashMap::new();
    for post in posts {
        match best.get(&post.account) {
            Some(current) if current.likes >= post.likes => {}
            _ => {
                best.insert(post.account.clone(), post);
            }
        }
    }

    let mut top: Vec<Post> = best.into_values().collect();
    top.sort_by(|a, b| {
        b.likes
            .cmp(&a.likes)
            .then_with(|| a.account.cmp(&b.account))
    });
    top
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub posts: Vec<Post>,
    pub blocked: usize,
    pub duplicates: usize,
}

/// Drop blocklisted posts, then collapse duplicates.
#[must_use]
pub fn apply_filters(posts: Vec<Post>, blocklist: &BlockList) -> FilterOutcome {
    let before = posts.len();
    let allowed: Vec<Post> = posts
        .into_iter()
        .filter(|post| match blocklist.matched(&post.text) {
            Some(keyword) => {
                tracing::debug!(account = %post.account, keyword, "blocked post");
                false
            }
            None => true,
        })
        .collect();
    let blocked = before - allowed.len();

    let (posts, duplicates) = dedupe_posts(allowed);
    if blocked > 0 || duplicates > 0 {
        tracing::info!(blocked, duplicates, kept = posts.len(), "filtered posts");
    }

    FilterOutcome {
        posts,
        blocked,
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(account: &str, text: &str, likes: u64) -> Post {
        Post {
            likes,
            ..Post::new(account, text)
        }
    }

    #[test]
    fn builtin_blocklist_catches_giveaways() {
        let list = BlockList::builtin();
        assert_eq!(
            list.matched("【プレゼント企画】フォロー＆RTで応募"),
            Some("プレゼント企画")
        );
        assert!(!list.is_blocked("3つの方法で月5万円稼いだ"));
    }

    #[test]
    fn builtin_blocklist_catches_copyright_drama() {
        let list = BlockList::builtin();
        let cases = [
            ("著作権侵害で通報", "著作権"),
            ("版権物を載せる", "版権"),
            ("海賊版サイトを見つけた", "海賊版"),
            ("収益化停止されました", "収益化停止"),
            ("ついに収益化が停止した", "収益化が停止"),
            ("アカウントが剥奪された", "剥奪"),
            ("肖像権の侵害です", "侵害"),
            ("インプレゾンビ対策まとめ", "インプレゾンビ"),
        ];
        for (text, keyword) in cases {
            assert_eq!(list.matched(text), Some(keyword), "{text}");
        }
    }

    #[test]
    fn empty_keywords_are_ignored() {
        let list = BlockList::new(["", "spam"]);
        assert_eq!(list.len(), 1);
        assert!(!list.is_blocked("anything"));
    }

    #[test]
    fn dedupe_keeps_highest_likes() {
        let posts = vec![
            post("alice", "hello", 5),
            post("bob", "hello", 1),
            post("alice", "hello", 9),
            post("alice", "hello", 9),
            post("alice", "other", 2),
        ];
        let (kept, removed) = dedupe_posts(posts);
        assert_eq!(removed, 2);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].account, "alice");
        assert_eq!(kept[0].likes, 9);
        assert_eq!(kept[1].account, "bob");
        assert_eq!(kept[2].text, "other");
    }

    #[test]
    fn dedupe_leaves_exactly_one_row_per_pair() {
        let posts = (0..10).map(|i| post("a", "same", i)).collect();
        let (kept, removed) = dedupe_posts(posts);
        assert_eq!(kept.len(), 1);
        assert_eq!(removed, 9);
        assert_eq!(kept[0].likes, 9);
    }

    #[test]
    fn top_per_account_picks_best_post() {
        let posts = vec![
            post("alice", "a1", 3),
            post("bob", "b1", 10),
            post("alice", "a2", 7),
        ];
        let top = keep_top_per_account(posts);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].account.as_str(), top[0].likes), ("bob", 10));
        assert_eq!((top[1].account.as_str(), top[1].text.as_str()), ("alice", "a2"));
    }

    #[test]
    fn apply_filters_counts_each_stage() {
        let posts = vec![
            post("alice", "useful tip", 4),
            post("alice", "useful tip", 8),
            post("spam", "抽選で10名様", 100),
        ];
        let outcome = apply_filters(posts, &BlockList::builtin());
        assert_eq!(outcome.blocked, 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(outcome.posts.len(), 1);
        assert_eq!(outcome.posts[0].likes, 8);
    }
}
