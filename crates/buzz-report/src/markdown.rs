//! Markdown analysis report.
//!
//! Each section renders on its own. A section that cannot be produced is
//! replaced by a one-line note and logged; the rest of the report still
//! renders.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use buzz_core::Post;
use buzz_scorer::{build_all_scorers, AlgorithmScorer, RuleSet, Scorer};
use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::accounts::account_summaries;
use crate::correlation::{format_correlation, strategy_correlations};
use crate::error::ReportError;
use crate::group::{group_by, Dimension};
use crate::stats::{mean, median};

/// Characters of post text shown per top post.
const EXCERPT_CHARS: usize = 200;

/// Engagement weights attributed to the ranking model: a reply counts far
/// more than a like.
pub const WEIGHTED_LIKE: f64 = 0.5;
pub const WEIGHTED_REPOST: f64 = 1.0;
pub const WEIGHTED_REPLY: f64 = 13.5;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub dimensions: Vec<Dimension>,
    pub top_n: usize,
    pub min_account_posts: usize,
    pub utc_offset: FixedOffset,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Buzz post analysis".to_string(),
            dimensions: vec![
                Dimension::Category,
                Dimension::OpeningPattern,
                Dimension::HourOfDay,
                Dimension::DayOfWeek,
                Dimension::TimeSlot,
            ],
            top_n: 10,
            min_account_posts: 3,
            utc_offset: FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

/// Likes, reposts and replies weighted as the ranking model is believed to
/// weigh them.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weighted_engagement(post: &Post) -> f64 {
    post.likes as f64 * WEIGHTED_LIKE
        + post.retweets as f64 * WEIGHTED_REPOST
        + post.replies as f64 * WEIGHTED_REPLY
}

struct ReportContext<'a> {
    posts: &'a [Post],
    rules: &'a Arc<RuleSet>,
    scorers: Vec<Box<dyn Scorer>>,
    options: &'a ReportOptions,
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Summary,
    Dimension(Dimension),
    TopPosts,
    Correlation,
    Accounts,
}

impl Section {
    fn title(self, options: &ReportOptions) -> String {
        match self {
            Section::Summary => "Summary".to_string(),
            Section::Dimension(d) => format!("By {}", d.title().to_lowercase()),
            Section::TopPosts => format!("Top {} posts", options.top_n),
            Section::Correlation => "Strategy correlation".to_string(),
            Section::Accounts => "Accounts".to_string(),
        }
    }

    fn render(self, ctx: &ReportContext<'_>) -> Result<String, ReportError> {
        match self {
            Section::Summary => summary_section(ctx),
            Section::Dimension(d) => dimension_section(ctx, d),
            Section::TopPosts => top_posts_section(ctx),
            Section::Correlation => correlation_section(ctx),
            Section::Accounts => accounts_section(ctx),
        }
    }
}

/// Render the full analysis report for `posts`.
#[must_use]
pub fn render_analysis_report(
    posts: &[Post],
    rules: &Arc<RuleSet>,
    options: &ReportOptions,
    generated_at: DateTime<Utc>,
) -> String {
    let ctx = ReportContext {
        posts,
        rules,
        scorers: build_all_scorers(rules),
        options,
    };

    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", options.title);
    let _ = writeln!(
        out,
        "**Generated:** {}\n",
        generated_at
            .with_timezone(&options.utc_offset)
            .format("%Y-%m-%d %H:%M %:z")
    );

    let mut sections = vec![Section::Summary];
    let mut seen = BTreeSet::new();
    for dimension in &options.dimensions {
        if seen.insert(dimension.as_str()) {
            sections.push(Section::Dimension(*dimension));
        }
    }
    sections.extend([Section::TopPosts, Section::Correlation, Section::Accounts]);

    for section in sections {
        let title = section.title(options);
        let _ = writeln!(out, "## {title}\n");
        match section.render(&ctx) {
            Ok(body) => out.push_str(&body),
            Err(err) => {
                tracing::warn!(section = %title, error = %err, "report section skipped");
                let _ = writeln!(out, "_Section skipped: {err}_\n");
            }
        }
    }
    out
}

/// Replace characters that would break a Markdown table row.
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[allow(clippy::cast_precision_loss, clippy::unnecessary_wraps)]
fn summary_section(ctx: &ReportContext<'_>) -> Result<String, ReportError> {
    let likes: Vec<f64> = ctx.posts.iter().map(|p| p.likes as f64).collect();
    let weighted: Vec<f64> = ctx.posts.iter().map(weighted_engagement).collect();
    let accounts: BTreeSet<&str> = ctx
        .posts
        .iter()
        .map(|p| p.account.as_str())
        .filter(|a| !a.is_empty())
        .collect();
    let dated = ctx.posts.iter().filter(|p| p.posted_at().is_some()).count();

    let mut out = String::new();
    let _ = writeln!(out, "- Posts analysed: {}", ctx.posts.len());
    let _ = writeln!(out, "- Accounts: {}", accounts.len());
    let _ = writeln!(out, "- Posts with a parseable date: {dated}");
    let _ = writeln!(out, "- Mean likes: {:.1}", mean(&likes));
    let _ = writeln!(out, "- Median likes: {:.1}", median(&likes));
    let _ = writeln!(
        out,
        "- Mean weighted engagement (likes×{WEIGHTED_LIKE} + reposts×{WEIGHTED_REPOST} + replies×{WEIGHTED_REPLY}): {:.1}\n",
        mean(&weighted)
    );
    Ok(out)
}

fn dimension_section(ctx: &ReportContext<'_>, dimension: Dimension) -> Result<String, ReportError> {
    let groups = group_by(ctx.posts, dimension, ctx.rules, ctx.options.utc_offset);
    if groups.is_empty() {
        return Err(ReportError::NotEnoughData {
            section: dimension.as_str(),
            reason: if dimension.is_time_based() {
                "no post has a parseable date".to_string()
            } else {
                "no posts".to_string()
            },
        });
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "| {} | Posts | Mean likes | Median likes | Mean reposts | Mean replies | Mean engagement |",
        dimension.title()
    );
    out.push_str("|---|---:|---:|---:|---:|---:|---:|\n");
    for g in &groups {
        let _ = writeln!(
            out,
            "| {} | {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} |",
            table_cell(&g.key),
            g.count,
            g.mean_likes,
            g.median_likes,
            g.mean_retweets,
            g.mean_replies,
            g.mean_engagement
        );
    }
    out.push('\n');
    Ok(out)
}

fn top_posts_section(ctx: &ReportContext<'_>) -> Result<String, ReportError> {
    if ctx.posts.is_empty() || ctx.options.top_n == 0 {
        return Err(ReportError::NotEnoughData {
            section: "top_posts",
            reason: "no posts".to_string(),
        });
    }

    let mut ranked: Vec<&Post> = ctx.posts.iter().collect();
    ranked.sort_by(|a, b| b.likes.cmp(&a.likes));

    let mut out = String::new();
    for (rank, post) in ranked.iter().take(ctx.options.top_n).enumerate() {
        let _ = writeln!(
            out,
            "### {}. {} likes · @{}\n",
            rank + 1,
            post.likes,
            if post.account.is_empty() { "unknown" } else { &post.account }
        );
        let _ = writeln!(out, "```\n{}\n```\n", excerpt(&post.text, EXCERPT_CHARS));
        let _ = writeln!(
            out,
            "- Reposts: {} · Replies: {}",
            post.retweets, post.replies
        );
        if let Some(url) = &post.url {
            let _ = writeln!(out, "- URL: {url}");
        }

        let mut totals = Vec::with_capacity(ctx.scorers.len());
        let mut breakdown = String::new();
        for scorer in &ctx.scorers {
            let result = scorer.score(&post.text, Some(&post.created_at));
            totals.push(format!("{} {}", result.strategy, result.total_score));
            if result.strategy == AlgorithmScorer::NAME {
                breakdown = result
                    .factors
                    .iter()
                    .map(|f| format!("{} {:+}", f.name, f.points))
                    .collect::<Vec<_>>()
                    .join(", ");
            }
        }
        let _ = writeln!(out, "- Scores: {}", totals.join(" · "));
        if !breakdown.is_empty() {
            let _ = writeln!(out, "- Algorithm factors: {breakdown}");
        }
        out.push('\n');
    }
    Ok(out)
}

fn correlation_section(ctx: &ReportContext<'_>) -> Result<String, ReportError> {
    if ctx.posts.len() < 2 {
        return Err(ReportError::NotEnoughData {
            section: "strategy_correlation",
            reason: format!("{} post(s), need at least 2", ctx.posts.len()),
        });
    }

    let mut out = String::new();
    out.push_str("| Strategy | Correlation with likes | Mean score | Sample size |\n");
    out.push_str("|---|---:|---:|---:|\n");
    for c in strategy_correlations(ctx.posts, &ctx.scorers) {
        let _ = writeln!(
            out,
            "| {} | {} | {:.1} | {} |",
            c.strategy,
            format_correlation(c.correlation),
            c.mean_score,
            c.sample_size
        );
    }
    out.push('\n');
    Ok(out)
}

fn accounts_section(ctx: &ReportContext<'_>) -> Result<String, ReportError> {
    let summaries = account_summaries(ctx.posts, ctx.rules, ctx.options.min_account_posts);
    if summaries.is_empty() {
        return Err(ReportError::NotEnoughData {
            section: "accounts",
            reason: format!(
                "no account has {} or more posts",
                ctx.options.min_account_posts
            ),
        });
    }

    let mut out = String::new();
    out.push_str(
        "| Account | Posts | Mean likes | Max likes | Top category | Top opening | Tone | Emotion | Algorithm | Questions | Disclosure | Length | Posts/day |\n",
    );
    out.push_str("|---|---:|---:|---:|---|---|---|---|---:|---:|---:|---:|---:|\n");
    for s in &summaries {
        let _ = writeln!(
            out,
            "| @{} | {} | {:.1} | {} | {} | {} | {} | {} | {:.1} | {:.0}% | {:.0}% | {:.0} | {} |",
            table_cell(&s.account),
            s.post_count,
            s.mean_likes,
            s.max_likes,
            s.top_category,
            s.top_opening,
            s.top_tone,
            s.top_emotion,
            s.mean_algorithm_score,
            s.question_rate * 100.0,
            s.self_disclosure_rate * 100.0,
            s.mean_length,
            s.posts_per_day
                .map_or_else(|| "n/a".to_string(), |d| format!("{d:.2}"))
        );
    }
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(account: &str, text: &str, likes: u64, created_at: &str) -> Post {
        Post {
            likes,
            retweets: 2,
            replies: 1,
            created_at: created_at.to_string(),
            ..Post::new(account, text)
        }
    }

    fn corpus() -> Vec<Post> {
        vec![
            post("alice", "3つの方法で月5万円稼いだ\n・手順1\n・手順2", 900, "2026-02-17 21:05:00"),
            post("alice", "正直、最初はしんどかった", 120, "2026-02-18 07:30:00"),
            post("alice", "みなさんはどう思う？", 40, "2026-02-19 12:00:00"),
            post("bob", "新機能がリリースされました", 15, "bad date"),
        ]
    }

    #[test]
    fn weighted_engagement_favours_replies() {
        let p = post("a", "x", 10, "");
        assert!((weighted_engagement(&p) - (5.0 + 2.0 + 13.5)).abs() < 1e-9);
    }

    #[test]
    fn excerpt_truncates_by_character() {
        assert_eq!(excerpt("あいうえお", 3), "あいう…");
        assert_eq!(excerpt("abc", 3), "abc");
    }

    #[test]
    fn table_cell_escapes_pipes_and_newlines() {
        assert_eq!(table_cell("a|b\nc"), "a\\|b c");
    }

    #[test]
    fn renders_every_section() {
        let rules = Arc::new(RuleSet::new());
        let report = render_analysis_report(&corpus(), &rules, &ReportOptions::default(), Utc::now());

        assert!(report.starts_with("# Buzz post analysis"));
        for heading in [
            "## Summary",
            "## By category",
            "## By opening pattern",
            "## By hour of day",
            "## By day of week",
            "## By time slot",
            "## Top 10 posts",
            "## Strategy correlation",
            "## Accounts",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains("- Posts analysed: 4"));
        assert!(report.contains("### 1. 900 likes · @alice"));
        assert!(report.contains("| @alice | 3 |"));
        assert!(report.contains("| 21:00 |"));
    }

    #[test]
    fn failing_sections_do_not_abort_the_report() {
        let rules = Arc::new(RuleSet::new());
        let posts = vec![post("bob", "hello", 1, "not a date")];
        let report = render_analysis_report(&posts, &rules, &ReportOptions::default(), Utc::now());

        assert!(report.contains("## By hour of day\n\n_Section skipped: not enough data for hour_of_day"));
        assert!(report.contains("## Strategy correlation\n\n_Section skipped:"));
        assert!(report.contains("## Accounts\n\n_Section skipped:"));
        // later sections still render after a skipped one
        assert!(report.contains("### 1. 1 likes · @bob"));
    }

    #[test]
    fn duplicate_dimensions_render_once() {
        let rules = Arc::new(RuleSet::new());
        let options = ReportOptions {
            dimensions: vec![Dimension::Account, Dimension::Account],
            ..ReportOptions::default()
        };
        let report = render_analysis_report(&corpus(), &rules, &options, Utc::now());
        assert_eq!(report.matches("## By account").count(), 1);
    }
}
