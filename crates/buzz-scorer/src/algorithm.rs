//! Ranking-signal score.
//!
//! Estimates how a post fares against the engagement signals the platform's
//! ranker is believed to weight: replies, dwell time, conversation depth,
//! tone, bookmarks, profile clicks and early reactions, minus a penalty for
//! off-platform links.

use std::sync::Arc;

use buzz_core::{Factor, ScoreResult};
use regex::Regex;
use serde::Serialize;

use crate::classify::{compile, compile_keyed, first_line, line_breaks, RuleSet};
use crate::tone::{Tone, ToneRules};
use crate::weights::StepTable;
use crate::{is_blank, zero_if_blank, Scorer};

const REPLY_TRIGGERS: &[(&str, i32)] = &[
    (r"[\?？]", 3),
    (r"どう思|教えて|みんなは|皆さんは|あなたは|聞きたい|知りたい", 4),
    (r"vs|VS|それとも|どっち|AかBか|賛否|議論", 3),
    (r"同じ人|経験ある|やったことある|わかる人|共感", 2),
    (r"正直|ぶっちゃけ|実は|告白|本音", 2),
    (r"かもしれない|知らんけど|異論は認める|怒られそう", 2),
];

const BOOKMARK_TRIGGERS: &[(&str, i32)] = &[
    (r"保存|ブクマ|ブックマーク|メモ|後で", 3),
    (r"選|つのコツ|つの方法|ステップ|手順|まとめ|一覧|チェックリスト", 3),
    (r"\d+[万円個件つ%]", 2),
    (r"テンプレ|フレームワーク|型|フォーマット|雛形", 3),
];

const PROFILE_TRIGGERS: &[(&str, i32)] = &[
    (r"プロフ|固ツイ|固定ツイート|自己紹介", 2),
    (r"年目|月目|万フォロワー|実績|経歴|専門", 2),
    (r"秘密|内緒|ここだけ|限定|非公開", 2),
    (r"(僕|私|俺).{0,10}(実は|正直|ぶっちゃけ)", 2),
];

const THREAD_STARTER: &[(&str, &str)] = &[
    ("explicit_thread", r"🧵|スレッド"),
    ("numbered_start", r"1/\d|①|1\."),
    ("points_below", r"以下|↓|👇|⬇"),
    ("thread_declared", r"長くなるので|連投します|スレにします"),
];

const THREAD_CONTINUATION: &[(&str, &str)] = &[
    ("to_be_continued", r"続く|つづく|続きは|次は"),
    ("sequence_start", r"まず|最初に|第一に"),
    ("trailing_ellipsis", r"\.{3,}$|…$"),
];

const THREAD_CONVERSATION: &[(&str, &str)] = &[
    ("ends_with_question", r"[\?？]$"),
    ("asks_opinion", r"どう思|教えて|みんなは|意見"),
    ("direct_address", r"あなたは|君は|皆さんは"),
];

const DWELL_BULLET: &str = r"(?m)^(?:[・\-✅☑①-⑳]|\d+[.)）])";
const DWELL_NUMBER: &str = r"\d+[万円個件つ%倍]";
const DWELL_EMOTION: &str = r"衝撃|驚|ヤバ|やば|マジで|ガチで|信じられない";
const DWELL_MEDIA: &str = r"画像|写真|スクショ|動画|📸|📹|🖼";
const EARLY_HOOK: &str = r"[！!？?]";
const EARLY_EMOTION: &str = r"マジで|ガチで|ヤバい|やばい|すごい|神|最強|衝撃";
const URL_HOST: &str = r"https?://([^\s/]+)";

/// Hosts that count as on-platform links.
pub const PLATFORM_DOMAINS: &[&str] = &["x.com", "twitter.com", "t.co", "pbs.twimg.com"];

/// Weighted keyword triggers: `min(cap, multiplier * sum(weights of matches))`.
#[derive(Debug)]
struct TriggerGroup {
    triggers: Vec<(Regex, i32)>,
    multiplier: i32,
    cap: i32,
}

impl TriggerGroup {
    fn new(table: &[(&str, i32)], multiplier: i32, cap: i32) -> Self {
        Self {
            triggers: table.iter().map(|(p, w)| (compile(p), *w)).collect(),
            multiplier,
            cap,
        }
    }

    fn score(&self, text: &str) -> i32 {
        let sum: i32 = self
            .triggers
            .iter()
            .filter(|(re, _)| re.is_match(text))
            .map(|(_, weight)| *weight)
            .sum();
        sum.saturating_mul(self.multiplier).min(self.cap)
    }
}

/// Which thread/conversation signals a post carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThreadSignals {
    pub is_thread_starter: bool,
    pub has_continuation_hint: bool,
    pub invites_conversation: bool,
    pub signals: Vec<&'static str>,
}

/// Hosts of the links found in a post, split by platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkSignals {
    pub external_hosts: Vec<String>,
    pub platform_hosts: Vec<String>,
}

impl LinkSignals {
    #[must_use]
    pub fn has_external_link(&self) -> bool {
        !self.external_hosts.is_empty()
    }

    #[must_use]
    pub fn has_platform_link(&self) -> bool {
        !self.platform_hosts.is_empty()
    }
}

/// Point values for the ranking-signal strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmWeights {
    pub reply_multiplier: i32,
    pub reply_cap: i32,
    pub dwell_cap: i32,
    pub dwell_length: StepTable,
    pub thread_starter: i32,
    pub thread_continuation: i32,
    pub thread_conversation: i32,
    pub tone_constructive: i32,
    pub tone_positive: i32,
    pub tone_neutral: i32,
    pub tone_constructive_provocation: i32,
    pub tone_negative: i32,
    pub tone_aggressive: i32,
    pub bookmark_multiplier: i32,
    pub bookmark_cap: i32,
    pub external_link_penalty: i32,
    pub platform_link_penalty: i32,
    pub profile_multiplier: i32,
    pub profile_cap: i32,
    pub early_multiplier: i32,
    pub early_cap: i32,
    /// First lines up to this many characters count as a quick hook.
    pub early_first_line_max: usize,
    /// Whole posts up to this many characters count as a quick read.
    pub early_short_text_max: usize,
}

impl Default for AlgorithmWeights {
    fn default() -> Self {
        Self {
            reply_multiplier: 3,
            reply_cap: 25,
            dwell_cap: 20,
            dwell_length: StepTable::new(&[(79, 1), (149, 2), (249, 3), (399, 5)], 6),
            thread_starter: 15,
            thread_continuation: 10,
            thread_conversation: 8,
            tone_constructive: 15,
            tone_positive: 12,
            tone_neutral: 8,
            tone_constructive_provocation: 10,
            tone_negative: 3,
            tone_aggressive: 0,
            bookmark_multiplier: 2,
            bookmark_cap: 10,
            external_link_penalty: -15,
            platform_link_penalty: -3,
            profile_multiplier: 2,
            profile_cap: 10,
            early_multiplier: 2,
            early_cap: 5,
            early_first_line_max: 40,
            early_short_text_max: 140,
        }
    }
}

impl AlgorithmWeights {
    fn tone_points(&self, tone: Tone) -> i32 {
        match tone {
            Tone::Constructive => self.tone_constructive,
            Tone::Positive => self.tone_positive,
            Tone::Neutral => self.tone_neutral,
            Tone::ConstructiveProvocation => self.tone_constructive_provocation,
            Tone::Negative => self.tone_negative,
            Tone::Aggressive => self.tone_aggressive,
        }
    }
}

pub struct AlgorithmScorer {
    rules: Arc<RuleSet>,
    tone: ToneRules,
    weights: AlgorithmWeights,
    reply: TriggerGroup,
    bookmark: TriggerGroup,
    profile: TriggerGroup,
    thread_starter: Vec<(&'static str, Regex)>,
    thread_continuation: Vec<(&'static str, Regex)>,
    thread_conversation: Vec<(&'static str, Regex)>,
    dwell_bullet: Regex,
    dwell_number: Regex,
    dwell_emotion: Regex,
    dwell_media: Regex,
    early_hook: Regex,
    early_emotion: Regex,
    url_host: Regex,
}

impl AlgorithmScorer {
    pub const NAME: &'static str = "algorithm";

    #[must_use]
    pub fn new(rules: Arc<RuleSet>, weights: AlgorithmWeights) -> Self {
        Self {
            reply: TriggerGroup::new(REPLY_TRIGGERS, weights.reply_multiplier, weights.reply_cap),
            bookmark: TriggerGroup::new(
                BOOKMARK_TRIGGERS,
                weights.bookmark_multiplier,
                weights.bookmark_cap,
            ),
            profile: TriggerGroup::new(
                PROFILE_TRIGGERS,
                weights.profile_multiplier,
                weights.profile_cap,
            ),
            thread_starter: compile_keyed(THREAD_STARTER),
            thread_continuation: compile_keyed(THREAD_CONTINUATION),
            thread_conversation: compile_keyed(THREAD_CONVERSATION),
            dwell_bullet: compile(DWELL_BULLET),
            dwell_number: compile(DWELL_NUMBER),
            dwell_emotion: compile(DWELL_EMOTION),
            dwell_media: compile(DWELL_MEDIA),
            early_hook: compile(EARLY_HOOK),
            early_emotion: compile(EARLY_EMOTION),
            url_host: compile(URL_HOST),
            tone: ToneRules::new(),
            rules,
            weights,
        }
    }

    #[must_use]
    pub fn detect_thread_structure(&self, text: &str) -> ThreadSignals {
        let text = text.trim_end();
        let mut signals = ThreadSignals::default();
        let mut collect = |table: &[(&'static str, Regex)]| -> bool {
            let mut any = false;
            for (name, re) in table {
                if re.is_match(text) {
                    signals.signals.push(*name);
                    any = true;
                }
            }
            any
        };
        let starter = collect(&self.thread_starter);
        let continuation = collect(&self.thread_continuation);
        let conversation = collect(&self.thread_conversation);
        signals.is_thread_starter = starter;
        signals.has_continuation_hint = continuation;
        signals.invites_conversation = conversation;
        signals
    }

    /// Split link hosts into on-platform and external.
    ///
    /// A host is on-platform when it equals a [`PLATFORM_DOMAINS`] entry or is
    /// a subdomain of one.
    #[must_use]
    pub fn detect_external_links(&self, text: &str) -> LinkSignals {
        let mut links = LinkSignals::default();
        for caps in self.url_host.captures_iter(text) {
            let Some(host) = caps.get(1).map(|m| m.as_str().to_ascii_lowercase()) else {
                continue;
            };
            let on_platform = PLATFORM_DOMAINS
                .iter()
                .any(|d| host == *d || host.ends_with(&format!(".{d}")));
            if on_platform {
                links.platform_hosts.push(host);
            } else {
                links.external_hosts.push(host);
            }
        }
        links
    }

    /// Estimated read-time score, capped at `dwell_cap`.
    #[must_use]
    pub fn estimate_dwell_time(&self, text: &str) -> i32 {
        if is_blank(text) {
            return 0;
        }
        let mut score = self.weights.dwell_length.points(text.chars().count());

        score += match line_breaks(text) {
            3..=10 => 3,
            n if n > 10 => 2,
            _ => 1,
        };
        if self.dwell_bullet.is_match(text) {
            score += 3;
        }
        if self.rules.has_story(text) {
            score += 2;
        }
        score += match self.dwell_number.find_iter(text).count() {
            0 => 0,
            1 | 2 => 1,
            _ => 3,
        };
        if self.dwell_emotion.is_match(text) {
            score += 2;
        }
        if self.dwell_media.is_match(text) {
            score += 1;
        }
        score.min(self.weights.dwell_cap)
    }

    /// Likelihood of reactions in the first minutes after posting.
    #[must_use]
    pub fn predict_early_engagement(&self, text: &str) -> i32 {
        if is_blank(text) {
            return 0;
        }
        let w = &self.weights;
        let mut triggers = 0;
        let opening = first_line(text);
        if opening.chars().count() <= w.early_first_line_max && self.early_hook.is_match(opening)
        {
            triggers += 2;
        }
        if self.early_emotion.is_match(text) {
            triggers += 2;
        }
        if text.chars().count() <= w.early_short_text_max {
            triggers += 1;
        }
        (triggers * w.early_multiplier).min(w.early_cap)
    }

    #[must_use]
    pub fn tone_rules(&self) -> &ToneRules {
        &self.tone
    }
}

impl Scorer for AlgorithmScorer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, text: &str, _posted_at: Option<&str>) -> ScoreResult {
        let w = &self.weights;

        let thread = self.detect_thread_structure(text);
        let conversation = if thread.is_thread_starter {
            w.thread_starter
        } else if thread.has_continuation_hint {
            w.thread_continuation
        } else if thread.invites_conversation {
            w.thread_conversation
        } else {
            0
        };

        let links = self.detect_external_links(text);
        let link_penalty = if links.has_external_link() {
            w.external_link_penalty
        } else if links.has_platform_link() {
            w.platform_link_penalty
        } else {
            0
        };

        let factors = vec![
            Factor::new("reply_inducement", self.reply.score(text)),
            Factor::new("dwell_time", self.estimate_dwell_time(text)),
            Factor::new("conversation", conversation),
            Factor::new("tone", w.tone_points(self.tone.analyze(text).overall)),
            Factor::new("bookmark", self.bookmark.score(text)),
            Factor::new("external_link", link_penalty),
            Factor::new("profile_click", self.profile.score(text)),
            Factor::new("early_engagement", self.predict_early_engagement(text)),
        ];
        ScoreResult::from_factors(Self::NAME, zero_if_blank(text, factors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> AlgorithmScorer {
        AlgorithmScorer::new(Arc::new(RuleSet::new()), AlgorithmWeights::default())
    }

    #[test]
    fn reply_inducement_sums_then_multiplies() {
        let s = scorer();
        // question mark (3) + opinion ask (4) = 7, times 3 = 21
        let result = s.score("これどう思う？", None);
        assert_eq!(result.factor("reply_inducement"), Some(21));
    }

    #[test]
    fn reply_inducement_capped() {
        let s = scorer();
        let result = s.score("正直どう思う？AかBか、知らんけど", None);
        assert_eq!(result.factor("reply_inducement"), Some(25));
    }

    #[test]
    fn external_link_penalised() {
        let s = scorer();
        let result = s.score("詳しくは https://example.com/post", None);
        assert_eq!(result.factor("external_link"), Some(-15));
    }

    #[test]
    fn platform_link_lightly_penalised() {
        let s = scorer();
        let result = s.score("前の投稿 https://x.com/someone/status/1", None);
        assert_eq!(result.factor("external_link"), Some(-3));
    }

    #[test]
    fn lookalike_host_is_external() {
        let links = scorer().detect_external_links("https://tenant.com/x https://mobile.twitter.com/a");
        assert_eq!(links.external_hosts, vec!["tenant.com".to_string()]);
        assert_eq!(links.platform_hosts, vec!["mobile.twitter.com".to_string()]);
    }

    #[test]
    fn thread_starter_outranks_other_signals() {
        let s = scorer();
        let signals = s.detect_thread_structure("🧵 副業の始め方\nまず準備");
        assert!(signals.is_thread_starter);
        assert!(signals.has_continuation_hint);
        assert_eq!(
            s.score("🧵 副業の始め方\nまず準備", None).factor("conversation"),
            Some(15)
        );
    }

    #[test]
    fn trailing_question_invites_conversation() {
        let signals = scorer().detect_thread_structure("あなたならどうする？\n");
        assert!(signals.invites_conversation);
        assert!(signals.signals.contains(&"ends_with_question"));
    }

    #[test]
    fn dwell_time_for_short_plain_text() {
        assert_eq!(scorer().estimate_dwell_time("こんにちは"), 2);
    }

    #[test]
    fn blank_text_has_no_dwell_or_early_signal() {
        let s = scorer();
        assert_eq!(s.estimate_dwell_time(""), 0);
        assert_eq!(s.predict_early_engagement(" \n"), 0);
        let result = s.score("", None);
        assert_eq!(result.factor("tone"), Some(0));
        assert_eq!(result.raw_total(), 0);
    }

    #[test]
    fn dwell_time_reaches_cap() {
        let body = format!(
            "衝撃の結果\n1. 月5万円\n2. 3つの習慣\n3. 10%改善\n写真あり、まず最初に{}",
            "あ".repeat(400)
        );
        assert_eq!(scorer().estimate_dwell_time(&body), 20);
    }

    #[test]
    fn early_engagement_short_hook() {
        // hook (2) + emotion (2) + short (1) = 5, times 2 capped at 5
        assert_eq!(scorer().predict_early_engagement("マジで驚いた！"), 5);
        // short only: 1 * 2
        assert_eq!(scorer().predict_early_engagement("今日の記録"), 2);
    }

    #[test]
    fn aggressive_tone_scores_zero() {
        let result = scorer().score("あいつは詐欺師", None);
        assert_eq!(result.factor("tone"), Some(0));
    }

    #[test]
    fn penalty_can_pull_total_to_zero() {
        let result = scorer().score("https://example.com", None);
        assert_eq!(result.raw_total(), -3);
        assert_eq!(result.total_score, 0);
    }
}
