//! Reader-psychology analysis: why a reader would like, repost, reply to,
//! bookmark, or follow after seeing a post.
//!
//! Each reaction family is a table of named triggers. A trigger counts once
//! when any of its patterns matches. As a [`Scorer`], each family is worth up
//! to 20 points in proportion to the share of its triggers that fired.

use std::sync::Arc;

use buzz_core::{Factor, ScoreResult};
use regex::Regex;
use serde::Serialize;

use crate::classify::{compile, RuleSet};
use crate::tone::{Tone, ToneRules};
use crate::Scorer;

/// Points each reaction family contributes when every trigger fires.
pub const FAMILY_MAX_POINTS: i32 = 20;

#[derive(Debug, Clone, Copy)]
struct TriggerRule {
    name: &'static str,
    pattern: &'static str,
    explanation: &'static str,
}

const fn trigger(
    name: &'static str,
    pattern: &'static str,
    explanation: &'static str,
) -> TriggerRule {
    TriggerRule {
        name,
        pattern,
        explanation,
    }
}

const LIKE_TRIGGERS: &[TriggerRule] = &[
    trigger(
        "relatability",
        r"わかる|あるある|そうそう|私も|僕も|同じ|みんな",
        "The reader recognises themselves and likes on reflex.",
    ),
    trigger(
        "support_for_candor",
        r"正直|実は|ぶっちゃけ|告白|恥ずかしい|ド素人|初めて",
        "Showing weakness makes readers want to cheer the author on.",
    ),
    trigger(
        "admiration",
        r"達成|月\d+万|年収|成功|成果|実績|稼いだ|稼げた",
        "A like as applause for a result the reader admires.",
    ),
    trigger(
        "emotional_impulse",
        r"マジで|ガチで|ヤバい|やばい|すごい|神|最強|衝撃|驚",
        "A strong feeling triggers a like before any deliberation.",
    ),
    trigger(
        "hope",
        r"誰でも|初心者でも|ゼロから|スキル不要|簡単|すぐできる",
        "\"Maybe I can do this too\"; the like signals wanting to believe it.",
    ),
];

const REPOST_TRIGGERS: &[TriggerRule] = &[
    trigger(
        "useful_information",
        r"方法|やり方|コツ|手順|ステップ|\d+選|まとめ|テンプレ",
        "Passing useful know-how to followers also makes the reposter look useful.",
    ),
    trigger(
        "borrowed_authority",
        r"\d+万円|月収|年収|\d+万フォロワー|実績|プロ|専門家",
        "Reposting an impressive author shows the reader is plugged in.",
    ),
    trigger(
        "voiced_opinion",
        r"これ|ほんこれ|これな|言いたかったこと|全人類|みんなに",
        "The post says what the reader wanted to say; the repost is agreement.",
    ),
    trigger(
        "trend",
        r"ChatGPT|Claude|AI|GPT|Grok|2026|最新|速報|発表",
        "Sharing a trend early advertises the reader's own sensitivity to news.",
    ),
];

const REPLY_TRIGGERS: &[TriggerRule] = &[
    trigger(
        "opinion_request",
        r"[?？]|どう思|教えて|みんなは|皆さんは|意見",
        "A direct question makes the reader want to state their view.",
    ),
    trigger(
        "shared_experience",
        r"同じ人|経験ある|やったことある|私も|僕も|わかる人",
        "Readers want to tell their own version of the same story.",
    ),
    trigger(
        "invited_correction",
        r"かもしれない|知らんけど|異論は認める|怒られそう|多分",
        "Deliberate hedging lowers the bar for a friendly correction.",
    ),
    trigger(
        "report_back",
        r"試してみて|やってみて|おすすめ|紹介|使ってみた",
        "Readers reply to say they tried it or to say thanks.",
    ),
    trigger(
        "side_taking",
        r"vs|それとも|どっち|AかBか|賛否|論争",
        "A binary choice invites readers to declare which side they are on.",
    ),
];

const BOOKMARK_TRIGGERS: &[TriggerRule] = &[
    trigger(
        "how_to_memo",
        r"方法|やり方|手順|ステップ|\d+選|チェックリスト|テンプレ|フレームワーク",
        "Practical steps are saved to use later.",
    ),
    trigger(
        "reread_prompt",
        r"保存|ブクマ|ブックマーク|メモ|後で|見返",
        "An explicit nudge to save is usually followed.",
    ),
    trigger(
        "data_reference",
        r"\d+万円|\d+%|\d+倍|\d+つの|統計|データ|調査",
        "Concrete figures are kept for quoting later.",
    ),
];

const FOLLOW_TRIGGERS: &[TriggerRule] = &[
    trigger(
        "ongoing_value",
        r"毎日|毎週|シリーズ|第\d+|続き|次回|定期的",
        "The reader expects more of the same and does not want to miss it.",
    ),
    trigger(
        "interest_in_person",
        r"正直|実は|ぶっちゃけ|告白|(?:僕|私|俺).{0,10}(?:実は|正直)",
        "Good self-disclosure makes readers want to know the author better.",
    ),
    trigger(
        "recognised_expertise",
        r"\d+年目|\d+月目|専門|プロ|経歴|実績|\d+万フォロワー",
        "The author is recognised as an expert in the field.",
    ),
    trigger(
        "hidden_information",
        r"秘密|内緒|ここだけ|限定|非公開|プロフ|固ツイ",
        "Hints of more elsewhere send readers to the profile.",
    ),
];

/// First matching emotion wins; `interest` when none match.
const PRIMARY_EMOTIONS: &[(&str, &str)] = &[
    ("surprise", r"マジで|ガチで|ヤバい|やばい|衝撃|信じられない|驚"),
    ("empathy", r"わかる|あるある|そうそう|私も|僕も|同じ経験"),
    ("hope", r"誰でも|初心者でも|ゼロから|稼げ|始められ"),
    ("urgency", r"危険|注意|知らないと損|やばい|怖い|リスク"),
    ("support", r"正直|実は|告白|ド素人|恥ずかしい|初めて"),
    ("admiration", r"月\d+万|達成|成功|実績|年収"),
    ("curiosity", r"秘密|ここだけ|内緒|実は.*意外|知られてない"),
    ("participation", r"[?？]|どう思|みんなは|教えて"),
];

const DEFAULT_EMOTION: &str = "interest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Like,
    Repost,
    Reply,
    Bookmark,
    Follow,
}

impl Reaction {
    pub const ALL: [Reaction; 5] = [
        Reaction::Like,
        Reaction::Repost,
        Reaction::Reply,
        Reaction::Bookmark,
        Reaction::Follow,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Repost => "repost",
            Reaction::Reply => "reply",
            Reaction::Bookmark => "bookmark",
            Reaction::Follow => "follow",
        }
    }

    fn table(self) -> &'static [TriggerRule] {
        match self {
            Reaction::Like => LIKE_TRIGGERS,
            Reaction::Repost => REPOST_TRIGGERS,
            Reaction::Reply => REPLY_TRIGGERS,
            Reaction::Bookmark => BOOKMARK_TRIGGERS,
            Reaction::Follow => FOLLOW_TRIGGERS,
        }
    }
}

/// A trigger that fired, with the reader motive it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerHit {
    pub trigger: &'static str,
    pub explanation: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PsychologyReport {
    pub like: Vec<TriggerHit>,
    pub repost: Vec<TriggerHit>,
    pub reply: Vec<TriggerHit>,
    pub bookmark: Vec<TriggerHit>,
    pub follow: Vec<TriggerHit>,
    pub primary_emotion: &'static str,
    pub tone: Tone,
    pub one_line_why: String,
}

impl PsychologyReport {
    #[must_use]
    pub fn hits(&self, reaction: Reaction) -> &[TriggerHit] {
        match reaction {
            Reaction::Like => &self.like,
            Reaction::Repost => &self.repost,
            Reaction::Reply => &self.reply,
            Reaction::Bookmark => &self.bookmark,
            Reaction::Follow => &self.follow,
        }
    }

    #[must_use]
    pub fn trigger_count(&self) -> usize {
        Reaction::ALL.iter().map(|r| self.hits(*r).len()).sum()
    }
}

struct CompiledFamily {
    reaction: Reaction,
    triggers: Vec<(TriggerRule, Regex)>,
}

impl CompiledFamily {
    fn new(reaction: Reaction) -> Self {
        let triggers = reaction
            .table()
            .iter()
            .map(|rule| (*rule, compile(&format!("(?i){}", rule.pattern))))
            .collect();
        Self { reaction, triggers }
    }

    fn hits(&self, text: &str) -> Vec<TriggerHit> {
        self.triggers
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(rule, _)| TriggerHit {
                trigger: rule.name,
                explanation: rule.explanation,
            })
            .collect()
    }

    /// `FAMILY_MAX_POINTS * matched / size`, rounded down.
    fn points(&self, matched: usize) -> i32 {
        let size = i32::try_from(self.triggers.len()).unwrap_or(i32::MAX);
        if size == 0 {
            return 0;
        }
        let matched = i32::try_from(matched).unwrap_or(i32::MAX).min(size);
        FAMILY_MAX_POINTS * matched / size
    }
}

pub struct ReaderPsychologyScorer {
    rules: Arc<RuleSet>,
    families: Vec<CompiledFamily>,
    emotions: Vec<(&'static str, Regex)>,
    tone: ToneRules,
}

impl ReaderPsychologyScorer {
    pub const NAME: &'static str = "psychology";

    #[must_use]
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            rules,
            families: Reaction::ALL.iter().map(|r| CompiledFamily::new(*r)).collect(),
            emotions: PRIMARY_EMOTIONS
                .iter()
                .map(|(name, p)| (*name, compile(&format!("(?i){p}"))))
                .collect(),
            tone: ToneRules::new(),
        }
    }

    #[must_use]
    pub fn analyze(&self, text: &str) -> PsychologyReport {
        let mut hits: Vec<Vec<TriggerHit>> =
            self.families.iter().map(|family| family.hits(text)).collect();
        // families are built in Reaction::ALL order
        let follow = hits.pop().unwrap_or_default();
        let bookmark = hits.pop().unwrap_or_default();
        let reply = hits.pop().unwrap_or_default();
        let repost = hits.pop().unwrap_or_default();
        let like = hits.pop().unwrap_or_default();

        let one_line_why = self.one_line_why(text, &like, &repost, &reply);
        PsychologyReport {
            like,
            repost,
            reply,
            bookmark,
            follow,
            primary_emotion: self.primary_emotion(text),
            tone: self.tone.analyze(text).overall,
            one_line_why,
        }
    }

    #[must_use]
    pub fn primary_emotion(&self, text: &str) -> &'static str {
        self.emotions
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map_or(DEFAULT_EMOTION, |(name, _)| *name)
    }

    /// Top like, repost and reply motive; falls back to the post's
    /// structure when no trigger fired.
    fn one_line_why(
        &self,
        text: &str,
        like: &[TriggerHit],
        repost: &[TriggerHit],
        reply: &[TriggerHit],
    ) -> String {
        let parts: Vec<String> = [("like", like), ("repost", repost), ("reply", reply)]
            .iter()
            .filter_map(|(label, hits)| hits.first().map(|hit| format!("{label}: {}", hit.trigger)))
            .collect();

        if parts.is_empty() {
            format!(
                "structure: {}×{}",
                self.rules.classify_category(text),
                self.rules.classify_opening(text)
            )
        } else {
            parts.join(" / ")
        }
    }
}

impl Scorer for ReaderPsychologyScorer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, text: &str, _posted_at: Option<&str>) -> ScoreResult {
        let factors = self
            .families
            .iter()
            .map(|family| {
                let matched = family.hits(text).len();
                Factor::new(family.reaction.as_str(), family.points(matched))
            })
            .collect();
        ScoreResult::from_factors(Self::NAME, factors)
    }
}

/// One-shot analysis with a freshly compiled trigger table.
///
/// Callers analysing many posts should build a [`ReaderPsychologyScorer`]
/// once and call [`ReaderPsychologyScorer::analyze`].
#[must_use]
pub fn analyze_reader_psychology(rules: Arc<RuleSet>, text: &str) -> PsychologyReport {
    ReaderPsychologyScorer::new(rules).analyze(text)
}
