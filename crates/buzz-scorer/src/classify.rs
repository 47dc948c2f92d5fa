//! Keyword classifiers shared by every scoring strategy.
//!
//! Pattern tables are plain data; [`RuleSet::new`] compiles them once and the
//! resulting set is handed to each scorer.

use regex::Regex;
use serde::Serialize;

/// How the first line of a post opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningPattern {
    NumberLed,
    Question,
    Declarative,
    Empathy,
    Provocation,
    Address,
    Other,
}

impl OpeningPattern {
    pub const ALL: [OpeningPattern; 7] = [
        OpeningPattern::NumberLed,
        OpeningPattern::Question,
        OpeningPattern::Declarative,
        OpeningPattern::Empathy,
        OpeningPattern::Provocation,
        OpeningPattern::Address,
        OpeningPattern::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OpeningPattern::NumberLed => "number_led",
            OpeningPattern::Question => "question",
            OpeningPattern::Declarative => "declarative",
            OpeningPattern::Empathy => "empathy",
            OpeningPattern::Provocation => "provocation",
            OpeningPattern::Address => "address",
            OpeningPattern::Other => "other",
        }
    }
}

impl std::fmt::Display for OpeningPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content category of a whole post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Achievement,
    HowTo,
    Anecdote,
    ProblemStatement,
    ToolPromotion,
    News,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Achievement,
        Category::HowTo,
        Category::Anecdote,
        Category::ProblemStatement,
        Category::ToolPromotion,
        Category::News,
        Category::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Achievement => "achievement",
            Category::HowTo => "how_to",
            Category::Anecdote => "anecdote",
            Category::ProblemStatement => "problem_statement",
            Category::ToolPromotion => "tool_promotion",
            Category::News => "news",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opening patterns in priority order; the first match wins.
pub const OPENING_PATTERNS: &[(OpeningPattern, &str)] = &[
    (
        OpeningPattern::NumberLed,
        r"^[0-9０-９①-⑳]|[0-9０-９]+(?:つ|個|選|%|％)",
    ),
    (
        OpeningPattern::Question,
        r"[？?]|どう思|なぜ|なんで|何故|でしょうか",
    ),
    (OpeningPattern::Declarative, r"です|ます|である|だ。"),
    (OpeningPattern::Empathy, r"わかる|共感|同じ|あるある"),
    (
        OpeningPattern::Provocation,
        r"まじで|マジで|やばい|ヤバい|最悪|ありえない",
    ),
    (OpeningPattern::Address, r"みなさん|あなた|皆さん"),
];

/// Categories in priority order; the first match wins.
pub const CATEGORY_PATTERNS: &[(Category, &str)] = &[
    (
        Category::Achievement,
        r"達成|収益|稼げた|稼いだ|成功|実績|儲かった|[0-9０-９]+万円|月収|年収|売上|報酬|利益",
    ),
    (
        Category::HowTo,
        r"方法|やり方|コツ|手順|ステップ|テクニック|攻略|マニュアル|ガイド",
    ),
    (
        Category::Anecdote,
        r"私が|僕が|自分が|実際に|やってみた|試してみた|体験|経験",
    ),
    (
        Category::ProblemStatement,
        r"は？|問題|危険|注意|警告|【悲報】|ヤバい|おかしい",
    ),
    (
        Category::ToolPromotion,
        r"(?i)ツール|アプリ|サービス|プラグイン|拡張機能|おすすめ|紹介|ai|claude|chatgpt|gpt",
    ),
    (
        Category::News,
        r"発表|リリース|開始|開催|速報|最新|ニュース|公開",
    ),
];

pub const STORY_PATTERNS: &[&str] = &[
    r"まず|次に|そして|最後に",
    r"(?i)before|after|→",
    r"昔|以前|最初|今では|現在",
    r"私|僕|自分|実際に|やってみた",
];

/// Call-to-action phrases, keyed by the reaction they ask for.
pub const CTA_PATTERNS: &[(&str, &str)] = &[
    ("like", r"いいね|👍|ハート"),
    ("save", r"保存|ブックマーク"),
    ("follow", r"(?i)フォロー|follow"),
    ("repost", r"リポスト|RT|シェア|拡散"),
    ("comment", r"コメント|返信|教えて"),
];

/// Emotion families used by the first-generation scorer.
pub const EMOTION_PATTERNS: &[(&str, &str)] = &[
    (
        "anticipation",
        r"チャンス|可能性|稼げる|儲かる|成功|達成|実現|できる",
    ),
    ("surprise", r"まさか|びっくり|驚き|すごい|やばい"),
    ("empathy", r"わかる|そうそう|あるある|同じ|私も"),
    ("fear", r"危険|怖い|リスク|失敗|損|ヤバい|最悪"),
];

const EMOJI_PATTERN: &str = r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}\x{1F900}-\x{1F9FF}\x{2600}-\x{27BF}]";
const BULLET_PATTERN: &str = r"(?m)^(?:・|[\-\*①-⑳1-9]\s)";
const CONCRETE_NUMBER_PATTERN: &str =
    r"[0-9０-９]+(?:万|円|個|件|つ|選|ステップ|ヶ月|日|時間|分|秒|%|％|倍)";
const MONEY_PATTERN: &str = r"[0-9０-９]+万|[0-9０-９]+円|月収|年収|売上";
const QUESTION_PATTERN: &str = r"[？?]";
const SELF_DISCLOSURE_PATTERN: &str = r"正直|実は|ぶっちゃけ|告白|ド素人";
const HOUR_PATTERN: &str = r"(\d{1,2}):\d{2}";

/// Compiled classifier tables.
#[derive(Debug)]
pub struct RuleSet {
    opening: Vec<(OpeningPattern, Regex)>,
    categories: Vec<(Category, Regex)>,
    story: Vec<Regex>,
    cta: Vec<(&'static str, Regex)>,
    emotions: Vec<(&'static str, Regex)>,
    emoji: Regex,
    bullet: Regex,
    concrete_number: Regex,
    money: Regex,
    question: Regex,
    self_disclosure: Regex,
    hour: Regex,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSet {
    /// Compile the built-in tables.
    ///
    /// # Panics
    ///
    /// Panics only if a built-in pattern is not a valid regex, which the unit
    /// tests rule out.
    #[must_use]
    pub fn new() -> Self {
        Self {
            opening: compile_keyed(OPENING_PATTERNS),
            categories: compile_keyed(CATEGORY_PATTERNS),
            story: STORY_PATTERNS.iter().map(|p| compile(p)).collect(),
            cta: compile_keyed(CTA_PATTERNS),
            emotions: compile_keyed(EMOTION_PATTERNS),
            emoji: compile(EMOJI_PATTERN),
            bullet: compile(BULLET_PATTERN),
            concrete_number: compile(CONCRETE_NUMBER_PATTERN),
            money: compile(MONEY_PATTERN),
            question: compile(QUESTION_PATTERN),
            self_disclosure: compile(SELF_DISCLOSURE_PATTERN),
            hour: compile(HOUR_PATTERN),
        }
    }

    /// Classify the opening of `text` by looking at its first line only.
    #[must_use]
    pub fn classify_opening(&self, text: &str) -> OpeningPattern {
        let first_line = first_line(text);
        if first_line.trim().is_empty() {
            return OpeningPattern::Other;
        }
        self.opening
            .iter()
            .find(|(_, re)| re.is_match(first_line))
            .map_or(OpeningPattern::Other, |(pattern, _)| *pattern)
    }

    #[must_use]
    pub fn classify_category(&self, text: &str) -> Category {
        self.categories
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map_or(Category::Other, |(category, _)| *category)
    }

    #[must_use]
    pub fn has_story(&self, text: &str) -> bool {
        self.story.iter().any(|re| re.is_match(text))
    }

    /// Names of the call-to-action families present in `text`.
    #[must_use]
    pub fn cta_kinds(&self, text: &str) -> Vec<&'static str> {
        self.cta
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Names of the emotion families present in `text`.
    #[must_use]
    pub fn emotions(&self, text: &str) -> Vec<&'static str> {
        self.emotions
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Number of individual emoji code points.
    #[must_use]
    pub fn emoji_count(&self, text: &str) -> usize {
        self.emoji.find_iter(text).count()
    }

    #[must_use]
    pub fn has_bullets(&self, text: &str) -> bool {
        self.bullet.is_match(text)
    }

    #[must_use]
    pub fn has_concrete_number(&self, text: &str) -> bool {
        self.concrete_number.is_match(text)
    }

    #[must_use]
    pub fn has_money(&self, text: &str) -> bool {
        self.money.is_match(text)
    }

    #[must_use]
    pub fn has_question(&self, text: &str) -> bool {
        self.question.is_match(text)
    }

    #[must_use]
    pub fn has_self_disclosure(&self, text: &str) -> bool {
        self.self_disclosure.is_match(text)
    }

    /// Hour from an `HH:MM` fragment in a timestamp string, if it is a valid hour.
    #[must_use]
    pub fn extract_hour(&self, timestamp: &str) -> Option<u32> {
        self.hour
            .captures(timestamp)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|hour| *hour < 24)
    }
}

/// Number of `\n` characters in `text`.
#[must_use]
pub fn line_breaks(text: &str) -> usize {
    text.matches('\n').count()
}

#[must_use]
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or("")
}

pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid built-in rule regex")
}

pub(crate) fn compile_keyed<K: Copy>(table: &[(K, &str)]) -> Vec<(K, Regex)> {
    table.iter().map(|(key, p)| (*key, compile(p))).collect()
}
