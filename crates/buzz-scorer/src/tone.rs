//! Keyword tone classifier.

use regex::Regex;
use serde::Serialize;

use crate::classify::compile;

const POSITIVE: &[&str] = &[
    r"嬉しい|楽しい|幸せ|最高|素晴らしい|感謝|ありがとう",
    r"おすすめ|良い|好き|素敵|神|便利|助かる",
    r"成功|達成|実現|できた|やった|頑張",
    r"ワクワク|期待|楽しみ|面白い",
];

const CONSTRUCTIVE: &[&str] = &[
    r"方法|やり方|コツ|ステップ|手順|始め方",
    r"解決|改善|対策|提案|アドバイス",
    r"学んだ|気づいた|発見|わかった|理解",
    r"共有|シェア|紹介|まとめ|レビュー",
    r"経験|体験|実践|試し|チャレンジ",
];

const NEGATIVE: &[&str] = &[
    r"最悪|ひどい|つらい|辛い|苦しい|悲しい",
    r"失敗|後悔|損|無駄|意味ない",
    r"不安|怖い|心配|恐ろしい",
];

const AGGRESSIVE: &[&str] = &[
    r"バカ|アホ|クソ|死ね|消えろ|うざい",
    r"炎上|叩[かき]|批判|攻撃|許さない|ふざけるな",
    r"嘘つき|詐欺|騙[しさ]|裏切り",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Constructive,
    Positive,
    Neutral,
    /// Negative framing paired with a constructive angle.
    ConstructiveProvocation,
    Negative,
    Aggressive,
}

impl Tone {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Constructive => "constructive",
            Tone::Positive => "positive",
            Tone::Neutral => "neutral",
            Tone::ConstructiveProvocation => "constructive_provocation",
            Tone::Negative => "negative",
            Tone::Aggressive => "aggressive",
        }
    }

    /// Tones the ranking model is believed not to suppress.
    #[must_use]
    pub fn is_reach_friendly(self) -> bool {
        !matches!(self, Tone::Negative | Tone::Aggressive)
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-family hit counts and the resulting overall tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToneAnalysis {
    pub positive: usize,
    pub constructive: usize,
    pub negative: usize,
    pub aggressive: usize,
    pub overall: Tone,
}

#[derive(Debug)]
pub struct ToneRules {
    positive: Vec<Regex>,
    constructive: Vec<Regex>,
    negative: Vec<Regex>,
    aggressive: Vec<Regex>,
}

impl Default for ToneRules {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneRules {
    #[must_use]
    pub fn new() -> Self {
        let build = |table: &[&str]| -> Vec<Regex> { table.iter().map(|p| compile(p)).collect() };
        Self {
            positive: build(POSITIVE),
            constructive: build(CONSTRUCTIVE),
            negative: build(NEGATIVE),
            aggressive: build(AGGRESSIVE),
        }
    }

    #[must_use]
    pub fn analyze(&self, text: &str) -> ToneAnalysis {
        let hits = |family: &[Regex]| family.iter().filter(|re| re.is_match(text)).count();
        let positive = hits(&self.positive);
        let constructive = hits(&self.constructive);
        let negative = hits(&self.negative);
        let aggressive = hits(&self.aggressive);

        ToneAnalysis {
            positive,
            constructive,
            negative,
            aggressive,
            overall: overall_tone(positive, constructive, negative, aggressive),
        }
    }
}

/// One-off tone analysis with the built-in tables. Compiles the tables on
/// every call; hold a [`ToneRules`] when analysing many texts.
#[must_use]
pub fn analyze_tone(text: &str) -> ToneAnalysis {
    ToneRules::new().analyze(text)
}

/// Highest family wins; ties resolve in the order positive, constructive,
/// negative, aggressive.
fn overall_tone(positive: usize, constructive: usize, negative: usize, aggressive: usize) -> Tone {
    let ranked = [
        (positive, Tone::Positive),
        (constructive, Tone::Constructive),
        (negative, Tone::Negative),
        (aggressive, Tone::Aggressive),
    ];
    let mut best = ranked[0];
    for candidate in &ranked[1..] {
        if candidate.0 > best.0 {
            best = *candidate;
        }
    }

    match best {
        (0, _) => Tone::Neutral,
        (_, Tone::Negative) if constructive > 0 => Tone::ConstructiveProvocation,
        (_, tone) => tone,
    }
}
