use serde::{Deserialize, Serialize};

use super::percent;
use crate::config::LexiconConfig;

/// 三项分别独立四舍五入，合计可能偏离 100
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

pub struct SentimentAnalyzer {
    positive_words: Vec<String>,
    negative_words: Vec<String>,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: &LexiconConfig) -> Self {
        Self {
            positive_words: lexicon.positive_words.clone(),
            negative_words: lexicon.negative_words.clone(),
        }
    }

    /// 每段文本对每个情感词最多计一次；无文本时返回全零
    pub fn analyze<S: AsRef<str>>(&self, texts: &[S]) -> Sentiment {
        if texts.is_empty() {
            return Sentiment::default();
        }

        let hits = |words: &[String]| -> usize {
            texts
                .iter()
                .map(|text| words.iter().filter(|w| text.as_ref().contains(w.as_str())).count())
                .sum()
        };

        let positive = hits(&self.positive_words);
        let negative = hits(&self.negative_words);
        let neutral = texts.len().saturating_sub(positive + negative);

        Sentiment {
            positive: percent(positive, texts.len()),
            neutral: percent(neutral, texts.len()),
            negative: percent(negative, texts.len()),
        }
    }
}
