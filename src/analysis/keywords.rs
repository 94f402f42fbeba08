use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;

use crate::config::LexiconConfig;

/// 返回关键词数量上限
pub const MAX_KEYWORDS: usize = 10;

fn ideograph_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\x{4e00}-\x{9fa5}]+").expect("ideograph pattern"))
}

pub struct KeywordExtractor {
    stopwords: HashSet<String>,
}

impl KeywordExtractor {
    pub fn new(lexicon: &LexiconConfig) -> Self {
        Self {
            stopwords: lexicon.stopwords.iter().cloned().collect(),
        }
    }

    /// 统计连续汉字串的出现频次，按频次降序返回前 10 个；同频按首次出现顺序
    pub fn extract<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        let mut order: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for run in ideograph_run().find_iter(text.as_ref()) {
                let word = run.as_str();
                if word.chars().count() <= 1 || self.stopwords.contains(word) {
                    continue;
                }
                match index.get(word) {
                    Some(&i) => order[i].1 += 1,
                    None => {
                        index.insert(word.to_string(), order.len());
                        order.push((word.to_string(), 1));
                    }
                }
            }
        }

        // sort_by 是稳定排序，同频词保持首次出现顺序
        order.sort_by(|a, b| b.1.cmp(&a.1));
        debug!("关键词候选 {} 个", order.len());

        order
            .into_iter()
            .take(MAX_KEYWORDS)
            .map(|(word, _)| word)
            .collect()
    }

    /// 单段文本的首个关键词
    pub fn leading<S: AsRef<str>>(&self, text: S) -> Option<String> {
        self.extract(&[text]).into_iter().next()
    }
}
