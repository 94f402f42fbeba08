use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::storage::Category;
use crate::utils::{AppError, AppResult};

/// 文本分析使用的固定词表和类别对立关系
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LexiconConfig {
    pub stopwords: Vec<String>,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
    /// 非对称，未列出的类别没有对立项
    pub opposing_categories: Vec<OppositionRule>,
}

/// `category` 把 `opposes` 中的类别视为对立
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OppositionRule {
    pub category: Category,
    pub opposes: Vec<Category>,
}

impl LexiconConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from("config/lexicon.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> AppResult<Self> {
        let config_path = path.as_ref();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: LexiconConfig = toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("{}: {}", config_path.display(), e)))?;
        Ok(config)
    }

    /// `a` 是否把 `b` 列为对立类别（只看 `a` 这一行）
    pub fn opposes(&self, a: Category, b: Category) -> bool {
        self.opposing_categories
            .iter()
            .find(|rule| rule.category == a)
            .map(|rule| rule.opposes.contains(&b))
            .unwrap_or(false)
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for LexiconConfig {
    fn default() -> Self {
        let rule = |category, opposes: &[Category]| OppositionRule {
            category,
            opposes: opposes.to_vec(),
        };
        let opposing_categories = vec![
            rule(Category::Political, &[Category::Economic, Category::Personal]),
            rule(Category::SocialImpact, &[Category::Cultural, Category::Educational]),
            rule(Category::Economic, &[Category::Political, Category::Cultural]),
        ];

        Self {
            stopwords: words(&[
                "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "一个",
                "上", "也", "很", "到", "说", "要", "去", "你", "会", "着", "没有", "看", "好",
                "自己", "这", "这种", "这些", "这样", "这个", "这里", "那些", "那里", "那个",
                "它们", "他们", "她们", "我们", "你们", "咱们", "因此", "因为", "所以", "但是",
                "然而", "不过", "而且", "并且", "同时", "另外", "此外", "可能", "应该", "可以",
                "能够", "必须", "需要", "想要", "希望", "觉得", "认为", "对于", "关于", "由于",
                "通过", "随着", "按照", "根据", "基于", "针对", "为了",
            ]),
            positive_words: words(&[
                "好", "优秀", "积极", "进步", "机遇", "发展", "成功", "支持", "希望", "创新",
            ]),
            negative_words: words(&[
                "问题", "挑战", "困难", "风险", "担忧", "不足", "缺陷", "反对", "危机", "压力",
            ]),
            opposing_categories,
        }
    }
}
