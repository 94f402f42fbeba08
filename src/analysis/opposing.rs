use serde::{Deserialize, Serialize};

use crate::config::LexiconConfig;
use crate::storage::{Category, Viewpoint};

pub const MAX_PAIRS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpposingSide {
    pub category: Category,
    /// 该类别中赞同数最高的观点全文
    pub argument: String,
    pub supporters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpposingPair {
    pub view_a: OpposingSide,
    pub view_b: OpposingSide,
}

pub struct OpposingViewPairer {
    lexicon: LexiconConfig,
}

impl OpposingViewPairer {
    pub fn new(lexicon: &LexiconConfig) -> Self {
        Self {
            lexicon: lexicon.clone(),
        }
    }

    /// 按类别首次出现顺序遍历，`a` 在前时查 `a` 的对立表，最多返回 2 组
    pub fn pair(&self, viewpoints: &[Viewpoint]) -> Vec<OpposingPair> {
        let mut categories: Vec<Category> = Vec::new();
        for viewpoint in viewpoints {
            if !categories.contains(&viewpoint.category) {
                categories.push(viewpoint.category);
            }
        }

        let mut pairs = Vec::new();
        for (i, &a) in categories.iter().enumerate() {
            for &b in &categories[i + 1..] {
                if !self.lexicon.opposes(a, b) {
                    continue;
                }
                if let (Some(view_a), Some(view_b)) = (side(viewpoints, a), side(viewpoints, b)) {
                    pairs.push(OpposingPair { view_a, view_b });
                }
            }
        }

        pairs.truncate(MAX_PAIRS);
        pairs
    }
}

fn side(viewpoints: &[Viewpoint], category: Category) -> Option<OpposingSide> {
    let mut members: Vec<&Viewpoint> = viewpoints
        .iter()
        .filter(|vp| vp.category == category)
        .collect();

    // 稳定排序：赞同数相同时保持原顺序
    members.sort_by(|a, b| b.agree_count.cmp(&a.agree_count));
    let representative = *members.first()?;

    Some(OpposingSide {
        category,
        argument: representative.content.clone(),
        supporters: members.iter().map(|vp| vp.user_name.clone()).collect(),
    })
}
