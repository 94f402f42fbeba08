use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 评论长度；目前只影响提示文字，不改变分析深度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

impl Length {
    pub fn label(&self) -> &'static str {
        match self {
            Length::Short => "简短 (约300字)",
            Length::Medium => "中等 (约600字)",
            Length::Long => "详细 (约1000字)",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Neutral,
    Analytical,
    Persuasive,
}

impl Tone {
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Neutral => "中立客观",
            Tone::Analytical => "分析性",
            Tone::Persuasive => "说服性",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    #[default]
    Balanced,
    Consensus,
    Diversity,
}

impl Emphasis {
    pub fn label(&self) -> &'static str {
        match self {
            Emphasis::Balanced => "平衡呈现",
            Emphasis::Consensus => "强调共识",
            Emphasis::Diversity => "强调多元",
        }
    }

    pub fn shows_consensus(&self) -> bool {
        matches!(self, Emphasis::Balanced | Emphasis::Consensus)
    }

    pub fn shows_diversity(&self) -> bool {
        matches!(self, Emphasis::Balanced | Emphasis::Diversity)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub length: Length,
    pub tone: Tone,
    pub emphasis: Emphasis,
}
