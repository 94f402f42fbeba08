use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::analysis::percent;

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartDatum {
    pub label: String,
    pub value: u32,
}

/// 聚合数据的展示，不参与分析
pub trait ChartRenderer {
    fn render(&self, title: &str, data: &[ChartDatum]) -> String;
}

/// 终端字符图表
#[derive(Debug, Clone, Copy, Default)]
pub struct TextChart {
    kind: ChartKind,
}

impl TextChart {
    pub fn new(kind: ChartKind) -> Self {
        Self { kind }
    }

    fn bar(data: &[ChartDatum]) -> Vec<String> {
        let max = data.iter().map(|d| d.value).max().unwrap_or(0) as usize;
        data.iter()
            .map(|d| {
                let width = if max == 0 {
                    0
                } else {
                    d.value as usize * BAR_WIDTH / max
                };
                format!("{:<8} {} {}", d.label, "█".repeat(width), d.value)
            })
            .collect()
    }

    fn pie(data: &[ChartDatum]) -> Vec<String> {
        let total: usize = data.iter().map(|d| d.value as usize).sum();
        data.iter()
            .map(|d| {
                format!(
                    "{:<8} {:>3}% ({})",
                    d.label,
                    percent(d.value as usize, total),
                    d.value
                )
            })
            .collect()
    }
}

impl ChartRenderer for TextChart {
    fn render(&self, title: &str, data: &[ChartDatum]) -> String {
        if data.is_empty() {
            return format!("{}\n（暂无数据）", title);
        }

        let rows = match self.kind {
            ChartKind::Bar => Self::bar(data),
            ChartKind::Pie => Self::pie(data),
        };
        format!("{}\n{}", title, rows.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Vec<ChartDatum> {
        vec![
            ChartDatum { label: "教育意义".into(), value: 3 },
            ChartDatum { label: "个人感受".into(), value: 1 },
        ]
    }

    #[test]
    fn bars_scale_to_the_largest_value() {
        let out = TextChart::new(ChartKind::Bar).render("观点分布", &data());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "观点分布");
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[2].matches('█').count(), BAR_WIDTH / 3);
    }

    #[test]
    fn pie_shows_shares() {
        let out = TextChart::new(ChartKind::Pie).render("观点分布", &data());
        assert!(out.contains(" 75% (3)"));
        assert!(out.contains(" 25% (1)"));
    }

    #[test]
    fn empty_data_is_labelled() {
        assert!(TextChart::default().render("t", &[]).contains("暂无数据"));
    }
}
