use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 观点类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Political,
    Economic,
    SocialImpact,
    Cultural,
    Educational,
    Personal,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Political,
        Category::Economic,
        Category::SocialImpact,
        Category::Cultural,
        Category::Educational,
        Category::Personal,
        Category::Other,
    ];

    /// 界面显示名称
    pub fn label(&self) -> &'static str {
        match self {
            Category::Political => "政治观点",
            Category::Economic => "经济分析",
            Category::SocialImpact => "社会影响",
            Category::Cultural => "文化视角",
            Category::Educational => "教育意义",
            Category::Personal => "个人感受",
            Category::Other => "其他",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::Political => "political",
            Category::Economic => "economic",
            Category::SocialImpact => "social-impact",
            Category::Cultural => "cultural",
            Category::Educational => "educational",
            Category::Personal => "personal",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// 同时接受英文键名和中文显示名
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key().eq_ignore_ascii_case(s) || c.label() == s)
            .ok_or_else(|| format!("未知的观点类别: {}", s))
    }
}

/// 新闻主题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub comments_count: u32,
}

/// 学生观点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewpoint {
    pub id: String,
    pub news_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub category: Category,
    pub agree_count: u32,
    pub created_at: DateTime<Utc>,
}

/// 新建新闻时由教师填写的字段
#[derive(Debug, Clone, Default)]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    pub news_url: Option<String>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_key_and_label() {
        assert_eq!("social-impact".parse::<Category>().unwrap(), Category::SocialImpact);
        assert_eq!("教育意义".parse::<Category>().unwrap(), Category::Educational);
        assert_eq!("Personal".parse::<Category>().unwrap(), Category::Personal);
        assert!("体育".parse::<Category>().is_err());
    }

    #[test]
    fn viewpoint_serializes_camel_case() {
        let vp = Viewpoint {
            id: "vp_x".to_string(),
            news_id: "1".to_string(),
            user_id: "student_a".to_string(),
            user_name: "学生甲".to_string(),
            content: "内容".to_string(),
            category: Category::Cultural,
            agree_count: 2,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&vp).unwrap();
        assert_eq!(json["newsId"], "1");
        assert_eq!(json["agreeCount"], 2);
        assert_eq!(json["category"], "cultural");
    }
}
