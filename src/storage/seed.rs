use chrono::{DateTime, Utc};

use super::models::{Category, NewsItem, Viewpoint};

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

/// 首次运行时填充的示例新闻
pub fn sample_news() -> Vec<NewsItem> {
    vec![
        NewsItem {
            id: "1".to_string(),
            title: "人工智能技术在教育领域的应用与挑战".to_string(),
            content: "随着人工智能技术的快速发展，越来越多的教育机构开始探索AI在教学中的应用。从智能辅导系统到个性化学习平台，AI正在改变传统的教育模式。然而，这一变革也带来了数据隐私、算法偏见等诸多挑战。如何平衡技术创新与教育本质，成为当前教育界讨论的热点话题。".to_string(),
            news_url: None,
            image_url: Some("https://space.coze.cn/api/coze_space/gen_image?image_size=landscape_16_9&prompt=AI%20technology%20in%20education".to_string()),
            created_at: at("2025-11-25T10:30:00Z"),
            comments_count: 8,
        },
        NewsItem {
            id: "2".to_string(),
            title: "全球气候变化对粮食安全的影响分析".to_string(),
            content: "全球气候变化正以前所未有的速度影响着我们的星球。极端天气事件频发、温度升高、降水模式改变等因素，对全球粮食生产和供应构成了严峻挑战。专家呼吁国际社会加强合作，共同应对气候变化对粮食安全的威胁，同时推动农业可持续发展。".to_string(),
            news_url: None,
            image_url: Some("https://space.coze.cn/api/coze_space/gen_image?image_size=landscape_16_9&prompt=Climate%20change%20impact%20on%20agriculture".to_string()),
            created_at: at("2025-11-24T14:20:00Z"),
            comments_count: 12,
        },
        NewsItem {
            id: "3".to_string(),
            title: "数字经济时代的就业市场变革".to_string(),
            content: "数字经济的蓬勃发展正在重塑全球就业市场。一方面，新技术创造了大量新兴职业；另一方面，传统行业面临着自动化和智能化带来的转型压力。在这一背景下，劳动力市场对数字技能的需求大幅增加，教育体系和职业培训也需要相应调整，以适应这一变革趋势。".to_string(),
            news_url: None,
            image_url: None,
            created_at: at("2025-11-23T09:15:00Z"),
            comments_count: 6,
        },
    ]
}

/// 首次运行时填充的示例观点
pub fn sample_viewpoints() -> Vec<Viewpoint> {
    vec![
        Viewpoint {
            id: "vp_1".to_string(),
            news_id: "1".to_string(),
            user_id: "2".to_string(),
            user_name: "学生甲".to_string(),
            content: "我认为AI在教育中的应用前景广阔，可以根据学生的学习情况提供个性化的学习方案，大大提高学习效率。".to_string(),
            category: Category::Educational,
            agree_count: 5,
            created_at: at("2025-11-25T11:00:00Z"),
        },
        Viewpoint {
            id: "vp_2".to_string(),
            news_id: "1".to_string(),
            user_id: "3".to_string(),
            user_name: "学生乙".to_string(),
            content: "虽然AI技术很先进，但教育的本质是人与人之间的交流和情感传递，这是AI无法替代的。".to_string(),
            category: Category::Personal,
            agree_count: 8,
            created_at: at("2025-11-25T11:30:00Z"),
        },
        Viewpoint {
            id: "vp_3".to_string(),
            news_id: "1".to_string(),
            user_id: "4".to_string(),
            user_name: "学生丙".to_string(),
            content: "数据隐私是AI在教育应用中必须重视的问题，学生的个人学习数据需要得到妥善保护。".to_string(),
            category: Category::SocialImpact,
            agree_count: 6,
            created_at: at("2025-11-25T14:15:00Z"),
        },
        Viewpoint {
            id: "vp_4".to_string(),
            news_id: "2".to_string(),
            user_id: "2".to_string(),
            user_name: "学生甲".to_string(),
            content: "气候变化对发展中国家的影响更为严重，国际社会应该给予更多支持和帮助。".to_string(),
            category: Category::Political,
            agree_count: 7,
            created_at: at("2025-11-24T15:00:00Z"),
        },
        Viewpoint {
            id: "vp_5".to_string(),
            news_id: "2".to_string(),
            user_id: "3".to_string(),
            user_name: "学生乙".to_string(),
            content: "发展可持续农业技术是应对气候变化影响的有效途径，应该加大研发投入。".to_string(),
            category: Category::Economic,
            agree_count: 9,
            created_at: at("2025-11-24T16:20:00Z"),
        },
    ]
}
