pub mod arguments;
pub mod keywords;
pub mod opposing;
pub mod sentiment;
pub mod topics;

pub use arguments::{ArgumentCluster, ArgumentClusterer};
pub use keywords::KeywordExtractor;
pub use opposing::{OpposingPair, OpposingSide, OpposingViewPairer};
pub use sentiment::{Sentiment, SentimentAnalyzer};
pub use topics::{TopicDistributor, TopicShare};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::LexiconConfig;
use crate::storage::Viewpoint;

/// 四舍五入的百分比，分母为 0 时返回 0
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

/// 一条新闻下全部观点的分析结果，按需计算，不持久化
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub keywords: Vec<String>,
    pub sentiment: Sentiment,
    pub topic_distribution: Vec<TopicShare>,
    pub main_arguments: Vec<ArgumentCluster>,
    pub opposing_views: Vec<OpposingPair>,
}

/// 统一分析管道
pub struct AnalysisPipeline {
    keyword_extractor: KeywordExtractor,
    sentiment_analyzer: SentimentAnalyzer,
    topic_distributor: TopicDistributor,
    argument_clusterer: ArgumentClusterer,
    opposing_pairer: OpposingViewPairer,
}

impl AnalysisPipeline {
    pub fn new(lexicon: &LexiconConfig) -> Self {
        Self {
            keyword_extractor: KeywordExtractor::new(lexicon),
            sentiment_analyzer: SentimentAnalyzer::new(lexicon),
            topic_distributor: TopicDistributor::new(),
            argument_clusterer: ArgumentClusterer::new(),
            opposing_pairer: OpposingViewPairer::new(lexicon),
        }
    }

    /// 调用方负责只传入同一条新闻的观点
    pub fn analyze(&self, viewpoints: &[Viewpoint]) -> AnalysisResult {
        let contents: Vec<&str> = viewpoints.iter().map(|vp| vp.content.as_str()).collect();

        // 1. 关键词
        let keywords = self.keyword_extractor.extract(&contents);

        // 2. 情感倾向
        let sentiment = self.sentiment_analyzer.analyze(&contents);

        // 3. 主题分布
        let topic_distribution = self.topic_distributor.distribute(viewpoints);

        // 4. 主要论点
        let main_arguments = self.argument_clusterer.cluster(viewpoints);

        // 5. 对立观点
        let opposing_views = self.opposing_pairer.pair(viewpoints);

        info!(
            "文本分析完成: {} 条观点, {} 个关键词, {} 个论点, {} 组对立观点",
            viewpoints.len(),
            keywords.len(),
            main_arguments.len(),
            opposing_views.len()
        );

        AnalysisResult {
            keywords,
            sentiment,
            topic_distribution,
            main_arguments,
            opposing_views,
        }
    }
}
