use serde::{Deserialize, Serialize};

use crate::storage::Viewpoint;

/// 论点句最短长度（不含）
const MIN_SENTENCE_CHARS: usize = 10;
const MAX_QUOTES: usize = 3;
pub const MAX_ARGUMENTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentCluster {
    pub argument: String,
    pub supporting_viewpoints: usize,
    pub representative_quotes: Vec<String>,
    pub total_agree: u32,
}

pub struct ArgumentClusterer;

impl ArgumentClusterer {
    pub fn new() -> Self {
        Self
    }

    /// 取观点中第一个长度超过 10 的句子作为论点
    pub fn key_sentence(content: &str) -> Option<&str> {
        content
            .split(['。', '！', '？'])
            .find(|s| s.chars().count() > MIN_SENTENCE_CHARS)
    }

    /// 论点句完全相同的观点归为一组，按支持数降序取前 5 组
    pub fn cluster(&self, viewpoints: &[Viewpoint]) -> Vec<ArgumentCluster> {
        let mut clusters: Vec<ArgumentCluster> = Vec::new();

        for viewpoint in viewpoints {
            let Some(sentence) = Self::key_sentence(&viewpoint.content) else {
                continue;
            };

            let cluster = match clusters.iter().position(|c| c.argument == sentence) {
                Some(i) => &mut clusters[i],
                None => {
                    clusters.push(ArgumentCluster {
                        argument: sentence.to_string(),
                        supporting_viewpoints: 0,
                        representative_quotes: Vec::new(),
                        total_agree: 0,
                    });
                    let last = clusters.len() - 1;
                    &mut clusters[last]
                }
            };

            cluster.supporting_viewpoints += 1;
            cluster.total_agree += viewpoint.agree_count;
            if cluster.representative_quotes.len() < MAX_QUOTES {
                cluster.representative_quotes.push(viewpoint.content.clone());
            }
        }

        clusters.sort_by(|a, b| b.supporting_viewpoints.cmp(&a.supporting_viewpoints));
        clusters.truncate(MAX_ARGUMENTS);
        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::viewpoint;
    use crate::storage::Category;

    const SHARED: &str = "人工智能可以为每个学生提供个性化方案";

    #[test]
    fn short_sentences_are_skipped() {
        assert_eq!(ArgumentClusterer::key_sentence("太短了。也很短！"), None);
        assert_eq!(
            ArgumentClusterer::key_sentence("短句。这一句明显超过了十个汉字的长度？尾巴"),
            Some("这一句明显超过了十个汉字的长度")
        );
    }

    #[test]
    fn identical_leading_sentences_merge() {
        let vps = vec![
            viewpoint("a", Category::Educational, "甲", 2, &format!("{}。我很赞同。", SHARED)),
            viewpoint("b", Category::Educational, "乙", 5, &format!("{}！还要注意隐私。", SHARED)),
            viewpoint("c", Category::Personal, "丙", 1, "教育的本质是人与人之间的情感交流。"),
        ];
        let clusters = ArgumentClusterer::new().cluster(&vps);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].argument, SHARED);
        assert_eq!(clusters[0].supporting_viewpoints, 2);
        assert_eq!(clusters[0].total_agree, 7);
        assert_eq!(clusters[0].representative_quotes.len(), 2);
    }

    #[test]
    fn near_duplicates_stay_apart() {
        let vps = vec![
            viewpoint("a", Category::Educational, "甲", 2, "人工智能可以为每个学生提供个性化的方案。"),
            viewpoint("b", Category::Educational, "乙", 5, "人工智能能够为每个学生提供个性化的方案。"),
            viewpoint("c", Category::Personal, "丙", 1, "教育的本质是人与人之间的情感交流。"),
        ];
        let clusters = ArgumentClusterer::new().cluster(&vps);
        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(|c| c.supporting_viewpoints == 1));
    }

    #[test]
    fn capped_and_sorted_with_bounded_support() {
        let mut vps = Vec::new();
        for i in 0..7 {
            let content = format!("第{}类论点的内容需要足够长才能成立。", "一二三四五六七".chars().nth(i).unwrap());
            for j in 0..=i {
                vps.push(viewpoint(&format!("{}-{}", i, j), Category::Other, "某", 0, &content));
            }
        }
        let clusters = ArgumentClusterer::new().cluster(&vps);
        assert_eq!(clusters.len(), MAX_ARGUMENTS);
        assert!(clusters.windows(2).all(|w| w[0].supporting_viewpoints >= w[1].supporting_viewpoints));
        let support: usize = clusters.iter().map(|c| c.supporting_viewpoints).sum();
        assert!(support <= vps.len());
        assert!(clusters.iter().all(|c| c.representative_quotes.len() <= 3));
    }
}
