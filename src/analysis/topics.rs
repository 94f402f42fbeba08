use serde::{Deserialize, Serialize};

use crate::storage::{Category, Viewpoint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicShare {
    pub topic: Category,
    pub count: usize,
    pub percentage: u32,
}

pub struct TopicDistributor;

impl TopicDistributor {
    pub fn new() -> Self {
        Self
    }

    /// 按类别计数并按数量降序排列
    ///
    /// 百分比向下取整，最后一项补足余数，使合计恰好为 100。
    pub fn distribute(&self, viewpoints: &[Viewpoint]) -> Vec<TopicShare> {
        let mut shares: Vec<TopicShare> = Vec::new();
        for viewpoint in viewpoints {
            match shares.iter_mut().find(|s| s.topic == viewpoint.category) {
                Some(share) => share.count += 1,
                None => shares.push(TopicShare {
                    topic: viewpoint.category,
                    count: 1,
                    percentage: 0,
                }),
            }
        }

        shares.sort_by(|a, b| b.count.cmp(&a.count));

        let total = viewpoints.len();
        let mut assigned = 0u32;
        let last = shares.len().saturating_sub(1);
        for (i, share) in shares.iter_mut().enumerate() {
            share.percentage = if i == last {
                100u32.saturating_sub(assigned)
            } else {
                (share.count * 100 / total) as u32
            };
            assigned += share.percentage;
        }

        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::viewpoint;

    #[test]
    fn empty_set_has_no_topics() {
        assert!(TopicDistributor::new().distribute(&[]).is_empty());
    }

    #[test]
    fn two_to_one_split_is_66_34() {
        let vps = vec![
            viewpoint("a", Category::Educational, "甲", 2, "第一条观点"),
            viewpoint("b", Category::Educational, "乙", 5, "第二条观点"),
            viewpoint("c", Category::Personal, "丙", 1, "第三条观点"),
        ];
        let shares = TopicDistributor::new().distribute(&vps);
        assert_eq!(shares.len(), 2);
        assert_eq!((shares[0].topic, shares[0].count, shares[0].percentage), (Category::Educational, 2, 66));
        assert_eq!((shares[1].topic, shares[1].count, shares[1].percentage), (Category::Personal, 1, 34));
    }

    #[test]
    fn percentages_sum_to_hundred_over_distinct_categories() {
        let vps = vec![
            viewpoint("a", Category::Cultural, "甲", 0, "一"),
            viewpoint("b", Category::Political, "乙", 0, "二"),
            viewpoint("c", Category::Other, "丙", 0, "三"),
            viewpoint("d", Category::Political, "丁", 0, "四"),
            viewpoint("e", Category::Economic, "戊", 0, "五"),
            viewpoint("f", Category::Cultural, "己", 0, "六"),
            viewpoint("g", Category::Political, "庚", 0, "七"),
        ];
        let shares = TopicDistributor::new().distribute(&vps);
        let sum: u32 = shares.iter().map(|s| s.percentage).sum();
        assert_eq!(sum, 100);
        assert_eq!(shares.len(), 4);
        assert_eq!(shares[0].topic, Category::Political);
        assert!(shares.windows(2).all(|w| w[0].count >= w[1].count));
    }
}
