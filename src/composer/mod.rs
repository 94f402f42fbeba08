pub mod html;
pub mod settings;

pub use html::render_html;
pub use settings::{Emphasis, GenerationSettings, Length, Tone};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::analysis::{percent, AnalysisResult, KeywordExtractor};
use crate::config::LexiconConfig;
use crate::storage::{NewsItem, Viewpoint};

const KEYWORD_FALLBACK: &str = "相关议题";
const TOPIC_FALLBACK: &str = "相关领域";

/// 按字符截取前 n 个字符
fn head(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

fn nth_or<'a>(items: &'a [String], index: usize, fallback: &'a str) -> &'a str {
    items.get(index).map(String::as_str).unwrap_or(fallback)
}

/// 取 [start, end) 区间并用顿号连接，区间为空时返回 fallback
fn join_range(items: &[String], start: usize, end: usize, fallback: &str) -> String {
    let end = end.min(items.len());
    if start >= end {
        return fallback.to_string();
    }
    items[start..end].join("、")
}

/// 学生观点综合评论生成器
///
/// 纯函数式拼装：相同输入（含生成时间）得到相同输出。所有按下标取关键词、主题、
/// 论点的位置都有兜底文字，观点稀少时不会出现空洞或越界。
pub struct CommentComposer {
    keyword_extractor: KeywordExtractor,
}

struct Ctx<'a> {
    news: &'a NewsItem,
    total: usize,
    analysis: &'a AnalysisResult,
    settings: &'a GenerationSettings,
    generated_at: String,
}

impl<'a> Ctx<'a> {
    fn keyword(&self, index: usize) -> &'a str {
        nth_or(&self.analysis.keywords, index, KEYWORD_FALLBACK)
    }

    fn topic(&self, index: usize) -> &'static str {
        self.analysis
            .topic_distribution
            .get(index)
            .map(|t| t.topic.label())
            .unwrap_or(TOPIC_FALLBACK)
    }
}

impl CommentComposer {
    pub fn new(lexicon: &LexiconConfig) -> Self {
        Self {
            keyword_extractor: KeywordExtractor::new(lexicon),
        }
    }

    pub fn compose(
        &self,
        news: &NewsItem,
        viewpoints: &[Viewpoint],
        analysis: &AnalysisResult,
        settings: &GenerationSettings,
        generated_at: DateTime<Local>,
    ) -> String {
        debug!(
            "生成设置: 长度={} 语气={} 重点={}",
            settings.length.label(),
            settings.tone.label(),
            settings.emphasis.label()
        );

        let ctx = Ctx {
            news,
            total: viewpoints.len(),
            analysis,
            settings,
            generated_at: generated_at.format("%Y/%m/%d %H:%M:%S").to_string(),
        };

        let mut comment = String::new();
        self.introduction(&ctx, &mut comment);
        self.keyword_section(&ctx, &mut comment);
        self.argument_section(&ctx, &mut comment);
        self.consensus_section(&ctx, &mut comment);
        self.diversity_section(&ctx, &mut comment);
        self.sentiment_section(&ctx, &mut comment);
        self.conclusion(&ctx, &mut comment);
        self.news_commentary(&ctx, &mut comment);
        comment
    }

    /// 观点 A/B 的首个关键词
    fn focus_of(&self, argument: &str) -> String {
        self.keyword_extractor
            .leading(argument)
            .unwrap_or_else(|| KEYWORD_FALLBACK.to_string())
    }

    fn introduction(&self, ctx: &Ctx, out: &mut String) {
        let n = ctx.total;
        out.push_str(&format!("# 学生观点综合评论：{}\n\n", ctx.news.title));
        out.push_str("## 观点整合前言\n\n");

        match ctx.settings.tone {
            Tone::Analytical => {
                out.push_str(&format!(
                    "本评论基于对{n}位学生提交的{n}条观点进行的系统性文本分析。"
                ));
                out.push_str("通过自然语言处理技术，我们提取了核心论点、分析了情感倾向，并识别出了主要共识与分歧。\n\n");
            }
            Tone::Persuasive => {
                out.push_str("综合全班同学的智慧结晶，我们得以从多个角度审视这一事件。");
                out.push_str(&format!(
                    "通过整合{n}位同学的观点，我们不仅看到了思想的碰撞，更发现了许多值得深入思考的洞见。\n\n"
                ));
            }
            Tone::Neutral => {
                out.push_str(&format!(
                    "通过对{n}条学生观点的智能整合，我们得以梳理出大家对这一事件的主要看法和思考方向。"
                ));
                out.push_str("以下是基于所有学生观点的综合分析与评论。\n\n");
            }
        }
    }

    fn keyword_section(&self, ctx: &Ctx, out: &mut String) {
        let keywords = &ctx.analysis.keywords;
        if keywords.is_empty() {
            return;
        }

        out.push_str("## 核心关注焦点\n\n");
        out.push_str("通过文本分析，我们提取出了学生观点中最常出现的核心关键词，这些词反映了大家对事件的主要关注点：\n\n");

        let top: Vec<String> = keywords.iter().take(5).cloned().collect();
        let lines: Vec<String> = top
            .iter()
            .enumerate()
            .map(|(i, k)| format!("{}. {}（高频关键词，反映了同学们对这一方面的高度关注）", i + 1, k))
            .collect();
        out.push_str(&lines.join("\n"));

        out.push_str(&format!("\n\n从关键词分布可以看出，{}是讨论的核心焦点，", top[0]));
        out.push_str(&format!("其次是{}等方面，", join_range(&top, 1, 3, "其他")));
        out.push_str("这些共同构成了大家对这一事件的认知框架。\n\n");
    }

    fn argument_section(&self, ctx: &Ctx, out: &mut String) {
        let arguments = &ctx.analysis.main_arguments;
        if arguments.is_empty() {
            return;
        }

        out.push_str("## 主要观点整合\n\n");
        for (i, arg) in arguments.iter().enumerate() {
            out.push_str(&format!("### {}. {}\n\n", i + 1, arg.argument));
            out.push_str(&format!(
                "- **支持情况**: 共有{}位同学表达了类似观点，",
                arg.supporting_viewpoints
            ));
            out.push_str(&format!(
                "约占总观点数的{}%。\n\n",
                percent(arg.supporting_viewpoints, ctx.total)
            ));

            if !arg.representative_quotes.is_empty() {
                out.push_str("- **代表性表述**:\n");
                for quote in &arg.representative_quotes {
                    out.push_str(&format!("  * \"{}...\"\n", head(quote, 60)));
                }
                out.push('\n');
            }
        }
    }

    fn consensus_section(&self, ctx: &Ctx, out: &mut String) {
        if !ctx.settings.emphasis.shows_consensus() {
            return;
        }

        // 至少 3 人，且不低于观点总数的 30%
        let threshold = 3.max(ctx.total * 3 / 10);
        let points: Vec<_> = ctx
            .analysis
            .main_arguments
            .iter()
            .filter(|arg| arg.supporting_viewpoints >= threshold)
            .collect();
        if points.is_empty() {
            return;
        }

        out.push_str("## 观点共识提炼\n\n");
        out.push_str("通过分析，我们发现同学们在以下几个方面达成了较广泛的共识：\n\n");
        for (i, point) in points.iter().enumerate() {
            out.push_str(&format!("{}. **{}**\n", i + 1, point.argument));
            out.push_str(&format!(
                "   这一观点得到了{}位同学的支持，体现了大家对这一问题的普遍看法。\n\n",
                point.supporting_viewpoints
            ));
        }
    }

    fn diversity_section(&self, ctx: &Ctx, out: &mut String) {
        let pairs = &ctx.analysis.opposing_views;
        if !ctx.settings.emphasis.shows_diversity() || pairs.is_empty() {
            return;
        }

        out.push_str("## 观点碰撞与多元视角\n\n");
        out.push_str("在讨论中，我们也观察到了不同观点之间的碰撞，这些多元视角共同构成了对事件的全面理解：\n\n");

        for (i, pair) in pairs.iter().enumerate() {
            out.push_str(&format!("### {}. 观点对立分析\n\n", i + 1));

            for (name, side) in [("A", &pair.view_a), ("B", &pair.view_b)] {
                out.push_str(&format!("**观点{}**: {}...\n", name, head(&side.argument, 100)));
                let shown: Vec<&str> = side.supporters.iter().take(3).map(String::as_str).collect();
                out.push_str(&format!(
                    "   - 支持者: {}等{}位同学\n\n",
                    shown.join("、"),
                    side.supporters.len()
                ));
            }

            out.push_str("这两种观点看似对立，实则从不同角度丰富了我们对问题的认识。");
            out.push_str(&format!("观点A强调了{}方面，", self.focus_of(&pair.view_a.argument)));
            out.push_str(&format!("而观点B则关注了{}维度，", self.focus_of(&pair.view_b.argument)));
            out.push_str("将两者结合起来，能够帮助我们形成更为全面的判断。\n\n");
        }
    }

    fn sentiment_section(&self, ctx: &Ctx, out: &mut String) {
        let s = &ctx.analysis.sentiment;
        out.push_str("## 情感倾向分析\n\n");
        out.push_str("通过对所有观点的情感分析，我们发现：\n\n");
        out.push_str(&format!("- {}% 的观点带有积极倾向，强调机遇和正面影响\n", s.positive));
        out.push_str(&format!("- {}% 的观点保持中立客观，注重事实陈述和理性分析\n", s.neutral));
        out.push_str(&format!("- {}% 的观点表达了担忧或批判性思考\n\n", s.negative));
    }

    fn conclusion(&self, ctx: &Ctx, out: &mut String) {
        let analysis = ctx.analysis;
        out.push_str("## 综合结论与思考\n\n");

        match ctx.settings.tone {
            Tone::Analytical => {
                let topics: Vec<&str> = analysis
                    .topic_distribution
                    .iter()
                    .take(3)
                    .map(|t| t.topic.label())
                    .collect();
                let topics = if topics.is_empty() {
                    TOPIC_FALLBACK.to_string()
                } else {
                    topics.join("、")
                };
                let mood = if analysis.sentiment.neutral > analysis.sentiment.positive {
                    "中立客观"
                } else {
                    "积极乐观"
                };
                out.push_str("基于以上分析，我们可以得出以下结论：\n\n");
                out.push_str(&format!(
                    "1. 学生们对这一事件的关注呈现多维度特征，涵盖了{}等多个方面。\n\n",
                    topics
                ));
                out.push_str(&format!(
                    "2. 虽然存在一些观点分歧，但在{}等核心问题上已经形成了一定共识。\n\n",
                    ctx.keyword(0)
                ));
                out.push_str(&format!("3. 整体情感倾向以{}为主，", mood));
                out.push_str("反映了学生们在面对复杂问题时的理性态度。\n\n");
            }
            Tone::Persuasive => {
                out.push_str("综合所有同学的观点，我们认为这一事件的意义远超表面现象。\n\n");
                out.push_str(&format!(
                    "它不仅涉及{}等具体问题，更反映了{}等深层次议题。\n\n",
                    ctx.keyword(0),
                    ctx.keyword(1)
                ));
                out.push_str("通过这次讨论，我们看到了思想的碰撞与融合，也体会到了从多个角度思考问题的价值。\n\n");
                out.push_str(&format!(
                    "正如同学们在讨论中提到的，解决这一问题需要{}等多方面的努力与合作。\n\n",
                    join_range(&analysis.keywords, 2, 5, KEYWORD_FALLBACK)
                ));
            }
            Tone::Neutral => {
                out.push_str("综合所有学生的观点，我们可以看到大家对这一事件的多元解读和深度思考。\n\n");
                out.push_str(&format!(
                    "从{}到{}，从{}到{}，",
                    ctx.keyword(0),
                    ctx.keyword(1),
                    ctx.topic(0),
                    ctx.topic(1)
                ));
                out.push_str("同学们从不同角度提出了自己的见解，这些见解相互补充，共同构成了对这一事件的全面认识。\n\n");
                out.push_str("特别值得注意的是，虽然大家的观点各有侧重，但都体现了对社会问题的关注和思考深度，");
                out.push_str("展现了当代学生的社会责任感和独立思考能力。\n\n");
            }
        }

        out.push_str("## 结语\n\n");
        out.push_str("本次观点整合分析不仅汇总了学生们的思考成果，更通过系统化的文本分析，");
        out.push_str("提炼出了隐藏在分散观点背后的核心主题和共识。");
        out.push_str("这种基于集体智慧的分析方法，为我们理解复杂问题提供了新的视角和思路。\n\n");
        out.push_str(&format!("生成时间：{}\n", ctx.generated_at));
        out.push_str(&format!("基于{}条学生观点整合分析\n\n\n", ctx.total));
    }

    /// 第二部分：完整新闻评论
    fn news_commentary(&self, ctx: &Ctx, out: &mut String) {
        let analysis = ctx.analysis;
        let n = ctx.total;
        let title = &ctx.news.title;

        out.push_str("---\n\n");
        out.push_str(&format!("# 完整新闻评论：{}\n\n", title));
        out.push_str("## 事件回顾与背景分析\n\n");
        out.push_str(&format!(
            "{}... 这一事件引发了广泛关注，",
            head(&ctx.news.content, 200)
        ));
        out.push_str(&format!(
            "也激发了同学们的深入思考。通过对{n}位同学观点的整理分析，"
        ));
        out.push_str("我们得以从多元视角审视这一事件的意义与影响。\n\n");
        out.push_str("## 核心观点梳理与深度解析\n\n");

        let lead_argument = analysis.main_arguments.first();

        match ctx.settings.tone {
            Tone::Analytical => {
                let lead_share = analysis
                    .topic_distribution
                    .first()
                    .map(|t| t.percentage)
                    .unwrap_or(0);
                out.push_str(&format!(
                    "从分析性角度看，这一事件的核心矛盾在于{}与{}之间的平衡。",
                    ctx.keyword(0),
                    ctx.keyword(1)
                ));
                out.push_str("同学们的讨论主要围绕三个维度展开：\n\n");
                out.push_str(&format!(
                    "首先，在{}层面，{}%的观点认为{}。",
                    ctx.topic(0),
                    lead_share,
                    lead_argument
                        .map(|a| a.argument.as_str())
                        .unwrap_or("这一问题需要从长远角度考量")
                ));
                out.push_str(&format!(
                    "这一观点得到了广泛支持，反映了大家对{}的关注重点。\n\n",
                    ctx.keyword(0)
                ));
                out.push_str(&format!(
                    "其次，在{}方面，不同意见的碰撞较为明显。",
                    ctx.topic(1)
                ));
                if let Some(pair) = analysis.opposing_views.first() {
                    out.push_str(&format!(
                        "一方观点强调{}的重要性，",
                        self.focus_of(&pair.view_a.argument)
                    ));
                    out.push_str(&format!(
                        "另一方则更关注{}的影响，",
                        self.focus_of(&pair.view_b.argument)
                    ));
                    out.push_str("这种多元视角有助于我们全面理解问题的复杂性。\n\n");
                }
                let third = analysis
                    .topic_distribution
                    .get(2)
                    .map(|t| t.topic.label())
                    .unwrap_or("实际应用");
                out.push_str(&format!("最后，在{}层面，", third));
                out.push_str(&format!(
                    "部分观点提出了{}等具体建议，",
                    join_range(&analysis.keywords, 2, 4, KEYWORD_FALLBACK)
                ));
                out.push_str("体现了同学们将理论思考与实际问题解决相结合的能力。\n\n");
            }
            Tone::Persuasive => {
                let support = lead_argument.map(|a| a.supporting_viewpoints).unwrap_or(0);
                out.push_str(&format!(
                    "综合各方观点，我们有充分理由相信，{}这一事件的意义远超表面现象。\n\n",
                    title
                ));
                out.push_str(&format!(
                    "一方面，{}，",
                    lead_argument
                        .map(|a| a.argument.as_str())
                        .unwrap_or("这一问题关系到我们每个人的利益")
                ));
                out.push_str(&format!(
                    "这一共识得到了{}位同学中超过{}%的支持。",
                    n,
                    percent(support, n)
                ));
                out.push_str(&format!(
                    "这充分说明，{}已经成为社会关注的焦点。\n\n",
                    ctx.keyword(0)
                ));
                out.push_str("另一方面，我们也不能忽视那些不同的声音。正如部分同学所指出的，");
                if let Some(pair) = analysis.opposing_views.first() {
                    out.push_str(&format!("{}...", head(&pair.view_b.argument, 80)));
                    out.push_str(&format!(
                        "这些观点为我们提供了重要的警示，提醒我们在推进{}发展的同时，",
                        ctx.keyword(0)
                    ));
                    out.push_str(&format!(
                        "必须充分考虑{}等相关因素。\n\n",
                        ctx.keyword(1)
                    ));
                }
                out.push_str(&format!(
                    "综合来看，解决这一问题需要{}等多方面的共同努力，",
                    join_range(&analysis.keywords, 2, 5, KEYWORD_FALLBACK)
                ));
                out.push_str("而开放、理性的讨论正是找到最佳解决方案的关键一步。\n\n");
            }
            Tone::Neutral => {
                let s = &analysis.sentiment;
                out.push_str(&format!(
                    "客观而言，{}这一事件既带来了机遇，也带来了挑战。\n\n",
                    title
                ));
                out.push_str(&format!(
                    "从积极方面看，{}%的观点认为{}的发展为{}带来了新的可能，",
                    s.positive,
                    ctx.keyword(0),
                    ctx.keyword(1)
                ));
                out.push_str(&format!(
                    "特别是在{}领域，已经展现出明显的积极影响。\n\n",
                    ctx.topic(0)
                ));
                out.push_str(&format!(
                    "从挑战方面看，{}%的观点表达了对{}等问题的担忧，",
                    s.negative,
                    ctx.keyword(2)
                ));
                out.push_str(&format!(
                    "这些担忧主要集中在{}方面。\n\n",
                    ctx.topic(1)
                ));
                out.push_str(&format!(
                    "值得注意的是，大多数同学（{}%）保持了客观中立的态度，",
                    s.neutral
                ));
                out.push_str(&format!(
                    "他们既看到了{}的潜力，也认识到了实现过程中可能面临的困难。",
                    ctx.keyword(0)
                ));
                out.push_str("这种理性的思考方式，正是我们面对复杂社会问题时所需要的。\n\n");
            }
        }

        out.push_str("## 思考与展望\n\n");
        out.push_str(&format!("通过这次讨论，我们不仅加深了对{}这一事件的理解，", title));
        out.push_str("更体会到了集体智慧的价值。不同观点的碰撞与融合，");
        out.push_str("让我们对问题的认识更加全面和深入。\n\n");
        out.push_str(&format!(
            "展望未来，{}的发展仍将是社会关注的焦点。",
            ctx.keyword(0)
        ));
        out.push_str(&format!("如何在促进{}发展的同时，", ctx.keyword(0)));
        out.push_str(&format!(
            "妥善解决{}、{}等相关问题，",
            ctx.keyword(1),
            ctx.keyword(2)
        ));
        out.push_str("将是我们需要持续思考的重要课题。\n\n");
        out.push_str(&format!("新闻评论生成时间：{}\n", ctx.generated_at));
        out.push_str(&format!("基于新闻文本分析与{}条学生观点整合", n));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::viewpoint;
    use crate::analysis::AnalysisPipeline;
    use crate::storage::Category;
    use chrono::{TimeZone, Utc};

    fn news() -> NewsItem {
        NewsItem {
            id: "n1".to_string(),
            title: "人工智能进课堂".to_string(),
            content: "某市中小学开始试点人工智能辅助教学。".to_string(),
            news_url: None,
            image_url: None,
            created_at: Utc::now(),
            comments_count: 0,
        }
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 11, 25, 10, 30, 0).unwrap()
    }

    fn compose(viewpoints: &[Viewpoint], settings: GenerationSettings) -> String {
        let lexicon = LexiconConfig::default();
        let analysis = AnalysisPipeline::new(&lexicon).analyze(viewpoints);
        CommentComposer::new(&lexicon).compose(&news(), viewpoints, &analysis, &settings, fixed_time())
    }

    fn rich_viewpoints() -> Vec<Viewpoint> {
        let shared = "人工智能能够为学生提供个性化的学习方案";
        vec![
            viewpoint("a", Category::Political, "甲", 3, &format!("{}。政策应当支持。", shared)),
            viewpoint("b", Category::Political, "乙", 1, &format!("{}。需要监管。", shared)),
            viewpoint("c", Category::Economic, "丙", 4, &format!("{}！成本也会下降。", shared)),
            viewpoint("d", Category::Personal, "丁", 2, "我担忧数据隐私问题会带来新的风险和压力。"),
            viewpoint("e", Category::Cultural, "戊", 0, "传统课堂文化中的师生情感交流不可替代。"),
        ]
    }

    #[test]
    fn sparse_input_never_prints_undefined() {
        for tone in [Tone::Neutral, Tone::Analytical, Tone::Persuasive] {
            let settings = GenerationSettings { tone, ..Default::default() };
            let empty = compose(&[], settings);
            let single = compose(&[viewpoint("a", Category::Other, "甲", 0, "好")], settings);
            for text in [empty, single] {
                assert!(!text.contains("undefined"));
                assert!(text.contains("# 完整新闻评论：人工智能进课堂"));
                assert!(text.contains(KEYWORD_FALLBACK));
            }
        }
    }

    #[test]
    fn sections_follow_emphasis() {
        let vps = rich_viewpoints();

        let balanced = compose(&vps, GenerationSettings::default());
        assert!(balanced.contains("## 观点共识提炼"));
        assert!(balanced.contains("## 观点碰撞与多元视角"));

        let consensus = compose(&vps, GenerationSettings { emphasis: Emphasis::Consensus, ..Default::default() });
        assert!(consensus.contains("## 观点共识提炼"));
        assert!(!consensus.contains("## 观点碰撞与多元视角"));

        let diversity = compose(&vps, GenerationSettings { emphasis: Emphasis::Diversity, ..Default::default() });
        assert!(!diversity.contains("## 观点共识提炼"));
        assert!(diversity.contains("## 观点碰撞与多元视角"));
        assert!(diversity.contains("等2位同学"));
    }

    #[test]
    fn tone_changes_introduction() {
        let vps = rich_viewpoints();
        let analytical = compose(&vps, GenerationSettings { tone: Tone::Analytical, ..Default::default() });
        assert!(analytical.contains("本评论基于对5位学生提交的5条观点"));
        assert!(analytical.contains("从分析性角度看"));

        let persuasive = compose(&vps, GenerationSettings { tone: Tone::Persuasive, ..Default::default() });
        assert!(persuasive.contains("综合全班同学的智慧结晶"));
        assert!(persuasive.contains("这一共识得到了5位同学中超过60%的支持"));
    }

    #[test]
    fn argument_section_reports_share_and_truncated_quotes() {
        let text = compose(&rich_viewpoints(), GenerationSettings::default());
        assert!(text.contains("### 1. 人工智能能够为学生提供个性化的学习方案"));
        assert!(text.contains("共有3位同学表达了类似观点，约占总观点数的60%。"));
        assert!(text.contains("生成时间：2025/11/25 10:30:00"));
    }

    #[test]
    fn length_is_cosmetic() {
        let vps = rich_viewpoints();
        let short = compose(&vps, GenerationSettings { length: Length::Short, ..Default::default() });
        let long = compose(&vps, GenerationSettings { length: Length::Long, ..Default::default() });
        assert_eq!(short, long);
    }

    #[test]
    fn join_range_clamps() {
        let items = vec!["甲".to_string(), "乙".to_string(), "丙".to_string()];
        assert_eq!(join_range(&items, 1, 3, "无"), "乙、丙");
        assert_eq!(join_range(&items, 2, 5, "无"), "丙");
        assert_eq!(join_range(&items, 3, 5, "无"), "无");
    }
}
