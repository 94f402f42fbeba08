use chrono::Local;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use super::Classroom;
use crate::analysis::{AnalysisPipeline, AnalysisResult};
use crate::composer::{CommentComposer, GenerationSettings};
use crate::config::LexiconConfig;
use crate::ui::Notifier;
use crate::utils::{AppError, AppResult};

pub const FALLBACK_COMMENT: &str = "生成评论时发生错误，请重试。";
pub const FAILURE_NOTICE: &str = "评论生成失败，请重试";

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub comment: String,
    /// 失败时为 None
    pub analysis: Option<AnalysisResult>,
}

impl GenerationOutcome {
    fn fallback() -> Self {
        Self {
            comment: FALLBACK_COMMENT.to_string(),
            analysis: None,
        }
    }
}

/// 生成期间置位，离开作用域时复位
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 分析 + 拼装，外层兜住所有错误
pub struct CommentGenerator {
    pipeline: AnalysisPipeline,
    composer: CommentComposer,
    busy: AtomicBool,
}

impl CommentGenerator {
    pub fn new(lexicon: &LexiconConfig) -> Self {
        Self {
            pipeline: AnalysisPipeline::new(lexicon),
            composer: CommentComposer::new(lexicon),
            busy: AtomicBool::new(false),
        }
    }

    /// 新闻不存在时返回 NotFound；其余失败转为兜底评论
    pub fn generate(
        &self,
        classroom: &Classroom,
        news_id: &str,
        settings: &GenerationSettings,
        notifier: &dyn Notifier,
    ) -> AppResult<GenerationOutcome> {
        let news = classroom.find_news(news_id)?;
        let viewpoints = classroom.analysis_input(news_id);

        info!(
            "开始生成评论: {} ({} 条观点, 篇幅 {}, 语气 {}, 侧重 {})",
            news.title,
            viewpoints.len(),
            settings.length.label(),
            settings.tone.label(),
            settings.emphasis.label()
        );

        self.guarded(notifier, || {
            let analysis = self.pipeline.analyze(&viewpoints);
            let comment = self
                .composer
                .compose(news, &viewpoints, &analysis, settings, Local::now());
            Ok(GenerationOutcome {
                comment,
                analysis: Some(analysis),
            })
        })
    }

    fn guarded<F>(&self, notifier: &dyn Notifier, job: F) -> AppResult<GenerationOutcome>
    where
        F: FnOnce() -> AppResult<GenerationOutcome>,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let result = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
            Err(AppError::GenerationError("拼装过程异常中断".to_string()))
        });

        match result {
            Ok(outcome) => {
                notifier.success("已成功生成基于学生观点的综合评论！");
                Ok(outcome)
            }
            Err(e) => {
                warn!("生成评论失败: {}", e);
                notifier.error(FAILURE_NOTICE);
                Ok(GenerationOutcome::fallback())
            }
        }
    }
}
