pub mod generator;

pub use generator::{CommentGenerator, GenerationOutcome, FALLBACK_COMMENT};

use chrono::Utc;
use clap::ValueEnum;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::config::StorageConfig;
use crate::session::{Route, Session, UserInfo};
use crate::storage::{new_id, Category, Database, NewsDraft, NewsItem, Repository, Viewpoint};
use crate::ui::Confirmer;
use crate::utils::{AppError, AppResult};

const MAX_TITLE_CHARS: usize = 100;
const MAX_NEWS_CHARS: usize = 1000;
const MAX_VIEWPOINT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum NewsSort {
    #[default]
    Newest,
    /// 按观点数量
    Popularity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ViewpointSort {
    #[default]
    Newest,
    #[value(name = "agree")]
    MostAgreed,
}

/// 可视化页面中单个类别的汇总
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub category: Category,
    pub count: usize,
    pub total_agree: u32,
    pub average_agree: u32,
    pub top: Option<Viewpoint>,
}

fn validation(message: &str) -> AppError {
    AppError::ValidationError(message.to_string())
}

fn news_not_found() -> AppError {
    AppError::NotFound("未找到该新闻".to_string())
}

/// 空白视为未填写；非空时必须是合法 URL
fn optional_url(raw: Option<String>) -> AppResult<Option<String>> {
    match raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        Some(s) => {
            Url::parse(&s).map_err(|_| validation("请输入有效的URL"))?;
            Ok(Some(s))
        }
        None => Ok(None),
    }
}

fn rounded_average(total: u32, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    (total as f64 / count as f64).round() as u32
}

fn require_teacher<'a>(session: &'a Session, action: &str) -> AppResult<&'a UserInfo> {
    let user = session.require_user()?;
    if !session.is_teacher() {
        return Err(AppError::Forbidden(action.to_string()));
    }
    Ok(user)
}

/// 课堂数据的统一入口：新闻与观点两个集合，以及它们之间的计数维护
pub struct Classroom {
    news: Repository<NewsItem>,
    viewpoints: Repository<Viewpoint>,
}

impl Classroom {
    pub async fn open(db: Arc<Database>, storage: &StorageConfig) -> AppResult<Self> {
        let news = Repository::open(db.clone(), &storage.news_slot).await?;
        let viewpoints = Repository::open(db, &storage.viewpoints_slot).await?;
        Ok(Self { news, viewpoints })
    }

    /// 用示例数据覆盖两个槽位
    pub async fn reseed(db: Arc<Database>, storage: &StorageConfig) -> AppResult<Self> {
        let news = Repository::seed(db.clone(), &storage.news_slot).await?;
        let viewpoints = Repository::seed(db, &storage.viewpoints_slot).await?;
        Ok(Self { news, viewpoints })
    }

    pub fn news(&self) -> &[NewsItem] {
        self.news.list()
    }

    pub fn find_news(&self, id: &str) -> AppResult<&NewsItem> {
        self.news.get(id).ok_or_else(news_not_found)
    }

    pub async fn create_news(&mut self, session: &Session, draft: NewsDraft) -> AppResult<NewsItem> {
        require_teacher(session, "发布新闻")?;

        let title = draft.title.trim();
        if title.is_empty() {
            return Err(validation("请输入新闻标题"));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(validation("新闻标题不能超过100个字符"));
        }
        let content = draft.content.trim();
        if content.is_empty() {
            return Err(validation("请输入新闻内容"));
        }
        if content.chars().count() > MAX_NEWS_CHARS {
            return Err(validation("新闻内容不能超过1000个字符"));
        }

        let item = NewsItem {
            id: new_id::<NewsItem>(),
            title: title.to_string(),
            content: content.to_string(),
            news_url: optional_url(draft.news_url)?,
            image_url: optional_url(draft.image_url)?,
            created_at: Utc::now(),
            comments_count: 0,
        };

        self.news.add(item.clone()).await?;
        info!("新闻已发布: {} ({})", item.title, item.id);
        Ok(item)
    }

    /// 返回 false 表示用户取消；关联观点保留
    pub async fn delete_news(
        &mut self,
        session: &Session,
        id: &str,
        confirmer: &dyn Confirmer,
    ) -> AppResult<bool> {
        require_teacher(session, "删除新闻")?;
        let title = self.find_news(id)?.title.clone();

        if !confirmer.confirm(&format!("确定要删除新闻「{}」吗？", title)) {
            info!("已取消删除新闻: {}", id);
            return Ok(false);
        }

        self.news.delete(id).await?;
        info!("新闻已删除: {}", id);
        Ok(true)
    }

    pub async fn submit_viewpoint(
        &mut self,
        session: &Session,
        news_id: &str,
        content: &str,
        category: Category,
    ) -> AppResult<Viewpoint> {
        session.ensure(&Route::StudentHome)?;
        let user = session.require_user()?;

        let content = content.trim();
        if content.is_empty() {
            return Err(validation("请输入您的观点内容"));
        }
        if content.chars().count() > MAX_VIEWPOINT_CHARS {
            return Err(validation("观点内容不能超过500个字符"));
        }

        let previous = self.find_news(news_id)?.clone();

        let viewpoint = Viewpoint {
            id: new_id::<Viewpoint>(),
            news_id: news_id.to_string(),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            content: content.to_string(),
            category,
            agree_count: 0,
            created_at: Utc::now(),
        };
        // 先更新计数，观点写入失败时回滚
        let mut news = previous.clone();
        news.comments_count += 1;
        self.news.update(news).await?;
        if let Err(e) = self.viewpoints.add(viewpoint.clone()).await {
            self.restore_news(previous).await;
            return Err(e);
        }

        info!("{} 提交了观点 {} ({})", user.name, viewpoint.id, category);
        Ok(viewpoint)
    }

    /// 作者本人或教师可删除；返回 false 表示用户取消
    pub async fn delete_viewpoint(
        &mut self,
        session: &Session,
        id: &str,
        confirmer: &dyn Confirmer,
    ) -> AppResult<bool> {
        let user = session.require_user()?;
        let viewpoint = self
            .viewpoints
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("未找到该观点: {}", id)))?;

        if viewpoint.user_id != user.id && !session.is_teacher() {
            return Err(AppError::Forbidden("删除他人的观点".to_string()));
        }
        if !confirmer.confirm("确定要删除这条观点吗？") {
            info!("已取消删除观点: {}", id);
            return Ok(false);
        }

        // 所属新闻可能已被删除
        let parent = self.news.get(&viewpoint.news_id).cloned();
        if let Some(previous) = &parent {
            let mut news = previous.clone();
            news.comments_count = news.comments_count.saturating_sub(1);
            self.news.update(news).await?;
        }
        if let Err(e) = self.viewpoints.delete(id).await {
            if let Some(previous) = parent {
                self.restore_news(previous).await;
            }
            return Err(e);
        }

        info!("观点已删除: {}", id);
        Ok(true)
    }

    /// 不做去重，同一用户可重复赞同
    pub async fn agree(&mut self, id: &str) -> AppResult<u32> {
        let mut viewpoint = self
            .viewpoints
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("未找到该观点: {}", id)))?;
        viewpoint.agree_count += 1;
        let count = viewpoint.agree_count;
        self.viewpoints.update(viewpoint).await?;
        Ok(count)
    }

    /// 标题或正文包含关键词（不区分大小写）
    pub fn search_news(&self, term: Option<&str>, sort: NewsSort) -> Vec<&NewsItem> {
        let term = term.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());

        let mut items: Vec<&NewsItem> = self
            .news
            .list()
            .iter()
            .filter(|n| match &term {
                Some(t) => n.title.to_lowercase().contains(t) || n.content.to_lowercase().contains(t),
                None => true,
            })
            .collect();

        match sort {
            NewsSort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            NewsSort::Popularity => items.sort_by(|a, b| b.comments_count.cmp(&a.comments_count)),
        }
        items
    }

    pub fn news_viewpoints<'a>(
        &'a self,
        news_id: &'a str,
        category: Option<Category>,
        sort: ViewpointSort,
    ) -> Vec<&'a Viewpoint> {
        let mut items: Vec<&Viewpoint> = self
            .viewpoints_of(news_id)
            .filter(|vp| category.map_or(true, |c| vp.category == c))
            .collect();

        match sort {
            ViewpointSort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ViewpointSort::MostAgreed => items.sort_by(|a, b| b.agree_count.cmp(&a.agree_count)),
        }
        items
    }

    /// 分析管道的输入：保持存储顺序
    pub fn analysis_input(&self, news_id: &str) -> Vec<Viewpoint> {
        self.viewpoints_of(news_id).cloned().collect()
    }

    /// 该新闻下出现过的类别，按固定类别顺序
    pub fn categories_for(&self, news_id: &str) -> Vec<Category> {
        let present: HashSet<Category> = self.viewpoints_of(news_id).map(|vp| vp.category).collect();
        Category::ALL
            .iter()
            .copied()
            .filter(|c| present.contains(c))
            .collect()
    }

    pub fn participant_count(&self, news_id: &str) -> usize {
        self.viewpoints_of(news_id)
            .map(|vp| vp.user_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn my_viewpoints(&self, session: &Session) -> AppResult<Vec<&Viewpoint>> {
        session.ensure(&Route::MyViewpoints)?;
        let user = session.require_user()?;
        Ok(self
            .viewpoints
            .list()
            .iter()
            .filter(|vp| vp.user_id == user.id)
            .collect())
    }

    pub fn category_stats(&self, news_id: &str) -> Vec<CategoryStat> {
        self.categories_for(news_id)
            .into_iter()
            .map(|category| {
                let members: Vec<&Viewpoint> = self
                    .viewpoints_of(news_id)
                    .filter(|vp| vp.category == category)
                    .collect();
                let total_agree: u32 = members.iter().map(|vp| vp.agree_count).sum();

                let mut top: Option<&Viewpoint> = None;
                for &vp in &members {
                    if top.map_or(true, |t| vp.agree_count > t.agree_count) {
                        top = Some(vp);
                    }
                }

                CategoryStat {
                    category,
                    count: members.len(),
                    total_agree,
                    average_agree: rounded_average(total_agree, members.len()),
                    top: top.cloned(),
                }
            })
            .collect()
    }

    async fn restore_news(&mut self, previous: NewsItem) {
        if let Err(e) = self.news.update(previous).await {
            warn!("观点数回滚失败: {}", e);
        }
    }

    fn viewpoints_of<'a>(&'a self, news_id: &'a str) -> impl Iterator<Item = &'a Viewpoint> + 'a {
        self.viewpoints
            .list()
            .iter()
            .filter(move |vp| vp.news_id == news_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::session::Role;
    use crate::ui::tests::Answer;
    use tempfile::TempDir;

    async fn classroom() -> (TempDir, Classroom) {
        let tmp = TempDir::new().unwrap();
        let url = format!("sqlite:{}", tmp.path().join("class.db").display());
        let db = Database::new(&url).await.unwrap();
        db.init_schema().await.unwrap();
        let classroom = Classroom::open(Arc::new(db), &AppConfig::default().storage)
            .await
            .unwrap();
        (tmp, classroom)
    }

    fn session(name: &str, role: Role) -> Session {
        let mut session = Session::new();
        session.login(name, role, None).unwrap();
        session
    }

    fn draft(title: &str, content: &str) -> NewsDraft {
        NewsDraft {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn teacher_creates_news_at_the_front() {
        let (_tmp, mut room) = classroom().await;
        let teacher = session("张老师", Role::Teacher);
        let mut d = draft("  新闻标题 ", "新闻内容");
        d.news_url = Some("   ".to_string());
        d.image_url = Some("https://example.com/a.png".to_string());

        let item = room.create_news(&teacher, d).await.unwrap();
        assert_eq!(item.title, "新闻标题");
        assert_eq!(item.news_url, None);
        assert_eq!(item.comments_count, 0);
        assert_eq!(room.news()[0].id, item.id);
        assert_eq!(room.news().len(), 4);
    }

    #[tokio::test]
    async fn invalid_drafts_leave_state_untouched() {
        let (_tmp, mut room) = classroom().await;
        let teacher = session("张老师", Role::Teacher);

        let err = room.create_news(&teacher, draft("", "内容")).await.unwrap_err();
        assert_eq!(err.to_string(), "请输入新闻标题");
        let err = room.create_news(&teacher, draft("标题", " ")).await.unwrap_err();
        assert_eq!(err.to_string(), "请输入新闻内容");
        let mut bad = draft("标题", "内容");
        bad.news_url = Some("not a url".to_string());
        let err = room.create_news(&teacher, bad).await.unwrap_err();
        assert_eq!(err.to_string(), "请输入有效的URL");
        let long = "长".repeat(MAX_TITLE_CHARS + 1);
        assert!(room.create_news(&teacher, draft(&long, "内容")).await.is_err());

        assert_eq!(room.news().len(), 3);
    }

    #[tokio::test]
    async fn students_cannot_manage_news() {
        let (_tmp, mut room) = classroom().await;
        let student = session("小明", Role::Student);
        assert!(matches!(
            room.create_news(&student, draft("标题", "内容")).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            room.delete_news(&student, "1", &Answer(true)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            room.create_news(&Session::new(), draft("标题", "内容")).await,
            Err(AppError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn deleting_news_needs_confirmation_and_orphans_viewpoints() {
        let (_tmp, mut room) = classroom().await;
        let teacher = session("张老师", Role::Teacher);

        assert!(!room.delete_news(&teacher, "1", &Answer(false)).await.unwrap());
        assert!(room.find_news("1").is_ok());

        assert!(room.delete_news(&teacher, "1", &Answer(true)).await.unwrap());
        assert!(matches!(room.find_news("1"), Err(AppError::NotFound(_))));
        assert!(room.viewpoints.get("vp_1").is_some());
    }

    #[tokio::test]
    async fn submitting_and_deleting_viewpoints_tracks_the_counter() {
        let (_tmp, mut room) = classroom().await;
        let student = session("小明", Role::Student);
        let before = room.find_news("3").unwrap().comments_count;

        let vp = room
            .submit_viewpoint(&student, "3", " 就业市场需要更多数字技能培训。 ", Category::Economic)
            .await
            .unwrap();
        assert_eq!(vp.user_id, "student_小明");
        assert_eq!(vp.content, "就业市场需要更多数字技能培训。");
        assert_eq!(vp.agree_count, 0);
        assert_eq!(room.find_news("3").unwrap().comments_count, before + 1);

        assert!(room.delete_viewpoint(&student, &vp.id, &Answer(true)).await.unwrap());
        assert_eq!(room.find_news("3").unwrap().comments_count, before);
    }

    #[tokio::test]
    async fn viewpoint_validation() {
        let (_tmp, mut room) = classroom().await;
        let student = session("小明", Role::Student);

        let err = room.submit_viewpoint(&student, "1", "  ", Category::Other).await.unwrap_err();
        assert_eq!(err.to_string(), "请输入您的观点内容");
        let long = "字".repeat(MAX_VIEWPOINT_CHARS + 1);
        assert!(room.submit_viewpoint(&student, "1", &long, Category::Other).await.is_err());
        assert!(matches!(
            room.submit_viewpoint(&student, "missing", "内容", Category::Other).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            room.submit_viewpoint(&Session::new(), "1", "内容", Category::Other).await,
            Err(AppError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn teachers_cannot_submit_viewpoints() {
        let (_tmp, mut room) = classroom().await;
        let teacher = session("张老师", Role::Teacher);
        let before = room.find_news("1").unwrap().comments_count;

        assert!(matches!(
            room.submit_viewpoint(&teacher, "1", "老师的观点", Category::Other).await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(room.find_news("1").unwrap().comments_count, before);
        assert_eq!(room.news_viewpoints("1", None, ViewpointSort::Newest).len(), 3);
    }

    /// 让观点槽位的覆盖写入在数据库层失败
    async fn block_viewpoint_writes(tmp: &TempDir) {
        let url = format!("sqlite:{}", tmp.path().join("class.db").display());
        let pool = sqlx::SqlitePool::connect(&url).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER block_viewpoints BEFORE UPDATE ON snapshots \
             WHEN NEW.key = 'viewpoints' BEGIN SELECT RAISE(ABORT, 'blocked'); END",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;
    }

    #[tokio::test]
    async fn failed_viewpoint_write_restores_the_counter() {
        let (tmp, mut room) = classroom().await;
        let student = session("小明", Role::Student);
        let teacher = session("张老师", Role::Teacher);
        let before = room.find_news("1").unwrap().comments_count;
        block_viewpoint_writes(&tmp).await;

        assert!(matches!(
            room.submit_viewpoint(&student, "1", "这条观点写不进去", Category::Other).await,
            Err(AppError::DatabaseError(_))
        ));
        assert_eq!(room.find_news("1").unwrap().comments_count, before);
        assert_eq!(room.news_viewpoints("1", None, ViewpointSort::Newest).len(), 3);

        assert!(room.delete_viewpoint(&teacher, "vp_1", &Answer(true)).await.is_err());
        assert_eq!(room.find_news("1").unwrap().comments_count, before);
        assert!(room.viewpoints.get("vp_1").is_some());

        // 数据库中的计数同样未变
        let db = Database::new(&format!("sqlite:{}", tmp.path().join("class.db").display()))
            .await
            .unwrap();
        let reopened = Classroom::open(Arc::new(db), &AppConfig::default().storage)
            .await
            .unwrap();
        assert_eq!(reopened.find_news("1").unwrap().comments_count, before);
    }

    #[tokio::test]
    async fn only_author_or_teacher_may_delete_a_viewpoint() {
        let (_tmp, mut room) = classroom().await;
        let author = session("小明", Role::Student);
        let other = session("小红", Role::Student);
        let teacher = session("张老师", Role::Teacher);
        let vp = room
            .submit_viewpoint(&author, "1", "我的观点", Category::Personal)
            .await
            .unwrap();

        assert!(matches!(
            room.delete_viewpoint(&other, &vp.id, &Answer(true)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(room.delete_viewpoint(&teacher, &vp.id, &Answer(true)).await.unwrap());
    }

    #[tokio::test]
    async fn counter_never_goes_negative_and_missing_parent_is_skipped() {
        let (_tmp, mut room) = classroom().await;
        let teacher = session("张老师", Role::Teacher);

        // 示例数据中的计数与观点数不一致，删除到 0 后保持 0
        let mut news = room.find_news("2").unwrap().clone();
        news.comments_count = 0;
        room.news.update(news).await.unwrap();
        assert!(room.delete_viewpoint(&teacher, "vp_4", &Answer(true)).await.unwrap());
        assert_eq!(room.find_news("2").unwrap().comments_count, 0);

        room.delete_news(&teacher, "1", &Answer(true)).await.unwrap();
        assert!(room.delete_viewpoint(&teacher, "vp_1", &Answer(true)).await.unwrap());
    }

    #[tokio::test]
    async fn agree_increments_without_dedup() {
        let (_tmp, mut room) = classroom().await;
        assert_eq!(room.agree("vp_1").await.unwrap(), 6);
        assert_eq!(room.agree("vp_1").await.unwrap(), 7);
        assert!(matches!(room.agree("nope").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn search_and_sort_news() {
        let (_tmp, room) = classroom().await;
        fn ids(items: Vec<&NewsItem>) -> Vec<String> {
            items.iter().map(|n| n.id.clone()).collect()
        }

        assert_eq!(ids(room.search_news(None, NewsSort::Newest)), ["1", "2", "3"]);
        assert_eq!(ids(room.search_news(None, NewsSort::Popularity)), ["2", "1", "3"]);
        assert_eq!(ids(room.search_news(Some("ai"), NewsSort::Newest)), ["1"]);
        assert_eq!(ids(room.search_news(Some("气候"), NewsSort::Newest)), ["2"]);
        assert!(room.search_news(Some("体育"), NewsSort::Newest).is_empty());
    }

    #[tokio::test]
    async fn viewpoint_queries() {
        let (_tmp, room) = classroom().await;

        let agreed: Vec<&str> = room
            .news_viewpoints("1", None, ViewpointSort::MostAgreed)
            .iter()
            .map(|vp| vp.id.as_str())
            .collect();
        assert_eq!(agreed, ["vp_2", "vp_3", "vp_1"]);

        let newest = room.news_viewpoints("1", None, ViewpointSort::Newest);
        assert_eq!(newest[0].id, "vp_3");

        let filtered = room.news_viewpoints("1", Some(Category::Personal), ViewpointSort::Newest);
        assert_eq!(filtered.len(), 1);

        assert_eq!(
            room.categories_for("1"),
            [Category::SocialImpact, Category::Educational, Category::Personal]
        );
        assert_eq!(room.participant_count("1"), 3);
        assert_eq!(room.participant_count("3"), 0);
    }

    #[tokio::test]
    async fn my_viewpoints_is_a_student_page() {
        let (_tmp, mut room) = classroom().await;
        let student = session("小明", Role::Student);
        room.submit_viewpoint(&student, "2", "观点一", Category::Cultural).await.unwrap();
        room.submit_viewpoint(&student, "3", "观点二", Category::Other).await.unwrap();

        assert_eq!(room.my_viewpoints(&student).unwrap().len(), 2);
        assert!(matches!(
            room.my_viewpoints(&session("张老师", Role::Teacher)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn category_stats_summarise_each_category() {
        let (_tmp, mut room) = classroom().await;
        let student = session("小明", Role::Student);
        let extra = room
            .submit_viewpoint(&student, "1", "补充一个教育观点", Category::Educational)
            .await
            .unwrap();
        room.agree(&extra.id).await.unwrap();
        room.agree(&extra.id).await.unwrap();

        let stats = room.category_stats("1");
        let edu = stats.iter().find(|s| s.category == Category::Educational).unwrap();
        assert_eq!(edu.count, 2);
        assert_eq!(edu.total_agree, 7);
        assert_eq!(edu.average_agree, 4);
        assert_eq!(edu.top.as_ref().unwrap().id, "vp_1");
        assert!(room.category_stats("3").is_empty());
    }
}
