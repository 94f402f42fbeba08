mod analysis;
mod classroom;
mod composer;
mod config;
mod session;
mod storage;
mod ui;
mod utils;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use classroom::{Classroom, CommentGenerator, NewsSort, ViewpointSort};
use composer::{render_html, Emphasis, Length, Tone};
use config::{AppConfig, LexiconConfig};
use session::{Access, Role, Route, Session};
use storage::{Category, Database, NewsDraft};
use ui::{
    copy_with_feedback, ChartDatum, ChartKind, ChartRenderer, FileClipboard, Notifier, StdinConfirmer,
    TextChart, TracingNotifier,
};
use utils::logger;

#[derive(Parser)]
#[command(name = "newsclass")]
#[command(about = "新闻课堂：学生观点收集、分析与综合评论生成", long_about = None)]
struct Cli {
    /// 用户名
    #[arg(long, global = true)]
    user: Option<String>,

    /// 角色 (teacher | student)
    #[arg(long, global = true)]
    role: Option<Role>,

    /// 用户ID，默认由角色和用户名生成
    #[arg(long, global = true)]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 初始化配置和数据库
    Init {
        /// 用示例数据覆盖现有数据
        #[arg(long)]
        reset: bool,
    },
    /// 新闻管理
    News {
        #[command(subcommand)]
        action: NewsCommand,
    },
    /// 学生观点
    Viewpoint {
        #[command(subcommand)]
        action: ViewpointCommand,
    },
    /// 输出某条新闻的观点分析结果
    Analyze { news_id: String },
    /// 生成综合评论
    Generate {
        news_id: String,
        #[arg(long, value_enum)]
        tone: Option<Tone>,
        #[arg(long, value_enum)]
        emphasis: Option<Emphasis>,
        #[arg(long, value_enum)]
        length: Option<Length>,
        /// 同时导出 HTML 页面
        #[arg(long)]
        html: bool,
        /// 复制到剪贴板
        #[arg(long)]
        copy: bool,
    },
    /// 当前用户及可访问的页面
    Whoami,
    /// 观点分布图表
    Visualize {
        news_id: String,
        #[arg(long, value_enum, default_value_t = ChartKind::Bar)]
        chart: ChartKind,
    },
}

#[derive(Subcommand)]
enum NewsCommand {
    /// 新闻列表
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = NewsSort::Newest)]
        sort: NewsSort,
    },
    /// 新闻详情及观点
    Show {
        id: String,
        /// 按类别筛选
        #[arg(long)]
        category: Option<Category>,
        #[arg(long, value_enum, default_value_t = ViewpointSort::Newest)]
        sort: ViewpointSort,
    },
    /// 发布新闻（教师）
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    /// 删除新闻（教师）
    Delete {
        id: String,
        /// 跳过确认
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ViewpointCommand {
    /// 提交观点
    Add {
        news_id: String,
        #[arg(long)]
        category: Category,
        #[arg(long)]
        content: String,
    },
    /// 赞同观点
    Agree { id: String },
    /// 删除观点（作者或教师）
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// 我的观点（学生）
    Mine,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init_logger();

    let cli = Cli::parse();
    let mut session = login(&cli)?;

    match cli.command {
        Commands::Init { reset } => {
            init_command(reset).await?;
        }
        Commands::News { action } => {
            news_command(&session, action).await?;
        }
        Commands::Viewpoint { action } => {
            viewpoint_command(&session, action).await?;
        }
        Commands::Analyze { news_id } => {
            analyze_command(&session, &news_id).await?;
        }
        Commands::Generate {
            news_id,
            tone,
            emphasis,
            length,
            html,
            copy,
        } => {
            generate_command(&session, &news_id, tone, emphasis, length, html, copy).await?;
        }
        Commands::Whoami => {
            whoami_command(&session);
        }
        Commands::Visualize { news_id, chart } => {
            visualize_command(&session, &news_id, chart).await?;
        }
    }

    session.logout();
    Ok(())
}

/// 由命令行参数建立本次调用的会话
fn login(cli: &Cli) -> Result<Session> {
    let mut session = Session::new();
    match (&cli.user, cli.role) {
        (Some(name), Some(role)) => {
            let user = session.login(name, role, cli.user_id.clone())?;
            debug!("当前用户: {} ({})", user.name, user.role.label());
        }
        (None, None) => {}
        _ => anyhow::bail!("--user 与 --role 需要同时提供"),
    }
    Ok(session)
}

async fn open_classroom(config: &AppConfig) -> Result<Classroom> {
    if let Some(parent) = Path::new(&config.storage.database_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db = Database::new(&config.database_url()).await?;
    db.init_schema().await?;
    Ok(Classroom::open(Arc::new(db), &config.storage).await?)
}

async fn init_command(reset: bool) -> Result<()> {
    info!("初始化系统...");

    tokio::fs::create_dir_all("config").await?;

    if Path::new("config/settings.toml").exists() {
        info!("配置文件已存在，跳过: config/settings.toml");
    } else {
        AppConfig::default().save("config/settings.toml")?;
        info!("已生成配置文件: config/settings.toml");
    }

    if Path::new("config/lexicon.toml").exists() {
        info!("词表配置已存在，跳过: config/lexicon.toml");
    } else {
        let lexicon_toml = toml::to_string_pretty(&LexiconConfig::default())?;
        tokio::fs::write("config/lexicon.toml", lexicon_toml).await?;
        info!("已生成词表配置: config/lexicon.toml");
    }

    let app_config = AppConfig::load()?;
    tokio::fs::create_dir_all(&app_config.generation.output_dir).await?;

    let classroom = if reset {
        if let Some(parent) = Path::new(&app_config.storage.database_path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let db = Database::new(&app_config.database_url()).await?;
        db.init_schema().await?;
        let cleared = db.clear_all_slots().await?;
        info!("已清空 {} 个数据槽位", cleared);
        Classroom::reseed(Arc::new(db), &app_config.storage).await?
    } else {
        open_classroom(&app_config).await?
    };

    info!(
        "✅ 系统初始化完成！当前 {} 条新闻",
        classroom.news().len()
    );
    info!("下一步:");
    info!("  1. 运行 'newsclass --user 张老师 --role teacher news list' 查看新闻");
    info!("  2. 运行 'newsclass --user 小明 --role student viewpoint add <新闻ID> --category educational --content ...' 提交观点");
    info!("  3. 运行 'newsclass --user 张老师 --role teacher generate <新闻ID>' 生成综合评论");

    Ok(())
}

async fn news_command(session: &Session, action: NewsCommand) -> Result<()> {
    let config = AppConfig::load()?;
    let mut classroom = open_classroom(&config).await?;

    match action {
        NewsCommand::List { search, sort } => {
            session.require_user()?;
            let items = classroom.search_news(search.as_deref(), sort);
            if items.is_empty() {
                println!("没有找到匹配的新闻");
            }
            for news in items {
                println!(
                    "[{}] {}  ({} 条观点, {})",
                    news.id,
                    news.title,
                    news.comments_count,
                    news.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                );
            }
        }
        NewsCommand::Show { id, category, sort } => {
            session.ensure(&Route::NewsDetail(id.clone()))?;
            let news = classroom.find_news(&id)?;

            println!("# {}", news.title);
            println!("{}", news.content);
            if let Some(url) = &news.news_url {
                println!("原文链接: {}", url);
            }
            if let Some(url) = &news.image_url {
                println!("配图: {}", url);
            }

            let categories: Vec<&str> = classroom.categories_for(&id).iter().map(|c| c.label()).collect();
            println!();
            println!(
                "参与人数: {}  观点类别: {}",
                classroom.participant_count(&id),
                if categories.is_empty() { "无".to_string() } else { categories.join("、") }
            );

            let viewpoints = classroom.news_viewpoints(&id, category, sort);
            if viewpoints.is_empty() {
                println!("暂无观点");
            }
            for vp in viewpoints {
                println!();
                println!("[{}] {} · {} · 👍 {}", vp.id, vp.user_name, vp.category, vp.agree_count);
                println!("  {}", vp.content);
            }
        }
        NewsCommand::Add {
            title,
            content,
            url,
            image,
        } => {
            let item = classroom
                .create_news(
                    session,
                    NewsDraft {
                        title,
                        content,
                        news_url: url,
                        image_url: image,
                    },
                )
                .await?;
            TracingNotifier.success(&format!("新闻发布成功: {}", item.id));
        }
        NewsCommand::Delete { id, yes } => {
            if classroom.delete_news(session, &id, &StdinConfirmer::new(yes)).await? {
                TracingNotifier.success("新闻已删除");
            }
        }
    }

    Ok(())
}

async fn viewpoint_command(session: &Session, action: ViewpointCommand) -> Result<()> {
    let config = AppConfig::load()?;
    let mut classroom = open_classroom(&config).await?;

    match action {
        ViewpointCommand::Add {
            news_id,
            category,
            content,
        } => {
            let vp = classroom
                .submit_viewpoint(session, &news_id, &content, category)
                .await?;
            TracingNotifier.success(&format!("观点提交成功: {}", vp.id));
        }
        ViewpointCommand::Agree { id } => {
            session.require_user()?;
            let count = classroom.agree(&id).await?;
            println!("已赞同，当前赞同数: {}", count);
        }
        ViewpointCommand::Delete { id, yes } => {
            if classroom
                .delete_viewpoint(session, &id, &StdinConfirmer::new(yes))
                .await?
            {
                TracingNotifier.success("观点已删除");
            }
        }
        ViewpointCommand::Mine => {
            let mine = classroom.my_viewpoints(session)?;
            if mine.is_empty() {
                println!("您还没有提交过观点");
            }
            for vp in mine {
                let title = classroom
                    .find_news(&vp.news_id)
                    .map(|n| n.title.as_str())
                    .unwrap_or("（新闻已删除）");
                println!("[{}] {} · {} · 👍 {}", vp.id, title, vp.category, vp.agree_count);
                println!("  {}", vp.content);
            }
        }
    }

    Ok(())
}

async fn analyze_command(session: &Session, news_id: &str) -> Result<()> {
    session.ensure(&Route::CommentGeneration(news_id.to_string()))?;

    let config = AppConfig::load()?;
    let lexicon = LexiconConfig::load()?;
    let classroom = open_classroom(&config).await?;
    classroom.find_news(news_id)?;

    let result = analysis::AnalysisPipeline::new(&lexicon).analyze(&classroom.analysis_input(news_id));
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn generate_command(
    session: &Session,
    news_id: &str,
    tone: Option<Tone>,
    emphasis: Option<Emphasis>,
    length: Option<Length>,
    html: bool,
    copy: bool,
) -> Result<()> {
    session.ensure(&Route::CommentGeneration(news_id.to_string()))?;

    let config = AppConfig::load()?;
    let lexicon = LexiconConfig::load()?;
    let classroom = open_classroom(&config).await?;

    let mut settings = config.generation.settings();
    if let Some(tone) = tone {
        settings.tone = tone;
    }
    if let Some(emphasis) = emphasis {
        settings.emphasis = emphasis;
    }
    if let Some(length) = length {
        settings.length = length;
    }

    let notifier = TracingNotifier;
    let generator = CommentGenerator::new(&lexicon);
    let outcome = generator.generate(&classroom, news_id, &settings, &notifier)?;

    println!("{}", outcome.comment);

    if outcome.analysis.is_none() {
        return Ok(());
    }

    let output_dir = Path::new(&config.generation.output_dir);
    if html {
        tokio::fs::create_dir_all(output_dir).await?;
        let title = classroom.find_news(news_id)?.title.clone();
        let path = output_dir.join(format!(
            "comment_{}_{}.html",
            news_id,
            Local::now().format("%Y%m%d%H%M%S")
        ));
        tokio::fs::write(&path, render_html(&title, &outcome.comment)).await?;
        info!("HTML 已导出: {}", path.display());
    }

    if copy {
        let clipboard = FileClipboard::new(output_dir.join("clipboard.md"));
        copy_with_feedback(&clipboard, &notifier, &outcome.comment);
    }

    Ok(())
}

async fn visualize_command(session: &Session, news_id: &str, chart: ChartKind) -> Result<()> {
    session.ensure(&Route::Visualization(news_id.to_string()))?;

    let config = AppConfig::load()?;
    let classroom = open_classroom(&config).await?;
    let news = classroom.find_news(news_id)?;
    let stats = classroom.category_stats(news_id);

    let renderer = TextChart::new(chart);
    let counts: Vec<ChartDatum> = stats
        .iter()
        .map(|s| ChartDatum {
            label: s.category.label().to_string(),
            value: s.count as u32,
        })
        .collect();
    let agrees: Vec<ChartDatum> = stats
        .iter()
        .map(|s| ChartDatum {
            label: s.category.label().to_string(),
            value: s.total_agree,
        })
        .collect();

    println!("# {}", news.title);
    println!("参与人数: {}", classroom.participant_count(news_id));
    println!();
    println!("{}", renderer.render("观点类别分布", &counts));
    println!();
    println!("{}", renderer.render("各类别赞同数", &agrees));
    println!();

    for stat in &stats {
        println!(
            "{}: {} 条观点, 平均赞同 {}",
            stat.category, stat.count, stat.average_agree
        );
        if let Some(top) = &stat.top {
            println!("  最受认可: {}（{}，👍 {}）", top.content, top.user_name, top.agree_count);
        }
    }

    Ok(())
}

fn whoami_command(session: &Session) {
    match session.user() {
        Some(user) => println!("{} ({}) · ID: {}", user.name, user.role.label(), user.id),
        None => println!("未登录，请使用 --user 与 --role 登录"),
    }
    println!("首页: {}", session.home().path());

    if !session.is_authenticated() {
        return;
    }

    let pages = [
        Route::TeacherHome,
        Route::StudentHome,
        Route::MyViewpoints,
        Route::Examples,
        Route::Help,
        Route::Resources,
    ];
    for page in &pages {
        match session.authorize(page) {
            Access::Granted => println!("  ✓ {}", page.path()),
            Access::Redirect(to) => println!("  ✗ {} → {}", page.path(), to.path()),
        }
    }
}
