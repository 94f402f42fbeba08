pub mod logger;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("请先登录")]
    Unauthenticated,

    #[error("当前角色无权访问: {0}")]
    Forbidden(String),

    #[error("正在分析学生观点并整合，请稍候")]
    Busy,

    #[error("评论生成失败: {0}")]
    GenerationError(String),
}

pub type AppResult<T> = Result<T, AppError>;
