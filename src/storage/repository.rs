use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::database::Database;
use super::models::{NewsItem, Viewpoint};
use super::seed;
use crate::utils::{AppError, AppResult};

/// 可存入快照槽位的记录
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// 新记录标识符前缀
    const ID_PREFIX: &'static str;
    /// 用于错误提示的实体名称
    const NOUN: &'static str;

    fn id(&self) -> &str;

    /// 槽位不存在时使用的示例数据
    fn sample() -> Vec<Self>;
}

impl Record for NewsItem {
    const ID_PREFIX: &'static str = "news";
    const NOUN: &'static str = "新闻";

    fn id(&self) -> &str {
        &self.id
    }

    fn sample() -> Vec<Self> {
        seed::sample_news()
    }
}

impl Record for Viewpoint {
    const ID_PREFIX: &'static str = "vp";
    const NOUN: &'static str = "观点";

    fn id(&self) -> &str {
        &self.id
    }

    fn sample() -> Vec<Self> {
        seed::sample_viewpoints()
    }
}

/// 生成带前缀的唯一标识符
pub fn new_id<T: Record>() -> String {
    format!("{}_{}", T::ID_PREFIX, Uuid::new_v4().simple())
}

/// 内存集合，每次修改后整体写回对应槽位
pub struct Repository<T: Record> {
    db: Arc<Database>,
    slot: String,
    items: Vec<T>,
}

impl<T: Record> Repository<T> {
    /// 加载槽位；槽位不存在时写入示例数据
    pub async fn open(db: Arc<Database>, slot: &str) -> AppResult<Self> {
        match db.load_slot(slot).await? {
            Some(raw) => {
                let items: Vec<T> = serde_json::from_str(&raw)?;
                debug!("从槽位 {} 加载 {} 条{}", slot, items.len(), T::NOUN);
                Ok(Self {
                    db,
                    slot: slot.to_string(),
                    items,
                })
            }
            None => Self::seed(db, slot).await,
        }
    }

    /// 使用内置示例数据初始化槽位
    pub async fn seed(db: Arc<Database>, slot: &str) -> AppResult<Self> {
        let mut repo = Self {
            db,
            slot: slot.to_string(),
            items: Vec::new(),
        };
        repo.commit(T::sample()).await?;
        info!("槽位 {} 无数据，已填充 {} 条示例{}", slot, repo.items.len(), T::NOUN);
        Ok(repo)
    }

    pub fn list(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// 新记录插入到最前面
    pub async fn add(&mut self, item: T) -> AppResult<()> {
        let mut items = self.items.clone();
        items.insert(0, item);
        self.commit(items).await
    }

    pub async fn update(&mut self, item: T) -> AppResult<()> {
        let index = self.position(item.id())?;
        let mut items = self.items.clone();
        items[index] = item;
        self.commit(items).await
    }

    /// 按标识符删除，不级联
    pub async fn delete(&mut self, id: &str) -> AppResult<T> {
        let index = self.position(id)?;
        let mut items = self.items.clone();
        let removed = items.remove(index);
        self.commit(items).await?;
        Ok(removed)
    }

    fn position(&self, id: &str) -> AppResult<usize> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| not_found::<T>(id))
    }

    /// 写入成功后才替换内存集合，失败时保持原状
    async fn commit(&mut self, items: Vec<T>) -> AppResult<()> {
        let raw = serde_json::to_string(&items)?;
        self.db.save_slot(&self.slot, &raw).await?;
        self.items = items;
        Ok(())
    }
}

fn not_found<T: Record>(id: &str) -> AppError {
    AppError::NotFound(format!("未找到该{}: {}", T::NOUN, id))
}
