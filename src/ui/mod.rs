pub mod chart;

pub use chart::{ChartDatum, ChartKind, ChartRenderer, TextChart};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::utils::AppResult;

/// 即时反馈（相当于页面上的提示条），发出即忘
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// 终端输出的提示实现
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!("✅ {}", message);
    }

    fn error(&self, message: &str) {
        warn!("❌ {}", message);
    }
}

/// 删除等破坏性操作前的确认
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

/// 从标准输入读取 y/n；`assume_yes` 对应命令行的 `--yes`
#[derive(Debug)]
pub struct StdinConfirmer {
    assume_yes: bool,
}

impl StdinConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "是")
    }
}

/// 剪贴板写入，尽力而为
pub trait Clipboard {
    fn write_text(&self, text: &str) -> AppResult<()>;
}

/// 命令行下以文件充当剪贴板
#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Clipboard for FileClipboard {
    fn write_text(&self, text: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, text)?;
        info!("已写入剪贴板文件: {}", self.path.display());
        Ok(())
    }
}

/// 复制文本并通过提示反馈结果
pub fn copy_with_feedback(clipboard: &dyn Clipboard, notifier: &dyn Notifier, text: &str) -> bool {
    match clipboard.write_text(text) {
        Ok(()) => {
            notifier.success("评论已复制到剪贴板");
            true
        }
        Err(e) => {
            warn!("复制失败: {}", e);
            notifier.error("复制失败，请手动复制");
            false
        }
    }
}
