use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Teacher => "教师",
            Role::Student => "学生",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        })
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teacher" | "教师" => Ok(Role::Teacher),
            "student" | "学生" => Ok(Role::Student),
            other => Err(format!("未知角色: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// 可访问的页面，以及访问所需的角色
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    TeacherHome,
    StudentHome,
    NewsDetail(String),
    CommentGeneration(String),
    Visualization(String),
    MyViewpoints,
    Examples,
    Help,
    Resources,
}

impl Route {
    /// None 表示仅需登录；Login 无需登录
    fn required_role(&self) -> Option<Role> {
        match self {
            Route::TeacherHome | Route::CommentGeneration(_) | Route::Visualization(_) => {
                Some(Role::Teacher)
            }
            Route::StudentHome | Route::MyViewpoints => Some(Role::Student),
            Route::Login
            | Route::NewsDetail(_)
            | Route::Examples
            | Route::Help
            | Route::Resources => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::TeacherHome => "/teacher".to_string(),
            Route::StudentHome => "/student".to_string(),
            Route::NewsDetail(id) => format!("/news/{}", id),
            Route::CommentGeneration(id) => format!("/comment-generation/{}", id),
            Route::Visualization(id) => format!("/viewpoint-visualization/{}", id),
            Route::MyViewpoints => "/my-viewpoints".to_string(),
            Route::Examples => "/examples".to_string(),
            Route::Help => "/help".to_string(),
            Route::Resources => "/resources".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(Route),
}

/// 登录状态；只存在于当前进程，不持久化
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<UserInfo>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 角色由用户自行声明，不做凭据校验
    pub fn login(&mut self, name: &str, role: Role, id: Option<String>) -> AppResult<&UserInfo> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("请输入用户名".to_string()));
        }

        let id = id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("{}_{}", role, name));

        let user = self.user.insert(UserInfo {
            id,
            name: name.to_string(),
            role,
        });
        Ok(&*user)
    }

    pub fn logout(&mut self) {
        self.user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> AppResult<&UserInfo> {
        self.user.as_ref().ok_or(AppError::Unauthenticated)
    }

    pub fn is_teacher(&self) -> bool {
        matches!(self.user, Some(UserInfo { role: Role::Teacher, .. }))
    }

    pub fn home(&self) -> Route {
        match self.user.as_ref().map(|u| u.role) {
            Some(Role::Teacher) => Route::TeacherHome,
            Some(Role::Student) => Route::StudentHome,
            None => Route::Login,
        }
    }

    pub fn authorize(&self, route: &Route) -> Access {
        if *route == Route::Login {
            return Access::Granted;
        }

        let Some(user) = self.user.as_ref() else {
            return Access::Redirect(Route::Login);
        };

        match route.required_role() {
            Some(role) if role != user.role => Access::Redirect(self.home()),
            _ => Access::Granted,
        }
    }

    /// 将重定向转换为错误，供命令行入口使用
    pub fn ensure(&self, route: &Route) -> AppResult<()> {
        match self.authorize(route) {
            Access::Granted => Ok(()),
            Access::Redirect(Route::Login) => Err(AppError::Unauthenticated),
            Access::Redirect(home) => Err(AppError::Forbidden(format!(
                "{} (请返回 {})",
                route.path(),
                home.path()
            ))),
        }
    }
}
