// 漫画发现后端库
//
// 本库提供漫画搜索与浏览的核心功能，包括：
// - API 路由
// - 上游目录服务集成
// - 搜索条件构建与结果累积
// - 成人内容可见性判断

pub mod api;
pub mod config;
pub mod external;
pub mod models;
pub mod services;
