// ==========================================
// EcoTrack 环境指标导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 多格式环境测量 CSV 接入，统一为 Indicator 模型
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DatasetKind, ImportOutcome, Indicator, IndicatorFilter, IndicatorUpdate, NewIndicator,
    RowErrorEntry, Source, Zone,
};

// 导入
pub use importer::{ImportError, IndicatorImporter};

// API
pub use api::{ImportApi, IndicatorApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "EcoTrack 环境指标导入系统";
