// ==========================================
// EcoTrack 环境指标导入系统 - 命令行入口
// ==========================================
// 子命令: import / seed / stats / indicators / zones / sources / config
//         以及区域、来源、指标的手工增删改
// 输出: 结果以 JSON 打印到 stdout，日志写 stderr
// ==========================================

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use ecotrack_ingest::app::{get_default_db_path, AppState};
use ecotrack_ingest::config::ConfigManager;
use ecotrack_ingest::domain::{DatasetKind, IndicatorFilter, IndicatorUpdate, NewIndicator};
use ecotrack_ingest::importer::parse_timestamp;
use serde::Serialize;
use std::path::PathBuf;

/// 启动时按顺序导入的种子文件
const SEED_FILES: &[(&str, DatasetKind)] = &[
    ("ind_atmo_2021.csv", DatasetKind::IndAtmo),
    ("FR_E2_2025-01-01.csv", DatasetKind::FrE2),
];

#[derive(Parser, Debug)]
#[clap(name = "ecotrack-ingest", version)]
#[clap(about = "EcoTrack 环境指标 CSV 导入与查询")]
struct Cli {
    /// 数据库文件路径（缺省: ECOTRACK_DB_PATH 或用户数据目录）
    #[clap(long, global = true, value_name = "FILE")]
    db: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 导入一个 CSV 文件（generic / fr_e2 / ind_atmo）
    Import {
        dataset: DatasetKind,
        file: PathBuf,
    },

    /// 从数据目录导入 ind_atmo_2021.csv 与 FR_E2_2025-01-01.csv
    Seed {
        #[clap(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// 指标聚合统计
    Stats(FilterArgs),

    /// 指标列表
    Indicators {
        #[clap(flatten)]
        filter: FilterArgs,

        #[clap(long, default_value = "0")]
        skip: usize,

        #[clap(long, default_value = "100")]
        limit: usize,
    },

    /// 单条指标
    GetIndicator { id: i64 },

    /// 手工新建指标（区域与来源必须已存在）
    CreateIndicator(NewIndicatorArgs),

    /// 部分更新指标，只修改给出的字段
    UpdateIndicator {
        id: i64,

        #[clap(flatten)]
        changes: IndicatorChangeArgs,
    },

    /// 删除指标
    DeleteIndicator { id: i64 },

    /// 区域列表
    Zones,

    /// 新建区域
    CreateZone {
        name: String,

        #[clap(long)]
        postal_code: Option<String>,
    },

    /// 来源列表
    Sources,

    /// 新建来源
    CreateSource {
        name: String,

        #[clap(long)]
        description: Option<String>,

        #[clap(long)]
        url: Option<String>,
    },

    /// 导入配置
    Config {
        #[clap(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// 打印全部 global 配置
    Show,
    /// 写入一个配置项
    Set { key: String, value: String },
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[clap(long = "type")]
    indicator_type: Option<String>,

    #[clap(long)]
    zone_id: Option<i64>,

    #[clap(long)]
    source_id: Option<i64>,

    /// 起始时间（与导入相同的日期格式）
    #[clap(long)]
    from: Option<String>,

    /// 结束时间
    #[clap(long)]
    to: Option<String>,
}

#[derive(Args, Debug)]
struct NewIndicatorArgs {
    #[clap(long)]
    source_id: i64,

    #[clap(long)]
    zone_id: i64,

    #[clap(long = "type")]
    indicator_type: String,

    #[clap(long, allow_negative_numbers = true)]
    value: f64,

    #[clap(long)]
    unit: String,

    /// 测量时间（与导入相同的日期格式）
    #[clap(long, value_parser = parse_cli_timestamp)]
    timestamp: NaiveDateTime,

    #[clap(long)]
    metadata: Option<String>,
}

impl From<NewIndicatorArgs> for NewIndicator {
    fn from(args: NewIndicatorArgs) -> Self {
        NewIndicator {
            source_id: args.source_id,
            zone_id: args.zone_id,
            indicator_type: args.indicator_type,
            value: args.value,
            unit: args.unit,
            timestamp: args.timestamp,
            metadata: args.metadata,
        }
    }
}

#[derive(Args, Debug)]
struct IndicatorChangeArgs {
    #[clap(long)]
    source_id: Option<i64>,

    #[clap(long)]
    zone_id: Option<i64>,

    #[clap(long = "type")]
    indicator_type: Option<String>,

    #[clap(long, allow_negative_numbers = true)]
    value: Option<f64>,

    #[clap(long)]
    unit: Option<String>,

    #[clap(long, value_parser = parse_cli_timestamp)]
    timestamp: Option<NaiveDateTime>,

    #[clap(long)]
    metadata: Option<String>,
}

impl From<IndicatorChangeArgs> for IndicatorUpdate {
    fn from(args: IndicatorChangeArgs) -> Self {
        IndicatorUpdate {
            source_id: args.source_id,
            zone_id: args.zone_id,
            indicator_type: args.indicator_type,
            value: args.value,
            unit: args.unit,
            timestamp: args.timestamp,
            metadata: args.metadata,
        }
    }
}

fn parse_cli_timestamp(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_timestamp(raw).map_err(|e| e.to_string())
}

impl FilterArgs {
    fn into_filter(self) -> Result<IndicatorFilter> {
        Ok(IndicatorFilter {
            indicator_type: self.indicator_type,
            zone_id: self.zone_id,
            source_id: self.source_id,
            date_from: parse_bound(self.from)?,
            date_to: parse_bound(self.to)?,
        })
    }
}

fn parse_bound(raw: Option<String>) -> Result<Option<NaiveDateTime>> {
    raw.map(|s| parse_timestamp(&s).map_err(|e| anyhow!("时间参数无效: {}", e)))
        .transpose()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    ecotrack_ingest::logging::init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!(version = ecotrack_ingest::VERSION, db = %db_path, "{}", ecotrack_ingest::APP_NAME);

    let state = AppState::new(db_path.clone()).map_err(|e| anyhow!(e))?;

    match cli.command {
        Command::Import { dataset, file } => {
            let outcome = state
                .import_api
                .import_file(dataset, &file)
                .with_context(|| format!("导入 {} 失败", file.display()))?;
            print_json(&outcome)?;
        }
        Command::Seed { data_dir } => {
            for (file_name, kind) in SEED_FILES {
                let path = data_dir.join(file_name);
                if !path.exists() {
                    tracing::warn!(file = %path.display(), "种子文件不存在，跳过");
                    continue;
                }

                let outcome = state
                    .import_api
                    .import_file(*kind, &path)
                    .with_context(|| format!("导入 {} 失败", path.display()))?;
                tracing::info!(
                    file = file_name,
                    inserted = outcome.inserted,
                    errors = outcome.error_count(),
                    "种子数据导入完成"
                );
            }
        }
        Command::Stats(filter) => {
            let stats = state.indicator_api.indicator_stats(&filter.into_filter()?)?;
            print_json(&stats)?;
        }
        Command::Indicators {
            filter,
            skip,
            limit,
        } => {
            let items =
                state
                    .indicator_api
                    .list_indicators(&filter.into_filter()?, Some(skip), Some(limit))?;
            print_json(&items)?;
        }
        Command::GetIndicator { id } => print_json(&state.indicator_api.get_indicator(id)?)?,
        Command::CreateIndicator(args) => {
            let created = state.indicator_api.create_indicator(&args.into())?;
            print_json(&created)?;
        }
        Command::UpdateIndicator { id, changes } => {
            let updated = state.indicator_api.update_indicator(id, &changes.into())?;
            print_json(&updated)?;
        }
        Command::DeleteIndicator { id } => {
            state.indicator_api.delete_indicator(id)?;
            print_json(&serde_json::json!({ "deleted": id }))?;
        }
        Command::Zones => print_json(&state.indicator_api.list_zones()?)?,
        Command::CreateZone { name, postal_code } => {
            let zone = state
                .indicator_api
                .create_zone(&name, postal_code.as_deref())?;
            print_json(&zone)?;
        }
        Command::Sources => print_json(&state.indicator_api.list_sources()?)?,
        Command::CreateSource {
            name,
            description,
            url,
        } => {
            let source = state
                .indicator_api
                .create_source(&name, description.as_deref(), url.as_deref())?;
            print_json(&source)?;
        }
        Command::Config { action } => {
            let manager = ConfigManager::new(&db_path).map_err(|e| anyhow!("{}", e))?;
            match action {
                ConfigAction::Show => println!(
                    "{}",
                    manager.get_config_snapshot().map_err(|e| anyhow!("{}", e))?
                ),
                ConfigAction::Set { key, value } => {
                    manager.set_config(&key, &value).map_err(|e| anyhow!("{}", e))?
                }
            }
        }
    }

    Ok(())
}
