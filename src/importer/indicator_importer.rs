// ==========================================
// EcoTrack 环境指标导入系统 - 指标导入器
// ==========================================
// 职责: 整合导入流程，从 CSV 文本到数据库
// 流程: 读表头 → 校验必需列 → 逐行映射写入 → 提交 / 回滚
// 约束: 行级错误累积后继续；整批只有一个事务边界
// ==========================================

use crate::config::{config_keys, ImportConfigReader};
use crate::domain::import::{ImportOutcome, RawRow, RowErrorEntry};
use crate::domain::types::DatasetKind;
use crate::importer::data_cleaner::normalize_headers;
use crate::importer::dataset_adapter::{adapter_for, AdapterSettings, DatasetAdapter};
use crate::importer::error::{ImportError, ImportResult, RowError};
use crate::repository::indicator_import_repo::IndicatorImportRepository;
use crate::repository::indicator_import_repo_impl::SqliteImportSession;
use csv::ReaderBuilder;
use rusqlite::Connection;
use std::error::Error;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 首条数据行的行号（表头为第 1 行）
const FIRST_DATA_LINE: usize = 2;

// ==========================================
// IndicatorImporter - 指标导入器
// ==========================================
pub struct IndicatorImporter<C>
where
    C: ImportConfigReader,
{
    // 导入期间独占的连接
    conn: Arc<Mutex<Connection>>,

    // 配置读取器
    config: C,
}

impl<C> IndicatorImporter<C>
where
    C: ImportConfigReader,
{
    /// 创建新的 IndicatorImporter 实例
    ///
    /// # 参数
    /// - conn: 已完成建表的数据库连接
    /// - config: 配置读取器
    pub fn new(conn: Arc<Mutex<Connection>>, config: C) -> Self {
        Self { conn, config }
    }

    /// 从任意 Read 源导入（整体读入内存，要求 UTF-8）
    pub fn import_reader<R: Read>(&self, kind: DatasetKind, mut reader: R) -> ImportResult<ImportOutcome> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        self.import_str(kind, &content)
    }

    /// 导入一段 CSV 文本
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 已提交的行数 + 行级错误
    /// - Err(ImportError::MissingColumns): 表头缺少必需列，未写入任何数据
    /// - Err(ImportError::CommitFailed): 提交失败，已回滚，未写入任何数据
    /// - Err(ImportError::TransactionAborted): 数据库中途回滚了事务，未写入任何数据
    #[instrument(skip(self, content), fields(dataset = kind.as_str(), batch_id))]
    pub fn import_str(&self, kind: DatasetKind, content: &str) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(batch_id = %batch_id, bytes = content.len(), "开始导入指标数据");

        // 配置与导入共用连接，必须在加锁前读取
        let settings = self.load_settings()?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::DatabaseTransactionError(format!("锁获取失败: {}", e)))?;
        let session = SqliteImportSession::begin(&conn)
            .map_err(|e| ImportError::DatabaseTransactionError(e.to_string()))?;

        let outcome = run_import(adapter_for(kind), content.as_bytes(), &session, &settings)?;

        info!(
            batch_id = %batch_id,
            inserted = outcome.inserted,
            errors = outcome.error_count(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "指标导入完成"
        );

        Ok(outcome)
    }

    /// 读取本次导入的适配器配置
    pub fn load_settings(&self) -> ImportResult<AdapterSettings> {
        Ok(AdapterSettings {
            fr_e2_default_unit: self
                .config
                .get_fr_e2_default_unit()
                .map_err(|e| config_error(config_keys::FR_E2_DEFAULT_UNIT, e))?,
            fr_e2_source_description: self
                .config
                .get_fr_e2_source_description()
                .map_err(|e| config_error(config_keys::FR_E2_SOURCE_DESCRIPTION, e))?,
            ind_atmo_source_description: self
                .config
                .get_ind_atmo_source_description()
                .map_err(|e| config_error(config_keys::IND_ATMO_SOURCE_DESCRIPTION, e))?,
        })
    }
}

fn config_error(key: &str, err: Box<dyn Error>) -> ImportError {
    ImportError::ConfigReadError {
        key: key.to_string(),
        message: err.to_string(),
    }
}

/// 在给定事务上执行一次导入
///
/// 事务由调用方开启；本函数负责结束它（提交，或在任何整批错误时回滚）。
pub fn run_import<R: Read>(
    adapter: &dyn DatasetAdapter,
    input: R,
    repo: &dyn IndicatorImportRepository,
    settings: &AdapterSettings,
) -> ImportResult<ImportOutcome> {
    let dataset = adapter.kind().to_string();

    let mut reader = ReaderBuilder::new()
        .delimiter(adapter.delimiter())
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    // === 阶段 1: 表头校验 ===
    let headers = match reader.headers() {
        Ok(record) => normalize_headers(&record.iter().collect::<Vec<_>>()),
        Err(e) => {
            abort(repo);
            return Err(e.into());
        }
    };

    let missing = adapter.missing_columns(&headers);
    if !missing.is_empty() {
        warn!(dataset = %dataset, missing = ?missing, "缺少必需列，放弃导入");
        abort(repo);
        return Err(ImportError::MissingColumns {
            dataset,
            columns: missing,
        });
    }
    debug!(columns = headers.len(), "表头校验通过");

    // === 阶段 2: 逐行映射 ===
    let mut outcome = ImportOutcome::default();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + FIRST_DATA_LINE;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let err = RowError::MalformedRecord(e.to_string());
                warn!(line, error = %err, "CSV 记录无法解析");
                outcome.errors.push(RowErrorEntry {
                    line,
                    error: err.to_string(),
                    row: None,
                });
                continue;
            }
        };

        // 短行缺失的列不出现在 map 中
        let raw: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();

        let mapped = adapter
            .map_row(&raw, repo, settings)
            .and_then(|indicator| repo.insert_indicator(&indicator).map_err(RowError::from));

        match mapped {
            Ok(_) => outcome.inserted += 1,
            Err(err) => {
                // 写入失败可能已让 SQLite 回滚整个事务，之后的写入会直接落盘
                if !repo.is_active() {
                    warn!(dataset = %dataset, line, error = %err, "导入事务已被数据库回滚，放弃导入");
                    abort(repo);
                    return Err(ImportError::TransactionAborted {
                        dataset,
                        line,
                        message: err.to_string(),
                    });
                }

                debug!(line, error = %err, "行映射失败");
                outcome.errors.push(RowErrorEntry {
                    line,
                    error: err.to_string(),
                    row: adapter.echoes_raw_row().then_some(raw),
                });
            }
        }
    }

    info!(
        inserted = outcome.inserted,
        errors = outcome.error_count(),
        "逐行处理完成，准备提交"
    );

    // === 阶段 3: 提交 ===
    if let Err(e) = repo.commit() {
        warn!(dataset = %dataset, error = %e, "提交失败，回滚本次导入");
        abort(repo);
        return Err(ImportError::CommitFailed {
            dataset,
            message: e.to_string(),
        });
    }

    Ok(outcome)
}

fn abort(repo: &dyn IndicatorImportRepository) {
    if let Err(e) = repo.rollback() {
        warn!(error = %e, "回滚失败");
    }
}
