// ==========================================
// EcoTrack 环境指标导入系统 - 指标导入 Repository 实现
// ==========================================
// 职责: 实现导入事务内的数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::indicator::{NewIndicator, Source, Zone};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::indicator_import_repo::IndicatorImportRepository;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::Cell;

// ==========================================
// SqliteImportSession
// ==========================================
// 显式 BEGIN / COMMIT / ROLLBACK：
// COMMIT 失败（如延迟外键检查）时事务仍处于活动状态，调用方可以再 ROLLBACK。
// 未结束的会话在 Drop 时回滚。
pub struct SqliteImportSession<'c> {
    conn: &'c Connection,
    finished: Cell<bool>,
}

impl<'c> SqliteImportSession<'c> {
    /// 在给定连接上开启事务
    ///
    /// # 参数
    /// - conn: 已配置 PRAGMA 且完成建表的连接（调用期间独占）
    pub fn begin(conn: &'c Connection) -> RepositoryResult<Self> {
        conn.execute_batch("BEGIN")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(Self {
            conn,
            finished: Cell::new(false),
        })
    }
}

impl IndicatorImportRepository for SqliteImportSession<'_> {
    fn find_zone_by_name(&self, name: &str) -> RepositoryResult<Option<Zone>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, postal_code FROM zones WHERE name = ?1 ORDER BY id LIMIT 1",
        )?;

        let zone = stmt
            .query_row(params![name], |row| {
                Ok(Zone {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    postal_code: row.get(2)?,
                })
            })
            .optional()?;

        Ok(zone)
    }

    fn find_source_by_name(&self, name: &str) -> RepositoryResult<Option<Source>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, description, url FROM sources WHERE name = ?1 ORDER BY id LIMIT 1",
        )?;

        let source = stmt
            .query_row(params![name], |row| {
                Ok(Source {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    url: row.get(3)?,
                })
            })
            .optional()?;

        Ok(source)
    }

    fn insert_zone(&self, name: &str, postal_code: Option<&str>) -> RepositoryResult<Zone> {
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO zones (name, postal_code) VALUES (?1, ?2)")?;
        stmt.execute(params![name, postal_code])?;

        Ok(Zone {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            postal_code: postal_code.map(str::to_string),
        })
    }

    fn insert_source(
        &self,
        name: &str,
        description: Option<&str>,
        url: Option<&str>,
    ) -> RepositoryResult<Source> {
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO sources (name, description, url) VALUES (?1, ?2, ?3)")?;
        stmt.execute(params![name, description, url])?;

        Ok(Source {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            description: description.map(str::to_string),
            url: url.map(str::to_string),
        })
    }

    fn insert_indicator(&self, indicator: &NewIndicator) -> RepositoryResult<i64> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            INSERT INTO indicators (
                source_id, zone_id, type, value, unit, timestamp, metadata
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )?;

        stmt.execute(params![
            indicator.source_id,
            indicator.zone_id,
            indicator.indicator_type,
            indicator.value,
            indicator.unit,
            indicator.timestamp,
            indicator.metadata,
        ])?;

        Ok(self.conn.last_insert_rowid())
    }

    fn commit(&self) -> RepositoryResult<()> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        self.finished.set(true);
        Ok(())
    }

    fn rollback(&self) -> RepositoryResult<()> {
        self.finished.set(true);

        // SQLite 在部分错误下会自动回滚，此时已回到 autocommit 模式
        if self.conn.is_autocommit() {
            return Ok(());
        }

        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn is_active(&self) -> bool {
        !self.finished.get() && !self.conn.is_autocommit()
    }
}

impl Drop for SqliteImportSession<'_> {
    fn drop(&mut self) {
        if !self.finished.get() && !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(error = %e, "导入会话未结束，回滚失败");
            }
        }
    }
}
