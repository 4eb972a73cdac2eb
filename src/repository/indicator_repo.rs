// ==========================================
// EcoTrack 环境指标导入系统 - 指标查询仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: zones / sources / indicators 的查询、聚合统计与单条增删改
// 约束: 每个写方法自成一个事务（autocommit），与导入会话互不嵌套
// ==========================================

use crate::domain::indicator::{
    Indicator, IndicatorFilter, IndicatorStats, IndicatorUpdate, NewIndicator, Source, Zone,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

/// 列表查询默认分页大小
pub const DEFAULT_LIST_LIMIT: usize = 100;

const INDICATOR_COLUMNS: &str =
    "id, source_id, zone_id, type, value, unit, timestamp, metadata";

// ==========================================
// IndicatorRepository - 指标查询仓储
// ==========================================
pub struct IndicatorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl IndicatorRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 列出全部区域
    pub fn list_zones(&self) -> RepositoryResult<Vec<Zone>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, postal_code FROM zones ORDER BY id")?;

        let zones = stmt
            .query_map([], |row| {
                Ok(Zone {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    postal_code: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(zones)
    }

    /// 列出全部来源
    pub fn list_sources(&self) -> RepositoryResult<Vec<Source>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, description, url FROM sources ORDER BY id")?;

        let sources = stmt
            .query_map([], |row| {
                Ok(Source {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    url: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sources)
    }

    /// 按 id 查询区域
    pub fn get_zone(&self, zone_id: i64) -> RepositoryResult<Option<Zone>> {
        let conn = self.get_conn()?;
        let zone = conn
            .query_row(
                "SELECT id, name, postal_code FROM zones WHERE id = ?1",
                params![zone_id],
                |row| {
                    Ok(Zone {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        postal_code: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(zone)
    }

    /// 按 id 查询来源
    pub fn get_source(&self, source_id: i64) -> RepositoryResult<Option<Source>> {
        let conn = self.get_conn()?;
        let source = conn
            .query_row(
                "SELECT id, name, description, url FROM sources WHERE id = ?1",
                params![source_id],
                |row| {
                    Ok(Source {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        url: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(source)
    }

    /// 新建区域
    pub fn create_zone(&self, name: &str, postal_code: Option<&str>) -> RepositoryResult<Zone> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO zones (name, postal_code) VALUES (?1, ?2)",
            params![name, postal_code],
        )?;

        Ok(Zone {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            postal_code: postal_code.map(str::to_string),
        })
    }

    /// 新建来源
    pub fn create_source(
        &self,
        name: &str,
        description: Option<&str>,
        url: Option<&str>,
    ) -> RepositoryResult<Source> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO sources (name, description, url) VALUES (?1, ?2, ?3)",
            params![name, description, url],
        )?;

        Ok(Source {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            description: description.map(str::to_string),
            url: url.map(str::to_string),
        })
    }

    /// 按 id 查询单条指标
    pub fn get_indicator(&self, indicator_id: i64) -> RepositoryResult<Option<Indicator>> {
        let conn = self.get_conn()?;
        query_indicator(&conn, indicator_id)
    }

    /// 新建单条指标（外键由数据库校验）
    pub fn create_indicator(&self, indicator: &NewIndicator) -> RepositoryResult<Indicator> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO indicators (
                source_id, zone_id, type, value, unit, timestamp, metadata
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                indicator.source_id,
                indicator.zone_id,
                indicator.indicator_type,
                indicator.value,
                indicator.unit,
                indicator.timestamp,
                indicator.metadata,
            ],
        )?;

        Ok(Indicator {
            id: conn.last_insert_rowid(),
            source_id: indicator.source_id,
            zone_id: indicator.zone_id,
            indicator_type: indicator.indicator_type.clone(),
            value: indicator.value,
            unit: indicator.unit.clone(),
            timestamp: indicator.timestamp,
            metadata: indicator.metadata.clone(),
        })
    }

    /// 部分更新指标
    ///
    /// # 返回
    /// - Ok(Some(Indicator)): 更新后的记录
    /// - Ok(None): 指标不存在
    pub fn update_indicator(
        &self,
        indicator_id: i64,
        update: &IndicatorUpdate,
    ) -> RepositoryResult<Option<Indicator>> {
        let conn = self.get_conn()?;
        let (assignments, mut args) = build_update_assignments(update);

        if !assignments.is_empty() {
            let sql = format!("UPDATE indicators SET {} WHERE id = ?", assignments.join(", "));
            args.push(Box::new(indicator_id));

            let affected = conn.execute(&sql, params_from_iter(args.iter()))?;
            if affected == 0 {
                return Ok(None);
            }
        }

        query_indicator(&conn, indicator_id)
    }

    /// 删除指标，返回是否确有记录被删除
    pub fn delete_indicator(&self, indicator_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM indicators WHERE id = ?1", params![indicator_id])?;
        Ok(affected > 0)
    }

    /// 带过滤和分页的指标列表
    ///
    /// # 参数
    /// - filter: 过滤条件（全部可选，AND 组合）
    /// - skip: 分页偏移
    /// - limit: 每页记录数
    pub fn list_indicators(
        &self,
        filter: &IndicatorFilter,
        skip: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Indicator>> {
        let conn = self.get_conn()?;
        let (where_clause, mut args) = build_filter_clause(filter);

        let sql = format!(
            "SELECT {} FROM indicators{} ORDER BY id LIMIT ? OFFSET ?",
            INDICATOR_COLUMNS, where_clause
        );
        args.push(Box::new(limit as i64));
        args.push(Box::new(skip as i64));

        let mut stmt = conn.prepare(&sql)?;
        let indicators = stmt
            .query_map(params_from_iter(args.iter()), map_indicator_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(indicators)
    }

    /// 聚合统计：count / min / max / avg（与列表查询共用过滤条件）
    pub fn indicator_stats(&self, filter: &IndicatorFilter) -> RepositoryResult<IndicatorStats> {
        let conn = self.get_conn()?;
        let (where_clause, args) = build_filter_clause(filter);

        let sql = format!(
            "SELECT COUNT(id), MIN(value), MAX(value), AVG(value) FROM indicators{}",
            where_clause
        );

        let stats = conn.query_row(&sql, params_from_iter(args.iter()), |row| {
            Ok(IndicatorStats {
                count: row.get::<_, Option<i64>>(0)?.unwrap_or(0),
                min_value: row.get(1)?,
                max_value: row.get(2)?,
                avg_value: row.get(3)?,
            })
        })?;

        Ok(stats)
    }

    /// 统计 indicators 表记录数
    pub fn count_indicators(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM indicators", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn query_indicator(conn: &Connection, indicator_id: i64) -> RepositoryResult<Option<Indicator>> {
    let sql = format!("SELECT {} FROM indicators WHERE id = ?1", INDICATOR_COLUMNS);

    let indicator = conn
        .query_row(&sql, params![indicator_id], map_indicator_row)
        .optional()?;

    Ok(indicator)
}

fn map_indicator_row(row: &Row<'_>) -> rusqlite::Result<Indicator> {
    Ok(Indicator {
        id: row.get(0)?,
        source_id: row.get(1)?,
        zone_id: row.get(2)?,
        indicator_type: row.get(3)?,
        value: row.get(4)?,
        unit: row.get(5)?,
        timestamp: row.get(6)?,
        metadata: row.get(7)?,
    })
}

/// 构建 WHERE 子句（无条件时返回空串）
fn build_filter_clause(filter: &IndicatorFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions: Vec<&str> = Vec::new();
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(indicator_type) = filter.indicator_type.as_ref().filter(|t| !t.is_empty()) {
        conditions.push("type = ?");
        args.push(Box::new(indicator_type.clone()));
    }
    if let Some(zone_id) = filter.zone_id {
        conditions.push("zone_id = ?");
        args.push(Box::new(zone_id));
    }
    if let Some(source_id) = filter.source_id {
        conditions.push("source_id = ?");
        args.push(Box::new(source_id));
    }
    if let Some(date_from) = filter.date_from {
        conditions.push("timestamp >= ?");
        args.push(Box::new(date_from));
    }
    if let Some(date_to) = filter.date_to {
        conditions.push("timestamp <= ?");
        args.push(Box::new(date_to));
    }

    if conditions.is_empty() {
        (String::new(), args)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), args)
    }
}

/// 构建 SET 子句（只包含需要修改的列）
fn build_update_assignments(update: &IndicatorUpdate) -> (Vec<&'static str>, Vec<Box<dyn ToSql>>) {
    let mut assignments: Vec<&'static str> = Vec::new();
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(source_id) = update.source_id {
        assignments.push("source_id = ?");
        args.push(Box::new(source_id));
    }
    if let Some(zone_id) = update.zone_id {
        assignments.push("zone_id = ?");
        args.push(Box::new(zone_id));
    }
    if let Some(indicator_type) = &update.indicator_type {
        assignments.push("type = ?");
        args.push(Box::new(indicator_type.clone()));
    }
    if let Some(value) = update.value {
        assignments.push("value = ?");
        args.push(Box::new(value));
    }
    if let Some(unit) = &update.unit {
        assignments.push("unit = ?");
        args.push(Box::new(unit.clone()));
    }
    if let Some(timestamp) = update.timestamp {
        assignments.push("timestamp = ?");
        args.push(Box::new(timestamp));
    }
    if let Some(metadata) = &update.metadata {
        assignments.push("metadata = ?");
        args.push(Box::new(metadata.clone()));
    }

    (assignments, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use chrono::NaiveDate;

    fn setup_repo() -> IndicatorRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        conn.execute_batch(
            r#"
            INSERT INTO zones (name) VALUES ('Strasbourg'), ('Metz');
            INSERT INTO sources (name, description, url) VALUES ('ATMO GRAND EST', '', '');
            INSERT INTO indicators (source_id, zone_id, type, value, unit, timestamp)
            VALUES
                (1, 1, 'NO2', 10.0, 'µg/m³', '2025-01-01 00:00:00'),
                (1, 1, 'NO2', 30.0, 'µg/m³', '2025-01-02 00:00:00'),
                (1, 2, 'O3', 50.0, 'µg/m³', '2025-01-03 00:00:00');
            "#,
        )
        .unwrap();

        IndicatorRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_stats_without_filter() {
        let repo = setup_repo();
        let stats = repo.indicator_stats(&IndicatorFilter::default()).unwrap();

        assert_eq!(stats.count, 3);
        assert_eq!(stats.min_value, Some(10.0));
        assert_eq!(stats.max_value, Some(50.0));
        assert_eq!(stats.avg_value, Some(30.0));
    }

    #[test]
    fn test_stats_on_empty_selection() {
        let repo = setup_repo();
        let filter = IndicatorFilter {
            indicator_type: Some("PM10".to_string()),
            ..Default::default()
        };
        let stats = repo.indicator_stats(&filter).unwrap();

        assert_eq!(stats.count, 0);
        assert_eq!(stats.min_value, None);
        assert_eq!(stats.avg_value, None);
    }

    #[test]
    fn test_list_with_type_and_date_filter() {
        let repo = setup_repo();
        let filter = IndicatorFilter {
            indicator_type: Some("NO2".to_string()),
            date_from: NaiveDate::from_ymd_opt(2025, 1, 2).and_then(|d| d.and_hms_opt(0, 0, 0)),
            ..Default::default()
        };

        let items = repo.list_indicators(&filter, 0, DEFAULT_LIST_LIMIT).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value, 30.0);
    }

    #[test]
    fn test_list_pagination() {
        let repo = setup_repo();
        let page = repo
            .list_indicators(&IndicatorFilter::default(), 1, 1)
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 2);
    }

    #[test]
    fn test_get_indicator_missing() {
        let repo = setup_repo();
        assert!(repo.get_indicator(42).unwrap().is_none());
        assert!(repo.get_indicator(1).unwrap().is_some());
    }

    #[test]
    fn test_create_dimensions_and_indicator() {
        let repo = setup_repo();
        let zone = repo.create_zone("Colmar", Some("68000")).unwrap();
        let source = repo.create_source("Lig'Air", None, Some("https://www.ligair.fr")).unwrap();

        assert_eq!(repo.get_zone(zone.id).unwrap(), Some(zone.clone()));
        assert_eq!(repo.get_source(source.id).unwrap(), Some(source.clone()));

        let created = repo
            .create_indicator(&NewIndicator {
                source_id: source.id,
                zone_id: zone.id,
                indicator_type: "PM10".to_string(),
                value: 21.5,
                unit: "µg/m³".to_string(),
                timestamp: NaiveDate::from_ymd_opt(2025, 1, 4)
                    .and_then(|d| d.and_hms_opt(8, 0, 0))
                    .unwrap(),
                metadata: Some("saisie manuelle".to_string()),
            })
            .unwrap();

        assert_eq!(repo.get_indicator(created.id).unwrap(), Some(created));
        assert_eq!(repo.count_indicators().unwrap(), 4);
    }

    #[test]
    fn test_create_indicator_with_unknown_zone_fails() {
        let repo = setup_repo();
        let result = repo.create_indicator(&NewIndicator {
            source_id: 1,
            zone_id: 99,
            indicator_type: "NO2".to_string(),
            value: 1.0,
            unit: "µg/m³".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2025, 1, 4)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
            metadata: None,
        });

        assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation(_))));
    }

    #[test]
    fn test_partial_update_touches_only_given_fields() {
        let repo = setup_repo();
        let update = IndicatorUpdate {
            value: Some(12.0),
            metadata: Some("corrigé".to_string()),
            ..Default::default()
        };

        let updated = repo.update_indicator(1, &update).unwrap().unwrap();

        assert_eq!(updated.value, 12.0);
        assert_eq!(updated.metadata.as_deref(), Some("corrigé"));
        assert_eq!(updated.indicator_type, "NO2");
        assert_eq!(updated.zone_id, 1);
    }

    #[test]
    fn test_update_and_delete_missing_indicator() {
        let repo = setup_repo();
        let update = IndicatorUpdate {
            value: Some(1.0),
            ..Default::default()
        };

        assert!(repo.update_indicator(42, &update).unwrap().is_none());
        assert!(repo.update_indicator(42, &IndicatorUpdate::default()).unwrap().is_none());
        assert!(!repo.delete_indicator(42).unwrap());
    }

    #[test]
    fn test_delete_indicator() {
        let repo = setup_repo();
        assert!(repo.delete_indicator(2).unwrap());
        assert!(repo.get_indicator(2).unwrap().is_none());
        assert_eq!(repo.count_indicators().unwrap(), 2);
    }
}
