// ==========================================
// EcoTrack 环境指标导入系统 - 维度解析 (get-or-create)
// ==========================================
// 约束: 名称先 trim 再精确匹配；未命中则在当前事务内插入并立即拿到 id
// 约束: 无进程内缓存，每次调用都重新查询
// 注意: zones / sources 表没有唯一约束，仅在单写者前提下不会产生重复
// ==========================================

use crate::domain::indicator::{Source, Zone};
use crate::repository::error::RepositoryResult;
use crate::repository::indicator_import_repo::IndicatorImportRepository;
use tracing::debug;

/// 按名称获取或创建区域
pub fn resolve_zone(repo: &dyn IndicatorImportRepository, name: &str) -> RepositoryResult<Zone> {
    let name = name.trim();

    if let Some(zone) = repo.find_zone_by_name(name)? {
        return Ok(zone);
    }

    let zone = repo.insert_zone(name, None)?;
    debug!(zone_id = zone.id, zone = %zone.name, "新建区域");
    Ok(zone)
}

/// 按名称获取或创建来源
///
/// description / url 仅在新建时使用，缺省写入空串；已存在的来源不会被更新。
pub fn resolve_source(
    repo: &dyn IndicatorImportRepository,
    name: &str,
    description: Option<&str>,
    url: Option<&str>,
) -> RepositoryResult<Source> {
    let name = name.trim();

    if let Some(source) = repo.find_source_by_name(name)? {
        return Ok(source);
    }

    let source = repo.insert_source(
        name,
        Some(description.unwrap_or_default()),
        Some(url.unwrap_or_default()),
    )?;
    debug!(source_id = source.id, source = %source.name, "新建来源");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use crate::repository::indicator_import_repo_impl::SqliteImportSession;
    use rusqlite::Connection;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_resolve_zone_twice_yields_one_row() {
        let conn = setup_conn();
        let session = SqliteImportSession::begin(&conn).unwrap();

        let first = resolve_zone(&session, "Strasbourg").unwrap();
        let second = resolve_zone(&session, "  Strasbourg ").unwrap();
        session.commit().unwrap();

        assert_eq!(first.id, second.id);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM zones", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_resolve_source_defaults_to_empty_strings() {
        let conn = setup_conn();
        let session = SqliteImportSession::begin(&conn).unwrap();

        let source = resolve_source(&session, " ATMO GRAND EST ", None, None).unwrap();

        assert_eq!(source.name, "ATMO GRAND EST");
        assert_eq!(source.description.as_deref(), Some(""));
        assert_eq!(source.url.as_deref(), Some(""));
    }

    #[test]
    fn test_existing_source_keeps_its_description() {
        let conn = setup_conn();
        let session = SqliteImportSession::begin(&conn).unwrap();

        resolve_source(&session, "LIG'AIR", Some("Indice ATMO par commune"), None).unwrap();
        let again = resolve_source(&session, "LIG'AIR", Some("autre"), None).unwrap();

        assert_eq!(again.description.as_deref(), Some("Indice ATMO par commune"));
    }
}
