// ==========================================
// EcoTrack 环境指标导入系统 - 指标查询 API
// ==========================================
// 职责: zones / sources / indicators 查询、统计与手工录入
// 校验: 外键目标不存在、类型为空等调用方错误统一返回 InvalidInput
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::indicator::{
    Indicator, IndicatorFilter, IndicatorStats, IndicatorUpdate, NewIndicator, Source, Zone,
};
use crate::repository::indicator_repo::{IndicatorRepository, DEFAULT_LIST_LIMIT};

/// 单页最大记录数
pub const MAX_LIST_LIMIT: usize = 1_000;

/// 指标类型最大长度（字符）
pub const MAX_INDICATOR_TYPE_LEN: usize = 100;

/// 指标查询API
pub struct IndicatorApi {
    indicator_repo: Arc<IndicatorRepository>,
}

impl IndicatorApi {
    pub fn new(indicator_repo: Arc<IndicatorRepository>) -> Self {
        Self { indicator_repo }
    }

    pub fn list_zones(&self) -> ApiResult<Vec<Zone>> {
        Ok(self.indicator_repo.list_zones()?)
    }

    pub fn list_sources(&self) -> ApiResult<Vec<Source>> {
        Ok(self.indicator_repo.list_sources()?)
    }

    /// 新建区域
    pub fn create_zone(&self, name: &str, postal_code: Option<&str>) -> ApiResult<Zone> {
        let name = require_non_empty("name", name)?;
        Ok(self.indicator_repo.create_zone(name, postal_code)?)
    }

    /// 新建来源
    pub fn create_source(
        &self,
        name: &str,
        description: Option<&str>,
        url: Option<&str>,
    ) -> ApiResult<Source> {
        let name = require_non_empty("name", name)?;
        Ok(self.indicator_repo.create_source(name, description, url)?)
    }

    /// 新建单条指标
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 区域或来源不存在 / 类型为空 / 数值非有限数
    pub fn create_indicator(&self, indicator: &NewIndicator) -> ApiResult<Indicator> {
        validate_indicator_type(&indicator.indicator_type)?;
        validate_value(indicator.value)?;
        self.ensure_zone_exists(indicator.zone_id)?;
        self.ensure_source_exists(indicator.source_id)?;

        let created = self.indicator_repo.create_indicator(indicator)?;
        tracing::info!(indicator_id = created.id, "手工新建指标");
        Ok(created)
    }

    /// 部分更新指标（只修改 update 中给出的字段）
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 指标不存在
    /// - Err(ApiError::InvalidInput): 新的区域或来源不存在 / 字段值非法
    pub fn update_indicator(&self, indicator_id: i64, update: &IndicatorUpdate) -> ApiResult<Indicator> {
        self.get_indicator(indicator_id)?;

        if let Some(indicator_type) = &update.indicator_type {
            validate_indicator_type(indicator_type)?;
        }
        if let Some(value) = update.value {
            validate_value(value)?;
        }
        if let Some(zone_id) = update.zone_id {
            self.ensure_zone_exists(zone_id)?;
        }
        if let Some(source_id) = update.source_id {
            self.ensure_source_exists(source_id)?;
        }

        let updated = self
            .indicator_repo
            .update_indicator(indicator_id, update)?
            .ok_or_else(|| indicator_not_found(indicator_id))?;
        tracing::info!(indicator_id, "指标已更新");
        Ok(updated)
    }

    /// 删除指标
    pub fn delete_indicator(&self, indicator_id: i64) -> ApiResult<()> {
        if !self.indicator_repo.delete_indicator(indicator_id)? {
            return Err(indicator_not_found(indicator_id));
        }
        tracing::info!(indicator_id, "指标已删除");
        Ok(())
    }

    fn ensure_zone_exists(&self, zone_id: i64) -> ApiResult<()> {
        match self.indicator_repo.get_zone(zone_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::InvalidInput(format!("Zone(id={})不存在", zone_id))),
        }
    }

    fn ensure_source_exists(&self, source_id: i64) -> ApiResult<()> {
        match self.indicator_repo.get_source(source_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::InvalidInput(format!("Source(id={})不存在", source_id))),
        }
    }

    /// 查询单条指标，不存在时返回 NotFound
    pub fn get_indicator(&self, indicator_id: i64) -> ApiResult<Indicator> {
        self.indicator_repo
            .get_indicator(indicator_id)?
            .ok_or_else(|| indicator_not_found(indicator_id))
    }

    /// 查询指标列表
    ///
    /// # 参数
    /// - filter: 过滤条件
    /// - skip: 分页偏移（缺省 0）
    /// - limit: 每页记录数（缺省 100，上限 MAX_LIST_LIMIT）
    pub fn list_indicators(
        &self,
        filter: &IndicatorFilter,
        skip: Option<usize>,
        limit: Option<usize>,
    ) -> ApiResult<Vec<Indicator>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if limit == 0 || limit > MAX_LIST_LIMIT {
            return Err(ApiError::InvalidInput(format!(
                "limit 必须在 1..={} 之间，实际 {}",
                MAX_LIST_LIMIT, limit
            )));
        }
        validate_date_range(filter)?;

        Ok(self
            .indicator_repo
            .list_indicators(filter, skip.unwrap_or(0), limit)?)
    }

    /// 聚合统计
    pub fn indicator_stats(&self, filter: &IndicatorFilter) -> ApiResult<IndicatorStats> {
        validate_date_range(filter)?;
        Ok(self.indicator_repo.indicator_stats(filter)?)
    }
}

fn indicator_not_found(indicator_id: i64) -> ApiError {
    ApiError::NotFound(format!("Indicator(id={})不存在", indicator_id))
}

fn require_non_empty<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} 不能为空", field)));
    }
    Ok(trimmed)
}

fn validate_indicator_type(indicator_type: &str) -> ApiResult<()> {
    let trimmed = require_non_empty("type", indicator_type)?;
    if trimmed.chars().count() > MAX_INDICATOR_TYPE_LEN {
        return Err(ApiError::InvalidInput(format!(
            "type 长度不能超过 {} 个字符",
            MAX_INDICATOR_TYPE_LEN
        )));
    }
    Ok(())
}

fn validate_value(value: f64) -> ApiResult<()> {
    if !value.is_finite() {
        return Err(ApiError::InvalidInput(format!("value 必须是有限数值，实际 {}", value)));
    }
    Ok(())
}

fn validate_date_range(filter: &IndicatorFilter) -> ApiResult<()> {
    if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
        if from > to {
            return Err(ApiError::InvalidInput(format!(
                "date_from ({}) 晚于 date_to ({})",
                from, to
            )));
        }
    }
    Ok(())
}
