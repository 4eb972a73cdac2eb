// ==========================================
// IndicatorApi 手工录入测试
// ==========================================
// 测试目标: 导入后的数据可通过 API 新建 / 修改 / 删除
// ==========================================


use chrono::NaiveDate;
use ecotrack_ingest::api::ApiError;
use ecotrack_ingest::app::AppState;
use ecotrack_ingest::domain::{DatasetKind, IndicatorFilter, IndicatorUpdate, NewIndicator};
use test_helpers::{count_rows, create_test_db, open_test_connection, write_csv, IND_ATMO_CSV};

#[test]
fn test_manual_indicator_reuses_imported_dimensions() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path.clone()).expect("Failed to create AppState");
    let csv_file = write_csv(IND_ATMO_CSV).unwrap();
    state
        .import_api
        .import_file(DatasetKind::IndAtmo, csv_file.path())
        .unwrap();

    let zone = state.indicator_api.list_zones().unwrap().remove(0);
    let source = state.indicator_api.list_sources().unwrap().remove(0);

    let created = state
        .indicator_api
        .create_indicator(&NewIndicator {
            source_id: source.id,
            zone_id: zone.id,
            indicator_type: "atmo_index".to_string(),
            value: 3.0,
            unit: "index".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2021, 1, 2)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
            metadata: Some("lib_qual=Dégradé".to_string()),
        })
        .unwrap();

    let by_zone = IndicatorFilter {
        zone_id: Some(zone.id),
        ..Default::default()
    };
    let stats = state.indicator_api.indicator_stats(&by_zone).unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.max_value, Some(3.0));

    let moved = state
        .indicator_api
        .update_indicator(
            created.id,
            &IndicatorUpdate {
                value: Some(-1.5),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(moved.value, -1.5);
    assert_eq!(moved.zone_id, zone.id);

    state.indicator_api.delete_indicator(created.id).unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_rows(&conn, "indicators"), 2);
}

#[test]
fn test_unknown_source_is_client_error() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to create AppState");
    let zone = state.indicator_api.create_zone("Orléans", Some("45000")).unwrap();

    let result = state.indicator_api.create_indicator(&NewIndicator {
        source_id: 12,
        zone_id: zone.id,
        indicator_type: "NO2".to_string(),
        value: 1.0,
        unit: "µg/m³".to_string(),
        timestamp: NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap(),
        metadata: None,
    });

    match result {
        Err(err @ ApiError::InvalidInput(_)) => assert!(err.is_client_error()),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}
