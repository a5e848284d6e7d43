mod common;

use assert_matches::assert_matches;
use ore_warehouse_api::{
    entities::{log_entry, order},
    errors::ServiceError,
    services::orders::UpdateOrderStatusRequest,
};
use sea_orm::{EntityTrait, QueryOrder};

use common::{item, order_request, seed, TestApp};

fn status(value: &str) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status: value.to_string(),
    }
}

#[tokio::test]
async fn updating_a_missing_order_is_not_found_and_not_logged() {
    let app = TestApp::new().await;
    let service = &app.state.services.orders;

    let created = service
        .create_order(
            "tester",
            order_request("SO-1", vec![item(seed::BATCH_1, 2.0, None)]),
        )
        .await
        .unwrap();
    assert_eq!(app.wait_for_logs(1).await, 1);

    let result = service
        .update_order_status("tester", 9999, status("shipped"))
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));

    let stored = order::Entity::find_by_id(created.order.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "new");

    // A later audited write flushes anything the failed update might have queued.
    service
        .update_order_status("tester", created.order.id, status("confirmed"))
        .await
        .unwrap();
    assert_eq!(app.wait_for_logs(2).await, 2);

    let newest = log_entry::Entity::find()
        .order_by_desc(log_entry::Column::Id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert!(newest.detail.contains("confirmed"));
    assert!(!newest.detail.contains("9999"));
}

#[tokio::test]
async fn status_update_touches_status_and_timestamp_only() {
    let app = TestApp::new().await;
    let service = &app.state.services.orders;

    let created = service
        .create_order(
            "tester",
            order_request("SO-2", vec![item(seed::BATCH_1, 6.0, None)]),
        )
        .await
        .unwrap();

    let updated = service
        .update_order_status("dispatcher", created.order.id, status("  shipped "))
        .await
        .unwrap();

    assert_eq!(updated.status, "shipped");
    assert!(updated.updated_at >= created.order.updated_at);
    assert_eq!(updated.total_quantity, 6.0);
    assert_eq!(updated.order_number, "SO-2");
    assert_eq!(updated.created_at, created.order.created_at);
}

#[tokio::test]
async fn successful_update_is_audited_with_actor() {
    let app = TestApp::new().await;
    let service = &app.state.services.orders;

    let created = service
        .create_order(
            "tester",
            order_request("SO-3", vec![item(seed::BATCH_1, 1.0, None)]),
        )
        .await
        .unwrap();
    service
        .update_order_status("dispatcher", created.order.id, status("closed"))
        .await
        .unwrap();

    assert_eq!(app.wait_for_logs(2).await, 2);
    let entries = log_entry::Entity::find()
        .order_by_asc(log_entry::Column::Id)
        .all(&*app.db)
        .await
        .unwrap();
    assert_eq!(entries[1].actor, "dispatcher");
    assert_eq!(entries[1].action, "update_status");
    assert_eq!(entries[1].entity_kind, "order");
}

#[tokio::test]
async fn blank_status_is_rejected() {
    let app = TestApp::new().await;
    let created = app
        .state
        .services
        .orders
        .create_order(
            "tester",
            order_request("SO-4", vec![item(seed::BATCH_1, 1.0, None)]),
        )
        .await
        .unwrap();

    let result = app
        .state
        .services
        .orders
        .update_order_status("tester", created.order.id, status("   "))
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}
