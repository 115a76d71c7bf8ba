//! Handlers for the `/orders` resource.

use atelier_core::audit::{actions, resources};
use atelier_core::numbering::{order_number, MAX_NUMBER_ATTEMPTS};
use atelier_core::order::{validate_transition, OrderStatus};
use atelier_core::types::{DbId, Timestamp};
use atelier_db::models::order::{CreateOrder, Order, OrderFilter, UpdateOrder};
use atelier_db::repositories::{AppointmentRepo, OrderRepo};
use atelier_events::PlatformEvent;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::audit::AuditEntry;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireAdmin, RequireTailorOrAdmin};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_ORDER_LIMIT: i64 = 50;
const ORDER_NUMBER_CONSTRAINT: &str = "uq_orders_order_number";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub appointment_id: DbId,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub garment_type: String,
    pub fabric_details: Option<String>,
    pub design_notes: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub estimated_price: Option<f64>,
    pub estimated_delivery: Option<Timestamp>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub garment_type: Option<String>,
    pub fabric_details: Option<String>,
    pub design_notes: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub estimated_price: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub final_price: Option<f64>,
    pub estimated_delivery: Option<Timestamp>,
    pub actual_delivery: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderDeleted {
    pub message: &'static str,
    pub order_id: DbId,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn load_order(state: &AppState, id: DbId) -> AppResult<Order> {
    OrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Order", id))
}

/// Customers reach their own orders, tailors the ones assigned to them.
fn ensure_order_access(auth_user: &AuthUser, order: &Order) -> AppResult<()> {
    let denied = (auth_user.is_customer() && order.customer_id != auth_user.user_id)
        || (auth_user.is_tailor() && order.tailor_id != Some(auth_user.user_id));
    if denied {
        return Err(AppError::forbidden("Access denied"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/orders
///
/// Customer and tailor are copied from the source appointment. The order
/// number is regenerated if it collides with an existing one.
pub async fn create_order(
    State(state): State<AppState>,
    RequireTailorOrAdmin(user): RequireTailorOrAdmin,
    client: ClientInfo,
    Json(input): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Order>>)> {
    input.validate()?;

    let appointment = AppointmentRepo::find_by_id(&state.pool, input.appointment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Appointment", input.appointment_id))?;

    let mut create = CreateOrder {
        appointment_id: Some(appointment.id),
        customer_id: appointment.customer_id,
        tailor_id: appointment.tailor_id,
        order_number: String::new(),
        garment_type: input.garment_type.trim().to_string(),
        fabric_details: input.fabric_details,
        design_notes: input.design_notes,
        estimated_price: input.estimated_price,
        estimated_delivery: input.estimated_delivery,
    };

    let mut attempt = 0;
    let order = loop {
        attempt += 1;
        create.order_number = order_number(Utc::now().date_naive());
        match OrderRepo::create(&state.pool, &create).await {
            Ok(order) => break order,
            Err(e)
                if attempt < MAX_NUMBER_ATTEMPTS
                    && is_unique_violation(&e, ORDER_NUMBER_CONSTRAINT) =>
            {
                tracing::debug!(attempt, "Order number collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    };

    tracing::info!(
        order_id = order.id,
        order_number = %order.order_number,
        appointment_id = appointment.id,
        "Order created"
    );
    AuditEntry::new(actions::ORDER_CREATED)
        .user(user.user_id)
        .resource(resources::ORDER, order.id)
        .details(serde_json::json!({
            "order_number": order.order_number,
            "appointment_id": appointment.id,
            "garment_type": order.garment_type,
        }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// GET /api/v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    let status = params
        .status
        .as_deref()
        .map(OrderStatus::parse)
        .transpose()?;

    let mut filter = OrderFilter {
        status: status.map(|s| s.as_str().to_string()),
        ..Default::default()
    };
    if auth_user.is_customer() {
        filter.customer_id = Some(auth_user.user_id);
    } else if auth_user.is_tailor() {
        filter.tailor_id = Some(auth_user.user_id);
    }

    let (limit, offset) = pagination.resolve(DEFAULT_ORDER_LIMIT);
    let orders = OrderRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Order>>> {
    let order = load_order(&state, id).await?;
    ensure_order_access(&auth_user, &order)?;
    Ok(Json(DataResponse { data: order }))
}

/// PATCH /api/v1/orders/{id}
///
/// Status changes must follow the production pipeline. Delivering an
/// order stamps its actual delivery time.
pub async fn update_order(
    State(state): State<AppState>,
    RequireTailorOrAdmin(user): RequireTailorOrAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrderRequest>,
) -> AppResult<Json<DataResponse<Order>>> {
    input.validate()?;
    let order = load_order(&state, id).await?;
    ensure_order_access(&user, &order)?;

    let current = OrderStatus::parse(&order.status)?;
    let target = match input.status.as_deref() {
        Some(s) => {
            let target = OrderStatus::parse(s)
                .map_err(|_| AppError::BadRequest("Invalid status".into()))?;
            if target != current {
                validate_transition(current, target)?;
            }
            Some(target)
        }
        None => None,
    };
    let status_changed = target.is_some_and(|t| t != current);

    let update = UpdateOrder {
        garment_type: input.garment_type.map(|g| g.trim().to_string()),
        fabric_details: input.fabric_details,
        design_notes: input.design_notes,
        status: target.map(|t| t.as_str().to_string()),
        estimated_price: input.estimated_price,
        final_price: input.final_price,
        estimated_delivery: input.estimated_delivery,
        actual_delivery: input.actual_delivery,
    };
    let updated = OrderRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Order", id))?;

    let action = if status_changed {
        actions::ORDER_STATUS_CHANGED
    } else {
        actions::ORDER_UPDATED
    };
    AuditEntry::new(action)
        .user(user.user_id)
        .resource(resources::ORDER, id)
        .details(serde_json::json!({
            "from": current.as_str(),
            "to": updated.status,
        }))
        .client(&client)
        .record(&state.pool)
        .await;

    if status_changed {
        tracing::info!(
            order_id = id,
            from = current.as_str(),
            to = %updated.status,
            "Order status changed"
        );
        state.publish(
            PlatformEvent::new(actions::ORDER_STATUS_CHANGED)
                .with_source(resources::ORDER, id)
                .with_actor(user.user_id)
                .with_payload(serde_json::json!({
                    "from": current.as_str(),
                    "to": updated.status,
                })),
        );
    }

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Json<OrderDeleted>> {
    if !OrderRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Order", id));
    }

    tracing::info!(order_id = id, admin_id = admin.user_id, "Order deleted");
    AuditEntry::new(actions::ORDER_DELETED)
        .user(admin.user_id)
        .resource(resources::ORDER, id)
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(OrderDeleted {
        message: "Order deleted successfully",
        order_id: id,
    }))
}
