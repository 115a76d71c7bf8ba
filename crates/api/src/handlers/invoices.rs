//! Handlers for the `/invoices` resource and payment recording.

use atelier_core::audit::{actions, resources};
use atelier_core::invoice::{
    compute_total, due_date, round_money, status_after_payment, validate_payment, InvoiceStatus,
    PaymentMethod,
};
use atelier_core::numbering::{invoice_number, MAX_NUMBER_ATTEMPTS};
use atelier_core::types::DbId;
use atelier_db::models::invoice::{CreateInvoice, Invoice, InvoiceFilter, RecordPayment};
use atelier_db::repositories::{InvoiceRepo, OrderRepo};
use atelier_events::PlatformEvent;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::audit::AuditEntry;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::{PaginationParams, DEFAULT_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

const INVOICE_NUMBER_CONSTRAINT: &str = "uq_invoices_invoice_number";

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub order_id: DbId,
    pub subtotal: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub discount_amount: f64,
    pub due_days: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub payment_method: String,
    pub amount: f64,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceListParams {
    pub status: Option<String>,
}

async fn load_invoice(state: &AppState, id: DbId) -> AppResult<Invoice> {
    InvoiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice", id))
}

/// POST /api/v1/invoices
///
/// Bills the customer of the given order. The invoice number is regenerated
/// if it collides with an existing one.
pub async fn create_invoice(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    client: ClientInfo,
    Json(input): Json<CreateInvoiceRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Invoice>>)> {
    let total = compute_total(input.subtotal, input.tax_amount, input.discount_amount)?;
    let issue_date = Utc::now().date_naive();
    let due = due_date(issue_date, input.due_days)?;

    let order = OrderRepo::find_by_id(&state.pool, input.order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order", input.order_id))?;

    let mut create = CreateInvoice {
        order_id: order.id,
        customer_id: order.customer_id,
        invoice_number: String::new(),
        subtotal: round_money(input.subtotal),
        tax_amount: round_money(input.tax_amount),
        discount_amount: round_money(input.discount_amount),
        total_amount: total,
        issue_date,
        due_date: due,
        notes: input.notes.filter(|n| !n.trim().is_empty()),
    };

    let mut attempt = 0;
    let invoice = loop {
        attempt += 1;
        create.invoice_number = invoice_number(issue_date);
        match InvoiceRepo::create(&state.pool, &create).await {
            Ok(invoice) => break invoice,
            Err(e)
                if attempt < MAX_NUMBER_ATTEMPTS
                    && is_unique_violation(&e, INVOICE_NUMBER_CONSTRAINT) =>
            {
                tracing::debug!(attempt, "Invoice number collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    };

    tracing::info!(
        invoice_id = invoice.id,
        invoice_number = %invoice.invoice_number,
        order_id = order.id,
        total = invoice.total_amount,
        "Invoice created"
    );
    AuditEntry::new(actions::INVOICE_CREATED)
        .user(user.user_id)
        .resource(resources::INVOICE, invoice.id)
        .details(serde_json::json!({
            "invoice_number": invoice.invoice_number,
            "order_id": order.id,
            "total_amount": invoice.total_amount,
        }))
        .client(&client)
        .record(&state.pool)
        .await;
    state.publish(
        PlatformEvent::new(actions::INVOICE_CREATED)
            .with_source(resources::INVOICE, invoice.id)
            .with_actor(user.user_id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: invoice })))
}

/// GET /api/v1/invoices
///
/// Customers only see their own invoices.
pub async fn list_invoices(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<InvoiceListParams>,
) -> AppResult<Json<DataResponse<Vec<Invoice>>>> {
    let status = params
        .status
        .as_deref()
        .map(InvoiceStatus::parse)
        .transpose()?;
    let filter = InvoiceFilter {
        customer_id: auth_user.is_customer().then_some(auth_user.user_id),
        status: status.map(|s| s.as_str().to_string()),
    };

    let (limit, offset) = pagination.resolve(DEFAULT_LIMIT);
    let invoices = InvoiceRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: invoices }))
}

/// GET /api/v1/invoices/{id}
pub async fn get_invoice(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let invoice = load_invoice(&state, id).await?;
    if auth_user.is_customer() && invoice.customer_id != auth_user.user_id {
        return Err(AppError::forbidden("Access denied"));
    }
    Ok(Json(DataResponse { data: invoice }))
}

/// POST /api/v1/invoices/{id}/payments
///
/// Adds `amount` to the paid total. Overpayment is rejected.
pub async fn record_payment(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<PaymentRequest>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let method = PaymentMethod::parse(&input.payment_method)?;
    let reference = input.payment_reference.filter(|r| !r.trim().is_empty());
    let amount = input.amount;

    let apply = |invoice: &Invoice| -> AppResult<RecordPayment> {
        let current = InvoiceStatus::parse(&invoice.status)?;
        if !current.accepts_payment() {
            return Err(AppError::BadRequest(format!(
                "Invoice is {} and cannot accept payments",
                current.as_str()
            )));
        }
        validate_payment(invoice.total_amount, invoice.paid_amount, amount)?;

        let paid = round_money(invoice.paid_amount + amount);
        Ok(RecordPayment {
            paid_amount: paid,
            status: status_after_payment(current, invoice.total_amount, paid)
                .as_str()
                .to_string(),
            payment_method: method.as_str().to_string(),
            payment_reference: reference,
        })
    };
    let updated = InvoiceRepo::record_payment(&state.pool, id, apply)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice", id))?;

    tracing::info!(
        invoice_id = id,
        amount = input.amount,
        paid_total = updated.paid_amount,
        status = %updated.status,
        "Payment recorded"
    );
    AuditEntry::new(actions::INVOICE_PAYMENT_RECORDED)
        .user(user.user_id)
        .resource(resources::INVOICE, id)
        .details(serde_json::json!({
            "amount": input.amount,
            "payment_method": method.as_str(),
            "status": updated.status,
        }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: updated }))
}

/// PATCH /api/v1/invoices/{id}/status
pub async fn update_invoice_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<InvoiceStatusRequest>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let status = InvoiceStatus::parse(&input.status)
        .map_err(|_| AppError::BadRequest("Invalid status".into()))?;

    let previous = load_invoice(&state, id).await?.status;
    let updated = InvoiceRepo::update_status(&state.pool, id, status.as_str())
        .await?
        .ok_or_else(|| AppError::not_found("Invoice", id))?;

    AuditEntry::new(actions::INVOICE_STATUS_CHANGED)
        .user(admin.user_id)
        .resource(resources::INVOICE, id)
        .details(serde_json::json!({ "from": previous, "to": updated.status }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: updated }))
}
