//! Reservation REST handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::dto::*;
use crate::application::ReservationService;
use crate::domain::ReservationStatus;
use crate::interfaces::http::common::{ActorHeaders, ApiResponse, ApiResult, ValidatedJson};

#[derive(Clone)]
pub struct ReservationAppState {
    pub service: Arc<ReservationService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    params(
        ("X-Actor-Role" = String, Header, description = "ADMIN, ESTACIONAMENTO or TRANSPORTADORA"),
        ("X-Company-Id" = Option<i32>, Header, description = "Acting company")
    ),
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created in PENDING", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid window or request"),
        (status = 403, description = "Role may not create reservations"),
        (status = 404, description = "Lot, space, vehicle or driver not found"),
        (status = 409, description = "Space already booked for an overlapping window")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationAppState>,
    ActorHeaders(actor): ActorHeaders,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ReservationDto>>)> {
    let reservation = state.service.create(&actor, request.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(reservation.into()))))
}

#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/status",
    tag = "Reservations",
    params(
        ("id" = i32, Path, description = "Reservation ID"),
        ("X-Actor-Role" = String, Header, description = "ADMIN, ESTACIONAMENTO or TRANSPORTADORA"),
        ("X-Company-Id" = Option<i32>, Header, description = "Acting company")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Role may not set this status"),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
pub async fn update_status(
    State(state): State<ReservationAppState>,
    ActorHeaders(actor): ActorHeaders,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateStatusRequest>,
) -> ApiResult<Json<ApiResponse<ReservationDto>>> {
    let target: ReservationStatus = request.status.trim().parse()?;
    let reservation = state.service.change_status(id, &actor, target).await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

/// Body may be `{}` when no reason is given.
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/cancel",
    tag = "Reservations",
    params(
        ("id" = i32, Path, description = "Reservation ID"),
        ("X-Actor-Role" = String, Header, description = "ADMIN, ESTACIONAMENTO or TRANSPORTADORA"),
        ("X-Company-Id" = Option<i32>, Header, description = "Acting company")
    ),
    request_body = CancelReservationRequest,
    responses(
        (status = 200, description = "Reservation cancelled", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Not allowed to cancel this reservation"),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation already completed or cancelled")
    )
)]
pub async fn cancel_reservation(
    State(state): State<ReservationAppState>,
    ActorHeaders(actor): ActorHeaders,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<CancelReservationRequest>,
) -> ApiResult<Json<ApiResponse<ReservationDto>>> {
    let reservation = state.service.cancel(id, &actor, request.reason).await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation with lot, vehicle and driver", body = ApiResponse<ReservationDetailsDto>),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationAppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<ReservationDetailsDto>>> {
    let details = state.service.get_details(id).await?;
    Ok(Json(ApiResponse::success(details.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    params(ListReservationsQuery),
    responses(
        (status = 200, description = "Reservations, newest first", body = ApiResponse<Vec<ReservationDto>>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_reservations(
    State(state): State<ReservationAppState>,
    Query(query): Query<ListReservationsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<ReservationDto>>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ReservationStatus>)
        .transpose()?;
    let reservations = state.service.list(status).await?;
    Ok(Json(ApiResponse::success(
        reservations.into_iter().map(ReservationDto::from).collect(),
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/payment",
    tag = "Reservations",
    params(
        ("id" = i32, Path, description = "Reservation ID"),
        ("X-Actor-Role" = String, Header, description = "ADMIN or TRANSPORTADORA"),
        ("X-Company-Id" = Option<i32>, Header, description = "Acting company")
    ),
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Already paid or cancelled"),
        (status = 403, description = "Role may not pay"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn record_payment(
    State(state): State<ReservationAppState>,
    ActorHeaders(actor): ActorHeaders,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<PaymentResponse>>> {
    let (reservation, transaction) = state.service.record_payment(id, &actor).await?;
    Ok(Json(ApiResponse::success(PaymentResponse {
        reservation: reservation.into(),
        transaction: transaction.into(),
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/recalculate",
    tag = "Reservations",
    params(
        ("id" = i32, Path, description = "Reservation ID"),
        ("X-Actor-Role" = String, Header, description = "ADMIN, ESTACIONAMENTO or TRANSPORTADORA"),
        ("X-Company-Id" = Option<i32>, Header, description = "Acting company")
    ),
    responses(
        (status = 200, description = "Cost recomputed at the lot's current rate", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Reservation is no longer PENDING"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn recalculate_cost(
    State(state): State<ReservationAppState>,
    ActorHeaders(actor): ActorHeaders,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<ReservationDto>>> {
    let reservation = state.service.recalculate_cost(id, &actor).await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{id}/transactions",
    tag = "Reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Payments and refunds, oldest first", body = ApiResponse<Vec<TransactionDto>>),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn list_transactions(
    State(state): State<ReservationAppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<TransactionDto>>>> {
    let transactions = state.service.transactions(id).await?;
    Ok(Json(ApiResponse::success(
        transactions.into_iter().map(TransactionDto::from).collect(),
    )))
}
