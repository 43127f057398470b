//! Parking lot occupancy

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::reservations::ReservationAppState;
use crate::domain::LotAvailability;
use crate::interfaces::http::common::{ApiResponse, ApiResult};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityDto {
    pub parking_lot_id: i32,
    pub total_spaces: i32,
    /// Spaces not held by an active reservation right now
    pub available_spaces: i32,
    pub at: DateTime<Utc>,
}

impl From<LotAvailability> for AvailabilityDto {
    fn from(a: LotAvailability) -> Self {
        Self {
            parking_lot_id: a.parking_lot_id,
            total_spaces: a.total_spaces,
            available_spaces: a.available_spaces,
            at: a.at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/parking-lots/{id}/availability",
    tag = "Parking Lots",
    params(("id" = i32, Path, description = "Parking lot ID")),
    responses(
        (status = 200, description = "Current free-space count", body = ApiResponse<AvailabilityDto>),
        (status = 404, description = "Parking lot not found")
    )
)]
pub async fn lot_availability(
    State(state): State<ReservationAppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<AvailabilityDto>>> {
    let availability = state.service.lot_availability(id).await?;
    Ok(Json(ApiResponse::success(availability.into())))
}
