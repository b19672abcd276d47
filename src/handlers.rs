use axum::extract::{Extension, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::context::{classify_occasion, extract_destination, Occasion};
use crate::error::Error;
use crate::models::{
    CalendarEvent, ClosetItem, EventContext, GarmentAttributes, InspoImage, Outfit, PackingList,
    StylePreferences,
};
use crate::startup::AppState;

/// Map a domain error to an HTTP response. External-service failures are
/// reported as bad gateway; everything else is internal.
fn api_error(err: Error) -> (StatusCode, Json<Value>) {
    error!("Request failed: {:?}", err);
    let status = match err {
        Error::Weather(_) | Error::AiService(_) | Error::Calendar(_) | Error::Database(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

/// Handler for the health check
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// List the authenticated user's closet
pub async fn list_closet_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<ClosetItem>>> {
    let items = state
        .db
        .list_closet_items(&user.user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(items))
}

/// Request body for manually adding a closet item
#[derive(Debug, Deserialize)]
pub struct AddClosetItemRequest {
    #[serde(flatten)]
    pub attributes: GarmentAttributes,
    pub image_url: Option<String>,
}

/// Add a closet item with caller-supplied attributes
pub async fn add_closet_item_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AddClosetItemRequest>,
) -> ApiResult<(StatusCode, Json<ClosetItem>)> {
    let item = ClosetItem::new(&user.user_id, request.attributes, request.image_url);
    state.db.add_closet_item(&item).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Delete a closet item by id
pub async fn delete_closet_item_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .db
        .delete_closet_item(&user.user_id, item_id)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Classify an uploaded garment photo and add it to the closet
pub async fn classify_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ClosetItem>)> {
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Invalid multipart body: {}", e) })),
        )
    })? {
        if field.name() == Some("image") {
            let bytes = field.bytes().await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Failed to read image: {}", e) })),
                )
            })?;
            image_data = Some(bytes.to_vec());
        }
    }

    let image_data = image_data.ok_or((
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing 'image' field" })),
    ))?;

    let attributes = state
        .vision
        .classify_garment(&image_data)
        .await
        .map_err(api_error)?;

    info!(
        "Classified garment '{}' for user {}",
        attributes.name, user.user_id
    );

    let item = ClosetItem::new(&user.user_id, attributes, None);
    state.db.add_closet_item(&item).await.map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Upcoming calendar events annotated with occasion and destination
pub async fn events_context_handler(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<EventContext>>> {
    let calendar = state.calendar.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": "Calendar service is disabled" })),
    ))?;

    let events = calendar.upcoming_events().await.map_err(api_error)?;

    let timezone: chrono_tz::Tz = {
        let config_read = state.config.read().await;
        config_read.timezone.parse().unwrap_or(chrono_tz::UTC)
    };

    let mut contexts: Vec<EventContext> = events
        .into_iter()
        .map(|event| EventContext {
            occasion: classify_occasion(&event),
            destination: extract_destination(&event),
            event,
        })
        .collect();

    // Unparsable starts sort first rather than failing the request
    contexts.sort_by_key(|c| c.event.start_in(&timezone));

    Ok(Json(contexts))
}

/// Request body for an outfit suggestion: the shape of a calendar event,
/// plus an optional explicit occasion override
#[derive(Debug, Deserialize)]
pub struct SuggestOutfitRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub occasion: Option<Occasion>,
    /// Offer the user's closet to the model
    #[serde(default = "default_true")]
    pub use_closet: bool,
}

fn default_true() -> bool {
    true
}

impl SuggestOutfitRequest {
    fn as_event(&self) -> CalendarEvent {
        CalendarEvent {
            summary: (!self.title.is_empty()).then(|| self.title.clone()),
            description: (!self.description.is_empty()).then(|| self.description.clone()),
            location: (!self.location.is_empty()).then(|| self.location.clone()),
            ..Default::default()
        }
    }
}

/// Generate and persist an outfit suggestion for an event
pub async fn suggest_outfit_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SuggestOutfitRequest>,
) -> ApiResult<(StatusCode, Json<Outfit>)> {
    let event = request.as_event();

    // Derive the styling context; an explicit occasion wins over inference
    let occasion = request.occasion.unwrap_or_else(|| classify_occasion(&event));
    let destination = extract_destination(&event);

    let city = match &destination {
        Some(city) => city.clone(),
        None => {
            let config_read = state.config.read().await;
            config_read.default_city.clone()
        }
    };

    // A wrong or unresolvable city degrades to the fallback report
    let weather = state.weather.fetch_or_fallback(&city).await;

    let preferences = state
        .db
        .get_style_preferences(&user.user_id)
        .await
        .map_err(api_error)?
        .unwrap_or_default();

    let closet = if request.use_closet {
        state
            .db
            .list_closet_items(&user.user_id)
            .await
            .map_err(api_error)?
    } else {
        Vec::new()
    };

    let suggestion = state
        .stylist
        .suggest_outfit(occasion, &weather, &preferences, &closet)
        .await
        .map_err(api_error)?;

    let outfit = Outfit::new(&user.user_id, occasion, destination, suggestion);
    state.db.save_outfit(&outfit).await.map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(outfit)))
}

/// List the user's saved outfits
pub async fn list_outfits_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Outfit>>> {
    let outfits = state
        .db
        .list_outfits(&user.user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(outfits))
}

/// Request body for a packing list
#[derive(Debug, Deserialize)]
pub struct PackingListRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    /// Explicit destination wins over extraction
    pub destination: Option<String>,
    pub days: u32,
}

/// Generate and persist a packing list for a trip
pub async fn packing_list_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<PackingListRequest>,
) -> ApiResult<(StatusCode, Json<PackingList>)> {
    let event = CalendarEvent {
        summary: (!request.title.is_empty()).then(|| request.title.clone()),
        description: (!request.description.is_empty()).then(|| request.description.clone()),
        location: (!request.location.is_empty()).then(|| request.location.clone()),
        ..Default::default()
    };

    let destination = match request.destination {
        Some(destination) => destination,
        None => match extract_destination(&event) {
            Some(destination) => destination,
            None => {
                let config_read = state.config.read().await;
                config_read.default_city.clone()
            }
        },
    };

    let weather = state.weather.fetch_or_fallback(&destination).await;

    let preferences = state
        .db
        .get_style_preferences(&user.user_id)
        .await
        .map_err(api_error)?
        .unwrap_or_default();

    let entries = state
        .stylist
        .packing_list(&destination, request.days, &weather, &preferences)
        .await
        .map_err(api_error)?;

    let list = PackingList::new(&user.user_id, &destination, request.days, entries);
    state.db.save_packing_list(&list).await.map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(list)))
}

/// List the user's packing lists
pub async fn list_packing_lists_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<PackingList>>> {
    let lists = state
        .db
        .list_packing_lists(&user.user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(lists))
}

/// Request body for saving an inspiration image
#[derive(Debug, Deserialize)]
pub struct SaveInspoRequest {
    pub image_url: String,
    pub note: Option<String>,
}

/// Save an inspiration image reference
pub async fn save_inspo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SaveInspoRequest>,
) -> ApiResult<(StatusCode, Json<InspoImage>)> {
    let image = InspoImage {
        id: Uuid::new_v4(),
        user_id: user.user_id.clone(),
        image_url: request.image_url,
        note: request.note,
        created_at: chrono::Utc::now(),
    };
    state.db.save_inspo_image(&image).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// List the user's inspiration images
pub async fn list_inspo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<InspoImage>>> {
    let images = state
        .db
        .list_inspo_images(&user.user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(images))
}

/// Get the user's style preferences
pub async fn get_preferences_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<StylePreferences>> {
    let preferences = state
        .db
        .get_style_preferences(&user.user_id)
        .await
        .map_err(api_error)?
        .unwrap_or_default();
    Ok(Json(preferences))
}

/// Replace the user's style preferences
pub async fn set_preferences_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(preferences): Json<StylePreferences>,
) -> ApiResult<StatusCode> {
    state
        .db
        .set_style_preferences(&user.user_id, &preferences)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
