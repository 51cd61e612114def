use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{ApplicationId, PetId, ShelterId};
use super::repository::{AdoptionRepository, RepositoryError};
use super::service::{AdoptionApplicationService, AdoptionServiceError};
use super::shelters::{ShelterDirectory, ShelterOrder};
use super::validation::{ApplicationSubmission, PetSubmission, ShelterSubmission};

/// Fields rendered on the new application form, all required.
pub const APPLICATION_FIELDS: [&str; 6] = [
    "name",
    "street_address",
    "city",
    "state",
    "zip_code",
    "description",
];

/// Shared handles for the adoption handlers.
pub struct AdoptionState<R> {
    pub directory: Arc<ShelterDirectory<R>>,
    pub applications: Arc<AdoptionApplicationService<R>>,
}

impl<R> AdoptionState<R>
where
    R: AdoptionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            directory: Arc::new(ShelterDirectory::new(repository.clone())),
            applications: Arc::new(AdoptionApplicationService::new(repository)),
        }
    }
}

impl<R> Clone for AdoptionState<R> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            applications: Arc::clone(&self.applications),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShelterListParams {
    #[serde(default)]
    pub sort: ShelterOrder,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PetFilterParams {
    pub age: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AddPetRequest {
    pub pet_id: PetId,
}

/// Router builder exposing the public, shelter, and admin endpoints.
pub fn adoption_router<R>(state: AdoptionState<R>) -> Router
where
    R: AdoptionRepository + 'static,
{
    Router::new()
        .route("/admin/shelters", get(admin_shelters_handler::<R>))
        .route("/admin/shelters/:shelter_id", get(admin_shelter_handler::<R>))
        .route(
            "/admin/applications/:application_id",
            get(admin_application_handler::<R>),
        )
        .route(
            "/admin/applications/:application_id/pets/:pet_id/approve",
            post(approve_pet_handler::<R>),
        )
        .route(
            "/admin/applications/:application_id/pets/:pet_id/reject",
            post(reject_pet_handler::<R>),
        )
        .route("/applications", post(create_application_handler::<R>))
        .route("/applications/new", get(new_application_handler))
        .route(
            "/applications/:application_id",
            get(show_application_handler::<R>),
        )
        .route(
            "/applications/:application_id/pets",
            post(add_pet_handler::<R>),
        )
        .route(
            "/applications/:application_id/submit",
            post(submit_application_handler::<R>),
        )
        .route(
            "/shelters",
            get(list_shelters_handler::<R>).post(create_shelter_handler::<R>),
        )
        .route(
            "/shelters/:shelter_id",
            get(show_shelter_handler::<R>).delete(delete_shelter_handler::<R>),
        )
        .route(
            "/shelters/:shelter_id/pets",
            get(shelter_pets_handler::<R>).post(create_pet_handler::<R>),
        )
        .with_state(state)
}

pub(crate) async fn admin_shelters_handler<R>(State(state): State<AdoptionState<R>>) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state.directory.admin_dashboard() {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn admin_shelter_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path(shelter_id): Path<u64>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state.directory.find_name_and_address(ShelterId(shelter_id)) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn admin_application_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path(application_id): Path<u64>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state.applications.detail(ApplicationId(application_id)) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn approve_pet_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path((application_id, pet_id)): Path<(u64, u64)>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    let id = ApplicationId(application_id);
    match state.applications.approve_pet(id, PetId(pet_id)) {
        Ok(_) => Redirect::to(&format!("/admin/applications/{id}")).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reject_pet_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path((application_id, pet_id)): Path<(u64, u64)>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    let id = ApplicationId(application_id);
    match state.applications.reject_pet(id, PetId(pet_id)) {
        Ok(_) => Redirect::to(&format!("/admin/applications/{id}")).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn new_application_handler() -> Json<serde_json::Value> {
    Json(json!({
        "action": "/applications",
        "method": "POST",
        "fields": APPLICATION_FIELDS,
    }))
}

pub(crate) async fn create_application_handler<R>(
    State(state): State<AdoptionState<R>>,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state.applications.create(submission) {
        Ok(application) => {
            Redirect::to(&format!("/applications/{}", application.id)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn show_application_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path(application_id): Path<u64>,
    Query(params): Query<SearchParams>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state
        .applications
        .show(ApplicationId(application_id), params.query.as_deref())
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_pet_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path(application_id): Path<u64>,
    Json(request): Json<AddPetRequest>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    let id = ApplicationId(application_id);
    match state.applications.add_pet(id, request.pet_id) {
        Ok(_) => Redirect::to(&format!("/applications/{id}")).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_application_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path(application_id): Path<u64>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    let id = ApplicationId(application_id);
    match state.applications.submit(id) {
        Ok(_) => Redirect::to(&format!("/applications/{id}")).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_shelters_handler<R>(
    State(state): State<AdoptionState<R>>,
    Query(params): Query<ShelterListParams>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state.directory.list(params.sort, params.search.as_deref()) {
        Ok(shelters) => (StatusCode::OK, Json(shelters)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_shelter_handler<R>(
    State(state): State<AdoptionState<R>>,
    Json(submission): Json<ShelterSubmission>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state.directory.create_shelter(submission) {
        Ok(shelter) => (StatusCode::CREATED, Json(shelter)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn show_shelter_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path(shelter_id): Path<u64>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state.directory.profile(ShelterId(shelter_id)) {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_shelter_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path(shelter_id): Path<u64>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state.directory.delete_shelter(ShelterId(shelter_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn shelter_pets_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path(shelter_id): Path<u64>,
    Query(params): Query<PetFilterParams>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    let directory = &state.directory;
    let pets = directory
        .get(ShelterId(shelter_id))
        .and_then(|shelter| match params.age {
            Some(age) => directory.shelter_pets_filtered_by_age(&shelter, age),
            None => directory.alphabetical_pets(&shelter),
        });

    match pets {
        Ok(pets) => (StatusCode::OK, Json(pets)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_pet_handler<R>(
    State(state): State<AdoptionState<R>>,
    Path(shelter_id): Path<u64>,
    Json(submission): Json<PetSubmission>,
) -> Response
where
    R: AdoptionRepository + 'static,
{
    match state
        .directory
        .create_pet(ShelterId(shelter_id), submission)
    {
        Ok(pet) => (StatusCode::CREATED, Json(pet)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn error_response(err: AdoptionServiceError) -> Response {
    let status = match &err {
        AdoptionServiceError::Validation(errors) => {
            let payload = json!({ "errors": errors.messages() });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
        AdoptionServiceError::Repository(RepositoryError::NotFound)
        | AdoptionServiceError::PetNotOnApplication { .. } => StatusCode::NOT_FOUND,
        AdoptionServiceError::Repository(RepositoryError::Conflict)
        | AdoptionServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        AdoptionServiceError::PetNotAdoptable(_) | AdoptionServiceError::NoPetsSelected(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AdoptionServiceError::Repository(RepositoryError::Unavailable(_)) => {
            error!(error = %err, "adoption store unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
