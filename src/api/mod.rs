use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::scheduling::VerdictResponse;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health))
        .route("/schools", get(list_schools).post(create_school))
        .route("/schools/{id}", get(get_school).put(update_school).delete(delete_school))
        .route("/schools/{id}/rooms", get(list_rooms_by_school))
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{id}", get(get_room).put(update_room).delete(delete_room))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course).put(update_course).delete(delete_course))
        .route("/course-units", get(list_course_units).post(create_course_unit))
        .route(
            "/course-units/{id}",
            get(get_course_unit).put(update_course_unit).delete(delete_course_unit),
        )
        .route("/class-groups", get(list_class_groups).post(create_class_group))
        .route(
            "/class-groups/{id}",
            get(get_class_group).put(update_class_group).delete(delete_class_group),
        )
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/professors", get(list_professors))
        .route("/blocks", get(list_blocks).post(create_block))
        .route("/blocks/validate", post(validate_block))
        .route("/blocks/{id}", get(get_block).put(update_block).delete(delete_block))
        .route("/events", get(events));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

// Schools

async fn list_schools(State(state): State<AppState>) -> Result<Json<Vec<School>>, AppError> {
    Ok(Json(repository::fetch_schools(&state.db).await?))
}

async fn get_school(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<School>, AppError> {
    let school = repository::find_school_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(school))
}

async fn create_school(
    State(state): State<AppState>,
    Json(req): Json<NewSchoolRequest>,
) -> Result<(StatusCode, Json<School>), AppError> {
    let school = repository::insert_school(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(school)))
}

async fn update_school(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewSchoolRequest>,
) -> Result<Json<School>, AppError> {
    let school = repository::update_school(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(school))
}

async fn delete_school(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if repository::count_rooms_in_school(&state.db, id).await? > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete this school while rooms belong to it".to_string(),
        ));
    }
    if repository::delete_school(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// Rooms

async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(repository::fetch_rooms(&state.db).await?))
}

async fn list_rooms_by_school(
    State(state): State<AppState>,
    Path(school_id): Path<i64>,
) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(repository::fetch_rooms_by_school(&state.db, school_id).await?))
}

async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Room>, AppError> {
    let room = repository::find_room_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(room))
}

async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<NewRoomRequest>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    require_school(&state, req.school_id).await?;
    let room = repository::insert_room(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewRoomRequest>,
) -> Result<Json<Room>, AppError> {
    require_school(&state, req.school_id).await?;
    let room = repository::update_room(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(room))
}

async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if repository::count_blocks_in_room(&state.db, id).await? > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete this room while timetable blocks use it".to_string(),
        ));
    }
    if repository::delete_room(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// Courses

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(repository::fetch_courses(&state.db).await?))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Course>, AppError> {
    let course = repository::find_course_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    require_school(&state, req.school_id).await?;
    let course = repository::insert_course(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<Course>, AppError> {
    require_school(&state, req.school_id).await?;
    let course = repository::update_course(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if repository::count_class_groups_in_course(&state.db, id).await? > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete this course while class groups belong to it".to_string(),
        ));
    }
    if repository::delete_course(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// Course units

async fn list_course_units(State(state): State<AppState>) -> Result<Json<Vec<CourseUnit>>, AppError> {
    Ok(Json(repository::fetch_course_units(&state.db).await?))
}

async fn get_course_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CourseUnit>, AppError> {
    let unit = repository::find_course_unit_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(unit))
}

async fn create_course_unit(
    State(state): State<AppState>,
    Json(req): Json<NewCourseUnitRequest>,
) -> Result<(StatusCode, Json<CourseUnit>), AppError> {
    require_course(&state, req.course_id).await?;
    let unit = repository::insert_course_unit(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

async fn update_course_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewCourseUnitRequest>,
) -> Result<Json<CourseUnit>, AppError> {
    require_course(&state, req.course_id).await?;
    let unit = repository::update_course_unit(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(unit))
}

async fn delete_course_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if repository::delete_course_unit(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// Class groups

async fn list_class_groups(State(state): State<AppState>) -> Result<Json<Vec<ClassGroup>>, AppError> {
    Ok(Json(repository::fetch_class_groups(&state.db).await?))
}

async fn get_class_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ClassGroup>, AppError> {
    let group = repository::find_class_group_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(group))
}

async fn create_class_group(
    State(state): State<AppState>,
    Json(req): Json<NewClassGroupRequest>,
) -> Result<(StatusCode, Json<ClassGroup>), AppError> {
    let group = repository::insert_class_group(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn update_class_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewClassGroupRequest>,
) -> Result<Json<ClassGroup>, AppError> {
    let group = repository::update_class_group(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(group))
}

async fn delete_class_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if repository::delete_class_group(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// Users

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(repository::fetch_users(&state.db).await?))
}

async fn list_professors(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(repository::fetch_professors(&state.db).await?))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = repository::find_user_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = repository::insert_user(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// Timetable blocks

async fn list_blocks(
    State(state): State<AppState>,
    Query(filter): Query<BlockFilter>,
) -> Result<Json<Vec<BlockView>>, AppError> {
    Ok(Json(repository::fetch_block_views(&state.db, &filter).await?))
}

async fn get_block(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BlockView>, AppError> {
    let block = repository::find_block_view(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(block))
}

async fn create_block(
    State(state): State<AppState>,
    Json(req): Json<NewBlockRequest>,
) -> Result<(StatusCode, Json<BlockView>), AppError> {
    let view = state.timetable.create_block(req).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update_block(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewBlockRequest>,
) -> Result<Json<BlockView>, AppError> {
    Ok(Json(state.timetable.update_block(id, req).await?))
}

async fn delete_block(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.timetable.delete_block(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(serde::Deserialize)]
struct ValidateParams {
    exclude_id: Option<i64>,
}

async fn validate_block(
    State(state): State<AppState>,
    Query(params): Query<ValidateParams>,
    Json(req): Json<NewBlockRequest>,
) -> Result<Json<VerdictResponse>, AppError> {
    let verdict = state.timetable.check(req, params.exclude_id).await?;
    Ok(Json(VerdictResponse::from(&verdict)))
}

async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.notifier.subscribe();
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let data = match event.kind.payload_json() {
                        Ok(data) => data,
                        Err(e) => {
                            warn!("failed to encode schedule event: {}", e);
                            continue;
                        }
                    };
                    yield Ok::<_, Infallible>(Event::default()
                        .id(event.id.to_string())
                        .event(event.kind.name())
                        .data(data));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("event subscriber lagged, skipped {} message(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn require_school(state: &AppState, id: i64) -> Result<(), AppError> {
    match repository::find_school_by_id(&state.db, id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(format!("School {} not found", id))),
    }
}

async fn require_course(state: &AppState, id: i64) -> Result<(), AppError> {
    match repository::find_course_by_id(&state.db, id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(format!("Course {} not found", id))),
    }
}
