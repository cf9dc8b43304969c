#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

use timetable::api::router;
use timetable::db::{self, repository};
use timetable::models::*;
use timetable::state::AppState;

pub const MONDAY: &str = "2025-05-12";

pub struct TestApp {
    pub state: AppState,
    pub room_a: i64,
    pub room_b: i64,
    pub professor_x: i64,
    pub professor_y: i64,
    pub course_unit: i64,
    pub class_group: i64,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::connect("sqlite::memory:", 1).await.expect("db");
        let ids = fixtures(&pool).await;
        Self {
            state: AppState::new(pool, 16),
            room_a: ids[0],
            room_b: ids[1],
            professor_x: ids[2],
            professor_y: ids[3],
            course_unit: ids[4],
            class_group: ids[5],
        }
    }

    pub fn app(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let res = self.app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub fn block(&self, room: i64, professor: i64, start: &str, end: &str) -> Value {
        json!({
            "start_time": start,
            "end_time": end,
            "day": MONDAY,
            "professor_id": professor,
            "room_id": room,
            "course_unit_id": self.course_unit,
            "class_group_id": self.class_group,
        })
    }

    pub async fn create_block(&self, room: i64, professor: i64, start: &str, end: &str) -> (StatusCode, Value) {
        self.request("POST", "/api/blocks", Some(self.block(room, professor, start, end)))
            .await
    }
}

async fn fixtures(pool: &SqlitePool) -> [i64; 6] {
    let school = repository::insert_school(
        pool,
        NewSchoolRequest {
            name: "ESTT".to_string(),
            location: "Tomar".to_string(),
        },
    )
    .await
    .unwrap();

    let mut rooms = Vec::new();
    for name in ["B255", "B257"] {
        let room = repository::insert_room(
            pool,
            NewRoomRequest {
                name: name.to_string(),
                capacity: 30,
                room_type: "Sala de aula".to_string(),
                location: "Tomar".to_string(),
                school_id: school.id,
            },
        )
        .await
        .unwrap();
        rooms.push(room.id);
    }

    let mut professors = Vec::new();
    for (name, email) in [("João Silva", "joao@example.com"), ("Maria Santos", "maria@example.com")] {
        let user = repository::insert_user(
            pool,
            NewUserRequest {
                name: name.to_string(),
                email: email.to_string(),
                role: Role::Professor,
                category: None,
                school_id: Some(school.id),
            },
        )
        .await
        .unwrap();
        professors.push(user.id);
    }

    let course = repository::insert_course(
        pool,
        NewCourseRequest {
            name: "Engenharia Informática".to_string(),
            degree: "Licenciatura".to_string(),
            school_id: school.id,
        },
    )
    .await
    .unwrap();
    let unit = repository::insert_course_unit(
        pool,
        NewCourseUnitRequest {
            name: "Base de Dados".to_string(),
            unit_type: "Obrigatória".to_string(),
            degree: "Licenciatura".to_string(),
            typology: "Teórico-prática".to_string(),
            semester: "1º".to_string(),
            year: Some(2),
            course_id: course.id,
        },
    )
    .await
    .unwrap();
    let group = repository::insert_class_group(
        pool,
        NewClassGroupRequest {
            name: "Turma A".to_string(),
            course_unit_id: unit.id,
            course_id: course.id,
        },
    )
    .await
    .unwrap();

    [rooms[0], rooms[1], professors[0], professors[1], unit.id, group.id]
}
