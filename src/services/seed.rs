use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    Day, NewClassGroupRequest, NewCourseRequest, NewCourseUnitRequest, NewRoomRequest,
    NewSchoolRequest, NewUserRequest, Role, TimeOfDay, TimetableBlock,
};
use crate::scheduling::{ScheduleValidator, SqliteScheduleStore, Verdict};

#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub schools: usize,
    pub rooms: usize,
    pub courses: usize,
    pub course_units: usize,
    pub class_groups: usize,
    pub users: usize,
    pub blocks_inserted: usize,
    pub blocks_rejected: usize,
}

const SCHOOLS: [(&str, &str); 3] = [
    ("Escola Superior de Tecnologia de Tomar", "Tomar"),
    ("Escola Superior de Gestão de Tomar", "Tomar"),
    ("Escola Superior de Tecnologia de Abrantes", "Abrantes"),
];

// (name, degree, school index)
const COURSES: [(&str, &str, usize); 5] = [
    ("Engenharia Informática", "Licenciatura", 0),
    ("Gestão de Empresas", "Licenciatura", 1),
    ("Design e Tecnologia das Artes Gráficas", "Licenciatura", 0),
    ("Tecnologias de Informação e Comunicação", "Licenciatura", 2),
    ("Engenharia Informática - Internet das Coisas", "Mestrado", 0),
];

// (name, typology, semester, year, course index)
const COURSE_UNITS: [(&str, &str, &str, i64, usize); 5] = [
    ("Programação", "Teórico-prática", "1º", 1, 0),
    ("Base de Dados", "Teórico-prática", "1º", 2, 0),
    ("Redes de Computadores", "Teórico-prática", "2º", 2, 0),
    ("Gestão Financeira", "Teórica", "1º", 1, 1),
    ("IoT Fundamentals", "Teórico-prática", "1º", 1, 4),
];

const PROFESSORS: [(&str, &str); 4] = [
    ("João Silva", "joao.silva@example.com"),
    ("Maria Santos", "maria.santos@example.com"),
    ("António Pereira", "antonio.pereira@example.com"),
    ("Ana Costa", "ana.costa@example.com"),
];

/// Loads demo fixtures. Each table is filled only while it is empty, so the
/// call is safe to repeat. Blocks go through the schedule validator and
/// rejected ones are skipped.
pub async fn load_demo_data(db: &SqlitePool, week_start: Day) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    if repository::fetch_schools(db).await?.is_empty() {
        for (name, location) in SCHOOLS {
            repository::insert_school(
                db,
                NewSchoolRequest {
                    name: name.to_string(),
                    location: location.to_string(),
                },
            )
            .await?;
            report.schools += 1;
        }
    }
    let schools = repository::fetch_schools(db).await?;

    if repository::fetch_rooms(db).await?.is_empty() {
        for school in &schools {
            for i in 1..=5 {
                repository::insert_room(
                    db,
                    NewRoomRequest {
                        name: format!("Sala {:02}", i),
                        capacity: 30 + i * 5,
                        room_type: if i % 3 == 0 { "Laboratório" } else { "Sala de aula" }.to_string(),
                        location: school.location.clone(),
                        school_id: school.id,
                    },
                )
                .await?;
                report.rooms += 1;
            }
        }
    }

    if repository::fetch_courses(db).await?.is_empty() && !schools.is_empty() {
        for (name, degree, school) in COURSES {
            let Some(school) = schools.get(school) else { continue };
            repository::insert_course(
                db,
                NewCourseRequest {
                    name: name.to_string(),
                    degree: degree.to_string(),
                    school_id: school.id,
                },
            )
            .await?;
            report.courses += 1;
        }
    }
    let courses = repository::fetch_courses(db).await?;

    if repository::fetch_course_units(db).await?.is_empty() && !courses.is_empty() {
        for (name, typology, semester, year, course) in COURSE_UNITS {
            let Some(course) = courses.get(course) else { continue };
            repository::insert_course_unit(
                db,
                NewCourseUnitRequest {
                    name: name.to_string(),
                    unit_type: "Obrigatória".to_string(),
                    degree: course.degree.clone(),
                    typology: typology.to_string(),
                    semester: semester.to_string(),
                    year: Some(year),
                    course_id: course.id,
                },
            )
            .await?;
            report.course_units += 1;
        }
    }

    if repository::fetch_class_groups(db).await?.is_empty() {
        for unit in repository::fetch_course_units(db).await? {
            for letter in ['A', 'B'] {
                repository::insert_class_group(
                    db,
                    NewClassGroupRequest {
                        name: format!("Turma {}", letter),
                        course_unit_id: unit.id,
                        course_id: unit.course_id,
                    },
                )
                .await?;
                report.class_groups += 1;
            }
        }
    }

    if repository::fetch_users(db).await?.is_empty() {
        let mut users = vec![
            NewUserRequest {
                name: "Administrador Sistema".to_string(),
                email: "admin@example.com".to_string(),
                role: Role::Administrator,
                category: None,
                school_id: None,
            },
            NewUserRequest {
                name: "Membro da Comissão".to_string(),
                email: "comissao@example.com".to_string(),
                role: Role::CommitteeMember,
                category: None,
                school_id: None,
            },
        ];
        users.extend(PROFESSORS.iter().map(|(name, email)| NewUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Professor,
            category: Some("Professor Adjunto".to_string()),
            school_id: schools.first().map(|s| s.id),
        }));
        for user in users {
            repository::insert_user(db, user).await?;
            report.users += 1;
        }
    }

    if repository::count_blocks(db).await? == 0 {
        let (inserted, rejected) = seed_blocks(db, week_start).await?;
        report.blocks_inserted = inserted;
        report.blocks_rejected = rejected;
    }

    info!("demo data loaded: {:?}", report);
    Ok(report)
}

async fn seed_blocks(db: &SqlitePool, week_start: Day) -> Result<(usize, usize), AppError> {
    let professors = repository::fetch_professors(db).await?;
    let rooms = repository::fetch_rooms(db).await?;
    let groups = repository::fetch_class_groups(db).await?;
    if professors.is_empty() || rooms.is_empty() || groups.is_empty() {
        return Ok((0, 0));
    }

    let validator = ScheduleValidator::new(Arc::new(SqliteScheduleStore::new(db.clone())));
    let mut inserted = 0;
    let mut rejected = 0;

    for (idx, group) in groups.iter().take(10).enumerate() {
        let professor = &professors[idx % professors.len()];
        let room = &rooms[idx % rooms.len()];
        let offset = (idx % 3) as u32;

        for weekday in (0..5).filter(|d| (d + idx) % 2 == 0) {
            let day = Day::from(week_start.as_naive() + Duration::days(weekday as i64));
            for (start, end) in [(8 + offset, 10 + offset), (15 + offset, 17 + offset)] {
                let (Some(start_time), Some(end_time)) =
                    (TimeOfDay::from_hm(start, 0), TimeOfDay::from_hm(end, 0))
                else {
                    continue;
                };
                let block = TimetableBlock {
                    id: None,
                    start_time,
                    end_time,
                    day,
                    professor_id: professor.id,
                    room_id: room.id,
                    course_unit_id: group.course_unit_id,
                    class_group_id: group.id,
                };

                match validator.validate_block(&block, None).await? {
                    Verdict::Valid => {
                        repository::insert_block(db, &block).await?;
                        inserted += 1;
                    }
                    Verdict::Rejected(conflict) => {
                        warn!("skipping demo block for {}: {}", group.name, conflict);
                        rejected += 1;
                    }
                }
            }
        }
    }

    Ok((inserted, rejected))
}
