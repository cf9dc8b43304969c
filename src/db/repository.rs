use sqlx::SqlitePool;

use crate::models::{
    BlockFilter, BlockView, ClassGroup, Course, CourseUnit, Day, NewClassGroupRequest,
    NewCourseRequest, NewCourseUnitRequest, NewRoomRequest, NewSchoolRequest, NewUserRequest,
    Role, Room, School, TimetableBlock, User,
};

// Schools

pub async fn fetch_schools(db: &SqlitePool) -> Result<Vec<School>, sqlx::Error> {
    sqlx::query_as::<_, School>("SELECT id, name, location FROM schools ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn find_school_by_id(db: &SqlitePool, id: i64) -> Result<Option<School>, sqlx::Error> {
    sqlx::query_as::<_, School>("SELECT id, name, location FROM schools WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_school(db: &SqlitePool, req: NewSchoolRequest) -> Result<School, sqlx::Error> {
    let id = sqlx::query("INSERT INTO schools (name, location) VALUES (?, ?)")
        .bind(&req.name)
        .bind(&req.location)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(School {
        id,
        name: req.name,
        location: req.location,
    })
}

pub async fn update_school(
    db: &SqlitePool,
    id: i64,
    req: NewSchoolRequest,
) -> Result<Option<School>, sqlx::Error> {
    let affected = sqlx::query("UPDATE schools SET name = ?, location = ? WHERE id = ?")
        .bind(&req.name)
        .bind(&req.location)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    Ok(Some(School {
        id,
        name: req.name,
        location: req.location,
    }))
}

pub async fn delete_school(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    delete_by_id(db, "DELETE FROM schools WHERE id = ?", id).await
}

pub async fn count_rooms_in_school(db: &SqlitePool, school_id: i64) -> Result<i64, sqlx::Error> {
    count(db, "SELECT COUNT(*) FROM rooms WHERE school_id = ?", school_id).await
}

// Rooms

const ROOM_COLUMNS: &str = "id, name, capacity, room_type, location, school_id";

pub async fn fetch_rooms(db: &SqlitePool) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>(&format!("SELECT {ROOM_COLUMNS} FROM rooms ORDER BY school_id, name"))
        .fetch_all(db)
        .await
}

pub async fn fetch_rooms_by_school(db: &SqlitePool, school_id: i64) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>(&format!(
        "SELECT {ROOM_COLUMNS} FROM rooms WHERE school_id = ? ORDER BY name"
    ))
    .bind(school_id)
    .fetch_all(db)
    .await
}

pub async fn find_room_by_id(db: &SqlitePool, id: i64) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_room(db: &SqlitePool, req: NewRoomRequest) -> Result<Room, sqlx::Error> {
    let id = sqlx::query(
        "INSERT INTO rooms (name, capacity, room_type, location, school_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&req.name)
    .bind(req.capacity)
    .bind(&req.room_type)
    .bind(&req.location)
    .bind(req.school_id)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Room {
        id,
        name: req.name,
        capacity: req.capacity,
        room_type: req.room_type,
        location: req.location,
        school_id: req.school_id,
    })
}

pub async fn update_room(
    db: &SqlitePool,
    id: i64,
    req: NewRoomRequest,
) -> Result<Option<Room>, sqlx::Error> {
    let affected = sqlx::query(
        "UPDATE rooms SET name = ?, capacity = ?, room_type = ?, location = ?, school_id = ? WHERE id = ?",
    )
    .bind(&req.name)
    .bind(req.capacity)
    .bind(&req.room_type)
    .bind(&req.location)
    .bind(req.school_id)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    Ok(Some(Room {
        id,
        name: req.name,
        capacity: req.capacity,
        room_type: req.room_type,
        location: req.location,
        school_id: req.school_id,
    }))
}

pub async fn delete_room(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    delete_by_id(db, "DELETE FROM rooms WHERE id = ?", id).await
}

pub async fn count_blocks_in_room(db: &SqlitePool, room_id: i64) -> Result<i64, sqlx::Error> {
    count(db, "SELECT COUNT(*) FROM timetable_blocks WHERE room_id = ?", room_id).await
}

// Courses

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>("SELECT id, name, degree, school_id FROM courses ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn find_course_by_id(db: &SqlitePool, id: i64) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>("SELECT id, name, degree, school_id FROM courses WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, sqlx::Error> {
    let id = sqlx::query("INSERT INTO courses (name, degree, school_id) VALUES (?, ?, ?)")
        .bind(&req.name)
        .bind(&req.degree)
        .bind(req.school_id)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(Course {
        id,
        name: req.name,
        degree: req.degree,
        school_id: req.school_id,
    })
}

pub async fn update_course(
    db: &SqlitePool,
    id: i64,
    req: NewCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let affected = sqlx::query("UPDATE courses SET name = ?, degree = ?, school_id = ? WHERE id = ?")
        .bind(&req.name)
        .bind(&req.degree)
        .bind(req.school_id)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    Ok(Some(Course {
        id,
        name: req.name,
        degree: req.degree,
        school_id: req.school_id,
    }))
}

pub async fn delete_course(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    delete_by_id(db, "DELETE FROM courses WHERE id = ?", id).await
}

pub async fn count_class_groups_in_course(db: &SqlitePool, course_id: i64) -> Result<i64, sqlx::Error> {
    count(db, "SELECT COUNT(*) FROM class_groups WHERE course_id = ?", course_id).await
}

// Course units

const COURSE_UNIT_COLUMNS: &str = "id, name, unit_type, degree, typology, semester, year, course_id";

pub async fn fetch_course_units(db: &SqlitePool) -> Result<Vec<CourseUnit>, sqlx::Error> {
    sqlx::query_as::<_, CourseUnit>(&format!(
        "SELECT {COURSE_UNIT_COLUMNS} FROM course_units ORDER BY course_id, name"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_course_unit_by_id(db: &SqlitePool, id: i64) -> Result<Option<CourseUnit>, sqlx::Error> {
    sqlx::query_as::<_, CourseUnit>(&format!(
        "SELECT {COURSE_UNIT_COLUMNS} FROM course_units WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_course_unit(
    db: &SqlitePool,
    req: NewCourseUnitRequest,
) -> Result<CourseUnit, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO course_units (name, unit_type, degree, typology, semester, year, course_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&req.name)
    .bind(&req.unit_type)
    .bind(&req.degree)
    .bind(&req.typology)
    .bind(&req.semester)
    .bind(req.year)
    .bind(req.course_id)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(CourseUnit {
        id,
        name: req.name,
        unit_type: req.unit_type,
        degree: req.degree,
        typology: req.typology,
        semester: req.semester,
        year: req.year,
        course_id: req.course_id,
    })
}

pub async fn update_course_unit(
    db: &SqlitePool,
    id: i64,
    req: NewCourseUnitRequest,
) -> Result<Option<CourseUnit>, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        UPDATE course_units
        SET name = ?, unit_type = ?, degree = ?, typology = ?, semester = ?, year = ?, course_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&req.name)
    .bind(&req.unit_type)
    .bind(&req.degree)
    .bind(&req.typology)
    .bind(&req.semester)
    .bind(req.year)
    .bind(req.course_id)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    Ok(Some(CourseUnit {
        id,
        name: req.name,
        unit_type: req.unit_type,
        degree: req.degree,
        typology: req.typology,
        semester: req.semester,
        year: req.year,
        course_id: req.course_id,
    }))
}

pub async fn delete_course_unit(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    delete_by_id(db, "DELETE FROM course_units WHERE id = ?", id).await
}

// Class groups

pub async fn fetch_class_groups(db: &SqlitePool) -> Result<Vec<ClassGroup>, sqlx::Error> {
    sqlx::query_as::<_, ClassGroup>(
        "SELECT id, name, course_unit_id, course_id FROM class_groups ORDER BY course_unit_id, name",
    )
    .fetch_all(db)
    .await
}

pub async fn find_class_group_by_id(db: &SqlitePool, id: i64) -> Result<Option<ClassGroup>, sqlx::Error> {
    sqlx::query_as::<_, ClassGroup>(
        "SELECT id, name, course_unit_id, course_id FROM class_groups WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_class_group(
    db: &SqlitePool,
    req: NewClassGroupRequest,
) -> Result<ClassGroup, sqlx::Error> {
    let id = sqlx::query("INSERT INTO class_groups (name, course_unit_id, course_id) VALUES (?, ?, ?)")
        .bind(&req.name)
        .bind(req.course_unit_id)
        .bind(req.course_id)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(ClassGroup {
        id,
        name: req.name,
        course_unit_id: req.course_unit_id,
        course_id: req.course_id,
    })
}

pub async fn update_class_group(
    db: &SqlitePool,
    id: i64,
    req: NewClassGroupRequest,
) -> Result<Option<ClassGroup>, sqlx::Error> {
    let affected = sqlx::query(
        "UPDATE class_groups SET name = ?, course_unit_id = ?, course_id = ? WHERE id = ?",
    )
    .bind(&req.name)
    .bind(req.course_unit_id)
    .bind(req.course_id)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    Ok(Some(ClassGroup {
        id,
        name: req.name,
        course_unit_id: req.course_unit_id,
        course_id: req.course_id,
    }))
}

pub async fn delete_class_group(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    delete_by_id(db, "DELETE FROM class_groups WHERE id = ?", id).await
}

// Users

const USER_COLUMNS: &str = "id, name, email, role, category, school_id";

pub async fn fetch_users(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY name"))
        .fetch_all(db)
        .await
}

pub async fn fetch_professors(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY name"
    ))
    .bind(Role::Professor)
    .fetch_all(db)
    .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_user(db: &SqlitePool, req: NewUserRequest) -> Result<User, sqlx::Error> {
    let id = sqlx::query(
        "INSERT INTO users (name, email, role, category, school_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(req.role)
    .bind(&req.category)
    .bind(req.school_id)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(User {
        id,
        name: req.name,
        email: req.email,
        role: req.role,
        category: req.category,
        school_id: req.school_id,
    })
}

// Timetable blocks

const BLOCK_COLUMNS: &str =
    "id, start_time, end_time, day, professor_id, room_id, course_unit_id, class_group_id";

const BLOCK_VIEW_SELECT: &str = r#"
    SELECT
        b.id AS id,
        b.start_time AS start_time,
        b.end_time AS end_time,
        b.day AS day,
        b.professor_id AS professor_id,
        u.name AS professor_name,
        b.room_id AS room_id,
        r.name AS room_name,
        b.course_unit_id AS course_unit_id,
        cu.name AS course_unit_name,
        b.class_group_id AS class_group_id,
        cg.name AS class_group_name
    FROM timetable_blocks b
    JOIN users u ON u.id = b.professor_id
    JOIN rooms r ON r.id = b.room_id
    JOIN course_units cu ON cu.id = b.course_unit_id
    JOIN class_groups cg ON cg.id = b.class_group_id
"#;

pub async fn fetch_block_views(db: &SqlitePool, filter: &BlockFilter) -> Result<Vec<BlockView>, sqlx::Error> {
    sqlx::query_as::<_, BlockView>(&format!(
        r#"{BLOCK_VIEW_SELECT}
        WHERE (?1 IS NULL OR b.day = ?1)
          AND (?2 IS NULL OR b.room_id = ?2)
          AND (?3 IS NULL OR b.professor_id = ?3)
        ORDER BY b.day, b.start_time, b.id
        "#
    ))
    .bind(filter.day)
    .bind(filter.room_id)
    .bind(filter.professor_id)
    .fetch_all(db)
    .await
}

pub async fn find_block_view(db: &SqlitePool, id: i64) -> Result<Option<BlockView>, sqlx::Error> {
    sqlx::query_as::<_, BlockView>(&format!("{BLOCK_VIEW_SELECT} WHERE b.id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_block_by_id(db: &SqlitePool, id: i64) -> Result<Option<TimetableBlock>, sqlx::Error> {
    sqlx::query_as::<_, TimetableBlock>(&format!(
        "SELECT {BLOCK_COLUMNS} FROM timetable_blocks WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_block(db: &SqlitePool, block: &TimetableBlock) -> Result<i64, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO timetable_blocks
            (start_time, end_time, day, professor_id, room_id, course_unit_id, class_group_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(block.start_time)
    .bind(block.end_time)
    .bind(block.day)
    .bind(block.professor_id)
    .bind(block.room_id)
    .bind(block.course_unit_id)
    .bind(block.class_group_id)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn update_block(db: &SqlitePool, id: i64, block: &TimetableBlock) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        UPDATE timetable_blocks
        SET start_time = ?,
            end_time = ?,
            day = ?,
            professor_id = ?,
            room_id = ?,
            course_unit_id = ?,
            class_group_id = ?
        WHERE id = ?
        "#,
    )
    .bind(block.start_time)
    .bind(block.end_time)
    .bind(block.day)
    .bind(block.professor_id)
    .bind(block.room_id)
    .bind(block.course_unit_id)
    .bind(block.class_group_id)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

pub async fn delete_block(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    delete_by_id(db, "DELETE FROM timetable_blocks WHERE id = ?", id).await
}

pub async fn fetch_blocks_in_room_on(
    db: &SqlitePool,
    room_id: i64,
    day: Day,
    exclude_id: Option<i64>,
) -> Result<Vec<TimetableBlock>, sqlx::Error> {
    sqlx::query_as::<_, TimetableBlock>(&format!(
        r#"
        SELECT {BLOCK_COLUMNS} FROM timetable_blocks
        WHERE room_id = ?1 AND day = ?2 AND (?3 IS NULL OR id != ?3)
        ORDER BY start_time
        "#
    ))
    .bind(room_id)
    .bind(day)
    .bind(exclude_id)
    .fetch_all(db)
    .await
}

pub async fn fetch_blocks_for_professor_on(
    db: &SqlitePool,
    professor_id: i64,
    day: Day,
    exclude_id: Option<i64>,
) -> Result<Vec<TimetableBlock>, sqlx::Error> {
    sqlx::query_as::<_, TimetableBlock>(&format!(
        r#"
        SELECT {BLOCK_COLUMNS} FROM timetable_blocks
        WHERE professor_id = ?1 AND day = ?2 AND (?3 IS NULL OR id != ?3)
        ORDER BY start_time
        "#
    ))
    .bind(professor_id)
    .bind(day)
    .bind(exclude_id)
    .fetch_all(db)
    .await
}

pub async fn count_blocks(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM timetable_blocks")
        .fetch_one(db)
        .await
}

async fn delete_by_id(db: &SqlitePool, sql: &str, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(sql).bind(id).execute(db).await?.rows_affected();
    Ok(result > 0)
}

async fn count(db: &SqlitePool, sql: &str, id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(sql).bind(id).fetch_one(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::TimeOfDay;

    struct Fixture {
        room_id: i64,
        professor_id: i64,
        course_unit_id: i64,
        class_group_id: i64,
    }

    async fn setup() -> (SqlitePool, Fixture) {
        let pool = db::connect("sqlite::memory:", 1).await.expect("db");

        let school = insert_school(
            &pool,
            NewSchoolRequest {
                name: "ESTT".to_string(),
                location: "Tomar".to_string(),
            },
        )
        .await
        .unwrap();
        let room = insert_room(
            &pool,
            NewRoomRequest {
                name: "B257".to_string(),
                capacity: 40,
                room_type: "Sala de aula".to_string(),
                location: "Tomar".to_string(),
                school_id: school.id,
            },
        )
        .await
        .unwrap();
        let course = insert_course(
            &pool,
            NewCourseRequest {
                name: "Engenharia Informática".to_string(),
                degree: "Licenciatura".to_string(),
                school_id: school.id,
            },
        )
        .await
        .unwrap();
        let unit = insert_course_unit(
            &pool,
            NewCourseUnitRequest {
                name: "Programação".to_string(),
                unit_type: "Obrigatória".to_string(),
                degree: "Licenciatura".to_string(),
                typology: "Teórico-prática".to_string(),
                semester: "1º".to_string(),
                year: Some(1),
                course_id: course.id,
            },
        )
        .await
        .unwrap();
        let group = insert_class_group(
            &pool,
            NewClassGroupRequest {
                name: "Turma A".to_string(),
                course_unit_id: unit.id,
                course_id: course.id,
            },
        )
        .await
        .unwrap();
        let professor = insert_user(
            &pool,
            NewUserRequest {
                name: "Ana Costa".to_string(),
                email: "ana.costa@example.com".to_string(),
                role: Role::Professor,
                category: None,
                school_id: Some(school.id),
            },
        )
        .await
        .unwrap();

        (
            pool,
            Fixture {
                room_id: room.id,
                professor_id: professor.id,
                course_unit_id: unit.id,
                class_group_id: group.id,
            },
        )
    }

    fn block(f: &Fixture, day: Day, start: u32, end: u32) -> TimetableBlock {
        TimetableBlock {
            id: None,
            start_time: TimeOfDay::from_hm(start, 0).unwrap(),
            end_time: TimeOfDay::from_hm(end, 0).unwrap(),
            day,
            professor_id: f.professor_id,
            room_id: f.room_id,
            course_unit_id: f.course_unit_id,
            class_group_id: f.class_group_id,
        }
    }

    fn monday() -> Day {
        Day::from_ymd(2025, 5, 12).unwrap()
    }

    #[tokio::test]
    async fn test_block_round_trips_through_sqlite() {
        let (pool, f) = setup().await;
        let b = block(&f, monday(), 9, 11);

        let id = insert_block(&pool, &b).await.unwrap();
        let stored = find_block_by_id(&pool, id).await.unwrap().unwrap();

        assert_eq!(stored, TimetableBlock { id: Some(id), ..b });
    }

    #[tokio::test]
    async fn test_block_view_carries_names() {
        let (pool, f) = setup().await;
        let id = insert_block(&pool, &block(&f, monday(), 9, 11)).await.unwrap();

        let view = find_block_view(&pool, id).await.unwrap().unwrap();
        assert_eq!(view.room_name, "B257");
        assert_eq!(view.professor_name, "Ana Costa");
        assert_eq!(view.course_unit_name, "Programação");
        assert_eq!(view.class_group_name, "Turma A");
    }

    #[tokio::test]
    async fn test_day_queries_exclude_the_given_block() {
        let (pool, f) = setup().await;
        let first = insert_block(&pool, &block(&f, monday(), 9, 11)).await.unwrap();
        insert_block(&pool, &block(&f, monday(), 14, 16)).await.unwrap();
        let tuesday = Day::from_ymd(2025, 5, 13).unwrap();
        insert_block(&pool, &block(&f, tuesday, 9, 11)).await.unwrap();

        let all = fetch_blocks_in_room_on(&pool, f.room_id, monday(), None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].start_time < all[1].start_time);

        let others = fetch_blocks_for_professor_on(&pool, f.professor_id, monday(), Some(first))
            .await
            .unwrap();
        assert_eq!(others.len(), 1);
        assert_ne!(others[0].id, Some(first));
    }

    #[tokio::test]
    async fn test_block_filter_narrows_listing() {
        let (pool, f) = setup().await;
        insert_block(&pool, &block(&f, monday(), 9, 11)).await.unwrap();
        let tuesday = Day::from_ymd(2025, 5, 13).unwrap();
        insert_block(&pool, &block(&f, tuesday, 9, 11)).await.unwrap();

        let everything = fetch_block_views(&pool, &BlockFilter::default()).await.unwrap();
        assert_eq!(everything.len(), 2);

        let filter = BlockFilter {
            day: Some(tuesday),
            ..Default::default()
        };
        let on_tuesday = fetch_block_views(&pool, &filter).await.unwrap();
        assert_eq!(on_tuesday.len(), 1);
        assert_eq!(on_tuesday[0].day, tuesday);

        let filter = BlockFilter {
            room_id: Some(f.room_id + 100),
            ..Default::default()
        };
        assert!(fetch_block_views(&pool, &filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_rows() {
        let (pool, f) = setup().await;
        let b = block(&f, monday(), 9, 11);

        assert!(!update_block(&pool, 999, &b).await.unwrap());
        assert!(!delete_block(&pool, 999).await.unwrap());

        let id = insert_block(&pool, &b).await.unwrap();
        assert!(update_block(&pool, id, &block(&f, monday(), 10, 12)).await.unwrap());
        assert!(delete_block(&pool, id).await.unwrap());
        assert_eq!(count_blocks(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reference_counts() {
        let (pool, f) = setup().await;
        let room = find_room_by_id(&pool, f.room_id).await.unwrap().unwrap();

        assert_eq!(count_rooms_in_school(&pool, room.school_id).await.unwrap(), 1);
        assert_eq!(count_blocks_in_room(&pool, f.room_id).await.unwrap(), 0);
        insert_block(&pool, &block(&f, monday(), 9, 11)).await.unwrap();
        assert_eq!(count_blocks_in_room(&pool, f.room_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_restricted_delete_surfaces_foreign_key_error() {
        let (pool, f) = setup().await;
        insert_block(&pool, &block(&f, monday(), 9, 11)).await.unwrap();

        let err = delete_room(&pool, f.room_id).await.unwrap_err();
        match err {
            sqlx::Error::Database(db) => assert!(db.is_foreign_key_violation()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_professors_listing_filters_by_role() {
        let (pool, _) = setup().await;
        insert_user(
            &pool,
            NewUserRequest {
                name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                role: Role::Administrator,
                category: None,
                school_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(fetch_users(&pool).await.unwrap().len(), 2);
        let professors = fetch_professors(&pool).await.unwrap();
        assert_eq!(professors.len(), 1);
        assert_eq!(professors[0].role, Role::Professor);
    }
}
