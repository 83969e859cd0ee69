//! Record routes. `/students/enriched` is a static segment and wins over `/students/:id`.

use crate::handlers::{
    assign_proctorship, create_membership, create_professor, create_student, delete_membership,
    delete_professor, delete_student, list_proctorships, list_professors, list_students,
    list_students_enriched, read_membership, read_professor, read_student, update_membership,
    update_professor, update_student,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn record_routes(state: AppState) -> Router {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/enriched", get(list_students_enriched))
        .route(
            "/students/:id",
            get(read_student).patch(update_student).delete(delete_student),
        )
        .route(
            "/students/:id/library-membership",
            get(read_membership)
                .post(create_membership)
                .patch(update_membership)
                .delete(delete_membership),
        )
        .route("/professors", get(list_professors).post(create_professor))
        .route(
            "/professors/:id",
            get(read_professor).patch(update_professor).delete(delete_professor),
        )
        .route(
            "/professors/:id/proctorships",
            get(list_proctorships).post(assign_proctorship),
        )
        .with_state(state)
}
