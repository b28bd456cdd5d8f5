pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::extraction::handlers as postings;
use crate::forms::handlers as forms;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless extraction
        .route("/api/v1/postings/parse", post(postings::handle_parse_posting))
        .route("/api/v1/postings/pdf-text", post(postings::handle_pdf_text))
        // Forms
        .route("/api/v1/forms", post(forms::handle_create_form))
        .route(
            "/api/v1/forms/:id",
            get(forms::handle_get_form)
                .patch(forms::handle_edit_form)
                .delete(forms::handle_delete_form),
        )
        .route("/api/v1/forms/:id/skills", put(forms::handle_edit_skills))
        .route("/api/v1/forms/:id/extract", post(forms::handle_extract))
        .route("/api/v1/forms/:id/record", get(forms::handle_get_record))
        .with_state(state)
}
