use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;

pub async fn index_handler(State(state): State<AppState>) -> String {
    let url = &state.public_url;
    let mut page = format!(
        "burrow: a URL shortener\n\
         \n\
         Shorten a URL with a generated token:\n\
         \x20   curl -d 'https://example.com' {url}\n\
         \n\
         Shorten a URL with a token of your choosing:\n\
         \x20   curl -d 'https://example.com' {url}/my-token\n\
         \n\
         Both answer with the short URL in the body and the deletion key in\n\
         the X-Delete-With header. Delete a short URL with:\n\
         \x20   curl -X DELETE -d '<deletion key>' {url}/my-token\n"
    );

    if state.demo {
        page.push_str("\nThis is a demo instance: links may be removed at any time.\n");
    }
    if let Some(copy) = &state.copy {
        page.push_str(&format!("\n{copy}\n"));
    }
    page
}

pub async fn favicon_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}
