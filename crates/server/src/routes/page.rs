use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// The analyzer screen. All state lives behind the `/ws` socket.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
