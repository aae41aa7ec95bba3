use axum::body::Body;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Middleware для логирования HTTP запросов
///
/// Пишет метод, путь, статус, длительность и размер ответа. Размер берется
/// из Content-Length: тело не буферизуется, фотографии отдаются потоком.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let size = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .map(format_size)
        .unwrap_or_else(|| "-".to_string());
    let status = response.status().as_u16();
    let elapsed = start.elapsed().as_millis();

    if response.status().is_server_error() {
        tracing::error!("{} {} {} | {}ms | {}", status, method, path, elapsed, size);
    } else {
        tracing::info!("{} {} {} | {}ms | {}", status, method, path, elapsed, size);
    }

    response
}

/// Размер с разделителями тысяч: 1234567 -> "1.234.567"
fn format_size(n: usize) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result
}
