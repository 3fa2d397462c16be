use crate::http::AppState;
use crate::models::{Book, FindAllBooksError};
use crate::repositories::BookRepository;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub const fn new(status: StatusCode, data: T) -> Self {
        Self(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    status_code: u16,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    const fn new(status: StatusCode, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::InternalServerError(msg) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, Json(ApiResponse::new(status, msg))).into_response()
            }
        }
    }
}

impl From<FindAllBooksError> for ApiError {
    fn from(err: FindAllBooksError) -> Self {
        tracing::error!(error = ?err.0, "failed to list books");
        Self::InternalServerError("Internal server error".to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct BookHttpResponse {
    id: i64,
    title: String,
    author: i64,
    description: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    is_published: bool,
}

impl From<Book> for BookHttpResponse {
    fn from(value: Book) -> Self {
        Self {
            id: value.id(),
            title: value.title().to_string(),
            author: value.author_id(),
            description: value.description().to_string(),
            price: value.price().amount(),
            is_published: value.is_published(),
        }
    }
}

pub async fn list_books<BR: BookRepository>(
    State(state): State<AppState<BR>>,
) -> Result<ApiSuccess<Vec<BookHttpResponse>>, ApiError> {
    let books = state.book_repo.find_all_books().await?;
    tracing::debug!(count = books.len(), "listing books");

    let body = books.into_iter().map(BookHttpResponse::from).collect();
    Ok(ApiSuccess::new(StatusCode::OK, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookTitle, Price};

    #[test]
    fn serializes_book_fields() {
        let book = Book::new(
            3,
            BookTitle::new_unchecked("Sample Title"),
            1,
            "A sample".into(),
            Price::from_cents(999),
            false,
        );

        let json = serde_json::to_value(BookHttpResponse::from(book)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "title": "Sample Title",
                "author": 1,
                "description": "A sample",
                "price": 9.99,
                "is_published": false,
            })
        );
    }

    #[test]
    fn internal_error_hides_cause() {
        let err = FindAllBooksError(anyhow::anyhow!("disk on fire"));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
