//! Axum handlers mapping HTTP requests onto the book service.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use bookstock_http::error::AppError;
use bookstock_http::response::ApiResponse;

use super::models::{
    BookResponse, CreateBookRequest, PageRequest, PageResponse, SortSpec, UpdateBookRequest,
    DEFAULT_PAGE_SIZE,
};
use super::repository::BookRepository;
use super::service::BookService;

#[derive(Clone)]
pub struct BooksState {
    service: Arc<BookService>,
}

/// Build the module router with its own service/repository stack.
pub fn router(db: &SqlitePool) -> Router {
    let state = BooksState {
        service: Arc::new(BookService::new(BookRepository::new(db.clone()))),
    };

    Router::new()
        .route("/", post(create_book).get(list_books))
        .route("/search", get(search_books))
        .route("/search/advanced", get(search_advanced))
        .route("/search/title", get(search_by_title))
        .route("/search/author", get(search_by_author))
        .route("/search/category", get(search_by_category))
        .route("/search/price", get(search_by_price_range))
        .route("/in-stock", get(books_in_stock))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/{id}/stock/increase", post(increase_stock))
        .route("/{id}/stock/decrease", post(decrease_stock))
        .with_state(state)
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    keyword: Option<String>,
    #[serde(default)]
    page: i64,
    #[serde(default = "default_page_size")]
    size: i64,
    /// `field,direction` form, e.g. `price,asc`. Creation time descending
    /// when absent.
    sort: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdvancedQuery {
    title: Option<String>,
    author: Option<String>,
    category: Option<String>,
    #[serde(default)]
    page: i64,
    #[serde(default = "default_page_size")]
    size: i64,
}

#[derive(Debug, Deserialize)]
struct TitleQuery {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorQuery {
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRangeQuery {
    min_price: Option<i64>,
    max_price: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StockQuery {
    quantity: Option<i64>,
}

fn require<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::bad_request(format!("{name} parameter is required")))
}

async fn create_book(
    State(state): State<BooksState>,
    Json(request): Json<CreateBookRequest>,
) -> Result<(StatusCode, ApiResponse<BookResponse>), AppError> {
    let book = state.service.create_book(request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success("book created", book),
    ))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<BookResponse>, AppError> {
    let book = state.service.get_book(id).await?;
    Ok(ApiResponse::success("book found", book))
}

async fn list_books(
    State(state): State<BooksState>,
) -> Result<ApiResponse<Vec<BookResponse>>, AppError> {
    let books = state.service.get_all_books().await?;
    Ok(ApiResponse::success("book list", books))
}

async fn search_books(
    State(state): State<BooksState>,
    Query(query): Query<SearchQuery>,
) -> Result<ApiResponse<PageResponse<BookResponse>>, AppError> {
    let page = PageRequest::new(query.page, query.size);
    let sort = match query.sort.as_deref() {
        Some(value) => SortSpec::parse(value)?,
        None => SortSpec::default(),
    };
    let result = state
        .service
        .search_books(query.keyword.as_deref(), page, sort)
        .await?;
    Ok(ApiResponse::success("search results", result))
}

async fn search_advanced(
    State(state): State<BooksState>,
    Query(query): Query<AdvancedQuery>,
) -> Result<ApiResponse<PageResponse<BookResponse>>, AppError> {
    let page = PageRequest::new(query.page, query.size);
    let result = state
        .service
        .search_by_conditions(
            query.title.as_deref(),
            query.author.as_deref(),
            query.category.as_deref(),
            page,
        )
        .await?;
    Ok(ApiResponse::success("search results", result))
}

async fn search_by_title(
    State(state): State<BooksState>,
    Query(query): Query<TitleQuery>,
) -> Result<ApiResponse<Vec<BookResponse>>, AppError> {
    let title = require(query.title, "title")?;
    let books = state.service.search_by_title(&title).await?;
    Ok(ApiResponse::success("title search results", books))
}

async fn search_by_author(
    State(state): State<BooksState>,
    Query(query): Query<AuthorQuery>,
) -> Result<ApiResponse<Vec<BookResponse>>, AppError> {
    let author = require(query.author, "author")?;
    let books = state.service.search_by_author(&author).await?;
    Ok(ApiResponse::success("author search results", books))
}

async fn search_by_category(
    State(state): State<BooksState>,
    Query(query): Query<CategoryQuery>,
) -> Result<ApiResponse<Vec<BookResponse>>, AppError> {
    let category = require(query.category, "category")?;
    let books = state.service.search_by_category(&category).await?;
    Ok(ApiResponse::success("category search results", books))
}

async fn search_by_price_range(
    State(state): State<BooksState>,
    Query(query): Query<PriceRangeQuery>,
) -> Result<ApiResponse<Vec<BookResponse>>, AppError> {
    let min = require(query.min_price, "minPrice")?;
    let max = require(query.max_price, "maxPrice")?;
    let books = state.service.search_by_price_range(min, max).await?;
    Ok(ApiResponse::success("price range search results", books))
}

async fn books_in_stock(
    State(state): State<BooksState>,
) -> Result<ApiResponse<Vec<BookResponse>>, AppError> {
    let books = state.service.get_books_in_stock().await?;
    Ok(ApiResponse::success("books in stock", books))
}

async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBookRequest>,
) -> Result<ApiResponse<BookResponse>, AppError> {
    let book = state.service.update_book(id, request).await?;
    Ok(ApiResponse::success("book updated", book))
}

async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, AppError> {
    state.service.delete_book(id).await?;
    Ok(ApiResponse::message("book deleted"))
}

async fn increase_stock(
    State(state): State<BooksState>,
    Path(id): Path<i64>,
    Query(query): Query<StockQuery>,
) -> Result<ApiResponse<BookResponse>, AppError> {
    let quantity = require(query.quantity, "quantity")?;
    let book = state.service.increase_stock(id, quantity).await?;
    Ok(ApiResponse::success("stock increased", book))
}

async fn decrease_stock(
    State(state): State<BooksState>,
    Path(id): Path<i64>,
    Query(query): Query<StockQuery>,
) -> Result<ApiResponse<BookResponse>, AppError> {
    let quantity = require(query.quantity, "quantity")?;
    let book = state.service.decrease_stock(id, quantity).await?;
    Ok(ApiResponse::success("stock decreased", book))
}
