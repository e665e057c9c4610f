//! Book entity, request/response DTOs, and explicit field validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookstock_http::error::{AppError, FieldError};

pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_MAX_CHARS: usize = 100;
pub const CATEGORY_MAX_CHARS: usize = 50;
pub const PUBLISHER_MAX_CHARS: usize = 100;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A stored book record.
///
/// Fields are mutated only through the methods below; the transport layer
/// never writes to the record directly.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Book {
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub price: i64,
    pub stock_quantity: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Overwrite the editable fields. Isbn and stock are never touched here.
    pub(crate) fn apply_update(&mut self, update: BookUpdate) {
        self.title = update.title;
        self.author = update.author;
        self.category = update.category;
        self.publisher = update.publisher;
        self.price = update.price;
        self.description = update.description;
    }

    pub(crate) fn increase_stock(&mut self, quantity: i64) {
        // Saturating so an absurd quantity cannot wrap stock negative.
        self.stock_quantity = self.stock_quantity.saturating_add(quantity);
    }

    pub(crate) fn decrease_stock(&mut self, quantity: i64) -> Result<(), AppError> {
        if quantity > self.stock_quantity {
            return Err(AppError::bad_request(format!(
                "insufficient stock: {} remaining",
                self.stock_quantity
            )));
        }
        self.stock_quantity -= quantity;
        Ok(())
    }
}

/// Validated input for an insert. Produced by `CreateBookRequest::validate`.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub category: String,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub price: i64,
    pub stock_quantity: i64,
    pub description: Option<String>,
}

/// Validated input for a general update. Produced by
/// `UpdateBookRequest::validate`.
#[derive(Debug, Clone)]
pub struct BookUpdate {
    pub title: String,
    pub author: String,
    pub category: String,
    pub publisher: Option<String>,
    pub price: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateBookRequest {
    /// Check every field and either hand back insertable values or the full
    /// list of violations.
    pub fn validate(self) -> Result<NewBook, Vec<FieldError>> {
        let mut errors = Vec::new();

        check_required_text(&mut errors, "title", &self.title, TITLE_MAX_CHARS);
        check_required_text(&mut errors, "author", &self.author, AUTHOR_MAX_CHARS);
        check_required_text(&mut errors, "category", &self.category, CATEGORY_MAX_CHARS);

        if let Some(publisher) = self.publisher.as_deref() {
            if publisher.chars().count() > PUBLISHER_MAX_CHARS {
                errors.push(FieldError::new(
                    "publisher",
                    format!("publisher must be at most {PUBLISHER_MAX_CHARS} characters"),
                ));
            }
        }

        let isbn = self.isbn.filter(|i| !i.trim().is_empty());
        if let Some(isbn) = isbn.as_deref() {
            if !is_valid_isbn(isbn) {
                errors.push(FieldError::new("isbn", "isbn must be exactly 13 digits"));
            }
        }

        let price = check_required_amount(&mut errors, "price", self.price);
        let stock_quantity =
            check_required_amount(&mut errors, "stockQuantity", self.stock_quantity);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewBook {
            title: self.title,
            author: self.author,
            category: self.category,
            publisher: self.publisher,
            isbn,
            price,
            stock_quantity,
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateBookRequest {
    pub fn validate(self) -> Result<BookUpdate, Vec<FieldError>> {
        let mut errors = Vec::new();

        check_required_text(&mut errors, "title", &self.title, TITLE_MAX_CHARS);
        check_required_text(&mut errors, "author", &self.author, AUTHOR_MAX_CHARS);
        check_required_text(&mut errors, "category", &self.category, CATEGORY_MAX_CHARS);

        if let Some(publisher) = self.publisher.as_deref() {
            if publisher.chars().count() > PUBLISHER_MAX_CHARS {
                errors.push(FieldError::new(
                    "publisher",
                    format!("publisher must be at most {PUBLISHER_MAX_CHARS} characters"),
                ));
            }
        }

        let price = check_required_amount(&mut errors, "price", self.price);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(BookUpdate {
            title: self.title,
            author: self.author,
            category: self.category,
            publisher: self.publisher,
            price,
            description: self.description,
        })
    }
}

fn check_required_text(errors: &mut Vec<FieldError>, field: &str, value: &str, max_chars: usize) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{field} is required")));
    } else if value.chars().count() > max_chars {
        errors.push(FieldError::new(
            field,
            format!("{field} must be at most {max_chars} characters"),
        ));
    }
}

fn check_required_amount(errors: &mut Vec<FieldError>, field: &str, value: Option<i64>) -> i64 {
    match value {
        None => {
            errors.push(FieldError::new(field, format!("{field} is required")));
            0
        }
        Some(v) if v < 0 => {
            errors.push(FieldError::new(
                field,
                format!("{field} must be zero or greater"),
            ));
            0
        }
        Some(v) => v,
    }
}

fn is_valid_isbn(isbn: &str) -> bool {
    isbn.len() == 13 && isbn.bytes().all(|b| b.is_ascii_digit())
}

/// Wire representation of a book record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub price: i64,
    pub stock_quantity: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id,
            title: book.title,
            author: book.author,
            category: book.category,
            publisher: book.publisher,
            isbn: book.isbn,
            price: book.price,
            stock_quantity: book.stock_quantity,
            description: book.description,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// Offset-based page request. Page is zero-based; size is clamped to
/// `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    page: i64,
    size: i64,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: page.max(0),
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Sort order for paged searches, parsed from the `field,direction` query
/// form. Only known columns are accepted; direction defaults to ascending
/// when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Title,
    Author,
    Price,
    StockQuantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortSpec {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let mut parts = value.splitn(2, ',');
        let field = match parts.next().unwrap_or("").trim() {
            "createdAt" => SortField::CreatedAt,
            "title" => SortField::Title,
            "author" => SortField::Author,
            "price" => SortField::Price,
            "stockQuantity" => SortField::StockQuantity,
            other => {
                return Err(AppError::bad_request(format!(
                    "unsupported sort field: {other}"
                )))
            }
        };
        let direction = match parts.next().map(str::trim) {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(AppError::bad_request(format!(
                    "unsupported sort direction: {other}"
                )))
            }
        };
        Ok(Self { field, direction })
    }

    /// SQL ORDER BY fragment. Values come from the enums above, never from
    /// caller input.
    pub(crate) fn order_clause(&self) -> String {
        let column = match self.field {
            SortField::CreatedAt => "created_at",
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Price => "price",
            SortField::StockQuantity => "stock_quantity",
        };
        let direction = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        format!("{column} {direction}")
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// A page of results plus total-count metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let size = request.size();
        Self {
            content,
            page: request.page(),
            size,
            total_elements,
            total_pages: (total_elements + size - 1) / size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateBookRequest {
        CreateBookRequest {
            title: "클린 코드".to_string(),
            author: "로버트 C. 마틴".to_string(),
            category: "프로그래밍".to_string(),
            publisher: Some("인사이트".to_string()),
            isbn: Some("9788966260959".to_string()),
            price: Some(33000),
            stock_quantity: Some(100),
            description: Some("애자일 소프트웨어 장인 정신".to_string()),
        }
    }

    #[test]
    fn valid_create_request_passes() {
        let new_book = valid_request().validate().unwrap();
        assert_eq!(new_book.title, "클린 코드");
        assert_eq!(new_book.price, 33000);
        assert_eq!(new_book.stock_quantity, 100);
    }

    #[test]
    fn blank_required_fields_are_reported_together() {
        let request = CreateBookRequest {
            title: "   ".to_string(),
            author: String::new(),
            category: String::new(),
            price: None,
            stock_quantity: Some(-1),
            ..Default::default()
        };

        let errors = request.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["title", "author", "category", "price", "stockQuantity"]
        );
    }

    #[test]
    fn overlong_title_is_rejected() {
        let mut request = valid_request();
        request.title = "가".repeat(TITLE_MAX_CHARS + 1);

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn title_at_limit_is_accepted() {
        let mut request = valid_request();
        // Multi-byte characters count as single characters.
        request.title = "가".repeat(TITLE_MAX_CHARS);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn malformed_isbn_is_rejected() {
        for bad in ["123", "97889662609ab", "97889662609590"] {
            let mut request = valid_request();
            request.isbn = Some(bad.to_string());
            let errors = request.validate().unwrap_err();
            assert_eq!(errors[0].field, "isbn");
        }
    }

    #[test]
    fn blank_isbn_is_treated_as_absent() {
        let mut request = valid_request();
        request.isbn = Some("  ".to_string());
        let new_book = request.validate().unwrap();
        assert!(new_book.isbn.is_none());
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut request = valid_request();
        request.price = Some(-100);
        let errors = request.validate().unwrap_err();
        assert_eq!(errors[0].field, "price");
    }

    #[test]
    fn decrease_stock_guards_against_shortfall() {
        let mut book = test_book(70);

        assert!(book.decrease_stock(200).is_err());
        assert_eq!(book.stock_quantity, 70);

        book.decrease_stock(70).unwrap();
        assert_eq!(book.stock_quantity, 0);
    }

    #[test]
    fn increase_then_decrease_is_net_zero() {
        let mut book = test_book(100);
        book.increase_stock(50);
        book.decrease_stock(50).unwrap();
        assert_eq!(book.stock_quantity, 100);
    }

    #[test]
    fn increase_stock_saturates_instead_of_wrapping() {
        let mut book = test_book(100);
        book.increase_stock(i64::MAX);
        assert_eq!(book.stock_quantity, i64::MAX);
        assert!(book.stock_quantity >= 0);
    }

    #[test]
    fn apply_update_leaves_isbn_and_stock_alone() {
        let mut book = test_book(100);
        book.apply_update(BookUpdate {
            title: "클린 코드 (개정판)".to_string(),
            author: "로버트 C. 마틴".to_string(),
            category: "프로그래밍".to_string(),
            publisher: Some("인사이트".to_string()),
            price: 35000,
            description: None,
        });

        assert_eq!(book.title, "클린 코드 (개정판)");
        assert_eq!(book.price, 35000);
        assert_eq!(book.isbn.as_deref(), Some("9788966260959"));
        assert_eq!(book.stock_quantity, 100);
    }

    #[test]
    fn page_request_clamps_inputs() {
        let request = PageRequest::new(-3, 0);
        assert_eq!(request.page(), 0);
        assert_eq!(request.size(), 1);

        let request = PageRequest::new(2, 1000);
        assert_eq!(request.size(), MAX_PAGE_SIZE);
        assert_eq!(request.offset(), 2 * MAX_PAGE_SIZE);
    }

    #[test]
    fn sort_spec_parses_field_and_direction() {
        let sort = SortSpec::parse("price,asc").unwrap();
        assert_eq!(sort.field, SortField::Price);
        assert_eq!(sort.direction, SortDirection::Asc);
        assert_eq!(sort.order_clause(), "price ASC");

        // Direction defaults to ascending.
        let sort = SortSpec::parse("title").unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);

        let sort = SortSpec::parse("createdAt,desc").unwrap();
        assert_eq!(sort, SortSpec::default());
    }

    #[test]
    fn sort_spec_rejects_unknown_inputs() {
        assert!(SortSpec::parse("publisher").is_err());
        assert!(SortSpec::parse("price,sideways").is_err());
        assert!(SortSpec::parse("").is_err());
    }

    #[test]
    fn page_response_computes_total_pages() {
        let page = PageResponse::new(vec![1, 2, 3], PageRequest::new(0, 10), 23);
        assert_eq!(page.total_pages, 3);

        let empty: PageResponse<i64> = PageResponse::new(vec![], PageRequest::new(0, 10), 0);
        assert_eq!(empty.total_pages, 0);
    }

    fn test_book(stock: i64) -> Book {
        let now = Utc::now();
        Book {
            book_id: 1,
            title: "클린 코드".to_string(),
            author: "로버트 C. 마틴".to_string(),
            category: "프로그래밍".to_string(),
            publisher: Some("인사이트".to_string()),
            isbn: Some("9788966260959".to_string()),
            price: 33000,
            stock_quantity: stock,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}
