//! Domain layer: invariants and orchestration over the repository.

use bookstock_http::error::AppError;

use super::models::{
    Book, BookResponse, CreateBookRequest, PageRequest, PageResponse, SortSpec, UpdateBookRequest,
};
use super::repository::BookRepository;

pub struct BookService {
    repository: BookRepository,
}

impl BookService {
    pub fn new(repository: BookRepository) -> Self {
        Self { repository }
    }

    /// Register a new book. Fails with a conflict when the isbn is already
    /// taken; the duplicate check runs before anything is written.
    pub async fn create_book(
        &self,
        request: CreateBookRequest,
    ) -> Result<BookResponse, AppError> {
        let new_book = request.validate().map_err(AppError::validation)?;

        if let Some(isbn) = new_book.isbn.as_deref() {
            if self.repository.exists_by_isbn(isbn).await? {
                return Err(AppError::conflict(format!(
                    "a book with isbn {isbn} already exists"
                )));
            }
        }

        let book = self.repository.insert(new_book).await?;
        tracing::info!(book_id = book.book_id, "book created");

        Ok(book.into())
    }

    pub async fn get_book(&self, id: i64) -> Result<BookResponse, AppError> {
        self.find_book(id).await.map(Into::into)
    }

    pub async fn get_all_books(&self) -> Result<Vec<BookResponse>, AppError> {
        let books = self.repository.find_all().await?;
        Ok(into_responses(books))
    }

    pub async fn search_books(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
        sort: SortSpec,
    ) -> Result<PageResponse<BookResponse>, AppError> {
        let (books, total) = self.repository.search(keyword, page, sort).await?;
        Ok(PageResponse::new(into_responses(books), page, total))
    }

    pub async fn search_by_conditions(
        &self,
        title: Option<&str>,
        author: Option<&str>,
        category: Option<&str>,
        page: PageRequest,
    ) -> Result<PageResponse<BookResponse>, AppError> {
        let (books, total) = self
            .repository
            .search_by_conditions(title, author, category, page)
            .await?;
        Ok(PageResponse::new(into_responses(books), page, total))
    }

    pub async fn search_by_title(&self, title: &str) -> Result<Vec<BookResponse>, AppError> {
        let books = self.repository.find_by_title_containing(title).await?;
        Ok(into_responses(books))
    }

    pub async fn search_by_author(&self, author: &str) -> Result<Vec<BookResponse>, AppError> {
        let books = self.repository.find_by_author_containing(author).await?;
        Ok(into_responses(books))
    }

    pub async fn search_by_category(&self, category: &str) -> Result<Vec<BookResponse>, AppError> {
        let books = self.repository.find_by_category(category).await?;
        Ok(into_responses(books))
    }

    pub async fn search_by_price_range(
        &self,
        min: i64,
        max: i64,
    ) -> Result<Vec<BookResponse>, AppError> {
        let books = self.repository.find_by_price_range(min, max).await?;
        Ok(into_responses(books))
    }

    pub async fn get_books_in_stock(&self) -> Result<Vec<BookResponse>, AppError> {
        let books = self.repository.find_in_stock().await?;
        Ok(into_responses(books))
    }

    /// Overwrite the editable fields of an existing book. Isbn and stock
    /// are left untouched.
    pub async fn update_book(
        &self,
        id: i64,
        request: UpdateBookRequest,
    ) -> Result<BookResponse, AppError> {
        let update = request.validate().map_err(AppError::validation)?;

        let mut book = self.find_book(id).await?;
        book.apply_update(update);

        let saved = self.repository.save(&book).await?;
        tracing::info!(book_id = id, "book updated");

        Ok(saved.into())
    }

    pub async fn delete_book(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(id).await? {
            return Err(AppError::not_found(format!("book {id} not found")));
        }

        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    pub async fn increase_stock(&self, id: i64, quantity: i64) -> Result<BookResponse, AppError> {
        let mut book = self.find_book(id).await?;
        book.increase_stock(quantity);

        let saved = self.repository.save(&book).await?;
        tracing::info!(book_id = id, quantity, stock = saved.stock_quantity, "stock increased");

        Ok(saved.into())
    }

    pub async fn decrease_stock(&self, id: i64, quantity: i64) -> Result<BookResponse, AppError> {
        let mut book = self.find_book(id).await?;
        book.decrease_stock(quantity)?;

        let saved = self.repository.save(&book).await?;
        tracing::info!(book_id = id, quantity, stock = saved.stock_quantity, "stock decreased");

        Ok(saved.into())
    }

    async fn find_book(&self, id: i64) -> Result<Book, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("book {id} not found")))
    }
}

fn into_responses(books: Vec<Book>) -> Vec<BookResponse> {
    books.into_iter().map(Into::into).collect()
}
