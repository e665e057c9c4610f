//! Parameterized queries against the `books` table.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::models::{Book, NewBook, PageRequest, SortSpec};

const BOOK_COLUMNS: &str = "book_id, title, author, category, publisher, isbn, price, \
     stock_quantity, description, created_at, updated_at";

/// Data access for book records. All timestamps are owned here: inserts set
/// `created_at`/`updated_at`, saves refresh `updated_at`.
#[derive(Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, new_book: NewBook) -> Result<Book, sqlx::Error> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO books (title, author, category, publisher, isbn, price, \
             stock_quantity, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {BOOK_COLUMNS}"
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(new_book.title)
            .bind(new_book.author)
            .bind(new_book.category)
            .bind(new_book.publisher)
            .bind(new_book.isbn)
            .bind(new_book.price)
            .bind(new_book.stock_quantity)
            .bind(new_book.description)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
    }

    /// Persist a mutated record. Isbn is intentionally not part of the
    /// update set.
    pub async fn save(&self, book: &Book) -> Result<Book, sqlx::Error> {
        let sql = format!(
            "UPDATE books SET title = ?, author = ?, category = ?, publisher = ?, \
             price = ?, description = ?, stock_quantity = ?, updated_at = ? \
             WHERE book_id = ? \
             RETURNING {BOOK_COLUMNS}"
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.category)
            .bind(&book.publisher)
            .bind(book.price)
            .bind(&book.description)
            .bind(book.stock_quantity)
            .bind(Utc::now())
            .bind(book.book_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Book>, sqlx::Error> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE book_id = ?");

        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<Book>, sqlx::Error> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books");

        sqlx::query_as::<_, Book>(&sql).fetch_all(&self.pool).await
    }

    pub async fn exists_by_isbn(&self, isbn: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ?)")
            .bind(isbn)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn find_by_title_containing(&self, title: &str) -> Result<Vec<Book>, sqlx::Error> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE lower(title) LIKE ?");

        sqlx::query_as::<_, Book>(&sql)
            .bind(contains_pattern(&title.to_lowercase()))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_author_containing(&self, author: &str) -> Result<Vec<Book>, sqlx::Error> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE lower(author) LIKE ?");

        sqlx::query_as::<_, Book>(&sql)
            .bind(contains_pattern(&author.to_lowercase()))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_category(&self, category: &str) -> Result<Vec<Book>, sqlx::Error> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE category = ?");

        sqlx::query_as::<_, Book>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_price_range(&self, min: i64, max: i64) -> Result<Vec<Book>, sqlx::Error> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE price BETWEEN ? AND ?");

        sqlx::query_as::<_, Book>(&sql)
            .bind(min)
            .bind(max)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_in_stock(&self) -> Result<Vec<Book>, sqlx::Error> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE stock_quantity > 0");

        sqlx::query_as::<_, Book>(&sql).fetch_all(&self.pool).await
    }

    /// Keyword page: empty keyword matches everything, otherwise a
    /// case-sensitive substring match on title or author. `book_id` breaks
    /// ties so paging stays deterministic under any sort.
    pub async fn search(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
        sort: SortSpec,
    ) -> Result<(Vec<Book>, i64), sqlx::Error> {
        let keyword = keyword.unwrap_or("").trim();

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books \
             WHERE ?1 = '' OR instr(title, ?1) > 0 OR instr(author, ?1) > 0",
        )
        .bind(keyword)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE ?1 = '' OR instr(title, ?1) > 0 OR instr(author, ?1) > 0 \
             ORDER BY {order}, book_id DESC \
             LIMIT ?2 OFFSET ?3",
            order = sort.order_clause()
        );

        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(keyword)
            .bind(page.size())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Dynamic filter: AND-combine one predicate per non-blank argument,
    /// starting from match-all. Title/author match case-insensitively,
    /// category matches exactly.
    pub async fn search_by_conditions(
        &self,
        title: Option<&str>,
        author: Option<&str>,
        category: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Book>, i64), sqlx::Error> {
        let mut count_builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM books WHERE 1=1");
        push_condition_filters(&mut count_builder, title, author, category);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM books WHERE 1=1"));
        push_condition_filters(&mut builder, title, author, category);
        builder.push(" ORDER BY created_at DESC, book_id DESC LIMIT ");
        builder.push_bind(page.size());
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let books = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn push_condition_filters(
    builder: &mut QueryBuilder<'_, Sqlite>,
    title: Option<&str>,
    author: Option<&str>,
    category: Option<&str>,
) {
    if let Some(title) = non_blank(title) {
        builder.push(" AND lower(title) LIKE ");
        builder.push_bind(contains_pattern(&title.to_lowercase()));
    }

    if let Some(author) = non_blank(author) {
        builder.push(" AND lower(author) LIKE ");
        builder.push_bind(contains_pattern(&author.to_lowercase()));
    }

    if let Some(category) = non_blank(category) {
        builder.push(" AND category = ");
        builder.push_bind(category.to_string());
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn contains_pattern(needle: &str) -> String {
    format!("%{needle}%")
}
