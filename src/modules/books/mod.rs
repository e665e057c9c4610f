pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use sqlx::SqlitePool;

use bookstock_kernel::{InitCtx, Migration, Module};

/// Book inventory module: CRUD, search, and stock tracking.
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, db: &SqlitePool) -> Router {
        routes::router(db)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "responses": {
                            "201": { "description": "Created" },
                            "400": { "description": "Invalid input" },
                            "409": { "description": "Duplicate isbn" }
                        }
                    },
                    "get": {
                        "summary": "List all books",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Book list" }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Fetch one book",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Book" },
                            "404": { "description": "Not found" }
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Updated book" },
                            "400": { "description": "Invalid input" },
                            "404": { "description": "Not found" }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Deleted" },
                            "404": { "description": "Not found" }
                        }
                    }
                },
                "/search": {
                    "get": {
                        "summary": "Keyword search with paging",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Page of books" }
                        }
                    }
                },
                "/search/advanced": {
                    "get": {
                        "summary": "Dynamic filter on title/author/category",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Page of books" }
                        }
                    }
                },
                "/in-stock": {
                    "get": {
                        "summary": "Books with stock available",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Book list" }
                        }
                    }
                },
                "/{id}/stock/increase": {
                    "post": {
                        "summary": "Increase stock quantity",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Updated book" },
                            "404": { "description": "Not found" }
                        }
                    }
                },
                "/{id}/stock/decrease": {
                    "post": {
                        "summary": "Decrease stock quantity",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Updated book" },
                            "400": { "description": "Insufficient stock" },
                            "404": { "description": "Not found" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string", "maxLength": 200 },
                            "author": { "type": "string", "maxLength": 100 },
                            "category": { "type": "string", "maxLength": 50 },
                            "publisher": { "type": "string", "maxLength": 100 },
                            "isbn": { "type": "string", "pattern": "^\\d{13}$" },
                            "price": { "type": "integer", "minimum": 0 },
                            "stockQuantity": { "type": "integer", "minimum": 0 },
                            "description": { "type": "string" },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "author", "category", "price", "stockQuantity"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    book_id        INTEGER PRIMARY KEY AUTOINCREMENT,
                    title          TEXT    NOT NULL,
                    author         TEXT    NOT NULL,
                    category       TEXT    NOT NULL,
                    publisher      TEXT,
                    isbn           TEXT    UNIQUE,
                    price          INTEGER NOT NULL,
                    stock_quantity INTEGER NOT NULL,
                    description    TEXT,
                    created_at     TEXT    NOT NULL,
                    updated_at     TEXT    NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_books_category ON books (category);
                CREATE INDEX IF NOT EXISTS idx_books_created_at ON books (created_at);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
