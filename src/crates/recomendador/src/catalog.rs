//! Book catalog boundary and its tool bindings.
//!
//! [`BookCatalog`] is the read-only search backend. [`catalog_tools`] wraps
//! a catalog into the two tools the model may call: keyword/genre/author
//! search and detail lookup by id. Backend failures never raise out of a
//! tool; they surface as `error` / `not_found` markers in the tool result so
//! the model can read them.

use async_trait::async_trait;
use dialogue_graph::{Tool, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Name of the search tool.
pub const SEARCH_BOOKS: &str = "search_books";

/// Name of the detail-lookup tool.
pub const GET_BOOK_DETAILS: &str = "get_book_details";

/// Maximum records a search returns.
const SEARCH_LIMIT: usize = 5;

/// Catalog backend failure.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// A full catalog entry, as returned by detail lookup.
#[derive(Debug, Clone)]
pub struct BookDetails {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub average_rating: Option<f64>,
    pub cover_image_url: Option<String>,
    pub isbn: Option<String>,
}

impl BookDetails {
    fn summary_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "author": self.author,
            "genre": self.genre.as_deref().unwrap_or("N/A"),
            "average_rating": self.average_rating.map(round1),
        })
    }

    fn details_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "author": self.author,
            "genre": self.genre.as_deref().unwrap_or("N/A"),
            "description": self.description.as_deref().unwrap_or("N/A"),
            "average_rating": self.average_rating.map(round1),
            "cover_image_url": self.cover_image_url,
            "isbn": self.isbn,
        })
    }
}

fn round1(rating: f64) -> f64 {
    (rating * 10.0).round() / 10.0
}

/// Read-only book search backend.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// Search by keyword (title or description), genre, and/or author.
    /// Matching is case-insensitive substring; at least one criterion is
    /// guaranteed non-empty by the caller.
    async fn search(
        &self,
        query: Option<&str>,
        genre: Option<&str>,
        author: Option<&str>,
        limit: usize,
    ) -> Result<Vec<BookDetails>, CatalogError>;

    /// Fetch one book by id. `Ok(None)` means the id does not exist.
    async fn get_by_id(&self, book_id: i64) -> Result<Option<BookDetails>, CatalogError>;
}

/// In-memory catalog backed by a fixed list of books.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    books: Vec<BookDetails>,
}

impl MemoryCatalog {
    /// Build a catalog over the given books.
    pub fn new(books: Vec<BookDetails>) -> Self {
        Self { books }
    }

    /// A small Spanish-language sample catalog, for demos and tests.
    pub fn with_sample_books() -> Self {
        let book = |id: i64, title: &str, author: &str, genre: &str, rating: f64| BookDetails {
            id,
            title: title.to_string(),
            author: author.to_string(),
            genre: Some(genre.to_string()),
            description: None,
            average_rating: Some(rating),
            cover_image_url: None,
            isbn: None,
        };

        Self::new(vec![
            book(1, "Dune", "Frank Herbert", "Ciencia Ficción", 4.5),
            book(2, "El nombre del viento", "Patrick Rothfuss", "Fantasía", 4.6),
            book(3, "Mistborn", "Brandon Sanderson", "Fantasía", 4.4),
            book(4, "Fundación", "Isaac Asimov", "Ciencia Ficción", 4.3),
            book(5, "It", "Stephen King", "Terror", 4.1),
            book(6, "Cien años de soledad", "Gabriel García Márquez", "Realismo Mágico", 4.7),
        ])
    }
}

#[async_trait]
impl BookCatalog for MemoryCatalog {
    async fn search(
        &self,
        query: Option<&str>,
        genre: Option<&str>,
        author: Option<&str>,
        limit: usize,
    ) -> Result<Vec<BookDetails>, CatalogError> {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };

        let matches = self
            .books
            .iter()
            .filter(|book| {
                let query_ok = query.map_or(true, |q| {
                    contains(&book.title, q)
                        || book
                            .description
                            .as_deref()
                            .map_or(false, |d| contains(d, q))
                });
                let genre_ok = genre.map_or(true, |g| {
                    book.genre.as_deref().map_or(false, |bg| contains(bg, g))
                });
                let author_ok = author.map_or(true, |a| contains(&book.author, a));
                query_ok && genre_ok && author_ok
            })
            .take(limit)
            .cloned()
            .collect();

        Ok(matches)
    }

    async fn get_by_id(&self, book_id: i64) -> Result<Option<BookDetails>, CatalogError> {
        Ok(self.books.iter().find(|b| b.id == book_id).cloned())
    }
}

fn arg_str(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build the tool registry exposing a catalog to the model.
pub fn catalog_tools(catalog: Arc<dyn BookCatalog>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    let search_catalog = Arc::clone(&catalog);
    registry.register(Tool::new(
        SEARCH_BOOKS,
        "Busca libros en el catálogo según palabras clave (en título o descripción), género o \
         autor. Devuelve hasta 5 resultados con id, título, autor, género y average_rating. Se \
         debe proporcionar al menos un parámetro.",
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Palabras clave para buscar en título o descripción."},
                "genre": {"type": "string", "description": "Género del libro."},
                "author": {"type": "string", "description": "Autor del libro."}
            }
        }),
        move |args| {
            let catalog = Arc::clone(&search_catalog);
            Box::pin(async move {
                let query = arg_str(&args, "query");
                let genre = arg_str(&args, "genre");
                let author = arg_str(&args, "author");

                if query.is_none() && genre.is_none() && author.is_none() {
                    return Ok(json!([{
                        "error": "Please provide at least one search parameter (query, genre, or author)."
                    }]));
                }

                info!(?query, ?genre, ?author, "searching catalog");
                match catalog
                    .search(
                        query.as_deref(),
                        genre.as_deref(),
                        author.as_deref(),
                        SEARCH_LIMIT,
                    )
                    .await
                {
                    Ok(books) => {
                        let records: Vec<Value> =
                            books.iter().map(BookDetails::summary_json).collect();
                        Ok(Value::Array(records))
                    }
                    Err(e) => Ok(json!([{ "error": format!("Book search failed: {e}") }])),
                }
            })
        },
    ));

    let details_catalog = Arc::clone(&catalog);
    registry.register(Tool::new(
        GET_BOOK_DETAILS,
        "Recupera información detallada de un libro dado su ID único: id, título, autor, género, \
         descripción, average_rating, URL de portada e ISBN.",
        json!({
            "type": "object",
            "properties": {
                "book_id": {"type": "integer", "description": "ID único del libro."}
            },
            "required": ["book_id"]
        }),
        move |args| {
            let catalog = Arc::clone(&details_catalog);
            Box::pin(async move {
                let Some(book_id) = args.get("book_id").and_then(Value::as_i64) else {
                    return Ok(json!({
                        "error": "Invalid book_id provided. It must be a positive integer."
                    }));
                };
                if book_id <= 0 {
                    return Ok(json!({
                        "error": "Invalid book_id provided. It must be a positive integer."
                    }));
                }

                info!(book_id, "fetching book details");
                match catalog.get_by_id(book_id).await {
                    Ok(Some(book)) => Ok(book.details_json()),
                    Ok(None) => Ok(json!({
                        "not_found": format!("Book with id {book_id} not found.")
                    })),
                    Err(e) => Ok(json!({
                        "error": format!("Failed to get details for book {book_id}: {e}")
                    })),
                }
            })
        },
    ));

    registry
}
