use crate::models::{
    Author, Book, CreateAuthorError, CreateAuthorRequest, CreateBookError, CreateBookRequest,
    DeleteAuthorError, DeleteAuthorRequest, FindAllAuthorsError, FindAllBooksError,
    FindAuthorError, FindAuthorRequest,
};
use async_trait::async_trait;

#[async_trait]
pub trait AuthorRepository: Send + Sync + 'static {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Result<Author, CreateAuthorError>;

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError>;

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError>;

    /// Removes the author together with every book that references them.
    async fn delete_author(&self, req: &DeleteAuthorRequest) -> Result<(), DeleteAuthorError>;
}

#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError>;

    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError>;
}
