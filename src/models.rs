mod author;
mod book;

pub use author::{
    Author, AuthorName, AuthorNameError, CreateAuthorError, CreateAuthorRequest,
    DeleteAuthorError, DeleteAuthorRequest, EmailAddress, EmailAddressError,
    FindAllAuthorsError, FindAuthorError, FindAuthorRequest, PICTURE_UPLOAD_DIR, PhoneNumber,
    PhoneNumberError, PicturePath, PicturePathError,
};
pub use book::{
    Book, BookTitle, BookTitleError, CreateBookError, CreateBookRequest, FindAllBooksError,
    Price, PriceError,
};
