use rust_decimal::Decimal;
use thiserror::Error;

const BOOK_TITLE_MAX_LEN: usize = 255;
const PRICE_MAX_DIGITS: u32 = 10;
const PRICE_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(raw: &str) -> Result<Self, BookTitleError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BookTitleError::Empty);
        }
        let len = trimmed.chars().count();
        if len > BOOK_TITLE_MAX_LEN {
            return Err(BookTitleError::TooLong { len });
        }
        Ok(Self(trimmed.into()))
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for BookTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookTitleError {
    #[error("Book title cannot be empty")]
    Empty,
    #[error("Book title must be at most {max} characters, got {len}", max = BOOK_TITLE_MAX_LEN)]
    TooLong { len: usize },
}

/// A fixed-point price with exactly two decimal places and at most ten
/// digits in total. Held as a whole number of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price {
    cents: i64,
}

impl Price {
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        let scale = amount.normalize().scale();
        if scale > PRICE_DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces { scale });
        }

        let mut amount = amount;
        amount.rescale(PRICE_DECIMAL_PLACES);
        let limit = 10_i128.pow(PRICE_MAX_DIGITS);
        let cents = amount.mantissa();
        if cents.abs() >= limit {
            return Err(PriceError::TooManyDigits);
        }

        let cents = i64::try_from(cents).map_err(|_| PriceError::TooManyDigits)?;
        Ok(Self { cents })
    }

    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub const fn cents(&self) -> i64 {
        self.cents
    }

    pub fn amount(&self) -> Decimal {
        Decimal::new(self.cents, PRICE_DECIMAL_PLACES)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.amount())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("Price must have at most {max} decimal places, got {scale}", max = PRICE_DECIMAL_PLACES)]
    TooManyDecimalPlaces { scale: u32 },
    #[error("Price must have at most {max} digits in total", max = PRICE_MAX_DIGITS)]
    TooManyDigits,
}

#[derive(Debug, Clone)]
pub struct Book {
    id: i64,
    title: BookTitle,
    author_id: i64,
    description: String,
    price: Price,
    is_published: bool,
}

impl Book {
    pub const fn new(
        id: i64,
        title: BookTitle,
        author_id: i64,
        description: String,
        price: Price,
        is_published: bool,
    ) -> Self {
        Self {
            id,
            title,
            author_id,
            description,
            price,
            is_published,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn author_id(&self) -> i64 {
        self.author_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn price(&self) -> Price {
        self.price
    }

    pub const fn is_published(&self) -> bool {
        self.is_published
    }
}

/// New books are unpublished unless [`CreateBookRequest::set_published`] is
/// called.
#[derive(Debug)]
pub struct CreateBookRequest {
    title: BookTitle,
    author_id: i64,
    description: String,
    price: Price,
    is_published: bool,
}

impl CreateBookRequest {
    pub const fn new(title: BookTitle, author_id: i64, description: String, price: Price) -> Self {
        Self {
            title,
            author_id,
            description,
            price,
            is_published: false,
        }
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn author_id(&self) -> i64 {
        self.author_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn price(&self) -> Price {
        self.price
    }

    pub const fn is_published(&self) -> bool {
        self.is_published
    }

    pub fn set_published(&mut self, is_published: bool) {
        self.is_published = is_published;
    }
}

#[derive(Error, Debug)]
pub enum CreateBookError {
    #[error("Author with id \"{author_id}\" does not exist")]
    AuthorNotFound { author_id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAllBooksError(#[from] pub anyhow::Error);
