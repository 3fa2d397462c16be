use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;
use thiserror::Error;

const AUTHOR_NAME_MAX_LEN: usize = 255;
const EMAIL_ADDRESS_MAX_LEN: usize = 254;
const EMAIL_DOMAIN_ALLOWLIST: [&str; 1] = ["localhost"];
const PHONE_NUMBER_MAX_LEN: usize = 20;
const PICTURE_PATH_MAX_LEN: usize = 100;

/// Directory under the media root where author pictures are uploaded.
pub const PICTURE_UPLOAD_DIR: &str = "authors";

const PICTURE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(raw: &str) -> Result<Self, AuthorNameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AuthorNameError::Empty);
        }
        let len = trimmed.chars().count();
        if len > AUTHOR_NAME_MAX_LEN {
            return Err(AuthorNameError::TooLong { len });
        }
        Ok(Self(trimmed.into()))
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for AuthorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorNameError {
    #[error("Author name cannot be empty")]
    Empty,
    #[error("Author name must be at most {max} characters, got {len}", max = AUTHOR_NAME_MAX_LEN)]
    TooLong { len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(raw: &str) -> Result<Self, EmailAddressError> {
        let trimmed = raw.trim();
        if Self::is_valid(trimmed) {
            Ok(Self(trimmed.into()))
        } else {
            Err(EmailAddressError(trimmed.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    fn is_valid(s: &str) -> bool {
        static USER_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(concat!(
                r"^(?:[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
                r#"|"(?:[\x01-\x08\x0B\x0C\x0E-\x21#-\[\]-\x7F]|\\[\x01-\x09\x0B\x0C\x0E-\x7F])*")$"#,
            ))
            .expect("email user pattern is valid")
        });
        static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9][A-Za-z0-9-]{0,61}[A-Za-z0-9]$")
                .expect("email domain pattern is valid")
        });

        if s.len() > EMAIL_ADDRESS_MAX_LEN {
            return false;
        }
        let Some((user, domain)) = s.rsplit_once('@') else {
            return false;
        };
        if !USER_RE.is_match(user) {
            return false;
        }

        if EMAIL_DOMAIN_ALLOWLIST.contains(&domain) || DOMAIN_RE.is_match(domain) {
            return true;
        }
        // Address literal, e.g. `[127.0.0.1]` or `[IPv6:::1]`.
        domain
            .strip_prefix('[')
            .and_then(|literal| literal.strip_suffix(']'))
            .map(|literal| literal.strip_prefix("IPv6:").unwrap_or(literal))
            .is_some_and(|ip| ip.parse::<IpAddr>().is_ok())
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0} is not a valid email address")]
pub struct EmailAddressError(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: &str) -> Result<Self, PhoneNumberError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PhoneNumberError::Empty);
        }
        let len = trimmed.chars().count();
        if len > PHONE_NUMBER_MAX_LEN {
            return Err(PhoneNumberError::TooLong { len });
        }
        Ok(Self(trimmed.into()))
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("Phone number cannot be empty")]
    Empty,
    #[error("Phone number must be at most {max} characters, got {len}", max = PHONE_NUMBER_MAX_LEN)]
    TooLong { len: usize },
}

/// Stored location of an author's uploaded picture, relative to the media
/// root. Always of the form `authors/<file name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicturePath(String);

impl PicturePath {
    /// Builds the stored path for an uploaded file called `file_name`.
    pub fn new(file_name: &str) -> Result<Self, PicturePathError> {
        let file_name = file_name.trim();
        if file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains(['/', '\\'])
        {
            return Err(PicturePathError::InvalidFileName(file_name.into()));
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !PICTURE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(PicturePathError::UnsupportedExtension(extension));
        }

        let path = format!("{PICTURE_UPLOAD_DIR}/{file_name}");
        let len = path.chars().count();
        if len > PICTURE_PATH_MAX_LEN {
            return Err(PicturePathError::TooLong { len });
        }

        Ok(Self(path))
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl std::fmt::Display for PicturePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PicturePathError {
    #[error("\"{0}\" is not a valid picture file name")]
    InvalidFileName(String),
    #[error("Picture extension \"{0}\" is not supported")]
    UnsupportedExtension(String),
    #[error("Picture path must be at most {max} characters, got {len}", max = PICTURE_PATH_MAX_LEN)]
    TooLong { len: usize },
}

#[derive(Debug, Clone)]
pub struct Author {
    id: i64,
    name: AuthorName,
    email: EmailAddress,
    phone: PhoneNumber,
    picture: PicturePath,
}

impl Author {
    pub const fn new(
        id: i64,
        name: AuthorName,
        email: EmailAddress,
        phone: PhoneNumber,
        picture: PicturePath,
    ) -> Self {
        Self {
            id,
            name,
            email,
            phone,
            picture,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }

    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub const fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub const fn picture(&self) -> &PicturePath {
        &self.picture
    }
}

#[derive(Debug)]
pub struct CreateAuthorRequest {
    name: AuthorName,
    email: EmailAddress,
    phone: PhoneNumber,
    picture: PicturePath,
}

impl CreateAuthorRequest {
    pub const fn new(
        name: AuthorName,
        email: EmailAddress,
        phone: PhoneNumber,
        picture: PicturePath,
    ) -> Self {
        Self {
            name,
            email,
            phone,
            picture,
        }
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }

    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub const fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub const fn picture(&self) -> &PicturePath {
        &self.picture
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct CreateAuthorError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct FindAuthorRequest {
    id: i64,
}

impl FindAuthorRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum FindAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAllAuthorsError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct DeleteAuthorRequest {
    id: i64,
}

impl DeleteAuthorRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

/// Deleting an author also deletes every book written by them.
#[derive(Error, Debug)]
pub enum DeleteAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_name_is_trimmed() {
        let name = AuthorName::new("  Jane Doe ").unwrap();
        assert_eq!(name.to_string(), "Jane Doe");
    }

    #[test]
    fn author_name_rejects_blank() {
        assert_eq!(AuthorName::new("   "), Err(AuthorNameError::Empty));
    }

    #[test]
    fn author_name_length_is_bounded() {
        assert!(AuthorName::new(&"a".repeat(255)).is_ok());
        assert_eq!(
            AuthorName::new(&"a".repeat(256)),
            Err(AuthorNameError::TooLong { len: 256 })
        );
    }

    #[test]
    fn author_name_counts_characters_not_bytes() {
        assert!(AuthorName::new(&"é".repeat(255)).is_ok());
    }

    #[test]
    fn accepts_valid_email_addresses() {
        for raw in [
            "jane@example.com",
            "jane.doe+books@mail.example.co.uk",
            "o'brien@example-press.org",
            "jane@example.xn--p1ai",
            "jane@[127.0.0.1]",
            "jane@[IPv6:::1]",
            "\"jane doe\"@example.com",
            "\"jane@home\"@example.com",
            "jane@localhost",
            "jane@example.museum",
        ] {
            assert!(EmailAddress::new(raw).is_ok(), "{raw} should be valid");
        }
    }

    #[test]
    fn rejects_invalid_email_addresses() {
        for raw in [
            "",
            "jane",
            "jane@",
            "@example.com",
            "jane@example",
            "jane..doe@example.com",
            "jane@-example.com",
            "jane@example.com-",
            "jane@example.c",
            "jane@[not-an-ip]",
            "jane@127.0.0.1]",
            "\"unterminated@example.com",
            "jane doe@example.com",
        ] {
            assert!(EmailAddress::new(raw).is_err(), "{raw} should be invalid");
        }
    }

    #[test]
    fn phone_number_rejects_blank() {
        assert_eq!(PhoneNumber::new(""), Err(PhoneNumberError::Empty));
        assert_eq!(PhoneNumber::new("   "), Err(PhoneNumberError::Empty));
    }

    #[test]
    fn phone_number_length_is_bounded() {
        assert!(PhoneNumber::new("555-0100").is_ok());
        assert!(PhoneNumber::new(&"1".repeat(20)).is_ok());
        assert_eq!(
            PhoneNumber::new(&"1".repeat(21)),
            Err(PhoneNumberError::TooLong { len: 21 })
        );
    }

    #[test]
    fn picture_is_stored_under_authors() {
        let picture = PicturePath::new("jane.png").unwrap();
        assert_eq!(picture.to_string(), "authors/jane.png");
        assert_eq!(picture.file_name(), "jane.png");
    }

    #[test]
    fn picture_extension_is_case_insensitive() {
        assert!(PicturePath::new("portrait.JPEG").is_ok());
    }

    #[test]
    fn picture_rejects_paths() {
        for raw in ["", ".", "..", "../secret.png", "nested/jane.png", r"c:\jane.png"] {
            assert!(
                matches!(
                    PicturePath::new(raw),
                    Err(PicturePathError::InvalidFileName(_))
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn picture_rejects_non_images() {
        assert_eq!(
            PicturePath::new("resume.pdf"),
            Err(PicturePathError::UnsupportedExtension("pdf".into()))
        );
        assert_eq!(
            PicturePath::new("noextension"),
            Err(PicturePathError::UnsupportedExtension(String::new()))
        );
    }

    #[test]
    fn picture_path_length_is_bounded() {
        // "authors/" + 88 + ".png" == 100
        assert!(PicturePath::new(&format!("{}.png", "a".repeat(88))).is_ok());
        assert_eq!(
            PicturePath::new(&format!("{}.png", "a".repeat(89))),
            Err(PicturePathError::TooLong { len: 101 })
        );
    }
}
