//! Account records: users, their posts, and the creation request shape.
//!
//! A creation request arrives as an [`AccountSubmission`] whose fields are
//! still loosely typed. [`NewAccount::try_from`] applies the validation
//! sequence and yields trimmed, typed values ready for persistence.
//!
//! Validation is fail fast; the first failing check wins:
//! 1. email present and non-blank,
//! 2. email shaped like `local@domain.tld`,
//! 3. when a post is supplied, its title present and non-blank.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation failures raised while building a [`NewAccount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    /// `email` was missing, not a string, or blank.
    #[error("Email is required")]
    EmailRequired,
    /// The trimmed email did not look like `local@domain.tld`.
    #[error("Invalid email format")]
    InvalidEmail,
    /// A post was supplied without a usable title.
    #[error("Post title is required")]
    PostTitleRequired,
}

impl AccountValidationError {
    /// Request field the failure refers to.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::EmailRequired | Self::InvalidEmail => "email",
            Self::PostTitleRequired => "post.title",
        }
    }

    /// Stable machine-readable reason.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmailRequired => "missing_email",
            Self::InvalidEmail => "invalid_email",
            Self::PostTitleRequired => "missing_post_title",
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Permissive on purpose: local part, one `@`, a dotted domain.
        Regex::new(r"^[^\s@]+@[^\s@]+\.\S+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn trimmed(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Serial identifier of a stored user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a storage-assigned identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serial identifier of a stored post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PostId(i32);

impl PostId {
    /// Wrap a storage-assigned identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, shape-checked email address. Comparison is case-sensitive.
///
/// # Examples
/// ```
/// use quillboard::domain::EmailAddress;
///
/// let email = EmailAddress::parse(Some("  a@b.co ")).expect("valid email");
/// assert_eq!(email.as_ref(), "a@b.co");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Apply the email checks to raw input.
    ///
    /// # Errors
    /// [`AccountValidationError::EmailRequired`] when `raw` is absent or blank,
    /// [`AccountValidationError::InvalidEmail`] when the trimmed value is not
    /// shaped like `local@domain.tld`.
    pub fn parse(raw: Option<&str>) -> Result<Self, AccountValidationError> {
        let value = trimmed(raw).ok_or(AccountValidationError::EmailRequired)?;
        if !Self::matches_shape(value) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(value.to_owned()))
    }

    /// Whether `candidate` looks like `local@domain.tld`, as given.
    #[must_use]
    pub fn matches_shape(candidate: &str) -> bool {
        email_regex().is_match(candidate)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-blank, trimmed post title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTitle(String);

impl PostTitle {
    /// Trim and check a raw title.
    ///
    /// # Errors
    /// [`AccountValidationError::PostTitleRequired`] when absent or blank.
    pub fn parse(raw: Option<&str>) -> Result<Self, AccountValidationError> {
        trimmed(raw)
            .map(|value| Self(value.to_owned()))
            .ok_or(AccountValidationError::PostTitleRequired)
    }
}

impl AsRef<str> for PostTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Loosely typed post portion of a creation request.
///
/// Fields that were not strings in the original payload arrive as `None`;
/// `published` is already reduced to "was exactly `true`".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostSubmission {
    /// Raw title.
    pub title: Option<String>,
    /// Raw content.
    pub content: Option<String>,
    /// Publish flag.
    pub published: bool,
}

/// Loosely typed creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSubmission {
    /// Raw email.
    pub email: Option<String>,
    /// Raw display name.
    pub name: Option<String>,
    /// Optional first post.
    pub post: Option<PostSubmission>,
}

/// Validated user ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique email.
    pub email: EmailAddress,
    /// Trimmed display name, absent when blank.
    pub name: Option<String>,
}

/// Validated post ready to insert. The author is assigned inside the
/// transaction once the user row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Trimmed title.
    pub title: PostTitle,
    /// Trimmed content, absent when blank.
    pub content: Option<String>,
    /// Publish flag.
    pub published: bool,
}

/// A user and optional first post that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// The user to create.
    pub user: NewUser,
    /// The post to create alongside the user.
    pub post: Option<NewPost>,
}

impl TryFrom<AccountSubmission> for NewAccount {
    type Error = AccountValidationError;

    fn try_from(value: AccountSubmission) -> Result<Self, Self::Error> {
        let AccountSubmission { email, name, post } = value;
        let email = EmailAddress::parse(email.as_deref())?;
        let post = post
            .map(|post| -> Result<NewPost, AccountValidationError> {
                Ok(NewPost {
                    title: PostTitle::parse(post.title.as_deref())?,
                    content: trimmed(post.content.as_deref()).map(str::to_owned),
                    published: post.published,
                })
            })
            .transpose()?;
        Ok(Self {
            user: NewUser {
                email,
                name: trimmed(name.as_deref()).map(str::to_owned),
            },
            post,
        })
    }
}

/// Stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Serial identifier.
    #[schema(value_type = i32, example = 1)]
    pub id: UserId,
    /// Unique email.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Optional display name.
    #[schema(example = "Ada")]
    pub name: Option<String>,
}

/// Stored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Serial identifier.
    #[schema(value_type = i32, example = 1)]
    pub id: PostId,
    /// Title.
    pub title: String,
    /// Optional body.
    pub content: Option<String>,
    /// Whether the post is published.
    pub published: bool,
    /// Owning user.
    #[schema(value_type = i32, example = 1)]
    pub author_id: UserId,
}

/// A user together with every post they own, in storage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserWithPosts {
    /// Serial identifier.
    #[schema(value_type = i32, example = 1)]
    pub id: UserId,
    /// Unique email.
    pub email: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Owned posts.
    pub posts: Vec<Post>,
}

impl UserWithPosts {
    /// Label used in summaries: the name when set, otherwise the email.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.email.as_str())
    }
}

/// The records written by one successful creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedAccount {
    /// The new user.
    pub user: User,
    /// The new post, or `null` when none was requested.
    pub post: Option<Post>,
}

#[cfg(test)]
mod tests;
