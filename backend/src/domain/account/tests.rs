//! Validation order and normalisation of creation requests.

use super::*;
use rstest::rstest;

fn submission(email: Option<&str>) -> AccountSubmission {
    AccountSubmission {
        email: email.map(str::to_owned),
        ..AccountSubmission::default()
    }
}

fn with_post(mut base: AccountSubmission, title: Option<&str>) -> AccountSubmission {
    base.post = Some(PostSubmission {
        title: title.map(str::to_owned),
        ..PostSubmission::default()
    });
    base
}

#[rstest]
#[case::missing(None)]
#[case::empty(Some(""))]
#[case::whitespace(Some("   \t"))]
fn blank_email_is_required(#[case] email: Option<&str>) {
    let result = NewAccount::try_from(submission(email));
    assert_eq!(result, Err(AccountValidationError::EmailRequired));
}

#[rstest]
#[case("plainaddress")]
#[case("a@b")]
#[case("a b@c.d")]
#[case("a@@b.co")]
#[case("@b.co")]
#[case("a@.")]
fn malformed_email_is_rejected(#[case] email: &str) {
    let result = NewAccount::try_from(submission(Some(email)));
    assert_eq!(result, Err(AccountValidationError::InvalidEmail));
}

#[rstest]
#[case("a@b.co")]
#[case("first.last+tag@sub.example.org")]
#[case("  padded@example.com  ")]
fn well_formed_email_is_accepted(#[case] email: &str) {
    let account = NewAccount::try_from(submission(Some(email))).expect("valid");
    assert_eq!(account.user.email.as_ref(), email.trim());
}

#[rstest]
#[case::missing(None)]
#[case::blank(Some("  "))]
fn post_without_title_is_rejected(#[case] title: Option<&str>) {
    let result = NewAccount::try_from(with_post(submission(Some("a@b.co")), title));
    assert_eq!(result, Err(AccountValidationError::PostTitleRequired));
}

#[rstest]
fn email_check_runs_before_title_check() {
    let result = NewAccount::try_from(with_post(submission(Some("nope")), None));
    assert_eq!(result, Err(AccountValidationError::InvalidEmail));
}

#[rstest]
fn values_are_trimmed_and_blanks_become_absent() {
    let request = AccountSubmission {
        email: Some(" a@b.co ".to_owned()),
        name: Some("  Bob  ".to_owned()),
        post: Some(PostSubmission {
            title: Some(" Hi ".to_owned()),
            content: Some("   ".to_owned()),
            published: true,
        }),
    };

    let account = NewAccount::try_from(request).expect("valid");

    assert_eq!(account.user.email.as_ref(), "a@b.co");
    assert_eq!(account.user.name.as_deref(), Some("Bob"));
    let post = account.post.expect("post requested");
    assert_eq!(post.title.as_ref(), "Hi");
    assert_eq!(post.content, None);
    assert!(post.published);
}

#[rstest]
fn blank_name_becomes_absent() {
    let mut request = submission(Some("a@b.co"));
    request.name = Some("   ".to_owned());
    let account = NewAccount::try_from(request).expect("valid");
    assert!(account.user.name.is_none());
    assert!(account.post.is_none());
}

#[rstest]
#[case(AccountValidationError::EmailRequired, "email", "Email is required")]
#[case(AccountValidationError::InvalidEmail, "email", "Invalid email format")]
#[case(
    AccountValidationError::PostTitleRequired,
    "post.title",
    "Post title is required"
)]
fn errors_name_their_field(
    #[case] error: AccountValidationError,
    #[case] field: &str,
    #[case] message: &str,
) {
    assert_eq!(error.field(), field);
    assert_eq!(error.to_string(), message);
}

#[rstest]
fn display_label_prefers_name() {
    let mut user = UserWithPosts {
        id: UserId::new(1),
        email: "a@b.co".to_owned(),
        name: Some("Ada".to_owned()),
        posts: Vec::new(),
    };
    assert_eq!(user.display_label(), "Ada");
    user.name = None;
    assert_eq!(user.display_label(), "a@b.co");
}

#[rstest]
fn post_serialises_author_in_camel_case() {
    let post = Post {
        id: PostId::new(7),
        title: "Hi".to_owned(),
        content: None,
        published: true,
        author_id: UserId::new(3),
    };
    let value = serde_json::to_value(post).expect("serialise");
    assert_eq!(
        value,
        serde_json::json!({
            "id": 7,
            "title": "Hi",
            "content": null,
            "published": true,
            "authorId": 3,
        })
    );
}
