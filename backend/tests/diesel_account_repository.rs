//! `DieselAccountRepository` against embedded PostgreSQL: transaction
//! boundaries, constraint mapping and the nested listing.

use std::sync::Arc;

use pg_embedded_setup_unpriv::TestCluster;
use quillboard::domain::ports::{AccountPersistenceError, AccountRepository};
use quillboard::domain::{
    AccountCreationError, AccountService, AccountSubmission, EmailAddress, NewPost, NewUser,
    PostSubmission, PostTitle, UserId,
};
use quillboard::outbound::persistence::{
    DbPool, DieselAccountRepository, PoolConfig, run_pending_migrations,
};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, test_cluster};

struct TestContext {
    runtime: Runtime,
    repository: DieselAccountRepository,
    _cluster: TestCluster,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database_url = cluster.connection().database_url("postgres");

    let pool = runtime.block_on(async {
        run_pending_migrations(&database_url)
            .await
            .map_err(|err| err.to_string())?;
        DbPool::new(PoolConfig::new(&database_url).with_max_size(3))
            .await
            .map_err(|err| err.to_string())
    })?;

    Ok(TestContext {
        runtime,
        repository: DieselAccountRepository::new(pool),
        _cluster: cluster,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: EmailAddress::parse(Some(email)).expect("valid email"),
        name: Some("Ada".to_owned()),
    }
}

fn new_post(title: &str) -> NewPost {
    NewPost {
        title: PostTitle::parse(Some(title)).expect("valid title"),
        content: None,
        published: false,
    }
}

fn email(raw: &str) -> EmailAddress {
    EmailAddress::parse(Some(raw)).expect("valid email")
}

#[rstest]
fn committed_user_and_post_are_listed_together(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: committed_user_and_post_are_listed_together skipped");
        return;
    };
    let repository = context.repository.clone();

    let listed = context.runtime.block_on(async {
        let mut tx = repository.begin().await.expect("begin");
        let user = tx.create_user(&new_user("ada@example.com")).await.expect("user");
        let post = tx.create_post(user.id, &new_post("Notes")).await.expect("post");
        assert_eq!(post.author_id, user.id);
        tx.commit().await.expect("commit");
        repository.list_users_with_posts().await.expect("listing")
    });

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].email, "ada@example.com");
    assert_eq!(listed[0].name.as_deref(), Some("Ada"));
    assert_eq!(listed[0].posts.len(), 1);
    assert_eq!(listed[0].posts[0].title, "Notes");
    assert!(!listed[0].posts[0].published);
}

#[rstest]
fn duplicate_email_maps_to_unique_violation(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_email_maps_to_unique_violation skipped");
        return;
    };
    let repository = context.repository.clone();

    let outcome = context.runtime.block_on(async {
        let mut first = repository.begin().await.expect("begin");
        first.create_user(&new_user("dup@example.com")).await.expect("user");
        first.commit().await.expect("commit");

        let mut second = repository.begin().await.expect("begin");
        let outcome = second.create_user(&new_user("dup@example.com")).await;
        second.rollback().await.expect("rollback");
        outcome
    });

    match outcome {
        Err(AccountPersistenceError::UniqueViolation { message }) => {
            assert_eq!(message, "users_email_key");
        }
        other => panic!("expected a unique violation, got {other:?}"),
    }
}

#[rstest]
fn failed_post_insert_rolls_back_the_user(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: failed_post_insert_rolls_back_the_user skipped");
        return;
    };
    let repository = context.repository.clone();

    let (post_outcome, found, listed) = context.runtime.block_on(async {
        let mut tx = repository.begin().await.expect("begin");
        tx.create_user(&new_user("orphan@example.com")).await.expect("user");
        // No such author: the foreign key rejects the row.
        let post_outcome = tx.create_post(UserId::new(i32::MAX), &new_post("Lost")).await;
        tx.rollback().await.expect("rollback");
        let found = repository
            .find_user_by_email(&email("orphan@example.com"))
            .await
            .expect("lookup");
        let listed = repository.list_users_with_posts().await.expect("listing");
        (post_outcome, found, listed)
    });

    assert!(matches!(post_outcome, Err(AccountPersistenceError::Query { .. })));
    assert!(found.is_none());
    assert!(listed.is_empty());
}

#[rstest]
fn dropped_transaction_leaves_no_rows(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: dropped_transaction_leaves_no_rows skipped");
        return;
    };
    let repository = context.repository.clone();

    let listed = context.runtime.block_on(async {
        {
            let mut tx = repository.begin().await.expect("begin");
            let user = tx.create_user(&new_user("gone@example.com")).await.expect("user");
            tx.create_post(user.id, &new_post("Draft")).await.expect("post");
        }

        // Waits on the abandoned row's lock until the background rollback
        // releases it, then succeeds because nothing was committed.
        let mut tx = repository.begin().await.expect("begin");
        tx.create_user(&new_user("gone@example.com"))
            .await
            .expect("email is free again");
        tx.commit().await.expect("commit");
        repository.list_users_with_posts().await.expect("listing")
    });

    assert_eq!(listed.len(), 1);
    assert!(listed[0].posts.is_empty());
}

#[rstest]
fn service_reports_duplicates_as_conflicts(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: service_reports_duplicates_as_conflicts skipped");
        return;
    };
    let service = AccountService::new(Arc::new(context.repository.clone()));
    let submission = AccountSubmission {
        email: Some(" svc@example.com ".to_owned()),
        name: None,
        post: Some(PostSubmission {
            title: Some("First".to_owned()),
            ..PostSubmission::default()
        }),
    };

    let (first, second, listed) = context.runtime.block_on(async {
        let first = service.create(submission.clone()).await;
        let second = service.create(submission).await;
        let listed = context
            .repository
            .list_users_with_posts()
            .await
            .expect("listing");
        (first, second, listed)
    });

    let created = first.expect("first submission is created");
    assert_eq!(created.user.email, "svc@example.com");
    assert!(matches!(second, Err(AccountCreationError::Conflict { .. })));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].posts.len(), 1);
}
