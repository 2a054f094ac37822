//! Feed composer behavior over the in-memory store.

mod support;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use support::TestApp;
use vireo::application::feed::{FeedContext, FeedError, FeedScope, Viewer};
use vireo::application::pagination::PageNumber;

fn base_time() -> OffsetDateTime {
    OffsetDateTime::now_utc() - Duration::hours(1)
}

#[tokio::test]
async fn global_feed_orders_newest_first() {
    let app = TestApp::new();
    let author = app.store.add_user("leah");
    let base = base_time();

    app.store
        .add_post_at(&author, "first", None, base);
    app.store
        .add_post_at(&author, "third", None, base + Duration::minutes(10));
    app.store
        .add_post_at(&author, "second", None, base + Duration::minutes(5));

    let feed = app
        .state
        .feed
        .compose(FeedContext::Global, &Viewer::Anonymous, PageNumber::FIRST)
        .await
        .expect("global feed");

    let texts: Vec<&str> = feed.page.items.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["third", "second", "first"]);

    for window in feed.page.items.windows(2) {
        assert!(window[0].created_at >= window[1].created_at);
    }
}

#[tokio::test]
async fn equal_timestamps_keep_insertion_order() {
    let app = TestApp::new();
    let author = app.store.add_user("leah");
    let at = base_time();

    app.store.add_post_at(&author, "earlier insert", None, at);
    app.store.add_post_at(&author, "later insert", None, at);

    let feed = app
        .state
        .feed
        .compose(FeedContext::Global, &Viewer::Anonymous, PageNumber::FIRST)
        .await
        .expect("global feed");

    let texts: Vec<&str> = feed.page.items.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["earlier insert", "later insert"]);
}

#[tokio::test]
async fn thirteen_posts_paginate_ten_then_three() {
    let app = TestApp::new();
    let author = app.store.add_user("leah");
    let base = base_time();

    for n in 0..13i64 {
        app.store.add_post_at(
            &author,
            &format!("post {n}"),
            None,
            base + Duration::minutes(n),
        );
    }

    let page_one = app
        .state
        .feed
        .compose(FeedContext::Global, &Viewer::Anonymous, PageNumber::new(1))
        .await
        .expect("page one");
    assert_eq!(page_one.page.items.len(), 10);
    assert_eq!(page_one.page.total_pages, 2);
    assert!(page_one.page.has_next);

    let page_two = app
        .state
        .feed
        .compose(FeedContext::Global, &Viewer::Anonymous, PageNumber::new(2))
        .await
        .expect("page two");
    assert_eq!(page_two.page.items.len(), 3);

    let clamped = app
        .state
        .feed
        .compose(FeedContext::Global, &Viewer::Anonymous, PageNumber::new(3))
        .await
        .expect("clamped page");
    assert_eq!(clamped.page.number, 2);
    assert_eq!(clamped.page.items, page_two.page.items);
}

#[tokio::test]
async fn group_feed_contains_only_group_posts() {
    let app = TestApp::new();
    let author = app.store.add_user("leah");
    let group = app.store.add_group("Rustaceans", "rustaceans", "crab talk");
    let base = base_time();

    app.store
        .add_post_at(&author, "grouped", Some(&group), base);
    app.store.add_post_at(&author, "ungrouped", None, base);

    let feed = app
        .state
        .feed
        .compose(
            FeedContext::Group {
                slug: "rustaceans".to_string(),
            },
            &Viewer::Anonymous,
            PageNumber::FIRST,
        )
        .await
        .expect("group feed");

    assert_eq!(feed.page.items.len(), 1);
    assert_eq!(feed.page.items[0].text, "grouped");
    match feed.scope {
        FeedScope::Group { group: resolved } => assert_eq!(resolved.slug, "rustaceans"),
        other => panic!("unexpected scope: {other:?}"),
    }
}

#[tokio::test]
async fn unknown_group_slug_is_a_lookup_error() {
    let app = TestApp::new();

    let err = app
        .state
        .feed
        .compose(
            FeedContext::Group {
                slug: "missing".to_string(),
            },
            &Viewer::Anonymous,
            PageNumber::FIRST,
        )
        .await
        .expect_err("unknown slug rejected");

    assert!(matches!(err, FeedError::UnknownGroup));
}

#[tokio::test]
async fn author_feed_reports_viewer_follow_state() {
    let app = TestApp::new();
    let author = app.store.add_user("leah");
    let follower = app.store.add_user("ivan");
    app.store.add_post(&author, "hello", None);

    app.state
        .follows
        .follow(&follower, "leah")
        .await
        .expect("follow");

    let viewed_by_follower = app
        .state
        .feed
        .compose(
            FeedContext::Author {
                username: "leah".to_string(),
            },
            &Viewer::User(follower.clone()),
            PageNumber::FIRST,
        )
        .await
        .expect("author feed");
    match viewed_by_follower.scope {
        FeedScope::Author { is_following, .. } => assert!(is_following),
        other => panic!("unexpected scope: {other:?}"),
    }

    let viewed_anonymously = app
        .state
        .feed
        .compose(
            FeedContext::Author {
                username: "leah".to_string(),
            },
            &Viewer::Anonymous,
            PageNumber::FIRST,
        )
        .await
        .expect("author feed");
    match viewed_anonymously.scope {
        FeedScope::Author { is_following, .. } => assert!(!is_following),
        other => panic!("unexpected scope: {other:?}"),
    }
}

#[tokio::test]
async fn unknown_author_is_a_lookup_error() {
    let app = TestApp::new();

    let err = app
        .state
        .feed
        .compose(
            FeedContext::Author {
                username: "nobody".to_string(),
            },
            &Viewer::Anonymous,
            PageNumber::FIRST,
        )
        .await
        .expect_err("unknown author rejected");

    assert!(matches!(err, FeedError::UnknownAuthor));
}

#[tokio::test]
async fn following_feed_filters_to_followed_authors() {
    let app = TestApp::new();
    let viewer = app.store.add_user("ivan");
    let followed = app.store.add_user("leah");
    let stranger = app.store.add_user("mara");
    let base = base_time();

    app.store.add_post_at(&followed, "from leah", None, base);
    app.store
        .add_post_at(&stranger, "from mara", None, base + Duration::minutes(1));

    app.state
        .follows
        .follow(&viewer, "leah")
        .await
        .expect("follow");

    let feed = app
        .state
        .feed
        .compose(
            FeedContext::Following,
            &Viewer::User(viewer.clone()),
            PageNumber::FIRST,
        )
        .await
        .expect("following feed");

    assert_eq!(feed.page.items.len(), 1);
    assert_eq!(feed.page.items[0].text, "from leah");
}

#[tokio::test]
async fn following_feed_requires_authentication() {
    let app = TestApp::new();

    let err = app
        .state
        .feed
        .compose(FeedContext::Following, &Viewer::Anonymous, PageNumber::FIRST)
        .await
        .expect_err("anonymous rejected");

    assert!(matches!(err, FeedError::AuthRequired));
}

#[tokio::test]
async fn following_feed_is_empty_without_edges() {
    let app = TestApp::new();
    let viewer = app.store.add_user("ivan");
    let other = app.store.add_user("leah");
    app.store.add_post(&other, "unseen", None);

    let feed = app
        .state
        .feed
        .compose(
            FeedContext::Following,
            &Viewer::User(viewer),
            PageNumber::FIRST,
        )
        .await
        .expect("following feed");

    assert!(feed.page.items.is_empty());
    assert_eq!(feed.page.total_pages, 1);
}

#[tokio::test]
async fn post_detail_lists_comments_oldest_first() {
    let app = TestApp::new();
    let author = app.store.add_user("leah");
    let commenter = app.store.add_user("ivan");
    let post = app.store.add_post(&author, "discuss", None);
    let other_post = app.store.add_post(&author, "quiet", None);

    for text in ["first!", "second", "third"] {
        app.state
            .comments
            .add_comment(
                &commenter,
                post.id,
                vireo::application::forms::CommentInput {
                    text: text.to_string(),
                },
            )
            .await
            .expect("comment added");
    }

    let detail = app
        .state
        .feed
        .post_detail(post.id)
        .await
        .expect("detail query")
        .expect("post found");

    let texts: Vec<&str> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["first!", "second", "third"]);
    assert_eq!(detail.author.username, "leah");
    assert_eq!(detail.author_post_count, 2);

    let quiet = app
        .state
        .feed
        .post_detail(other_post.id)
        .await
        .expect("detail query")
        .expect("post found");
    assert!(quiet.comments.is_empty());
}

#[tokio::test]
async fn post_detail_unknown_id_is_none() {
    let app = TestApp::new();
    let detail = app
        .state
        .feed
        .post_detail(Uuid::new_v4())
        .await
        .expect("detail query");
    assert!(detail.is_none());
}
