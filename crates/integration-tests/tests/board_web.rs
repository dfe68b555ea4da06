//! Router-level tests driving the HTTP surface against mock-backed state.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{TimeZone, Utc};
use tower::ServiceExt;

use domains::{
    Article, ArticleDetail, ArticleSummary, BoardError, CommentRecord, Page, Principal,
    SearchFilter, UserAccount,
};
use integration_tests::{test_sessions, TestBoard};

fn summary() -> ArticleSummary {
    ArticleSummary {
        id: 1,
        title: "Rust in production".to_owned(),
        content: "Notes from the first year. #rust".to_owned(),
        user_id: "alice".to_owned(),
        nickname: Some("Alice".to_owned()),
        hashtags: vec!["rust".to_owned()],
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }
}

fn detail() -> ArticleDetail {
    ArticleDetail {
        id: 1,
        title: "Rust in production".to_owned(),
        content: "Notes from the first year. #rust".to_owned(),
        user_id: "alice".to_owned(),
        nickname: Some("Alice".to_owned()),
        email: Some("alice@example.com".to_owned()),
        hashtags: vec!["rust".to_owned()],
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }
}

fn account(user_id: &str) -> UserAccount {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    UserAccount {
        user_id: user_id.to_owned(),
        user_password: "argon2-hash".to_owned(),
        email: None,
        nickname: None,
        memo: None,
        created_at: at,
        created_by: user_id.to_owned(),
        modified_at: at,
        modified_by: user_id.to_owned(),
    }
}

fn article() -> Article {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Article {
        id: 1,
        user_id: "alice".to_owned(),
        title: "Rust in production".to_owned(),
        content: "Notes from the first year. #rust".to_owned(),
        created_at: at,
        created_by: "alice".to_owned(),
        modified_at: at,
        modified_by: "alice".to_owned(),
    }
}

fn comment(id: i64, parent: Option<i64>, content: &str) -> CommentRecord {
    CommentRecord {
        id,
        article_id: 1,
        user_id: "bob".to_owned(),
        nickname: Some("Bob".to_owned()),
        email: None,
        parent_comment_id: parent,
        content: content.to_owned(),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, id as u32).unwrap(),
    }
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn article_list_renders_titles() {
    let mut board = TestBoard::default();
    board
        .articles
        .expect_find_page()
        .returning(|filter, page| {
            assert!(filter.is_none());
            Ok(Page::new(vec![summary()], &page, 1))
        });
    board.articles.expect_count().returning(|| Ok(1));

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(Request::builder().uri("/articles").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Rust in production"));
    assert!(body.contains("#rust"));
}

#[tokio::test]
async fn article_list_passes_the_title_filter_through() {
    let mut board = TestBoard::default();
    board
        .articles
        .expect_find_page()
        .withf(|filter, _| {
            matches!(filter, Some(SearchFilter::TitleContains(kw)) if kw == "rust")
        })
        .returning(|_, page| Ok(Page::new(vec![summary()], &page, 1)));
    board.articles.expect_count().returning(|| Ok(1));

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/articles?searchType=title&searchValue=rust")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_article_detail_is_404() {
    let mut board = TestBoard::default();
    board.articles.expect_find_detail().returning(|_| Ok(None));

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(Request::builder().uri("/articles/77").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_renders_the_reply_thread() {
    let mut board = TestBoard::default();
    board
        .articles
        .expect_find_detail()
        .returning(|_| Ok(Some(detail())));
    board.comments.expect_find_by_article().returning(|_| {
        Ok(vec![
            comment(1, None, "great read"),
            comment(2, Some(1), "agreed, especially the build times"),
        ])
    });

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(Request::builder().uri("/articles/1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("great read"));
    assert!(body.contains("agreed, especially the build times"));
}

#[tokio::test]
async fn anonymous_comment_post_redirects_to_login() {
    let board = TestBoard::default();

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/comments/new")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("articleId=1&parentCommentId=&content=hi"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn session_cookie_authenticates_a_comment_post() {
    let mut board = TestBoard::default();
    board
        .users
        .expect_find_by_id()
        .returning(|id| Ok(Some(account(&id))));
    board
        .articles
        .expect_find_by_id()
        .returning(|_| Ok(Some(article())));
    board
        .comments
        .expect_create()
        .withf(|comment, stamp| {
            comment.article_id == 1
                && comment.user_id == "bob"
                && comment.parent_comment_id.is_none()
                && comment.content == "hi"
                && stamp.by == "bob"
        })
        .returning(|comment, stamp| {
            Ok(domains::ArticleComment {
                id: 10,
                article_id: comment.article_id,
                user_id: comment.user_id,
                parent_comment_id: comment.parent_comment_id,
                content: comment.content,
                created_at: stamp.at,
                created_by: stamp.by.clone(),
                modified_at: stamp.at,
                modified_by: stamp.by,
            })
        });

    let token = test_sessions().issue("bob");
    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/comments/new")
                .header(header::COOKIE, format!("AGORA_SESSION={token}"))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("articleId=1&parentCommentId=&content=hi"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/articles/1");
}

#[tokio::test]
async fn successful_login_sets_the_session_cookie() {
    let mut board = TestBoard::default();
    board
        .credentials
        .expect_authenticate()
        .withf(|username, password| username == "alice" && password == "pw")
        .returning(|username, _| {
            Ok(Principal {
                user_id: username.to_owned(),
                nickname: None,
                email: None,
            })
        });

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=alice&password=pw"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/articles");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("AGORA_SESSION="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn failed_login_bounces_back_with_an_error_flag() {
    let mut board = TestBoard::default();
    board
        .credentials
        .expect_authenticate()
        .returning(|_, _| Err(BoardError::Unauthorized("invalid username or password".into())));

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=alice&password=wrong"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login?error=1");
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn api_lists_articles_as_json() {
    let mut board = TestBoard::default();
    board
        .articles
        .expect_find_page()
        .returning(|_, page| Ok(Page::new(vec![summary()], &page, 1)));

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(Request::builder().uri("/api/articles").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["totalElements"], 1);
    assert_eq!(body["content"][0]["title"], "Rust in production");
    assert_eq!(body["content"][0]["hashtags"][0], "rust");
}

#[tokio::test]
async fn api_article_omits_the_author_email() {
    let mut board = TestBoard::default();
    board
        .articles
        .expect_find_detail()
        .returning(|_| Ok(Some(detail())));

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(Request::builder().uri("/api/articles/1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(!body.contains("alice@example.com"));
}

#[tokio::test]
async fn api_missing_comment_is_404() {
    let mut board = TestBoard::default();
    board.comments.expect_find_by_id().returning(|_| Ok(None));

    let app = api_adapters::router(board.into_state());
    let response = app
        .oneshot(Request::builder().uri("/api/comments/5").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
