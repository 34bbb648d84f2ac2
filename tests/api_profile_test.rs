//! Integration tests for the visitor profile endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::json;
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_json, empty_request, json_request, test_app};

    /// Tests an empty profile is returned without a cookie
    #[tokio::test]
    async fn it_returns_an_empty_profile_without_cookie() {
        let app = test_app().await;

        let response = app
            .oneshot(empty_request("GET", "/api/profile"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body, json!({"name": "", "email": ""}));
    }

    /// Tests saving a profile sets the cookie
    #[tokio::test]
    async fn it_sets_the_profile_cookie() {
        let app = test_app().await;

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/profile",
                json!({"name": "Jo", "email": "jo@example.com"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("userProfile="));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=31536000"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    /// Tests a saved profile is read back on the next request
    #[tokio::test]
    async fn it_reads_back_a_saved_profile() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/profile",
                json!({"name": "Jo De Smet", "email": "jo@example.com"}),
            ))
            .await
            .unwrap();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let pair = set_cookie.split(';').next().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/profile")
                    .header(header::COOKIE, pair)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_to_json(response.into_body()).await;
        assert_eq!(body, json!({"name": "Jo De Smet", "email": "jo@example.com"}));
    }

    /// Tests the profile is read back from the cookie
    #[tokio::test]
    async fn it_reads_the_profile_cookie() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/profile")
                    .header(
                        header::COOKIE,
                        "userProfile=%7B%22name%22%3A%22Jo%22%2C%22email%22%3A%22jo%40example.com%22%7D",
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_to_json(response.into_body()).await;
        assert_eq!(body, json!({"name": "Jo", "email": "jo@example.com"}));
    }
}
