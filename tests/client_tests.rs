//! End-to-end tests for both clients against a local mock server.
//!
//! The clients block, so every call runs on tokio's blocking pool while the
//! mock server keeps serving on the runtime.

use std::io::Write;
use std::time::Duration;

use soundcloud_api::soundcloud::{parse_authorization, Signer, ASSET_FIELD};
use soundcloud_api::{
    AppError, BasicClient, Call, Consumer, Credentials, HandshakeState, HttpTransport,
    RequestBody, SoundcloudClient, Token, Verb,
};
use wiremock::matchers::{body_string, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn blocking<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

fn protocol_params(request: &Request) -> Vec<(String, String)> {
    let header = request
        .headers
        .get("authorization")
        .expect("missing Authorization header")
        .to_str()
        .unwrap();

    parse_authorization(header)
}

fn consumer() -> Consumer {
    Consumer::new("consumer-key", "consumer-secret")
}

// =============================================================================
// Basic Auth Client Tests
// =============================================================================

mod basic_client {
    use super::*;

    #[tokio::test]
    async fn test_search_sends_credentials_and_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tracks/"))
            .and(query_param("q", "foo"))
            .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<tracks></tracks>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let result = blocking(move || {
            let client = BasicClient::new(Credentials::new("alice", "secret"))?.with_base_url(uri);
            client.tracks().call(Call::new("search").query([("q", "foo")]))
        })
        .await
        .unwrap();

        assert_eq!(result.text(), Some("<tracks></tracks>"));
    }

    #[tokio::test]
    async fn test_post_comment_sends_form_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tracks/7/comments"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("comment%5Bbody%5D=lovely"))
            .respond_with(ResponseTemplate::new(201).set_body_string("<comment/>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let result = blocking(move || {
            let client = BasicClient::new(Credentials::new("alice", "secret"))?.with_base_url(uri);
            client
                .tracks()
                .call(Call::new("comments").arg("track_id", 7).post([("comment[body]", "lovely")]))
        })
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_empty_delete_response_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/me/favorites/5/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let result = blocking(move || {
            let client = BasicClient::new(Credentials::new("alice", "secret"))?.with_base_url(uri);
            client.me().call(Call::new("favorites").arg("track_id", 5).delete())
        })
        .await
        .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/42/followers/"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let expected_url = format!("{}/users/42/followers/", uri);
        let result = blocking(move || {
            let client = BasicClient::new(Credentials::new("alice", "secret"))?.with_base_url(uri);
            client.users().call(Call::new("followers").user(42))
        })
        .await;

        match result.unwrap_err() {
            AppError::Api { status, url } => {
                assert_eq!(status, 404);
                assert_eq!(url, expected_url);
            }
            e => panic!("Expected Api error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_see_other_is_success_and_not_followed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/me/5/followings/"))
            .respond_with(ResponseTemplate::new(303).insert_header("location", "/users/5"))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/5"))
            .respond_with(ResponseTemplate::new(401))
            .expect(0)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let result = blocking(move || {
            let client = BasicClient::new(Credentials::new("alice", "secret"))?.with_base_url(uri);
            client
                .me()
                .call(Call::new("followings").arg("user_id", 5).post([("note", "hi")]))
        })
        .await
        .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let result = blocking(|| {
            let client = BasicClient::new(Credentials::new("alice", "secret"))?
                .with_base_url("http://127.0.0.1:9");
            client.me().call(Call::collection())
        })
        .await;

        match result.unwrap_err() {
            AppError::Network(_) => {}
            e => panic!("Expected Network error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let result = blocking(move || {
            let transport = HttpTransport::with_timeout(Duration::from_millis(200))?;
            BasicClient::with_transport(Credentials::new("alice", "secret"), transport)
                .with_base_url(uri)
                .me()
                .call(Call::collection())
        })
        .await;

        match result.unwrap_err() {
            AppError::Network(e) => assert!(e.is_timeout()),
            e => panic!("Expected Network error, got: {:?}", e),
        }
    }
}

// =============================================================================
// OAuth Client Tests
// =============================================================================

mod oauth_client {
    use super::*;

    #[tokio::test]
    async fn test_full_handshake_then_signed_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/request_token"))
            .and(header_exists("authorization"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("oauth_token=req&oauth_token_secret=reqsecret"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/oauth/access_token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("oauth_token=acc&oauth_token_secret=accsecret"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"id": 1, "username": "alice", "permalink": "alice"}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let (authorize_url, state, body) = blocking(move || -> soundcloud_api::Result<_> {
            let mut client = SoundcloudClient::new(consumer())?.with_base_url(&uri);

            let request_token = client.get_request_token("http://localhost/callback")?.unwrap();
            let authorize_url = client.get_authorize_url(&request_token);
            client.get_access_token("verifier")?.unwrap();

            let accept = vec![("Accept".to_string(), "application/json".to_string())];
            let body = client.request("me", Verb::Get, RequestBody::Empty, &accept)?;
            Ok((authorize_url, client.state(), body))
        })
        .await
        .unwrap();

        assert_eq!(
            authorize_url,
            format!("{}/oauth/authorize?oauth_token=req", mock_server.uri())
        );
        assert_eq!(state, HandshakeState::Authenticated);
        let user: serde_json::Value = body.json().unwrap();
        assert_eq!(user["username"], "alice");

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);

        let consumer = consumer();
        let request_token = Token::new("req", "reqsecret");
        let access_token = Token::new("acc", "accsecret");

        let first = protocol_params(&requests[0]);
        assert!(first.iter().any(|(k, v)| k == "oauth_callback" && v == "http://localhost/callback"));
        assert!(Signer::new(&consumer, None)
            .verify(Verb::Post, requests[0].url.as_str(), &[], &first)
            .unwrap());

        let second = protocol_params(&requests[1]);
        assert!(Signer::new(&consumer, Some(&request_token))
            .verify(Verb::Post, requests[1].url.as_str(), &[], &second)
            .unwrap());

        let third = protocol_params(&requests[2]);
        assert!(Signer::new(&consumer, Some(&access_token))
            .verify(Verb::Get, requests[2].url.as_str(), &[], &third)
            .unwrap());
    }

    #[tokio::test]
    async fn test_signed_post_params() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/me/tracks/3"))
            .and(body_string("track%5Btitle%5D=Renamed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<track/>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let token = Token::new("acc", "accsecret");
        let client_token = token.clone();
        blocking(move || {
            SoundcloudClient::new(consumer())?
                .with_base_url(&uri)
                .with_token(client_token)
                .request(
                    "me/tracks/3",
                    Verb::Put,
                    RequestBody::params([("track[title]", "Renamed")]),
                    &[],
                )
        })
        .await
        .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let protocol = protocol_params(&requests[0]);
        let params = vec![("track[title]".to_string(), "Renamed".to_string())];
        let consumer = consumer();
        assert!(Signer::new(&consumer, Some(&token))
            .verify(Verb::Put, requests[0].url.as_str(), &params, &protocol)
            .unwrap());
    }

    #[tokio::test]
    async fn test_see_other_after_signed_post_is_not_followed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/me/followings/5"))
            .respond_with(
                ResponseTemplate::new(303)
                    .insert_header("location", "/users/5")
                    .set_body_string("<see-other/>"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/5"))
            .respond_with(ResponseTemplate::new(401))
            .expect(0)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let result = blocking(move || {
            SoundcloudClient::new(consumer())?
                .with_base_url(&uri)
                .with_token(Token::new("acc", "accsecret"))
                .request("me/followings/5", Verb::Post, RequestBody::params([("a", "1")]), &[])
        })
        .await
        .unwrap();

        assert_eq!(result.text(), Some("<see-other/>"));
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_token_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/request_token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("unexpected"))
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let (token, state) = blocking(move || -> soundcloud_api::Result<_> {
            let mut client = SoundcloudClient::new(consumer())?.with_base_url(&uri);
            let token = client.get_request_token("oob")?;
            Ok((token, client.state()))
        })
        .await
        .unwrap();

        assert!(token.is_none());
        assert_eq!(state, HandshakeState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_unauthorized_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let result = blocking(move || {
            SoundcloudClient::new(consumer())?
                .with_base_url(&uri)
                .request("me", Verb::Get, RequestBody::Empty, &[])
        })
        .await;

        assert_eq!(result.unwrap_err().status(), Some(401));
    }

    #[tokio::test]
    async fn test_upload_track() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tracks"))
            .respond_with(
                ResponseTemplate::new(201).set_body_string(
                    r#"{"id": 9, "title": "Demo", "permalink_url": "http://soundcloud.com/alice/demo"}"#,
                ),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut asset = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        asset.write_all(b"fake mp3 payload").unwrap();
        let asset_path = asset.path().display().to_string();

        let uri = mock_server.uri();
        let result = blocking(move || {
            let fields = vec![
                (ASSET_FIELD.to_string(), asset_path),
                ("track[title]".to_string(), "Demo".to_string()),
            ];
            SoundcloudClient::new(consumer())?
                .with_base_url(&uri)
                .with_token(Token::new("acc", "accsecret"))
                .upload_track(&fields, "audio/mpeg", "image/png")
        })
        .await
        .unwrap();

        let track: serde_json::Value = result.json().unwrap();
        assert_eq!(track["id"], 9);

        let requests = mock_server.received_requests().await.unwrap();
        let request = &requests[0];
        let content_type = request
            .headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary=---------------------------"));

        let body = String::from_utf8(request.body.clone()).unwrap();
        assert!(body.contains("Content-Type: audio/mpeg\r\n\r\nfake mp3 payload\r\n"));
        assert!(body.contains("name=\"track[title]\"\r\n\r\nDemo\r\n"));

        // The multipart body is not part of the signature.
        let protocol = protocol_params(request);
        let consumer = consumer();
        let token = Token::new("acc", "accsecret");
        assert!(Signer::new(&consumer, Some(&token))
            .verify(Verb::Post, request.url.as_str(), &[], &protocol)
            .unwrap());
    }
}
