//! End-to-end signing tests against the verifying listener.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::header::DATE;
    use http::{HeaderValue, Method, StatusCode};
    use ocisign_auth::SigningRequest;

    use crate::{TEST_TOKEN, send_signed, start_verifying_server, test_signer};

    #[tokio::test]
    async fn test_should_verify_signed_list_buckets() {
        let addr = start_verifying_server().await;
        let response = send_signed(
            &test_signer(),
            addr,
            Method::GET,
            "/n/ns1/b/?compartmentId=ocid1.compartment.oc1..bbb",
            None,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["verified"], true);
        assert_eq!(json["keyId"], format!("ST${TEST_TOKEN}"));
        assert_eq!(
            json["headers"],
            serde_json::json!(["host", "date", "(request-target)"])
        );
    }

    #[tokio::test]
    async fn test_should_verify_signed_post_with_body() {
        let addr = start_verifying_server().await;
        let body = Bytes::from_static(br#"{"name":"bucket-1","compartmentId":"c1"}"#);
        let response = send_signed(&test_signer(), addr, Method::POST, "/n/ns1/b/", Some(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["contentLength"], 40);
        assert_eq!(
            json["headers"],
            serde_json::json!([
                "host",
                "date",
                "(request-target)",
                "content-type",
                "content-length",
                "x-content-sha256"
            ])
        );
    }

    #[tokio::test]
    async fn test_should_verify_signed_put_with_empty_body() {
        let addr = start_verifying_server().await;
        let response = send_signed(
            &test_signer(),
            addr,
            Method::PUT,
            "/n/ns1/b/bucket-1/o/empty.txt",
            Some(Bytes::new()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["contentLength"], 0);
    }

    #[tokio::test]
    async fn test_should_reject_body_changed_after_signing() {
        let addr = start_verifying_server().await;
        let path = "/n/ns1/b/bucket-1/o/obj";

        let request = SigningRequest::new(Method::PUT, addr.to_string(), path)
            .with_date(chrono::Utc::now())
            .unwrap()
            .with_body("original");
        let signed = test_signer().sign(&request).unwrap();
        let mut headers = request.headers().clone();
        signed.merge_into(&mut headers);

        let response = reqwest::Client::new()
            .put(format!("http://{addr}{path}"))
            .headers(headers)
            .body("tampered")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_should_reject_unsigned_request() {
        let addr = start_verifying_server().await;
        let response = reqwest::Client::new()
            .get(format!("http://{addr}/n/ns1/b/"))
            .header(DATE, HeaderValue::from_static("Thu, 05 Jan 2014 21:31:40 GMT"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["code"], "NotAuthenticated");
    }

    #[tokio::test]
    async fn test_should_reject_request_signed_for_another_path() {
        let addr = start_verifying_server().await;
        let request = SigningRequest::new(Method::GET, addr.to_string(), "/n/ns1/b/")
            .with_date(chrono::Utc::now())
            .unwrap();
        let signed = test_signer().sign(&request).unwrap();
        let mut headers = request.headers().clone();
        signed.merge_into(&mut headers);

        let response = reqwest::Client::new()
            .get(format!("http://{addr}/n/ns2/b/"))
            .headers(headers)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_should_sign_concurrently_with_shared_signer() {
        let addr = start_verifying_server().await;
        let signer = Arc::new(test_signer());

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let signer = Arc::clone(&signer);
                tokio::spawn(async move {
                    let body = Bytes::from(format!("{{\"index\":{i}}}"));
                    send_signed(
                        &signer,
                        addr,
                        Method::PUT,
                        &format!("/n/ns1/b/bucket-1/o/object-{i}"),
                        Some(body),
                    )
                    .await
                    .unwrap()
                    .status()
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), StatusCode::OK);
        }
    }
}
