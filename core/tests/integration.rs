//! End-to-end dispatch against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every method through
//! the ureq transport. Validates that building, sending and normalization
//! agree with a real HTTP peer, including bodies sent without a content type.

use fetch_core::{
    Dispatcher, DispatcherConfig, FetchError, FetchResult, FixedEnvironment, HttpMethod, RequestDescriptor,
    RequestMode, Transport, TransportError, UreqTransport,
};
use serde_json::{json, Value};

type TestDispatcher = Dispatcher<UreqTransport, FixedEnvironment>;

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

/// Run the server on its own runtime thread so the caller needs no runtime.
fn start_server_on_thread() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn dispatcher_with(config: DispatcherConfig) -> TestDispatcher {
    Dispatcher::new(UreqTransport::new(&config), FixedEnvironment::development())
}

fn dispatcher() -> TestDispatcher {
    dispatcher_with(DispatcherConfig::new().timeout_secs(5.0))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_method_round_trips() {
    let base = start_server().await;
    let d = dispatcher();
    let echo = format!("{base}/echo");

    for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete] {
        let result = d.bind(method).send_json(&echo, &json!({"a": 1})).await.unwrap();
        assert_eq!(
            result,
            FetchResult {
                ok: true,
                status: 200,
                data: Some(json!({"method": method.as_str(), "body": {"a": 1}})),
            },
            "{method}"
        );
    }

    for method in HttpMethod::ALL {
        let result = d.bind(method).send(&echo).await.unwrap();
        assert_eq!(result.data, Some(json!({"method": method.as_str(), "body": null})), "{method}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn struct_payload_reaches_server() {
    #[derive(serde::Serialize)]
    struct Ordered {
        zeta: u8,
        alpha: u8,
    }

    let base = start_server().await;
    let result = dispatcher()
        .post()
        .send_json(&format!("{base}/echo"), &Ordered { zeta: 1, alpha: 2 })
        .await
        .unwrap();
    assert_eq!(result.data.unwrap()["body"], json!({"zeta": 1, "alpha": 2}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn response_shapes_normalize() {
    let base = start_server().await;
    let get = dispatcher().get();

    let result = get.send(&format!("{base}/text/500")).await.unwrap();
    assert_eq!(
        result,
        FetchResult {
            ok: false,
            status: 500,
            data: None,
        }
    );

    let result = get.send(&format!("{base}/empty/204")).await.unwrap();
    assert_eq!(
        result,
        FetchResult {
            ok: true,
            status: 204,
            data: Some(json!({})),
        }
    );

    let result = get.send(&format!("{base}/empty/200")).await.unwrap();
    assert!(!result.ok);
    assert!(result.data.is_none());

    let result = get.send(&format!("{base}/status/404")).await.unwrap();
    assert_eq!(
        result,
        FetchResult {
            ok: false,
            status: 404,
            data: Some(json!({"status": 404})),
        }
    );

    let result = get.send(&format!("{base}/status/403")).await.unwrap();
    assert!(!result.ok);
    assert_eq!(result.status, 403);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn validation_error_body_is_returned() {
    let base = start_server().await;

    let result = dispatcher().post().send(&format!("{base}/status/42")).await.unwrap();

    assert!(!result.ok);
    assert_eq!(result.status, 400);
    assert!(result.data.unwrap()["error"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn body_larger_than_ten_mebibytes_is_a_result() {
    let base = start_server().await;
    let len = 11 * 1024 * 1024;

    let result = dispatcher().get().send(&format!("{base}/large/{len}")).await.unwrap();

    assert!(result.ok);
    assert_eq!(result.status, 200);
    assert_eq!(result.data.unwrap().as_str().unwrap().len(), len - 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn body_over_configured_limit_is_a_transport_error() {
    let base = start_server().await;
    let d = dispatcher_with(DispatcherConfig::new().timeout_secs(5.0).body_limit(1024));

    let err = d.get().send(&format!("{base}/large/4096")).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(TransportError::Io(_))), "unexpected error: {err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn transport_reports_response_headers() {
    let base = start_server().await;
    let request = RequestDescriptor {
        method: HttpMethod::Get,
        headers: Vec::new(),
        mode: RequestMode::SameOrigin,
        body: None,
    };

    let response = UreqTransport::default()
        .send(&format!("{base}/status/200"), request)
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type(), Some("application/json"));
}

#[test]
fn works_without_a_tokio_runtime() {
    let base = start_server_on_thread();
    let d = dispatcher();

    let result = futures::executor::block_on(d.post().send_json(&format!("{base}/echo"), &json!({"a": 1}))).unwrap();
    assert_eq!(result.data, Some(json!({"method": "POST", "body": {"a": 1}})));

    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = futures::executor::block_on(d.get().send(&format!("http://{closed}/"))).unwrap_err();
    assert!(err.as_transport().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_are_independent() {
    let base = start_server().await;
    let post = dispatcher().post();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let post = post.clone();
            let url = format!("{base}/echo");
            tokio::spawn(async move { (i, post.send_json(&url, &json!({ "n": i })).await.unwrap()) })
        })
        .collect();

    for handle in handles {
        let (i, result) = handle.await.unwrap();
        assert!(result.ok);
        assert_eq!(result.data, Some(json!({"method": "POST", "body": {"n": i}})));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn refused_connection_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = dispatcher().get().send(&format!("http://{addr}/")).await.unwrap_err();
    assert!(
        matches!(
            err,
            FetchError::Transport(TransportError::Connection(_) | TransportError::Io(_))
        ),
        "unexpected error: {err:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_with_data_is_refused_by_transport() {
    let base = start_server().await;

    let err = dispatcher()
        .get()
        .send_json(&format!("{base}/echo"), &json!({"a": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(TransportError::InvalidRequest(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn explicit_none_sends_no_body() {
    let base = start_server().await;

    let result = dispatcher().put().call::<Value>(&format!("{base}/echo"), None).await.unwrap();
    assert_eq!(result.data, Some(json!({"method": "PUT", "body": null})));
}
