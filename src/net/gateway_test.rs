use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::sleep;

use super::*;

/// Sleeps `params.delay_ms` (default 10) and echoes the request back.
#[derive(Default)]
struct DelayTransport {
    finished: AtomicUsize,
}

#[async_trait(?Send)]
impl Transport for DelayTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Value, RequestError> {
        let delay = request
            .params
            .get("delay_ms")
            .and_then(Value::as_u64)
            .unwrap_or(10);
        sleep(Duration::from_millis(delay)).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        match request.path.as_str() {
            "/fail" => Err(RequestError::Network("connection reset".to_owned())),
            "/expired" => Err(RequestError::Server { status: 401, message: "expired".to_owned() }),
            _ => Ok(json!({ "path": request.path, "params": request.params })),
        }
    }
}

fn gateway() -> (RequestGateway, Arc<DelayTransport>) {
    let transport = Arc::new(DelayTransport::default());
    (RequestGateway::new(transport.clone()), transport)
}

fn recorded(loading: &LoadingState) -> Arc<Mutex<Vec<bool>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    loading.subscribe(move |flag| sink.lock().unwrap().push(*flag));
    seen
}

#[test]
fn options_default_to_no_cancel_and_no_loading() {
    let options = RequestOptions::default();
    assert!(!options.cancel_last_request);
    assert!(!options.show_loading);
    assert!(RequestOptions::latest().cancel_last_request);
    assert!(RequestOptions::latest().with_loading().show_loading);
}

#[tokio::test(start_paused = true)]
async fn latest_identical_call_supersedes_earlier_one() {
    let (gateway, transport) = gateway();
    let first = ApiRequest::get("/users", json!({ "q": "al", "delay_ms": 50 }));
    let second = ApiRequest::get("/users", json!({ "delay_ms": 50, "q": "al" }));

    let (a, b) = tokio::join!(
        gateway.dispatch(first, RequestOptions::latest()),
        gateway.dispatch(second, RequestOptions::latest()),
    );

    assert_eq!(a, Err(RequestError::Cancelled));
    assert_eq!(b.unwrap()["path"], "/users");
    assert_eq!(transport.finished.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn identical_calls_run_side_by_side_without_cancel() {
    let (gateway, transport) = gateway();
    let request = ApiRequest::get("/users", json!({ "delay_ms": 20 }));
    let probe = async {
        sleep(Duration::from_millis(5)).await;
        gateway.pending_count()
    };

    let (a, b, in_flight) = tokio::join!(
        gateway.dispatch(request.clone(), RequestOptions::default()),
        gateway.dispatch(request.clone(), RequestOptions::default()),
        probe,
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(in_flight, 2);
    assert_eq!(transport.finished.load(Ordering::SeqCst), 2);
    assert_eq!(gateway.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn different_params_do_not_cancel_each_other() {
    let (gateway, _) = gateway();
    let (a, b) = tokio::join!(
        gateway.dispatch(ApiRequest::get("/users", json!({ "page": 1 })), RequestOptions::latest()),
        gateway.dispatch(ApiRequest::get("/users", json!({ "page": 2 })), RequestOptions::latest()),
    );
    assert!(a.is_ok());
    assert!(b.is_ok());
}

#[tokio::test(start_paused = true)]
async fn loading_holds_until_last_call_settles() {
    let (gateway, _) = gateway();
    let loading = gateway.loading().clone();
    let seen = recorded(&loading);
    let options = RequestOptions::default().with_loading();
    let probe = async {
        sleep(Duration::from_millis(15)).await;
        let early = (loading.is_loading(), loading.active());
        sleep(Duration::from_millis(10)).await;
        let late = (loading.is_loading(), loading.active());
        (early, late)
    };

    let (a, b, c, (early, late)) = tokio::join!(
        gateway.dispatch(ApiRequest::get("/a", json!({ "delay_ms": 10 })), options),
        gateway.dispatch(ApiRequest::get("/b", json!({ "delay_ms": 20 })), options),
        gateway.dispatch(ApiRequest::get("/fail", json!({ "delay_ms": 30 })), options),
        probe,
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert!(c.is_err());
    assert_eq!(early, (true, 2));
    assert_eq!(late, (true, 1));
    assert!(!loading.is_loading());
    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn calls_without_loading_leave_indicator_alone() {
    let (gateway, _) = gateway();
    let seen = recorded(gateway.loading());
    gateway
        .dispatch(ApiRequest::get("/a", json!({})), RequestOptions::default())
        .await
        .unwrap();
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn superseded_call_releases_its_loading_count() {
    let (gateway, _) = gateway();
    let options = RequestOptions::latest().with_loading();
    let (a, b) = tokio::join!(
        gateway.dispatch(ApiRequest::get("/users", json!({ "delay_ms": 40 })), options),
        gateway.dispatch(ApiRequest::get("/users", json!({ "delay_ms": 40 })), options),
    );
    assert!(a.unwrap_err().is_cancelled());
    assert!(b.is_ok());
    assert_eq!(gateway.loading().active(), 0);
    assert!(!gateway.loading().is_loading());
}

#[tokio::test(start_paused = true)]
async fn failed_call_is_removed_from_pending() {
    let (gateway, _) = gateway();
    let result = gateway
        .dispatch(ApiRequest::post("/fail", json!({})), RequestOptions::latest())
        .await;
    assert_eq!(result, Err(RequestError::Network("connection reset".to_owned())));
    assert_eq!(gateway.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_all_aborts_in_flight_calls() {
    let (gateway, transport) = gateway();
    let mut call = Box::pin(gateway.dispatch(
        ApiRequest::get("/users", json!({ "delay_ms": 50 })),
        RequestOptions::default().with_loading(),
    ));
    assert!(futures::poll!(call.as_mut()).is_pending());
    assert_eq!(gateway.pending_count(), 1);

    assert_eq!(gateway.cancel_all(), 1);
    assert_eq!(gateway.pending_count(), 0);
    assert_eq!(call.await, Err(RequestError::Cancelled));
    assert!(!gateway.loading().is_loading());
    assert_eq!(transport.finished.load(Ordering::SeqCst), 0);
    assert_eq!(gateway.cancel_all(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_call_releases_its_entry() {
    let (gateway, _) = gateway();
    let mut call = Box::pin(gateway.dispatch(
        ApiRequest::get("/users", json!({ "delay_ms": 50 })),
        RequestOptions::latest().with_loading(),
    ));
    assert!(futures::poll!(call.as_mut()).is_pending());
    assert_eq!(gateway.pending_count(), 1);
    assert!(gateway.loading().is_loading());

    drop(call);
    assert_eq!(gateway.pending_count(), 0);
    assert!(!gateway.loading().is_loading());
}

#[tokio::test(start_paused = true)]
async fn unauthorized_response_runs_hook() {
    let fired = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&fired);
    let gateway = RequestGateway::new(Arc::new(DelayTransport::default()))
        .on_unauthorized(move || flag.store(true, Ordering::SeqCst));

    gateway
        .dispatch(ApiRequest::get("/fail", json!({})), RequestOptions::default())
        .await
        .unwrap_err();
    assert!(!fired.load(Ordering::SeqCst));

    let err = gateway
        .dispatch(ApiRequest::get("/expired", json!({})), RequestOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(fired.load(Ordering::SeqCst));
}
