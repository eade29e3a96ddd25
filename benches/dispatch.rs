use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::sync::Arc;
use supersede::context::ModelContext;
use supersede::options::DispatchOptions;
use supersede::tracker::RequestTracker;
use supersede::transport::{OperationRequest, Transport, TransportResponse, TransportResult};
use supersede::types::Method;
use tokio::runtime::Runtime;

struct NoopTransport;

#[async_trait]
impl Transport for NoopTransport {
    async fn perform(&self, _request: OperationRequest) -> TransportResult {
        Ok(TransportResponse {
            status: 200,
            body: json!(null),
        })
    }

    fn name(&self) -> &str {
        "noop"
    }
}

fn bench_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let _guard = rt.enter();

    c.bench_function("dispatch_plain", |b| {
        let tracker = RequestTracker::new(Arc::new(NoopTransport));
        let context = ModelContext::new("/bench");
        b.iter(|| {
            let handle = tracker.dispatch(Method::Read, &context, DispatchOptions::default());
            black_box(handle);
        })
    });

    c.bench_function("dispatch_latest_wins", |b| {
        let tracker = RequestTracker::new(Arc::new(NoopTransport));
        let context = ModelContext::with_single_requests("/bench", true);
        b.iter(|| {
            let handle = tracker.dispatch(Method::Read, &context, DispatchOptions::default());
            black_box(handle);
        })
    });
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
