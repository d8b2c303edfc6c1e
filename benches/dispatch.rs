//! Benchmarks for route dispatch.
//!
//! `table_dispatch` measures the lookup on its own; the `router` group puts
//! it in context with a full request through the generated axum router.

use axum::{body::Body, http::Request};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use http::Method;
use page_routes::{AppState, Config, GuardRegistry, HttpMiddleware, PageServer, web};
use std::hint::black_box;
use tower::ServiceExt;

fn test_request(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

/// Benchmark: RouteTable::dispatch for hits, trailing slashes and misses
fn bench_table_dispatch(c: &mut Criterion) {
    let table = web::route_table().unwrap();
    let mut group = c.benchmark_group("table_dispatch");

    for path in ["/", "/dashboard", "/settings/appearance", "/dashboard/", "/missing"] {
        group.bench_with_input(BenchmarkId::from_parameter(path), path, |b, path| {
            b.iter(|| black_box(table.dispatch(&Method::GET, black_box(path)).is_ok()))
        });
    }

    group.finish();
}

/// Benchmark: full request through the router, with and without middleware
fn bench_router(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("router");

    for (label, middleware) in [("bare", false), ("middleware", true)] {
        let config = Config::default()
            .with_excluded_middlewares(vec![HttpMiddleware::Logging]);
        let state = AppState::from_config(&config);
        let guards = GuardRegistry::from_config(&config.auth);
        let mut server = PageServer::new(config, state, web::route_table().unwrap(), &guards).unwrap();
        if middleware {
            server = server.setup_middleware();
        }
        let router = server.into_router();

        group.bench_function(BenchmarkId::new("max_upload", label), |b| {
            b.to_async(&rt).iter(|| async {
                let response = router
                    .clone()
                    .oneshot(test_request("/max-upload"))
                    .await
                    .unwrap();
                black_box(response)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_table_dispatch, bench_router);
criterion_main!(benches);
