//! # Calculator Server Example
//!
//! Serves a small calculator library over HTTP: arithmetic in the default
//! module, a `stats` module, and a private `admin` module reachable with
//! `Authorization: Bearer letmein`.
//!
//! ```text
//! RUST_LOG=debug cargo run -p verlib-http --example calculator_server
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use verlib::prelude::*;
use verlib_http::HttpVerLibServer;

fn build_library() -> Result<VerLib, RegistryError> {
    let config = VerLibConfig::new().failure_policy(ProcedureFailurePolicy::ProcedureError);
    let mut lib = VerLib::with_config("calculator", config);

    let calls = Arc::new(AtomicU64::new(0));

    let counter = Arc::clone(&calls);
    lib.register("add", Signature::new(["a", "b"]), move |args| {
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(args.get::<f64>("a")? + args.get::<f64>("b")?)
    })?;
    lib.register("sub", Signature::new(["a", "b"]), |args| {
        Ok(args.get::<f64>("a")? - args.get::<f64>("b")?)
    })?;
    lib.register("div", Signature::new(["a", "b"]), |args| {
        let divisor = args.get::<f64>("b")?;
        if divisor == 0.0 {
            return Err(ProcedureError::failed("division by zero"));
        }
        Ok(args.get::<f64>("a")? / divisor)
    })?;

    let mut stats = VerModule::new("stats");
    stats.register("mean", Signature::new(["values"]), |args| {
        let values: Vec<f64> = args.get("values")?;
        if values.is_empty() {
            return Err(ProcedureError::failed("mean of an empty list"));
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    })?;
    lib.declare_module(stats)?;

    let mut admin = VerModule::with_access_level("admin", AccessLevel::private());
    let counter = Arc::clone(&calls);
    admin.register("calls", Signature::empty().with_context("ctx"), move |args| {
        let caller = args
            .context()
            .and_then(|ctx| ctx.get_str("user"))
            .unwrap_or("unknown")
            .to_string();
        Ok(serde_json::json!({
            "caller": caller,
            "add_calls": counter.load(Ordering::Relaxed),
        }))
    })?;
    lib.declare_module(admin)?;

    lib.set_context_builder(|headers: &HttpHeaders, _request: &JsonRpcRequest| {
        Context::new().with("user", headers.get("x-user").unwrap_or("anonymous"))
    });
    lib.set_auth_provider(
        |headers: &HttpHeaders, _request: &JsonRpcRequest, _context: &Context| {
            if headers.get("authorization") == Some("Bearer letmein") {
                AccessLevel::private()
            } else {
                AccessLevel::public()
            }
        },
    );

    Ok(lib)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind_address: SocketAddr = "127.0.0.1:8642".parse()?;
    let server = HttpVerLibServer::builder(build_library()?)
        .bind_address(bind_address)
        .introspection(true)
        .build();

    println!("Calculator library at: http://{}/verlib", bind_address);
    println!("Try this curl command:");
    println!(
        r#"curl -X POST http://{}/verlib \
  -H "Content-Type: application/json" \
  -d '{{"jsonrpc": "2.0", "id": 1, "method": "add", "params": [42, 13]}}'"#,
        bind_address
    );

    server.run().await?;

    Ok(())
}
