//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP. Every method is registered explicitly at startup.

use crate::handler::{RpcHandler, RpcServices};
use crate::rate_limiter::RateLimiter;
use jsonrpsee::core::RegisterMethodError;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9630;
const DEFAULT_RATE_LIMIT_BURST: u32 = 40;
const DEFAULT_RATE_LIMIT_PER_SEC: u32 = 20;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-actor burst size
    pub rate_limit_burst: u32,
    /// Per-actor sustained requests per second
    pub rate_limit_per_sec: u32,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
            rate_limit_per_sec: DEFAULT_RATE_LIMIT_PER_SEC,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind JSON-RPC server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register RPC method: {0}")]
    Register(#[from] RegisterMethodError),
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, services: RpcServices) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit_burst,
            config.rate_limit_per_sec,
        ));
        Self {
            config,
            handler: Arc::new(RpcHandler::new(services, rate_limiter)),
        }
    }

    /// Build the method table
    pub fn module(&self) -> Result<RpcModule<()>, ServerError> {
        let mut module = RpcModule::new(());
        let h = &self.handler;

        // Application lifecycle
        register(&mut module, "application.submit.v1", h, |h, req| async move {
            h.submit_application(req).await
        })?;
        register(&mut module, "application.get.v1", h, |h, req| async move {
            h.get_application(req).await
        })?;
        register(&mut module, "application.history.v1", h, |h, req| async move {
            h.application_history(req).await
        })?;
        register(&mut module, "application.status.v1", h, |h, req| async move {
            h.change_status(req).await
        })?;
        register(
            &mut module,
            "application.schedule_interview.v1",
            h,
            |h, req| async move { h.schedule_interview(req).await },
        )?;
        register(&mut module, "application.withdraw.v1", h, |h, req| async move {
            h.withdraw_application(req).await
        })?;
        register(&mut module, "application.view.v1", h, |h, req| async move {
            h.view_application(req).await
        })?;

        // Job publishing
        register(&mut module, "job.create.v1", h, |h, req| async move {
            h.create_job(req).await
        })?;
        register(&mut module, "job.publish.v1", h, |h, req| async move {
            h.publish_job(req).await
        })?;
        register(&mut module, "job.close.v1", h, |h, req| async move {
            h.close_job(req).await
        })?;
        register(&mut module, "job.get.v1", h, |h, req| async move {
            h.get_job(req).await
        })?;
        register(&mut module, "job.view.v1", h, |h, req| async move {
            h.view_job(req).await
        })?;
        register(&mut module, "job.recount_applications.v1", h, |h, req| async move {
            h.recount_applications(req).await
        })?;

        // Subscriptions
        register(&mut module, "subscription.quota.v1", h, |h, req| async move {
            h.quota(req).await
        })?;
        register(&mut module, "subscription.upgrade.v1", h, |h, req| async move {
            h.upgrade(req).await
        })?;
        register(&mut module, "subscription.activate.v1", h, |h, req| async move {
            h.activate(req).await
        })?;
        register(&mut module, "subscription.cancel.v1", h, |h, req| async move {
            h.cancel_subscription(req).await
        })?;
        register(&mut module, "subscription.history.v1", h, |h, req| async move {
            h.subscription_history(req).await
        })?;

        // Admin
        register(&mut module, "admin.sweep_expired.v1", h, |h, req| async move {
            h.sweep_expired(req).await
        })?;

        Ok(module)
    }

    /// Start the JSON-RPC server, returning the bound address and its handle
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server.local_addr().map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        let module = self.module()?;
        let methods = module.method_names().count();

        info!(
            addr = %local_addr,
            methods,
            rate_limit_burst = self.config.rate_limit_burst,
            rate_limit_per_sec = self.config.rate_limit_per_sec,
            "JSON-RPC server started"
        );

        Ok((local_addr, server.start(module)))
    }
}

/// Register one versioned method: parse params, then delegate to the handler
fn register<P, R, F, Fut>(
    module: &mut RpcModule<()>,
    name: &'static str,
    handler: &Arc<RpcHandler>,
    call: F,
) -> Result<(), RegisterMethodError>
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + Clone + Send + 'static,
    F: Fn(Arc<RpcHandler>, P) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ErrorObjectOwned>> + Send + 'static,
{
    let handler = Arc::clone(handler);
    module.register_async_method(name, move |params, _, _| {
        let handler = handler.clone();
        let call = call.clone();
        async move {
            let req: P = params.parse()?;
            call(handler, req).await
        }
    })?;
    Ok(())
}
