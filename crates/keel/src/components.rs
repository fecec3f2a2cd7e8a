//! Built-in component factories available to `keel check` and `keel run`.
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use keel_core::registry::{Constructor, Destructor};
use keel_core::{BoxError, ComponentContext, ComponentKey, ComponentRegistry, Instance};
use log::{debug, info, warn};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub const VALUE_FACTORY: &str = "value";
pub const TCP_LISTENER_FACTORY: &str = "tcp-listener";

const DEFAULT_ADDRESS: &str = "127.0.0.1:0";

/// Registry with every built-in factory.
pub fn builtin_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .register(VALUE_FACTORY, ValueFactory)
        .register_with_destructor(TCP_LISTENER_FACTORY, TcpListenerFactory, TcpListenerFactory);
    registry
}

/// Exposes its resolved configuration as a JSON object. Useful for sharing
/// settings between components.
struct ValueFactory;

#[async_trait]
impl Constructor for ValueFactory {
    async fn construct(&self, context: ComponentContext) -> Result<Instance, BoxError> {
        debug!("Component '{}' holds {}", context.key(), context.values_as_json());
        Ok(Arc::new(context.values_as_json()))
    }
}

/// A bound TCP listener that accepts and drops connections until halted.
pub struct ListenerComponent {
    pub local_addr: SocketAddr,
    accept_loop: Mutex<Option<JoinHandle<()>>>,
}

struct TcpListenerFactory;

#[async_trait]
impl Constructor for TcpListenerFactory {
    async fn construct(&self, context: ComponentContext) -> Result<Instance, BoxError> {
        let address = context.value_or::<String>("address", DEFAULT_ADDRESS.to_string());
        let listener = TcpListener::bind(&address).await?;
        let local_addr = listener.local_addr()?;

        for name in context.dependency_names() {
            if let Ok(settings) = context.dependency::<Value>(name) {
                debug!("Listener '{}' received settings '{}': {}", context.key(), name, settings);
            }
        }

        let key = context.key().clone();
        let accept_loop = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((_stream, peer)) => debug!("Listener '{}' accepted connection from {}", key, peer),
                    Err(e) => {
                        warn!("Listener '{}' failed to accept: {}", key, e);
                        break;
                    }
                }
            }
        });

        info!("Component '{}' listening on {}", context.key(), local_addr);
        Ok(Arc::new(ListenerComponent {
            local_addr,
            accept_loop: Mutex::new(Some(accept_loop)),
        }))
    }
}

#[async_trait]
impl Destructor for TcpListenerFactory {
    async fn destruct(&self, key: ComponentKey, instance: Instance) -> Result<(), BoxError> {
        let listener = instance
            .downcast::<ListenerComponent>()
            .map_err(|_| format!("component '{}' is not a tcp listener", key))?;

        if let Some(handle) = listener.accept_loop.lock().await.take() {
            handle.abort();
        }
        info!("Component '{}' stopped listening on {}", key, listener.local_addr);
        Ok(())
    }
}
