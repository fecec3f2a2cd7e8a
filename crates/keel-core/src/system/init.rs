use std::collections::HashMap;

use crate::config::graph::{Binding, ComponentSpec, ResolvedGraph};
use crate::event::{LifecycleEvent, LogSink};
use crate::kernel::component::{BoxError, ComponentContext, ComponentKey, Instance};
use crate::system::error::InitError;
use crate::system::halt::halt;
use crate::system::live::LiveSystem;

/// Construct every component of `graph` in order.
///
/// Constructors run one at a time. If one fails, the components that already
/// started are halted in reverse order before the error is returned, and no
/// later constructor is invoked.
pub async fn init(graph: ResolvedGraph, sink: &dyn LogSink) -> Result<LiveSystem, InitError> {
    sink.log(&LifecycleEvent::SystemStarting { components: graph.len() });

    let mut system = LiveSystem::new(graph);
    let failure = construct_all(&system.graph, sink, &mut system.instances, &mut system.started).await;

    match failure {
        Ok(()) => Ok(system),
        Err((key, source)) => {
            log::error!("Component '{}' failed to start: {}", key, source);
            sink.log(&LifecycleEvent::RollbackStarted {
                failed: key.to_string(),
                started: system.len(),
            });
            let rollback = halt(system, sink).await;
            Err(InitError { key, source, rollback })
        }
    }
}

async fn construct_all(
    graph: &ResolvedGraph,
    sink: &dyn LogSink,
    instances: &mut HashMap<ComponentKey, Instance>,
    started: &mut Vec<ComponentKey>,
) -> Result<(), (ComponentKey, BoxError)> {
    for spec in graph.iter() {
        let key = spec.key();
        sink.log(&LifecycleEvent::ComponentStarting {
            key: key.to_string(),
            factory: spec.factory().to_string(),
        });

        let outcome = match build_context(spec, instances) {
            Ok(context) => spec.constructor().construct(context).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(instance) => {
                log::debug!("Started component '{}'", key);
                instances.insert(key.clone(), instance);
                started.push(key.clone());
                sink.log(&LifecycleEvent::ComponentStarted { key: key.to_string() });
            }
            Err(e) => {
                sink.log(&LifecycleEvent::ComponentStartFailed {
                    key: key.to_string(),
                    error: e.to_string(),
                });
                return Err((key.clone(), e));
            }
        }
    }
    Ok(())
}

/// Gather literal values and the already-built dependency instances.
fn build_context(
    spec: &ComponentSpec,
    instances: &HashMap<ComponentKey, Instance>,
) -> Result<ComponentContext, BoxError> {
    let mut context = ComponentContext::new(spec.key().clone());
    for (name, binding) in spec.bindings() {
        context = match binding {
            Binding::Value(value) => context.with_value(name.clone(), value.clone()),
            Binding::Component(dep) => {
                let instance = instances
                    .get(dep)
                    .ok_or_else(|| format!("dependency '{}' bound as '{}' has not been started", dep, name))?;
                context.with_dependency(name.clone(), dep.clone(), instance.clone())
            }
        };
    }
    Ok(context)
}
