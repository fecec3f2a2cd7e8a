use crate::event::{LifecycleEvent, LogSink};
use crate::kernel::component::ComponentKey;
use crate::system::error::HaltError;
use crate::system::live::LiveSystem;

/// What happened to one component during halting.
#[derive(Debug)]
pub enum HaltOutcome {
    /// The destructor ran and returned successfully
    Stopped,
    /// No destructor is registered; the instance was simply released
    Skipped,
    /// The destructor returned an error
    Failed(HaltError),
}

/// Per-component outcomes of a halt, in the order they were processed.
#[derive(Debug, Default)]
pub struct HaltReport {
    outcomes: Vec<(ComponentKey, HaltOutcome)>,
}

impl HaltReport {
    pub fn outcomes(&self) -> &[(ComponentKey, HaltOutcome)] {
        &self.outcomes
    }

    /// Keys in the order they were halted.
    pub fn order(&self) -> Vec<&ComponentKey> {
        self.outcomes.iter().map(|(key, _)| key).collect()
    }

    pub fn outcome(&self, key: &ComponentKey) -> Option<&HaltOutcome> {
        self.outcomes.iter().find(|(k, _)| k == key).map(|(_, outcome)| outcome)
    }

    pub fn errors(&self) -> impl Iterator<Item = &HaltError> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            HaltOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }

    /// True when no destructor failed.
    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn stopped_count(&self) -> usize {
        self.count(|o| matches!(o, HaltOutcome::Stopped))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, HaltOutcome::Skipped))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, HaltOutcome::Failed(_)))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, predicate: impl Fn(&HaltOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

/// Destroy every component of `system` in the reverse of its start order.
///
/// Never fails: destructor errors are recorded in the report and the
/// remaining components are still halted.
pub async fn halt(system: LiveSystem, sink: &dyn LogSink) -> HaltReport {
    let LiveSystem {
        graph,
        mut instances,
        started,
    } = system;

    sink.log(&LifecycleEvent::SystemStopping { components: started.len() });
    let mut report = HaltReport::default();

    for key in started.into_iter().rev() {
        let Some(instance) = instances.remove(&key) else {
            log::warn!("Component '{}' has no instance to halt", key);
            continue;
        };

        let outcome = match graph.get(&key).and_then(|spec| spec.destructor()) {
            None => {
                sink.log(&LifecycleEvent::ComponentStopSkipped { key: key.to_string() });
                HaltOutcome::Skipped
            }
            Some(destructor) => match destructor.destruct(key.clone(), instance).await {
                Ok(()) => {
                    sink.log(&LifecycleEvent::ComponentStopped { key: key.to_string() });
                    HaltOutcome::Stopped
                }
                Err(source) => {
                    log::error!("Error stopping component '{}': {}", key, source);
                    sink.log(&LifecycleEvent::ComponentStopFailed {
                        key: key.to_string(),
                        error: source.to_string(),
                    });
                    HaltOutcome::Failed(HaltError {
                        key: key.clone(),
                        source,
                    })
                }
            },
        };
        report.outcomes.push((key, outcome));
    }

    sink.log(&LifecycleEvent::SystemStopped {
        stopped: report.stopped_count(),
        skipped: report.skipped_count(),
        failed: report.failed_count(),
    });
    report
}
