//! Label → counter bindings resolved against a [`CounterIndex`].

use ahash::AHashMap;

use crate::perf::{CounterIndex, PerfValue, RecordRef};

/// A display label bound to a fully-qualified counter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBinding {
    pub label: String,
    pub counter: String,
    /// `None` until resolved, and after resolving against an index that
    /// does not publish `counter`.
    pub resolved: Option<RecordRef>,
}

/// The set of counters a monitoring session samples.
///
/// Names are looked up once per [`SampleRegistry::resolve_all`]; reads go
/// straight to the cached byte offset.
#[derive(Debug, Clone, Default)]
pub struct SampleRegistry {
    bindings: Vec<LabelBinding>,
    by_label: AHashMap<String, usize>,
}

impl SampleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `label` to `counter`. Re-registering a label replaces its
    /// counter and drops any previous resolution.
    pub fn register(&mut self, label: &str, counter: &str) {
        if let Some(&slot) = self.by_label.get(label) {
            let binding = &mut self.bindings[slot];
            binding.counter = counter.to_string();
            binding.resolved = None;
            return;
        }

        self.by_label.insert(label.to_string(), self.bindings.len());
        self.bindings.push(LabelBinding {
            label: label.to_string(),
            counter: counter.to_string(),
            resolved: None,
        });
    }

    /// Look every binding up in `index`. Returns how many resolved.
    pub fn resolve_all(&mut self, index: &CounterIndex) -> usize {
        let mut resolved = 0;
        for binding in &mut self.bindings {
            binding.resolved = index.lookup(&binding.counter);
            match binding.resolved {
                Some(_) => resolved += 1,
                None => tracing::debug!(
                    label = %binding.label,
                    counter = %binding.counter,
                    "Counter not published"
                ),
            }
        }
        tracing::debug!(resolved, total = self.bindings.len(), "Resolved sample labels");
        resolved
    }

    pub fn handle(&self, label: &str) -> Option<RecordRef> {
        self.by_label
            .get(label)
            .and_then(|&slot| self.bindings[slot].resolved)
    }

    pub fn is_resolved(&self, label: &str) -> bool {
        self.handle(label).is_some()
    }

    /// Bindings whose counter was not found by the last resolve.
    pub fn unresolved(&self) -> impl Iterator<Item = &LabelBinding> {
        self.bindings.iter().filter(|b| b.resolved.is_none())
    }

    /// Bindings in registration order.
    pub fn bindings(&self) -> &[LabelBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Pair the registry with the region bytes for reading.
    pub fn view<'a>(&'a self, buf: &'a [u8]) -> SampleView<'a> {
        SampleView {
            registry: self,
            buf,
        }
    }
}

/// Read access to registered labels over one borrow of the region.
#[derive(Debug, Clone, Copy)]
pub struct SampleView<'a> {
    registry: &'a SampleRegistry,
    buf: &'a [u8],
}

impl<'a> SampleView<'a> {
    /// Current value of `label`, `None` if it is unknown or unresolved.
    pub fn get(&self, label: &str) -> Option<PerfValue> {
        self.registry.handle(label)?.read(self.buf)
    }

    pub fn get_f64(&self, label: &str) -> Option<f64> {
        self.get(label)?.as_f64()
    }

    pub fn get_i64(&self, label: &str) -> Option<i64> {
        self.get(label)?.as_i64()
    }

    pub fn registry(&self) -> &'a SampleRegistry {
        self.registry
    }
}
