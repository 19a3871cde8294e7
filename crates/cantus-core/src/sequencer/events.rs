//! Named continuations registered with `on` and triggered with `launch`.

use super::{ActionOutcome, Sequencer};
use crate::{BoxError, Error, Result};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Handler<C> =
    Box<dyn FnMut(&mut Sequencer<C>, &EventArgs) -> core::result::Result<(), BoxError> + Send>;

/// Positional arguments passed to an event handler.
///
/// # Example
/// ```ignore
/// seq.on("phrase", |seq, args| {
///     let bar = args.get::<i64>(0).copied().unwrap_or(1);
///     ...
/// });
/// seq.launch_with("phrase", EventArgs::new().with(3i64))?;
/// ```
#[derive(Default)]
pub struct EventArgs {
    values: Vec<Box<dyn Any + Send>>,
}

impl EventArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Any + Send>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn push<T: Any + Send>(&mut self, value: T) {
        self.values.push(Box::new(value));
    }

    /// Argument at `index`, if present and of type `T`.
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.downcast_ref::<T>()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for EventArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventArgs")
            .field("len", &self.values.len())
            .finish()
    }
}

pub(crate) struct EventRegistry<C> {
    handlers: HashMap<String, Arc<Mutex<Handler<C>>>>,
}

impl<C> EventRegistry<C> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Returns `true` if an existing handler was replaced.
    fn insert(&mut self, name: String, handler: Handler<C>) -> bool {
        self.handlers
            .insert(name, Arc::new(Mutex::new(handler)))
            .is_some()
    }

    fn get(&self, name: &str) -> Option<Arc<Mutex<Handler<C>>>> {
        self.handlers.get(name).cloned()
    }

    fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

impl<C: 'static> Sequencer<C> {
    /// Register `handler` under `name`, replacing any previous handler.
    pub fn on<F, O>(&mut self, name: impl Into<String>, mut handler: F)
    where
        F: FnMut(&mut Sequencer<C>, &EventArgs) -> O + Send + 'static,
        O: ActionOutcome,
    {
        let name = name.into();
        let replaced = self.events.insert(
            name.clone(),
            Box::new(move |seq: &mut Sequencer<C>, args: &EventArgs| {
                handler(seq, args).into_result()
            }),
        );
        if replaced {
            tracing::debug!("Replaced handler for event '{}'", name);
        }
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.events.contains(name)
    }

    /// Run the handler registered under `name` now, at the current position.
    pub fn launch(&mut self, name: &str) -> Result<()> {
        self.launch_with(name, EventArgs::new())
    }

    pub fn launch_with(&mut self, name: &str, args: EventArgs) -> Result<()> {
        let Some(handler) = self.events.get(name) else {
            tracing::warn!("Launch of unregistered event '{}' ignored", name);
            return Err(Error::UnknownEvent(name.to_owned()));
        };
        let Some(mut handler) = handler.try_lock() else {
            return Err(Error::EventBusy(name.to_owned()));
        };

        if self.config().log_events {
            tracing::debug!("Launching event '{}' at {}", name, self.position());
        }
        (*handler)(self, &args).map_err(|error| Error::EventFailed {
            name: name.to_owned(),
            message: error.to_string(),
        })
    }
}
