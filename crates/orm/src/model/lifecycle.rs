//! Model lifecycle hooks
//!
//! Observers are plain pass-throughs by default. Nothing in the crate fires
//! events on its own; write paths call [`Observers::fire`] and stop at the
//! first observer error.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{OrmError, OrmResult};
use crate::model::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    BeforeSave,
    AfterSave,
    BeforeCreate,
    AfterCreate,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 8] = [
        LifecycleEvent::BeforeSave,
        LifecycleEvent::AfterSave,
        LifecycleEvent::BeforeCreate,
        LifecycleEvent::AfterCreate,
        LifecycleEvent::BeforeUpdate,
        LifecycleEvent::AfterUpdate,
        LifecycleEvent::BeforeDelete,
        LifecycleEvent::AfterDelete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::BeforeSave => "before_save",
            LifecycleEvent::AfterSave => "after_save",
            LifecycleEvent::BeforeCreate => "before_create",
            LifecycleEvent::AfterCreate => "after_create",
            LifecycleEvent::BeforeUpdate => "before_update",
            LifecycleEvent::AfterUpdate => "after_update",
            LifecycleEvent::BeforeDelete => "before_delete",
            LifecycleEvent::AfterDelete => "after_delete",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an observer sees of the model
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub table: &'a str,
    pub data: Option<&'a Record>,
}

#[async_trait]
pub trait ModelObserver: Send + Sync {
    async fn before_save(&self, _ctx: HookContext<'_>) -> OrmResult<()> {
        Ok(())
    }

    async fn after_save(&self, _ctx: HookContext<'_>) -> OrmResult<()> {
        Ok(())
    }

    async fn before_create(&self, _ctx: HookContext<'_>) -> OrmResult<()> {
        Ok(())
    }

    async fn after_create(&self, _ctx: HookContext<'_>) -> OrmResult<()> {
        Ok(())
    }

    async fn before_update(&self, _ctx: HookContext<'_>) -> OrmResult<()> {
        Ok(())
    }

    async fn after_update(&self, _ctx: HookContext<'_>) -> OrmResult<()> {
        Ok(())
    }

    async fn before_delete(&self, _ctx: HookContext<'_>) -> OrmResult<()> {
        Ok(())
    }

    async fn after_delete(&self, _ctx: HookContext<'_>) -> OrmResult<()> {
        Ok(())
    }
}

/// Registered observers, invoked in registration order
#[derive(Clone, Default)]
pub struct Observers {
    observers: Vec<Arc<dyn ModelObserver>>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").field("count", &self.observers.len()).finish()
    }
}

impl Observers {
    pub fn register(&mut self, observer: Arc<dyn ModelObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub async fn fire(&self, event: LifecycleEvent, ctx: HookContext<'_>) -> OrmResult<()> {
        for observer in &self.observers {
            let result = match event {
                LifecycleEvent::BeforeSave => observer.before_save(ctx).await,
                LifecycleEvent::AfterSave => observer.after_save(ctx).await,
                LifecycleEvent::BeforeCreate => observer.before_create(ctx).await,
                LifecycleEvent::AfterCreate => observer.after_create(ctx).await,
                LifecycleEvent::BeforeUpdate => observer.before_update(ctx).await,
                LifecycleEvent::AfterUpdate => observer.after_update(ctx).await,
                LifecycleEvent::BeforeDelete => observer.before_delete(ctx).await,
                LifecycleEvent::AfterDelete => observer.after_delete(ctx).await,
            };

            if let Err(err) = result {
                tracing::debug!(%event, table = ctx.table, error = %err, "lifecycle hook failed");
                return Err(match err {
                    hook @ OrmError::Hook { .. } => hook,
                    other => OrmError::Hook {
                        event: event.to_string(),
                        message: other.to_string(),
                    },
                });
            }
        }
        Ok(())
    }
}
