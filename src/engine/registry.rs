//! Handle-based digest engine
//!
//! Contexts live in a slot arena. A [`ContextHandle`] pairs a slot index
//! with the slot's generation; destroying a context bumps the generation,
//! so any later use of the old handle is reported as a stale handle
//! instead of touching a reused slot. A slot whose generation reaches
//! `u32::MAX` is retired rather than reused.

use super::{ContextState, Digest, DigestContext};
use crate::catalog;
use crate::config::EngineConfig;
use crate::error::{DigestError, Result};

/// Opaque reference to a live context inside a [`DigestEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle {
    index: u32,
    generation: u32,
}

impl ContextHandle {
    /// Pack into the opaque integer handed to the host
    pub fn to_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Unpack a host-supplied integer. Validity is checked on use.
    pub fn from_raw(raw: u64) -> Self {
        Self {
            index: raw as u32,
            generation: (raw >> 32) as u32,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    context: Option<DigestContext>,
}

/// Lifecycle operations over handle-addressed contexts
///
/// The engine holds no state shared between contexts beyond the static
/// catalog; callers that share one engine across threads wrap it in their
/// own lock.
#[derive(Debug, Default)]
pub struct DigestEngine {
    config: EngineConfig,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl DigestEngine {
    /// Create an engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of contexts created and not yet destroyed
    pub fn live_contexts(&self) -> usize {
        self.live
    }

    /// Create a context for an algorithm identifier
    pub fn create(&mut self, identifier: i64) -> Result<ContextHandle> {
        let descriptor = catalog::resolve(identifier)?;

        self.config.ensure_enabled(descriptor.algorithm)?;

        if let Some(limit) = self.config.max_live_contexts {
            if self.live >= limit {
                return Err(DigestError::Allocation(format!(
                    "live context limit of {} reached",
                    limit
                )));
            }
        }

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| {
                    DigestError::Allocation("context handle space exhausted".to_string())
                })?;
                self.slots
                    .try_reserve(1)
                    .map_err(|e| DigestError::allocation("context slot", e))?;
                // Reserve the free-list entry now so destroy never allocates.
                self.free
                    .try_reserve(self.slots.len() + 1 - self.free.len())
                    .map_err(|e| DigestError::allocation("context slot", e))?;
                self.slots.push(Slot {
                    generation: 1,
                    context: None,
                });
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.context = Some(DigestContext::with_descriptor(descriptor));
        self.live += 1;

        let handle = ContextHandle {
            index,
            generation: slot.generation,
        };
        tracing::debug!(
            "Created {} context {:#018x} ({} live)",
            descriptor.name(),
            handle.to_raw(),
            self.live
        );
        Ok(handle)
    }

    /// Feed a chunk of data into a context
    pub fn update(&mut self, handle: ContextHandle, data: &[u8]) -> Result<()> {
        self.context_mut(handle)?.update(data)
    }

    /// Produce the digest of a context. The context must still be destroyed.
    pub fn finalize(&mut self, handle: ContextHandle) -> Result<Digest> {
        self.context_mut(handle)?.finalize()
    }

    /// Release a context. The handle is stale afterwards.
    pub fn destroy(&mut self, handle: ContextHandle) -> Result<()> {
        self.context_mut(handle)?.destroy()?;

        let slot = &mut self.slots[handle.index as usize];
        slot.context = None;
        match slot.generation.checked_add(1) {
            Some(generation) => {
                slot.generation = generation;
                self.free.push(handle.index);
            }
            // Generation space exhausted: the slot is retired, never reused.
            None => tracing::debug!("Retiring context slot {}", handle.index),
        }
        self.live -= 1;

        tracing::debug!(
            "Destroyed context {:#018x} ({} live)",
            handle.to_raw(),
            self.live
        );
        Ok(())
    }

    /// State of the context behind a handle
    pub fn state(&self, handle: ContextHandle) -> Result<ContextState> {
        self.context(handle).map(DigestContext::state)
    }

    /// Borrow the context behind a handle
    pub fn context(&self, handle: ContextHandle) -> Result<&DigestContext> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.context.as_ref())
            .ok_or(DigestError::StaleHandle(handle.to_raw()))
    }

    fn context_mut(&mut self, handle: ContextHandle) -> Result<&mut DigestContext> {
        match self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.context.as_mut())
        {
            Some(context) => Ok(context),
            None => {
                tracing::warn!("Rejecting stale context handle {:#018x}", handle.to_raw());
                Err(DigestError::StaleHandle(handle.to_raw()))
            }
        }
    }
}
