//! Configuration value type and the config-gated filter (§4.11).

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::error::{CelError, CelResult};
use crate::event::CelEventType;

/// Immutable configuration snapshot. Replaced wholesale on reload; never
/// mutated in place once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct CelConfig {
    pub enable: bool,
    pub dateformat: Option<String>,
    /// 64-bit mask indexed by `CelEventType::mask_bit()`.
    pub events_mask: u64,
    /// Lowercased application names.
    pub apps: HashSet<String>,
}

impl Default for CelConfig {
    fn default() -> Self {
        CelConfig {
            enable: false,
            dateformat: None,
            events_mask: 0,
            apps: HashSet::new(),
        }
    }
}

impl CelConfig {
    pub fn is_tracked(&self, event_type: CelEventType) -> bool {
        self.events_mask & event_type.mask_bit() != 0
    }

    /// Pre-apply validation (§4.11): if `apps` is non-empty but neither
    /// `APP_START` nor `APP_END` is tracked, the app filter could never
    /// match, so the config is rejected.
    pub fn validate(&self) -> CelResult<()> {
        if !self.apps.is_empty()
            && !self.is_tracked(CelEventType::AppStart)
            && !self.is_tracked(CelEventType::AppEnd)
        {
            return Err(CelError::AppsWithoutAppEvents);
        }
        Ok(())
    }
}

/// Atomically-swappable holder for the active `CelConfig`. Readers clone
/// the `Arc` once at the top of a handler invocation and work from that
/// owned snapshot for the call's duration (§5: "atomic config swap").
#[derive(Debug)]
pub struct ConfigHolder {
    current: RwLock<Arc<CelConfig>>,
}

impl ConfigHolder {
    pub fn new(config: CelConfig) -> Self {
        ConfigHolder {
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn get(&self) -> Arc<CelConfig> {
        self.current.read().unwrap().clone()
    }

    /// Validates `config`, then swaps it in atomically. On validation
    /// failure the previously active config is left untouched.
    pub fn reload(&self, config: CelConfig) -> CelResult<()> {
        config.validate()?;
        *self.current.write().unwrap() = Arc::new(config);
        Ok(())
    }
}

impl Default for ConfigHolder {
    fn default() -> Self {
        ConfigHolder::new(CelConfig::default())
    }
}

/// Gating decision for a candidate event, per `spec.md` §4.11's exact
/// order. `appl` is only consulted for `APP_START`/`APP_END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Report,
    Drop,
}

/// Implements `report(event_type, snapshot)` from §4.11. The linkedid
/// acquire side effect on `CHANNEL_START` happens even when the overall
/// decision is `Drop`, because `LINKEDID_END` depends on it regardless of
/// whether `CHANNEL_START` itself is reported — callers must invoke
/// `linkedid_acquire_if_needed` themselves before checking this decision
/// (kept as a separate step so this function stays a pure predicate).
pub fn should_report(config: &CelConfig, event_type: CelEventType, appl_lower: Option<&str>) -> FilterDecision {
    if !config.enable {
        return FilterDecision::Drop;
    }
    if !config.is_tracked(event_type) {
        return FilterDecision::Drop;
    }
    if matches!(event_type, CelEventType::AppStart | CelEventType::AppEnd) {
        let matches_app = appl_lower.map(|a| config.apps.contains(a)).unwrap_or(false);
        if !matches_app {
            return FilterDecision::Drop;
        }
    }
    FilterDecision::Report
}

/// Whether a `CHANNEL_START` candidate should trigger a linkedid acquire,
/// independent of whether the event itself will be reported (§4.11).
pub fn needs_linkedid_acquire_on_channel_start(config: &CelConfig, event_type: CelEventType) -> bool {
    config.enable && event_type == CelEventType::ChannelStart && config.is_tracked(CelEventType::LinkedidEnd)
}
