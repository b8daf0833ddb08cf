//! `cel show status` line formatting (§6). CLI argument parsing itself
//! stays out of scope; this is the pure function producing the exact
//! text a CLI frontend would print.

use crate::backend::BackendRegistry;
use crate::config::CelConfig;
use crate::constants::{
    STATUS_APP_PREFIX, STATUS_DISABLED_LINE, STATUS_ENABLED_LINE, STATUS_EVENT_PREFIX,
    STATUS_SUBSCRIBER_PREFIX,
};
use crate::event::CelEventType;

pub fn status_report(config: &CelConfig, backends: &BackendRegistry) -> Vec<String> {
    let mut lines = Vec::new();

    if !config.enable {
        lines.push(STATUS_DISABLED_LINE.to_string());
        return lines;
    }
    lines.push(STATUS_ENABLED_LINE.to_string());

    for ev in CelEventType::ALL {
        if config.is_tracked(ev) {
            lines.push(format!("{STATUS_EVENT_PREFIX}{ev}"));
        }
    }

    for app in &config.apps {
        lines.push(format!("{STATUS_APP_PREFIX}{app}"));
    }

    for backend in backends.names() {
        lines.push(format!("{STATUS_SUBSCRIBER_PREFIX}{backend}"));
    }

    lines
}
