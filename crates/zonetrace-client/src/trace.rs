//! Observer hooks.
//!
//! The driver reports progress through two optional callbacks so a
//! front-end can print each hop without the engine knowing about
//! terminals. Callbacks are best-effort sinks: the driver calls them
//! synchronously and does not guard against panics inside them.

use crate::classify::ResponseKind;
use crate::server::Responses;
use zonetrace_proto::{Message, Name};

/// Called once per driver iteration after all responses of the fan-out
/// have arrived and the classification is known. The message is the
/// query as it was sent on that iteration, cloned so the observer may
/// keep it.
pub type ResponseHook = Box<dyn Fn(u32, Message, &Responses, ResponseKind) + Send + Sync>;

/// Called when the driver is about to follow an alias, with the owner
/// name and the target it redirects to.
pub type CnameHook = Box<dyn Fn(&Name, &Name) + Send + Sync>;

/// A set of observer hooks; any may be absent.
///
/// The presence of a response hook changes one engine behavior: with no
/// observer, delegation processing stops after the first NS record since
/// nobody will look at per-server statistics.
#[derive(Default)]
pub struct Tracer {
    /// Per-iteration observer.
    pub on_response: Option<ResponseHook>,
    /// Alias-following observer.
    pub on_cname: Option<CnameHook>,
}

impl Tracer {
    /// A tracer with no hooks, used by nested address resolutions.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Returns true if per-server statistics are being observed.
    pub fn observes_responses(&self) -> bool {
        self.on_response.is_some()
    }

    pub(crate) fn emit_response(
        &self,
        step: u32,
        query: &Message,
        responses: &Responses,
        kind: ResponseKind,
    ) {
        if let Some(hook) = &self.on_response {
            hook(step, query.clone(), responses, kind);
        }
    }

    pub(crate) fn emit_cname(&self, owner: &Name, target: &Name) {
        if let Some(hook) = &self.on_cname {
            hook(owner, target);
        }
    }
}
