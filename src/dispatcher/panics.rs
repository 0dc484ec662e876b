//! Panic capture for the dispatch boundary.
//!
//! A backtrace taken after `catch_unwind` returns only shows the dispatcher's
//! own frames. The process panic hook runs before unwinding, so the hook
//! installed here records the backtrace and location of any panic raised while
//! the current thread is inside [`Dispatcher::call`](super::Dispatcher::call),
//! and stays silent so the dispatcher's `error!` event is the only report.
//! Panics outside the boundary go to the previously installed hook.

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic;
use std::sync::Once;

static INSTALL: Once = Once::new();

thread_local! {
    /// `Some(force_backtrace)` while this thread is inside a dispatch boundary
    static BOUNDARY: Cell<Option<bool>> = const { Cell::new(None) };
    static LAST_PANIC: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

/// Where a contained panic was raised, captured at the panic site.
#[derive(Debug)]
pub(crate) struct PanicReport {
    pub(crate) location: String,
    pub(crate) backtrace: Backtrace,
}

/// Install the boundary-aware panic hook. Idempotent.
pub(crate) fn install_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &panic::PanicHookInfo<'_>| {
            let Some(force) = BOUNDARY.with(Cell::get) else {
                previous(info);
                return;
            };
            let backtrace = if force {
                Backtrace::force_capture()
            } else {
                Backtrace::capture()
            };
            let location = info
                .location()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
            LAST_PANIC.with(|slot| {
                if let Ok(mut slot) = slot.try_borrow_mut() {
                    *slot = Some(PanicReport { location, backtrace });
                }
            });
        }));
    });
}

/// Marks the current thread as inside a dispatch boundary until dropped.
///
/// Nested boundaries (a handler dispatching again) restore the outer state.
pub(crate) struct BoundaryGuard {
    outer: Option<bool>,
}

impl BoundaryGuard {
    pub(crate) fn enter(force_backtrace: bool) -> Self {
        LAST_PANIC.with(|slot| slot.borrow_mut().take());
        let outer = BOUNDARY.with(|b| b.replace(Some(force_backtrace)));
        Self { outer }
    }

    /// Take the report recorded by the hook for the panic just caught.
    pub(crate) fn take_report(&self) -> Option<PanicReport> {
        LAST_PANIC.with(|slot| slot.borrow_mut().take())
    }
}

impl Drop for BoundaryGuard {
    fn drop(&mut self) {
        BOUNDARY.with(|b| b.set(self.outer));
    }
}
