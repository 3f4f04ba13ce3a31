//! Supervised activation.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::core::{self, BoxedState, State};

use super::options::{ActivateOption, Options};

/// Activates `initial` under the configured options and returns the run's
/// error, if any.
///
/// Options apply in order, later ones of the same kind replacing earlier
/// ones. The main chain runs first; the [`finally`](super::finally) state
/// (if configured) runs next through the bare loop whether the chain
/// succeeded or failed, its error discarded. When an
/// [`on_error`](super::on_error) hook is configured, the whole run is
/// wrapped in a panic boundary: a caught payload resolves to the run's
/// error (the exact value when the payload already was one), and the hook
/// then fires with that error, its resulting state driven with the error
/// discarded. The run's own result is returned unchanged; nothing the
/// cleanup state or the hook does can alter it.
///
/// Two deliberate edges:
///
/// - Without `on_error` there is no boundary: a panic unwinds to the
///   caller, and the cleanup state does not run.
/// - With `on_error`, a main-chain panic still skips the cleanup state.
///   Recovery resolves the error only after the unwind has already passed
///   the cleanup step, so only the hook observes such a run.
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use relay::harness::{self, finally, on_error, Panic};
/// use relay::{state_fn, Transition};
///
/// #[derive(Debug, PartialEq)]
/// enum UploadError {
///     Refused,
///     Panicked(Panic),
/// }
///
/// impl From<Panic> for UploadError {
///     fn from(panic: Panic) -> Self {
///         UploadError::Panicked(panic)
///     }
/// }
///
/// let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
///
/// let upload = {
///     let log = Rc::clone(&log);
///     state_fn(move || -> Transition<UploadError> {
///         log.borrow_mut().push("upload");
///         Err(UploadError::Refused)
///     })
/// };
/// let cleanup = {
///     let log = Rc::clone(&log);
///     state_fn(move || {
///         log.borrow_mut().push("cleanup");
///         Ok(None)
///     })
/// };
/// let rollback = {
///     let log = Rc::clone(&log);
///     move |_err: &UploadError| {
///         let log = Rc::clone(&log);
///         state_fn(move || {
///             log.borrow_mut().push("rollback");
///             Ok(None)
///         })
///     }
/// };
///
/// let result = harness::activate(upload, [finally(cleanup), on_error(rollback)]);
///
/// assert_eq!(result, Err(UploadError::Refused));
/// assert_eq!(*log.borrow(), ["upload", "cleanup", "rollback"]);
/// ```
pub fn activate<E, S, I>(initial: S, options: I) -> Result<(), E>
where
    S: State<E>,
    I: IntoIterator<Item = ActivateOption<E>>,
{
    let mut folded = Options::default();
    for option in options {
        folded.apply(option);
    }
    let Options { finally, on_error } = folded;

    let Some(hook) = on_error else {
        return run_to_completion(initial, finally);
    };

    let outcome = catch_unwind(AssertUnwindSafe(move || {
        run_to_completion(initial, finally)
    }));
    let result = match outcome {
        Ok(result) => result,
        Err(payload) => Err((hook.normalize)(payload)),
    };
    if let Err(err) = &result {
        let _ = core::activate((hook.handler)(err));
    }
    result
}

/// Runs the main chain, then the cleanup chain; the cleanup chain's error
/// is dropped.
fn run_to_completion<E, S>(initial: S, finally: Option<BoxedState<E>>) -> Result<(), E>
where
    S: State<E>,
{
    let result = core::activate(initial);
    if let Some(state) = finally {
        let _ = core::activate(state);
    }
    result
}
