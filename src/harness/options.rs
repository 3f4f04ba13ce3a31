//! Per-run activation options.

use std::any::Any;

use crate::core::{BoxedState, State};

use super::panic::{self, Panic};

/// One configuration item for a supervised run.
///
/// Options are built by [`finally`] and [`on_error`] and handed to
/// [`activate`](super::activate) as an ordered list; they apply in order,
/// so a later option of the same kind replaces an earlier one.
pub struct ActivateOption<E>(pub(crate) Kind<E>);

pub(crate) enum Kind<E> {
    Finally(BoxedState<E>),
    OnError(ErrorHook<E>),
}

/// The armed recovery hook: the handler itself plus the payload
/// normalizer monomorphized for `E` when the option was built.
pub(crate) struct ErrorHook<E> {
    pub(crate) handler: Box<dyn FnOnce(&E) -> BoxedState<E>>,
    pub(crate) normalize: fn(Box<dyn Any + Send>) -> E,
}

/// Folded options record for a single run. Never reused.
pub(crate) struct Options<E> {
    pub(crate) finally: Option<BoxedState<E>>,
    pub(crate) on_error: Option<ErrorHook<E>>,
}

impl<E> Default for Options<E> {
    fn default() -> Self {
        Options {
            finally: None,
            on_error: None,
        }
    }
}

impl<E> Options<E> {
    pub(crate) fn apply(&mut self, option: ActivateOption<E>) {
        match option.0 {
            Kind::Finally(state) => self.finally = Some(state),
            Kind::OnError(hook) => self.on_error = Some(hook),
        }
    }
}

/// Registers the state that runs once after the main chain, whether the
/// chain succeeded or failed. Its own chain's error is discarded; it is
/// for side effects such as cleanup. It does not run when the main chain
/// panics.
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use relay::harness::{self, finally};
/// use relay::{state_fn, Transition};
///
/// let cleaned = Rc::new(Cell::new(false));
/// let probe = Rc::clone(&cleaned);
///
/// let result: Result<(), String> = harness::activate(
///     state_fn(|| Err(String::from("chain failed"))),
///     [finally(state_fn(move || {
///         probe.set(true);
///         Ok(None)
///     }))],
/// );
///
/// assert_eq!(result, Err(String::from("chain failed")));
/// assert!(cleaned.get());
/// ```
pub fn finally<E>(state: impl State<E> + 'static) -> ActivateOption<E> {
    ActivateOption(Kind::Finally(Box::new(state)))
}

/// Registers the hook that maps the run's error to a recovery state,
/// and arms panic recovery for the run.
///
/// The hook fires after the main chain (and the [`finally`] state, if
/// any) whenever the run resolves to an error, including an error
/// recovered from a panic. The state it returns is driven through the
/// bare loop with its own error discarded; the hook exists for side
/// effects, never for replacing the run's result. The hook itself must
/// not panic.
///
/// `E: From<Panic>` is what absorbs panics whose payload was not already
/// an `E`; a payload that is an `E` is returned exactly as panicked.
pub fn on_error<E, F>(handler: F) -> ActivateOption<E>
where
    E: From<Panic> + 'static,
    F: FnOnce(&E) -> BoxedState<E> + 'static,
{
    ActivateOption(Kind::OnError(ErrorHook {
        handler: Box::new(handler),
        normalize: panic::normalize::<E>,
    }))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::core::{self, state_fn};

    fn marker(flag: &Rc<Cell<u32>>, value: u32) -> BoxedState<Panic> {
        let flag = Rc::clone(flag);
        state_fn(move || {
            flag.set(value);
            Ok(None)
        })
    }

    #[test]
    fn later_finally_replaces_earlier() {
        let flag = Rc::new(Cell::new(0));
        let mut options = Options::default();
        options.apply(finally(marker(&flag, 1)));
        options.apply(finally(marker(&flag, 2)));

        let kept = options.finally.expect("a final state is kept");
        assert_eq!(core::activate(kept), Ok(()));
        assert_eq!(flag.get(), 2);
    }

    #[test]
    fn later_on_error_replaces_earlier() {
        let flag = Rc::new(Cell::new(0));
        let first = Rc::clone(&flag);
        let second = Rc::clone(&flag);
        let mut options = Options::default();
        options.apply(on_error(move |_: &Panic| marker(&first, 1)));
        options.apply(on_error(move |_: &Panic| marker(&second, 2)));

        let hook = options.on_error.expect("a hook is kept");
        let state = (hook.handler)(&Panic::new("probe"));
        assert_eq!(core::activate(state), Ok(()));
        assert_eq!(flag.get(), 2);
    }

    #[test]
    fn option_kinds_do_not_displace_each_other() {
        let flag = Rc::new(Cell::new(0));
        let hooked = Rc::clone(&flag);
        let mut options = Options::default();
        options.apply(finally(marker(&flag, 1)));
        options.apply(on_error(move |_: &Panic| marker(&hooked, 2)));

        assert!(options.finally.is_some());
        assert!(options.on_error.is_some());
    }
}
