//! The `State` contract and the closure adapter.

/// A boxed state, ready to be chained.
pub type BoxedState<E> = Box<dyn State<E>>;

/// The decision a state produces when activated: the next state to run,
/// `None` to end the chain, or an error that stops the run.
///
/// Because the next state and the error share a `Result`, a state cannot
/// hand back both at once; an error always wins.
pub type Transition<E> = Result<Option<BoxedState<E>>, E>;

/// A unit of work in a chain.
///
/// Activating a state performs its work and yields a [`Transition`]: the
/// next state to run, `Ok(None)` to terminate, or `Err` to fail the run.
/// All context a state needs is captured by the implementing value; the
/// error type `E` is chosen by the caller and carries no bounds.
///
/// Activation consumes the state. A state is activated exactly as many
/// times as it appears as a "next" result, and the runtime never copies or
/// stores it beyond that single call. A state may legitimately hand itself
/// back to run again:
///
/// ```rust
/// use relay::{BoxedState, State, Transition};
///
/// struct Countdown {
///     remaining: u32,
/// }
///
/// impl State<String> for Countdown {
///     fn activate(mut self: Box<Self>) -> Transition<String> {
///         if self.remaining == 0 {
///             return Ok(None);
///         }
///         self.remaining -= 1;
///         Ok(Some(self))
///     }
/// }
///
/// let result = relay::activate(Countdown { remaining: 4 });
/// assert_eq!(result, Ok(()));
/// ```
///
/// Most chains never define a struct per state; they build states from
/// closures with [`state_fn`].
pub trait State<E> {
    /// Runs this state's work and decides what happens next.
    fn activate(self: Box<Self>) -> Transition<E>;
}

/// Adapter that lets a plain closure act as a [`State`].
///
/// Any `FnOnce() -> Transition<E>` qualifies. The closure's capture list is
/// where application code keeps its context, typically shared ownership of
/// some long-lived owner object:
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use relay::{StateFn, Transition};
///
/// let fired = Rc::new(Cell::new(false));
/// let probe = Rc::clone(&fired);
///
/// let state = StateFn(move || -> Transition<String> {
///     probe.set(true);
///     Ok(None)
/// });
///
/// assert_eq!(relay::activate(state), Ok(()));
/// assert!(fired.get());
/// ```
pub struct StateFn<F>(pub F);

impl<E, F> State<E> for StateFn<F>
where
    F: FnOnce() -> Transition<E>,
{
    fn activate(self: Box<Self>) -> Transition<E> {
        (self.0)()
    }
}

/// Wraps a closure straight into a [`BoxedState`].
///
/// This is the usual way a state names its successor:
///
/// ```rust
/// use relay::{state_fn, Transition};
///
/// fn greet() -> Transition<String> {
///     Ok(Some(state_fn(|| Ok(None))))
/// }
///
/// assert_eq!(relay::activate(state_fn(greet)), Ok(()));
/// ```
pub fn state_fn<E, F>(f: F) -> BoxedState<E>
where
    F: FnOnce() -> Transition<E> + 'static,
{
    Box::new(StateFn(f))
}

// A boxed state is itself a state, so `BoxedState` values flow anywhere an
// `impl State` is expected.
impl<E> State<E> for BoxedState<E> {
    fn activate(self: Box<Self>) -> Transition<E> {
        (*self).activate()
    }
}
