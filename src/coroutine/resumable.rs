use crate::error::Error;
use crate::promise::Promise;

/// What a computation produces at a suspend point.
///
/// The closed sum over the two things a computation may park on: a promise
/// whose settlement resumes it, or a plain value echoed straight back on
/// the next tick. Echoing is still a scheduling boundary: the computation
/// is suspended and resumed through the reactor either way.
pub enum Yielded<Y: 'static> {
    /// Wait for this promise; its value (or failure) resumes the
    /// computation.
    Promise(Promise<Y>),

    /// Hand this value back as the result of the suspend point on the
    /// next tick.
    Value(Y),
}

/// The result of driving a resumable computation one step forward.
pub enum Step<Y: 'static, T> {
    /// The computation parked at a suspend point.
    Suspended(Yielded<Y>),

    /// The computation ran to completion with this value.
    Completed(T),

    /// The computation raised a failure it did not recover from.
    Failed(Error),
}

/// A sequential-looking computation that can suspend at asynchronous
/// boundaries.
///
/// This is the state-machine rendition of a generator: implementors keep
/// their position between calls (typically as an explicit stage enum) and
/// advance one suspend point per call. The coroutine driver is written
/// purely against this interface and supplies all scheduling.
///
/// The contract mirrors generator semantics:
///
/// - `resume(None)` starts the computation; it runs until its first
///   suspend point, completion, or failure.
/// - `resume(Some(value))` continues from the last suspend point, with
///   `value` as that suspend point's result.
/// - `throw_into(error)` continues from the last suspend point by raising
///   `error` there instead, giving the computation a chance to recover
///   locally before failing.
///
/// A computation that cannot be driven this way simply cannot implement
/// the trait; the "not a resumable computation" construction error is a
/// compile error here, not a runtime one.
pub trait Resumable {
    /// Value produced by awaited promises and fed back at suspend points.
    type Yield: Clone + 'static;

    /// Final value of the computation.
    type Output: 'static;

    /// Begins or continues execution with the result of the previous
    /// suspend point.
    fn resume(&mut self, input: Option<Self::Yield>) -> Step<Self::Yield, Self::Output>;

    /// Continues execution by raising `error` at the previous suspend
    /// point.
    fn throw_into(&mut self, error: Error) -> Step<Self::Yield, Self::Output>;
}
