//! Abstract operations executed by [`Handler`]s.

use std::marker::PhantomData;

use crate::Handler;

/// Operation storing a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation replacing the mutable part of a stored value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Operation removing a stored value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Operation reading stored values.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation spawning a long-running process, such as a background task.
#[derive(Clone, Copy, Debug)]
pub struct Start<T>(pub T);

/// Operation running a single iteration of a process.
#[derive(Clone, Copy, Debug)]
pub struct Perform<T>(pub T);

/// Operation opening a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// [`Handler`] running inside a transaction opened by `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Operation committing a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W`hat by a `B`y key.
///
/// `W` only tags the expected result, so different [`Select`]s by the same
/// key type stay distinguishable.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Key to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector with the provided key.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns a reference to the key of this selector.
    #[must_use]
    pub fn inner(&self) -> &B {
        &self.by
    }

    /// Consumes this selector returning its key.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
