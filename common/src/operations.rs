//! Storage operations executed through a [`Handler`].

use std::marker::PhantomData;

use crate::Handler;

/// Stores a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites an already stored value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Removes a stored value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Reads stored values.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Locks a stored value until the end of the current transaction.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Opens a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Handler of a [`Transact`]ion opened by `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits a [`Transact`]ion.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of `W` values by a `B` criterion.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Kind of the selected values.
    _what: PhantomData<W>,

    /// Selection criterion.
    by: B,
}

impl<W, B> By<W, B> {
    /// Wraps the provided selection criterion.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the selection criterion.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
