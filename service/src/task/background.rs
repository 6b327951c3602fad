//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
    iter,
};

use derive_more::Display;
use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Handle of a [`Task`] spawned in a [`Background`].
type Handle = task::JoinHandle<Result<(), Failure>>;

/// Background environment for running named [`Task`]s.
///
/// Resolves once every spawned [`Task`] finishes, or with the first
/// [`Failure`].
#[derive(Debug, Default)]
pub struct Background {
    /// Local set driving the spawned [`Task`]s.
    set: task::LocalSet,

    /// Handles of the spawned [`Task`]s.
    handles: Vec<Handle>,
}

impl Background {
    /// Spawns a new [`Task`] identified by the provided `name` inside this
    /// [`Background`] environment.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        self.handles.push(self.set.spawn_local(future.map_err(move |e| {
            Failure {
                task: name,
                source: Box::new(e),
            }
        })));
    }

    /// Returns the number of [`Task`]s spawned in this [`Background`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Indicates whether no [`Task`]s have been spawned in this
    /// [`Background`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl IntoFuture for Background {
    type Output = Result<(), Failure>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;
        let joined = handles.into_iter().map(|h| {
            h.map(|res| {
                res.unwrap_or_else(|e| {
                    Err(Failure {
                        task: "<unknown>",
                        source: Box::new(e),
                    })
                })
            })
            .boxed_local()
        });
        let set = set.map(Ok).boxed_local();
        future::try_join_all(iter::once(set).chain(joined))
            .map_ok(drop)
            .boxed_local()
    }
}

/// Failure of a [`Task`] running in a [`Background`].
#[derive(Debug, Display)]
#[display("`{task}` task failed: {source}")]
pub struct Failure {
    /// Name of the failed [`Task`].
    task: &'static str,

    /// Error the [`Task`] failed with.
    source: Box<dyn Error + 'static>,
}

impl Failure {
    /// Returns the name of the failed [`Task`].
    #[must_use]
    pub fn task(&self) -> &'static str {
        self.task
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}
