//! Stub [`ImageResolver`] implementation.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use common::operations::{By, Select};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::product_request::{ImageUrl, ProductUrl},
    infra::image,
};

use super::ImageResolver;

/// [`ImageResolver`] answering every request with a predefined [`Outcome`].
#[derive(Clone, Debug)]
pub struct Stub {
    /// [`Outcome`] of every resolution.
    outcome: Outcome,

    /// Number of performed resolutions.
    calls: Arc<AtomicUsize>,
}

/// Predefined outcome of a [`Stub`] resolution.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// [`ImageUrl`] is resolved.
    Found(ImageUrl),

    /// No image exists.
    NotFound,

    /// Resolution fails.
    Fail,

    /// Resolution never completes.
    Hang,
}

impl Stub {
    /// Creates a new [`Stub`] answering with the provided [`Outcome`].
    #[must_use]
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: Arc::default(),
        }
    }

    /// Creates a new [`Stub`] resolving the provided `url`.
    #[must_use]
    pub fn found(url: &str) -> Self {
        Self::new(Outcome::Found(url.parse().expect("valid `ImageUrl`")))
    }

    /// Returns the number of performed resolutions.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// [`Stub`] error.
#[derive(Clone, Copy, Debug, Display, StdError)]
#[display("stub resolution failed")]
pub struct Error;

impl ImageResolver<Select<By<Option<ImageUrl>, ProductUrl>>> for Stub {
    type Ok = Option<ImageUrl>;
    type Err = Traced<image::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<ImageUrl>, ProductUrl>>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Found(url) => Ok(Some(url.clone())),
            Outcome::NotFound => Ok(None),
            Outcome::Fail => Err(tracerr::new!(image::Error::Stub(Error))),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Ok(None)
            }
        }
    }
}
