//! Abstractions for offset-based pagination.

use std::num::NonZeroUsize;

/// Pagination arguments.
///
/// Pages are 1-indexed: the `N`th page skips `(N - 1) * per_page` items.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// Number of the requested page.
    page: NonZeroUsize,

    /// Maximum number of items on a page.
    per_page: NonZeroUsize,
}

impl Arguments {
    /// Maximum allowed number of items on a single page.
    pub const MAX_PER_PAGE: usize = 100;

    /// Creates new [`Arguments`].
    ///
    /// Missing `page` defaults to the first one, missing `per_page` defaults
    /// to the provided `default_per_page`.
    ///
    /// [`None`] is returned if `page` or `per_page` is not positive, or if
    /// `per_page` exceeds [`Arguments::MAX_PER_PAGE`].
    pub fn new<Num>(
        page: Option<Num>,
        per_page: Option<Num>,
        default_per_page: Num,
    ) -> Option<Self>
    where
        Num: TryInto<usize>,
    {
        let page = match page {
            Some(p) => p.try_into().ok()?,
            None => 1,
        };
        let per_page = per_page.unwrap_or(default_per_page).try_into().ok()?;
        if per_page > Self::MAX_PER_PAGE {
            return None;
        }

        Some(Self {
            page: NonZeroUsize::new(page)?,
            per_page: NonZeroUsize::new(per_page)?,
        })
    }

    /// Returns the number of the requested page.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page.get()
    }

    /// Returns the maximum number of items on the requested page.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.per_page.get()
    }

    /// Returns the number of items to skip before the requested page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page.get() - 1).saturating_mul(self.per_page.get())
    }
}

/// A single page of items.
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,

    /// Total number of items across all pages.
    pub total_count: usize,
}

impl<I> Page<I> {
    /// Creates a new [`Page`] out of the provided items.
    #[must_use]
    pub fn new(
        arguments: Arguments,
        items: impl IntoIterator<Item = impl Into<I>>,
        total_count: usize,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            arguments,
            total_count,
        }
    }

    /// Returns the number of this [`Page`].
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.arguments.page()
    }

    /// Returns the total number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.arguments.limit())
    }
}

/// Pagination selector.
#[derive(Clone, Copy, Debug)]
pub struct Selector<F, S> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,

    /// Field the result is sorted by.
    pub sort: S,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty, $sort:ty) => {
        #[doc = "A [`Page`] of [`$node`]s."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter, $sort>;
    };
}
