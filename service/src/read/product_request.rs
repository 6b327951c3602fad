//! [`ProductRequest`] read model definition.
//!
//! [`ProductRequest`]: crate::domain::ProductRequest

pub mod list {
    //! [`ProductRequest`]s list definitions.

    use std::cmp::Ordering;

    use common::define_pagination;
    use strum::{Display, EnumString};

    use crate::domain::{product_request, user, ProductRequest};

    define_pagination!(ProductRequest, Filter, Sort);

    /// Default number of [`ProductRequest`]s on a [`Page`].
    pub const DEFAULT_PER_PAGE: usize = 5;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`User`] whose [`ProductRequest`]s are listed.
        ///
        /// [`User`]: crate::domain::User
        pub owner_id: user::Id,

        /// Exact [`product_request::Priority`] to filter by, if any.
        pub priority: Option<product_request::Priority>,
    }

    impl Filter {
        /// Checks whether the provided [`ProductRequest`] passes this
        /// [`Filter`].
        #[must_use]
        pub fn matches(&self, request: &ProductRequest) -> bool {
            request.owner_id == self.owner_id
                && self.priority.map_or(true, |p| request.priority == p)
        }
    }

    /// Field to sort [`ProductRequest`]s by in ascending order.
    ///
    /// Ties are broken by [`product_request::Id`].
    #[derive(
        Clone, Copy, Debug, Default, Display, EnumString, Eq, Hash, PartialEq,
    )]
    #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
    pub enum Sort {
        /// Sort by [`product_request::Priority`].
        Priority,

        /// Sort by [`product_request::RequestDateTime`].
        #[default]
        RequestDate,

        /// Sort by the [`Date`] the product is required by.
        ///
        /// [`Date`]: common::Date
        RequiredByDate,

        /// Sort by [`product_request::ProductUrl`].
        ProductUrl,
    }

    impl Sort {
        /// Compares the provided [`ProductRequest`]s according to this
        /// [`Sort`].
        #[must_use]
        pub fn compare(
            self,
            a: &ProductRequest,
            b: &ProductRequest,
        ) -> Ordering {
            match self {
                Self::Priority => a.priority.cmp(&b.priority),
                Self::RequestDate => a.requested_at.cmp(&b.requested_at),
                Self::RequiredByDate => a.required_by.cmp(&b.required_by),
                Self::ProductUrl => a.product_url.cmp(&b.product_url),
            }
            .then_with(|| a.id.cmp(&b.id))
        }
    }
}
