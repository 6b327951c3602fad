//! Macros for defining kind enums.

/// Macro for defining a kind enum.
///
/// A kind is stored as its [`u8`] discriminant and shown as its
/// `SCREAMING_SNAKE_CASE` name.
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Preferred contact method."]
///     enum ContactMethod {
///         #[doc = "Contact via email."]
///         Email = 1,
///
///         #[doc = "Contact via phone."]
///         Phone = 2,
///     }
/// }
///
/// assert_eq!(ContactMethod::try_from(2_u8), Ok(ContactMethod::Phone));
/// assert_eq!(ContactMethod::Email.to_string(), "EMAIL");
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "SCREAMING_SNAKE_CASE"),
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }
        }

        impl ::core::convert::TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(v: u8) -> ::core::result::Result<Self, u8> {
                match v {
                    $(
                        v if Self::$variant.u8() == v => Ok(Self::$variant),
                    )*
                    v => Err(v),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let v = <i16 as $crate::private::postgres_types::FromSql>
                    ::from_sql(ty, raw)?;
                Self::try_from(u8::try_from(v)?)
                    .map_err(|v| ::std::format!(
                        "invalid `{}` value: {v}",
                        ::core::stringify!($name),
                    ).into())
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                $crate::private::postgres_types::ToSql::to_sql(
                    &i16::from(self.u8()),
                    ty,
                    w,
                )
            }
        }
    };
}

#[cfg(test)]
mod spec {
    define_kind! {
        #[doc = "Test kind."]
        enum Shape {
            #[doc = "A cube."]
            Cube = 1,

            #[doc = "A sphere."]
            Sphere = 2,
        }
    }

    #[test]
    fn converts_from_u8() {
        assert_eq!(Shape::try_from(1_u8), Ok(Shape::Cube));
        assert_eq!(Shape::try_from(2_u8), Ok(Shape::Sphere));
        assert_eq!(Shape::try_from(3_u8), Err(3));
        assert_eq!(Shape::Sphere.u8(), 2);
    }

    #[test]
    fn displays_screaming_snake_case() {
        assert_eq!(Shape::Cube.to_string(), "CUBE");
        assert_eq!("SPHERE".parse::<Shape>(), Ok(Shape::Sphere));
    }
}
