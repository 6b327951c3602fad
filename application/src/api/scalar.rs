//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute.
///
/// Uses [`FromStr`]/[`Display`] impls of `As` type to convert the target type
/// to/from GraphQL string scalar, so the domain validation of `As` runs while
/// parsing the input.
///
/// Target type must implement [`TryFrom`] and [`AsRef`] for `As` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Converts the target type into a scalar [`Value`] by using [`Display`]
    /// impl of `As` type.
    ///
    /// [`Display`]: fmt::Display
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Constructs the target type from a scalar [`InputValue`] by using
    /// [`FromStr`] impl of `As` type.
    ///
    /// # Errors
    ///
    /// If the input value is not a string, or cannot be parsed into `As`
    /// type, or cannot be converted into the target type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = T::name(&()).unwrap_or("String");

        let s = input.as_string_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{name}`: expected string input \
                 value, found: {input}",
            )
        })?;
        s.parse::<As>()
            .map_err(|e| {
                format!("Cannot parse input scalar `{name}` from \"{s}\": {e}")
            })?
            .try_into()
            .map_err(|e| format!("Cannot parse input scalar `{name}`: {e}"))
    }

    /// Parses the provided [`ScalarToken`] as a string.
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue};

    use crate::api::user::Email;

    use super::Via;

    type EmailVia = Via<service::domain::user::Email>;

    fn parse(
        input: &InputValue<DefaultScalarValue>,
    ) -> Result<Email, String> {
        EmailVia::from_input::<Email, DefaultScalarValue>(input)
    }

    #[test]
    fn parses_valid_string() {
        let email =
            parse(&InputValue::scalar("alice@example.com".to_owned()))
                .unwrap();
        assert_eq!(email.to_string(), "alice@example.com");
    }

    #[test]
    fn rejects_invalid_string() {
        let err = parse(&InputValue::scalar("not-an-email".to_owned()))
            .unwrap_err();
        assert!(err.contains("UserEmail"), "{err}");
    }

    #[test]
    fn rejects_non_string() {
        let err = parse(&InputValue::scalar(42)).unwrap_err();
        assert!(err.contains("expected string"), "{err}");
    }
}
