//! Macros for defining kind enums.

/// Defines a kind enum stored and displayed as a `snake_case` string.
///
/// # Example
///
/// ```rust,ignore
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shipping state."]
///     enum State {
///         #[doc = "Waiting in the warehouse."]
///         Waiting,
///
///         #[doc = "Handed over to the recipient."]
///         Delivered,
///     }
/// }
///
/// assert_eq!(State::Waiting.as_str(), "waiting");
/// assert_eq!("delivered".parse::<State>().ok(), Some(State::Delivered));
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            $crate::private::strum::IntoStaticStr,
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
            serde(rename_all = "snake_case"),
        )]
        #[doc = $doc]
        #[strum(serialize_all = "snake_case")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant,
            )*
        }

        impl $name {
            /// Returns the stored representation of this kind.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                self.into()
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(TEXT, VARCHAR);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let s = <&str as $crate::private::postgres_types::FromSql<'a>>::from_sql(
                    ty, raw,
                )?;
                s.parse().map_err(|_| {
                    ::std::format!(
                        "invalid `{}` value: {s}",
                        ::core::stringify!($name),
                    )
                    .into()
                })
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(TEXT, VARCHAR);
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
                <&str as $crate::private::postgres_types::ToSql>::to_sql(
                    &self.as_str(),
                    ty,
                    w,
                )
            }
        }
    };
}
