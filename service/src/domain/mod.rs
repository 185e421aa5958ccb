//! Domain definitions.

pub mod client;
pub mod product;
pub mod purchase;
pub mod renewal;

pub use self::{
    client::Client, product::Product, purchase::Purchase, renewal::Renewal,
};

/// Defines a trimmed, non-empty and length-limited text newtype.
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        $name:ident(max = $max:literal)
    ) => {
        #[doc = $doc]
        #[derive(
            derive_more::AsRef,
            Clone,
            Debug,
            derive_more::Display,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
            serde::Serialize,
        )]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(postgres_types::FromSql, postgres_types::ToSql),
            postgres(transparent)
        )]
        pub struct $name(String);

        impl $name {
            /// Maximum length of this text in bytes.
            pub const MAX_LEN: usize = $max;

            #[doc = concat!("Creates a new [`", stringify!($name), "`].")]
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `text` is trimmed,
            /// non-empty and fits the maximum length.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(text: impl Into<String>) -> Self {
                Self(text.into())
            }

            #[doc = concat!(
                "Creates a new [`", stringify!($name), "`] out of the \
                 given `text`, trimming it first."
            )]
            ///
            /// [`None`] is returned if nothing is left after trimming or the
            /// text is too long.
            #[must_use]
            pub fn new(text: impl Into<String>) -> Option<Self> {
                let text = text.into();
                let trimmed = text.trim();
                (!trimmed.is_empty() && trimmed.len() <= Self::MAX_LEN)
                    .then(|| Self(trimmed.to_owned()))
            }
        }

        impl std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }

        impl TryFrom<String> for $name {
            type Error = &'static str;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(d: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(d)?;
                Self::try_from(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use define_text;

/// Defines a UUID-based identifier newtype.
macro_rules! define_id {
    (#[doc = $doc:literal] $name:ident) => {
        #[doc = $doc]
        #[derive(
            Clone,
            Copy,
            Debug,
            Default,
            serde::Deserialize,
            derive_more::Display,
            Eq,
            derive_more::From,
            derive_more::FromStr,
            Hash,
            derive_more::Into,
            Ord,
            PartialEq,
            PartialOrd,
            serde::Serialize,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(postgres_types::FromSql, postgres_types::ToSql),
            postgres(transparent)
        )]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }
    };
}

pub(crate) use define_id;
