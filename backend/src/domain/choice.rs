//! Closed string enumerations shared by payloads, storage and reports.
//!
//! Every enumerated field (event type, complaint status, meal, and so on) is
//! stored and transmitted as a fixed lowercase token. [`choice_enum!`]
//! generates the enum together with its token table so parsing, display and
//! serde stay in lockstep.

/// Error raised when a token is not one of the allowed values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("must be one of: {}", .allowed.join(", "))]
pub struct ParseChoiceError {
    /// Accepted tokens, in declaration order.
    pub allowed: &'static [&'static str],
    /// The rejected input.
    pub value: String,
}

/// Common surface of generated choice enums.
pub trait Choice: Sized + Copy + 'static {
    /// Accepted tokens in declaration order.
    const TOKENS: &'static [&'static str];

    /// Stable token for this value.
    fn as_str(self) -> &'static str;

    /// Parse a token, reporting the allowed set on failure.
    fn parse_token(raw: &str) -> Result<Self, ParseChoiceError>;
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $token:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $crate::domain::Choice for $name {
            const TOKENS: &'static [&'static str] = &[$($token),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }

            fn parse_token(raw: &str) -> Result<Self, $crate::domain::ParseChoiceError> {
                match raw {
                    $($token => Ok(Self::$variant),)+
                    other => Err($crate::domain::ParseChoiceError {
                        allowed: <Self as $crate::domain::Choice>::TOKENS,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl $name {
            /// Stable token used in payloads and storage.
            pub fn as_str(self) -> &'static str {
                <Self as $crate::domain::Choice>::as_str(self)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::ParseChoiceError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                <Self as $crate::domain::Choice>::parse_token(raw)
            }
        }
    };
}

pub(crate) use choice_enum;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    choice_enum! {
        /// Sample enumeration.
        pub enum Colour {
            Red => "red",
            DarkBlue => "dark-blue",
        }
    }

    #[rstest]
    #[case("red", Colour::Red)]
    #[case("dark-blue", Colour::DarkBlue)]
    fn tokens_parse(#[case] raw: &str, #[case] expected: Colour) {
        assert_eq!(raw.parse::<Colour>(), Ok(expected));
        assert_eq!(expected.to_string(), raw);
    }

    #[rstest]
    fn unknown_tokens_list_the_allowed_set() {
        let err = "green".parse::<Colour>().expect_err("unknown token");
        assert_eq!(err.to_string(), "must be one of: red, dark-blue");
        assert_eq!(err.value, "green");
    }

    #[rstest]
    fn serde_uses_the_token() {
        let json = serde_json::to_value(Colour::DarkBlue).expect("serialise");
        assert_eq!(json, serde_json::json!("dark-blue"));
        let back: Colour = serde_json::from_value(json).expect("deserialise");
        assert_eq!(back, Colour::DarkBlue);
    }
}
