//! Helper macro for declaring driven-port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! parameters accept anything convertible into the field type, so adapters
//! can write `RepositoryError::query(err.to_string())`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum RoomStoreError {
            Offline => "room store offline",
            Lookup { message: String } => "lookup failed: {message}",
            Full { capacity: u32 } => "room is full at {capacity}",
            Clash { message: String, revision: u32 } => "clash on {message} at revision {revision}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(RoomStoreError::offline(), RoomStoreError::Offline);
        assert_eq!(RoomStoreError::offline().to_string(), "room store offline");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = RoomStoreError::lookup("B-204");
        assert_eq!(err.to_string(), "lookup failed: B-204");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = RoomStoreError::full(4_u32);
        assert_eq!(err, RoomStoreError::Full { capacity: 4 });
    }

    #[test]
    fn mixed_fields_render_in_order() {
        let err = RoomStoreError::clash("menu slot", 3_u32);
        assert_eq!(err.to_string(), "clash on menu slot at revision 3");
    }
}
