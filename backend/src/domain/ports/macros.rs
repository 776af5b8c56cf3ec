//! Declarative macro for defining port error enums with ergonomic
//! snake_case constructors, mirroring the shape every outbound adapter error
//! in this crate follows.

/// Define a `thiserror`-derived port error enum plus a `snake_case`
/// constructor function per variant.
///
/// ```ignore
/// define_port_error!(
///     pub enum JobRepositoryError {
///         #[error("connection failed: {message}")]
///         Connection { message: String },
///         #[error("query failed: {message}")]
///         Query { message: String },
///     }
/// );
/// // generates JobRepositoryError::connection("...") and ::query("...")
/// ```
macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        $vis:vis enum $name:ident {
            $(
                #[error($message:expr)]
                $variant:ident { $( $field:ident : $field_ty:ty ),* $(,)? }
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        $vis enum $name {
            $(
                #[error($message)]
                $variant { $( $field: $field_ty ),* },
            )+
        }

        impl $name {
            $(
                paste::paste! {
                    #[doc = concat!("Construct [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($( $field: impl Into<$field_ty> ),*) -> Self {
                        Self::$variant { $( $field: $field.into() ),* }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;
