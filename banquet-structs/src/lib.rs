pub mod api;
pub mod config;
pub mod core;

/// Declares a plain serde record. `Option` fields default to `None` when absent.
#[macro_export]
macro_rules! serializable_struct {
    ( @ $(#[$sattr:meta])* $name:ident { } -> ($($fields:tt)*) ) => (
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
        $(#[$sattr])*
        pub struct $name {
            $($fields)*
        }
    );
    ( @ $(#[$sattr:meta])* $name:ident { $(#[$attr:meta])* $param:ident : Option<$type:ty>, $($rest:tt)* } -> ($($fields:tt)*) ) => (
        serializable_struct!(@ $(#[$sattr])* $name { $($rest)* } -> (
            $($fields)*
            $(#[$attr])*
            #[serde(default)]
            pub $param : Option<$type>,
        ));
    );
    ( @ $(#[$sattr:meta])* $name:ident { $(#[$attr:meta])* $param:ident : $type:ty, $($rest:tt)* } -> ($($fields:tt)*) ) => (
        serializable_struct!(@ $(#[$sattr])* $name { $($rest)* } -> (
            $($fields)*
            $(#[$attr])*
            pub $param : $type,
        ));
    );
    ( $(#[$sattr:meta])* $name:ident { $( $rest:tt)* } ) => {
        serializable_struct!(@ $(#[$sattr])* $name { $($rest)* } -> ());
    };
}
