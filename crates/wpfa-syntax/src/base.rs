//! Index types shared by the tree, the symbol table and the type table.
//!
//! All cross references are plain indices into arenas owned by the host's
//! compilation. Nothing in the analyzer stores pointers into host data.

use serde::Serialize;

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub u32);

        impl $name {
            pub const NONE: $name = $name(u32::MAX);

            #[inline]
            pub const fn is_none(self) -> bool {
                self.0 == u32::MAX
            }

            #[inline]
            pub const fn is_some(self) -> bool {
                self.0 != u32::MAX
            }

            /// `None` for the sentinel, `Some(self)` otherwise.
            #[inline]
            pub const fn into_option(self) -> Option<$name> {
                if self.is_none() { None } else { Some(self) }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::NONE
            }
        }
    };
}

define_index!(
    /// Index of a node in the `NodeArena`.
    NodeIndex
);

define_index!(
    /// Stable identity of a declared entity in the symbol table.
    SymbolId
);

define_index!(
    /// Index of an interned type in the `TypeTable`.
    TypeId
);
