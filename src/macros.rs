#![allow(unused_macros)]

macro_rules! impmod {
    ($($osmod:ident)::+, $($orig:ident $(as $into:ident)?),* $(,)?) => {
        #[cfg(unix)]
        use $crate::os::unix::$($osmod)::+::{$($orig $(as $into)?,)*};
        #[cfg(windows)]
        use $crate::os::windows::$($osmod)::+::{$($orig $(as $into)?,)*};
    };
}

/// Like the `io::Result` version in the standard library, except the error is the raw code from
/// the thread's error slot, to be classified by the caller.
macro_rules! ok_or_errno {
    ($success:expr => $($scb:tt)+) => {
        if $success {
            Ok($($scb)+)
        } else {
            Err($crate::error::last_error_code())
        }
    };
}

macro_rules! builder_setters {
    ($(#[doc = $($doc:tt)+])* $name:ident : $ty:ty) => {
        $(#[doc = $($doc)+])*
        #[must_use = builder_must_use!()]
        #[inline(always)]
        pub fn $name(mut self, $name: $ty) -> Self {
            self.$name = $name.into();
            self
        }
    };
    ($($(#[doc = $($doc:tt)+])* $name:ident : $ty:ty),+ $(,)?) => {
        $(builder_setters!($(#[doc = $($doc)+])* $name: $ty);)+
    };
}
macro_rules! builder_must_use {
    () => {
        "builder setters take the entire structure and return the result"
    };
}

/// Declares a small bitset of portable flags. Translation to the native values happens in the
/// platform modules.
macro_rules! flag_set {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $($(#[doc = $($doc:tt)+])* const $flag:ident = $bit:expr;)+
        }
    ) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
        $vis struct $name(u8);
        impl $name {
            $($(#[doc = $($doc)+])* pub const $flag: Self = Self(1 << $bit);)+
            /// The empty set.
            pub const NONE: Self = Self(0);

            /// Returns `true` if every flag in `other` is also set in `self`.
            #[inline]
            pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }
            /// Returns `true` if no flags are set.
            #[inline]
            pub const fn is_empty(self) -> bool { self.0 == 0 }
            /// Returns the set with the flags of `other` added.
            #[inline]
            #[must_use]
            pub const fn with(self, other: Self) -> Self { Self(self.0 | other.0) }
        }
        impl ::std::ops::BitOr for $name {
            type Output = Self;
            #[inline]
            fn bitor(self, rhs: Self) -> Self { self.with(rhs) }
        }
        impl ::std::ops::BitOrAssign for $name {
            #[inline]
            fn bitor_assign(&mut self, rhs: Self) { *self = self.with(rhs) }
        }
        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let mut set = f.debug_set();
                $(if self.contains(Self::$flag) {
                    set.entry(&format_args!(stringify!($flag)));
                })+
                set.finish()
            }
        }
    };
}
