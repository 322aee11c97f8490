#![allow(unused, reason = "logger")]

// Without the `log` feature the arguments are still type checked, so bindings that only appear
// in log statements are not reported as unused.

macro_rules! info {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::info!($($tt)*);
        #[cfg(not(feature = "log"))]
        if false {
            let _ = ::std::format!($($tt)*);
        }
    };
}

macro_rules! debug {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::debug!($($tt)*);
        #[cfg(not(feature = "log"))]
        if false {
            let _ = ::std::format!($($tt)*);
        }
    };
}

macro_rules! warning {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::warn!($($tt)*);
        #[cfg(not(feature = "log"))]
        if false {
            let _ = ::std::format!($($tt)*);
        }
    };
}

macro_rules! error {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::error!($($tt)*);
        #[cfg(not(feature = "log"))]
        if false {
            let _ = ::std::format!($($tt)*);
        }
    };
}

pub(crate) use {info, debug, warning, error};
