/// HTTP [Status Code][rfc].
///
/// Any `u16` is representable. Only codes listed in the reason table carry a reason phrase,
/// other codes are written with an empty reason.
///
/// [rfc]: <https://datatracker.ietf.org/doc/html/rfc9110#name-status-codes>
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl Default for StatusCode {
    #[inline]
    fn default() -> Self {
        Self::OK
    }
}

impl StatusCode {
    /// Create status code from its numeric value.
    #[inline]
    pub const fn from_u16(status: u16) -> Self {
        Self(status)
    }

    /// Returns status code value, e.g: `200`.
    #[inline]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

macro_rules! status_code {
    (
        $(
            $(#[$doc:meta])*
            $int:literal $id:ident $msg:literal;
        )*
    ) => {
        impl StatusCode {
            /// Returns the reason phrase, e.g: `"OK"`.
            ///
            /// Returns an empty string for codes without a known reason.
            #[inline]
            pub const fn reason(&self) -> &'static str {
                match self.0 {
                    $(
                        $int => $msg,
                    )*
                    _ => "",
                }
            }
        }

        impl StatusCode {
            $(
                $(#[$doc])*
                pub const $id: Self = Self($int);
            )*
        }
    };
}

status_code! {
    /// `200`. The request succeeded.
    200 OK "OK";
    /// `400`. The server cannot or will not process the request due to something that is
    /// perceived to be a client error.
    400 BAD_REQUEST "BAD REQUEST";
    /// `500`. The server has encountered a situation it does not know how to handle.
    500 INTERNAL_SERVER_ERROR "INTERNAL SERVER ERROR";
}

impl From<u16> for StatusCode {
    #[inline]
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

impl std::fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_tuple("StatusCode").field(&self.0).finish()
    }
}
