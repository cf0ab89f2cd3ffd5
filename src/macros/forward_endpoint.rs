//! Forwarding macros that expose the [`Endpoint`](crate::Endpoint) of a socket role as inherent
//! methods and descriptor traits of the role itself.

macro_rules! forward_endpoint_methods {
    ($ty:ident, $($field:ident).+) => {
        /// Readiness tracking, forwarded to the underlying [`Endpoint`](crate::Endpoint).
        impl $ty {
            /// Applies the readiness observed by one [`Poller`](crate::Poller) pass. See
            /// [`Endpoint::update`](crate::Endpoint::update).
            #[inline]
            pub fn update(&mut self, events: $crate::Events) -> ::std::io::Result<bool> {
                self.$($field).+.update(events)
            }
            /// See [`Endpoint::take_readable`](crate::Endpoint::take_readable).
            #[inline]
            pub fn take_readable(&mut self) -> bool { self.$($field).+.take_readable() }
            /// See [`Endpoint::take_writable`](crate::Endpoint::take_writable).
            #[inline]
            pub fn take_writable(&mut self) -> bool { self.$($field).+.take_writable() }
            /// See [`Endpoint::take_error`](crate::Endpoint::take_error).
            #[inline]
            pub fn take_error(&self) -> ::std::io::Result<Option<::std::io::Error>> {
                self.$($field).+.take_error()
            }
            /// See [`Endpoint::set_blocking`](crate::Endpoint::set_blocking).
            #[inline]
            pub fn set_blocking(&mut self) -> ::std::io::Result<()> {
                self.$($field).+.set_blocking()
            }
            /// See [`Endpoint::is_nonblocking`](crate::Endpoint::is_nonblocking).
            #[inline]
            pub fn is_nonblocking(&self) -> bool { self.$($field).+.is_nonblocking() }
        }
    };
}

macro_rules! forward_endpoint_fd {
    ($ty:ident, $($field:ident).+) => {
        impl ::std::os::fd::AsFd for $ty {
            #[inline]
            fn as_fd(&self) -> ::std::os::fd::BorrowedFd<'_> {
                ::std::os::fd::AsFd::as_fd(&self.$($field).+)
            }
        }
        impl ::std::os::fd::AsRawFd for $ty {
            #[inline]
            fn as_raw_fd(&self) -> ::std::os::fd::RawFd {
                ::std::os::fd::AsRawFd::as_raw_fd(&self.$($field).+)
            }
        }
    };
}
