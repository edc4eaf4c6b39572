//! Type-state markers for request context progression.
//!
//! These zero-sized markers encode whether a request's credential has been
//! validated. Only an authenticated context can produce an Allow decision.

/// Marker type for a request whose credential has not been validated.
///
/// `RequestCtx<Unauthed>` has a correlation id and a resource, no subject.
#[derive(Debug, Clone, Copy)]
pub struct Unauthed {
    _private: (),
}

/// Marker type for a request with a validated claim set.
///
/// `RequestCtx<Authed>` carries the subject and may be turned into an Allow.
#[derive(Debug, Clone, Copy)]
pub struct Authed {
    _private: (),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_markers_are_zero_sized() {
        assert_eq!(std::mem::size_of::<Unauthed>(), 0);
        assert_eq!(std::mem::size_of::<Authed>(), 0);
    }
}
