/// Type-state markers for the session builder
///
/// A session cannot be built before its endpoint is known; the marker
/// records at compile time whether `host` has been called.

/// Marker trait for host state
pub trait HostState {}

/// Host has not been set
pub struct NoHost;
impl HostState for NoHost {}

/// Host has been set
pub struct HasHost;
impl HostState for HasHost {}
