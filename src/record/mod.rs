/// Capability a record needs before it can participate in any routing
/// decision: a stable, string-like primary key.
///
/// Keys are expected to be non-empty base-36 strings (ASCII digits and
/// letters, case-insensitive); the router parses them as such. `None`
/// means no key has been assigned yet, which every routing decision
/// rejects with [`RouteError::MissingKey`](crate::util::RouteError).
pub trait Keyed {
    fn key(&self) -> Option<&str>;
}
