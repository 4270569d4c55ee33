/// Derived statistics for the dashboard.
///
/// Everything here is a pure function of its inputs: callers pass store
/// snapshots in, numbers come out, nothing is cached.
///
/// Submodules:
/// - `aggregates`: population at risk, risk buckets, state summaries,
///   delivery statistics.
/// - `groupings`: organizes flat record lists by state and LGA.
/// - `sms`: SMS segment estimates per language encoding.

pub mod aggregates;
pub mod groupings;
pub mod sms;
