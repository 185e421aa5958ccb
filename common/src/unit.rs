//! Marker types describing what a timestamp refers to.

/// Marker of an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker of an entity modification.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker of an item being sold.
#[derive(Clone, Copy, Debug)]
pub struct Sale;

/// Marker of a subscription renewal.
#[derive(Clone, Copy, Debug)]
pub struct Renewal;
