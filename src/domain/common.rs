use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Supplies a common contract for retrieving the amount used in matching.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Resolves an ordered override chain: the first `Some` wins.
///
/// Rate and price overrides are expressed as a list ordered from the most
/// specific source (section) to the least specific (global default), so the
/// precedence stays visible at the call site.
pub fn first_present<T: Copy>(chain: &[Option<T>]) -> Option<T> {
    chain.iter().find_map(|value| *value)
}

/// Absolute distance in whole days between two dates.
pub fn days_between(a: chrono::NaiveDate, b: chrono::NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use serde;
pub use uuid;
