//! Core traits for the memoization layer.

/// A key identifying one memoizable request.
pub trait QueryKey {
  /// Stable, fixed-length hash. Equal requests must produce equal hashes.
  fn cache_hash(&self) -> String;

  /// Group the entry belongs to (e.g. the operation name), used for
  /// dropping every entry of one kind at once.
  fn group(&self) -> &'static str;

  /// Human-readable description for logs.
  fn description(&self) -> String;
}
