//! Registry trait for self-registering implementations.

/// Base trait for implementation registries.
///
/// Each pluggable implementation exposes a `Registry` struct declaring the
/// name it is referenced by in configuration (for example `local` for
/// `[signer.implementations.local]`) and the factory that builds it.
pub trait ImplementationRegistry {
	/// Configuration key of this implementation.
	const NAME: &'static str;

	/// Factory function type of the implementation family.
	type Factory;

	fn factory() -> Self::Factory;
}
