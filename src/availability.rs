//! Build-availability predicate.
//!
//! Whether a package can be built for a given `(profile, scheme)` pair depends
//! on toolchains and platforms outside the resolver's knowledge. Callers
//! supply that answer through the [`Availability`] trait; the resolver only
//! uses it to filter each package's profile × scheme cross product.

/// Answers whether `package` is buildable with `profile` and `scheme`.
pub trait Availability: Send + Sync {
    fn is_available(&self, package: &str, profile: &str, scheme: &str) -> bool;
}

/// Treats every combination as buildable.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllAvailable;

impl Availability for AllAvailable {
    fn is_available(&self, _package: &str, _profile: &str, _scheme: &str) -> bool {
        true
    }
}

impl<F> Availability for F
where
    F: Fn(&str, &str, &str) -> bool + Send + Sync,
{
    fn is_available(&self, package: &str, profile: &str, scheme: &str) -> bool {
        self(package, profile, scheme)
    }
}
