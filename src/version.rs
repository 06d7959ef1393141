use semver::Version;

/// Oldest `op` release whose command syntax this crate targets.
pub const MIN_SUPPORTED_VERSION: Version = Version::new(2, 0, 0);

/// Parses the output of `op --version`.
///
/// The CLI prints a bare version such as `2.30.0`. A leading `v` and any
/// trailing text after the first whitespace are tolerated. Returns `None`
/// when nothing version-like is found.
pub fn parse(output: &str) -> Option<Version> {
    let token = output.split_whitespace().next()?;
    let token = token.strip_prefix('v').unwrap_or(token);
    Version::parse(token).ok()
}

/// True when `found` is at least `min`, ignoring pre-release tags.
pub fn is_supported(found: &Version, min: &Version) -> bool {
    (found.major, found.minor, found.patch) >= (min.major, min.minor, min.patch)
}
