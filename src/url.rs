//! Site URL classification and normalization
//!
//! Pure string transforms, no I/O. A user-supplied site reference is either
//! already absolute or a short relative form (`/sites/<name>`,
//! `sites/<name>`, `teams/<name>`) that gets resolved against the configured
//! root URL. The classification is an explicit tagged branch so the
//! narrowing for multi-segment paths is visible and testable.

/// Classification of a user-supplied site reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteReference {
    /// Fully qualified already, or any shape the relative pattern does not
    /// cover; used unchanged
    Absolute(String),
    /// `sites/<name>` or `teams/<name>`, with or without a leading slash;
    /// resolved against the root URL
    RelativePath(String),
}

impl SiteReference {
    /// Classify a site reference.
    ///
    /// Only single-segment `sites/` and `teams/` paths count as relative.
    /// Multi-segment paths (`/sites/foo/bar`) deliberately fall through to
    /// `Absolute` and pass the input along unchanged.
    pub fn classify(input: &str) -> Self {
        if is_relative_site_path(input) {
            SiteReference::RelativePath(input.to_string())
        } else {
            SiteReference::Absolute(input.to_string())
        }
    }
}

fn is_relative_site_path(input: &str) -> bool {
    let trimmed = input.strip_prefix('/').unwrap_or(input);
    let Some((prefix, rest)) = trimmed.split_once('/') else {
        return false;
    };
    if prefix != "sites" && prefix != "teams" {
        return false;
    }
    !rest.is_empty() && !rest.contains('/')
}

/// Resolve a site reference against the configured root URL.
///
/// Relative references are prepended with the root, inserting a separating
/// slash only when the input lacked a leading one. Absolute references are
/// returned unchanged, which makes this idempotent on its own output.
pub fn normalize(root: &str, input: &str) -> String {
    match SiteReference::classify(input) {
        SiteReference::Absolute(url) => url,
        SiteReference::RelativePath(path) => {
            if path.starts_with('/') {
                format!("{}{}", root, path)
            } else {
                format!("{}/{}", root, path)
            }
        }
    }
}

/// Validate a site URL argument before any processing.
///
/// Accepted shapes: an optional `https://<tenant>.sharepoint.com/` prefix or
/// an optional leading slash, followed by `sites/` or `teams/` and a
/// non-empty remainder.
pub fn is_valid_target(input: &str) -> bool {
    let rest = if let Some(after_scheme) = input.strip_prefix("https://") {
        let Some((host, path)) = after_scheme.split_once('/') else {
            return false;
        };
        match host.strip_suffix(".sharepoint.com") {
            Some(tenant) if !tenant.is_empty() => path,
            _ => return false,
        }
    } else {
        input.strip_prefix('/').unwrap_or(input)
    };

    let Some((kind, remainder)) = rest.split_once('/') else {
        return false;
    };
    (kind == "sites" || kind == "teams") && !remainder.is_empty()
}
