use crate::version::semver::Version;

/// Select the greatest version.
///
/// Among versions of equal precedence the first one wins. Returns `None`
/// for an empty slice; callers skip images without candidate versions.
pub fn newest(versions: &[Version]) -> Option<&Version> {
    versions
        .iter()
        .reduce(|newest, candidate| if candidate > newest { candidate } else { newest })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn versions(tags: &[&str]) -> Vec<Version> {
        tags.iter().map(|t| Version::parse(t).unwrap()).collect()
    }

    #[rstest]
    #[case(&["1.0.0", "1.2.0", "1.1.0"])]
    #[case(&["1.2.0", "1.1.0", "1.0.0"])]
    #[case(&["1.1.0", "1.0.0", "1.2.0"])]
    #[case(&["1.2.0-rc1", "1.2.0", "1.0.0"])]
    fn newest_is_permutation_invariant(#[case] tags: &[&str]) {
        let versions = versions(tags);

        assert_eq!(newest(&versions).unwrap().to_string(), "1.2.0");
    }

    #[test]
    fn newest_prefers_release_over_pre_release() {
        let versions = versions(&["2.0.0-rc1", "1.9.0", "2.0.0-beta"]);

        assert_eq!(newest(&versions).unwrap().to_string(), "2.0.0-rc1");
    }

    #[test]
    fn newest_returns_first_of_equal_versions() {
        let versions = versions(&["v1.2.0", "1.2.0", "1.2"]);

        assert_eq!(newest(&versions).unwrap().original(), "v1.2.0");
    }

    #[test]
    fn newest_returns_none_for_empty_input() {
        assert!(newest(&[]).is_none());
    }
}
