//! Multi-release manifest handling shared by directory and archive roots.

/// Location of the manifest relative to a root.
pub(crate) const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
/// Parent of the version-specific overlay trees.
pub(crate) const VERSIONS_DIR: &str = "META-INF/versions/";

/// Releases whose overlay directories are honoured.
pub const SUPPORTED_RELEASES: std::ops::RangeInclusive<u16> = 9..=25;

/// Whether the manifest main section declares `Multi-Release: true`.
pub(crate) fn is_multi_release(manifest: &str) -> bool {
    let mut logical_lines: Vec<String> = Vec::new();
    for line in manifest.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            // End of the main section.
            break;
        }
        match (line.strip_prefix(' '), logical_lines.last_mut()) {
            (Some(continuation), Some(previous)) => previous.push_str(continuation),
            _ => logical_lines.push(line.to_string()),
        }
    }

    logical_lines.iter().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("Multi-Release")
                && value.trim().eq_ignore_ascii_case("true")
        })
    })
}

/// Parses an overlay directory name, accepting only canonical supported
/// release numbers (`"11"`, not `"011"`).
pub(crate) fn parse_release(name: &str) -> Option<u16> {
    let release = name.parse::<u16>().ok()?;
    (SUPPORTED_RELEASES.contains(&release) && release.to_string() == name).then_some(release)
}

/// Orders release numbers highest first without duplicates.
pub(crate) fn overlay_order(releases: impl IntoIterator<Item = u16>) -> Vec<u16> {
    let mut releases: Vec<u16> = releases.into_iter().collect();
    releases.sort_unstable_by(|a, b| b.cmp(a));
    releases.dedup();
    releases
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Manifest-Version: 1.0\nMulti-Release: true\n", true ; "plain")]
    #[test_case("Manifest-Version: 1.0\r\nmulti-release:TRUE\r\n", true ; "case insensitive crlf")]
    #[test_case("Manifest-Version: 1.0\nMulti-Release: false\n", false ; "explicit false")]
    #[test_case("Manifest-Version: 1.0\n", false ; "absent")]
    #[test_case("Manifest-Version: 1.0\n\nName: foo\nMulti-Release: true\n", false ; "per entry section ignored")]
    #[test_case("Multi-Rel\n ease: true\n", true ; "continuation line")]
    fn detects_multi_release(manifest: &str, expected: bool) {
        assert_eq!(is_multi_release(manifest), expected);
    }

    #[test]
    fn release_names() {
        assert_eq!(parse_release("9"), Some(9));
        assert_eq!(parse_release("25"), Some(25));
        assert_eq!(parse_release("8"), None);
        assert_eq!(parse_release("011"), None);
        assert_eq!(parse_release("latest"), None);
    }

    #[test]
    fn overlays_are_highest_first() {
        assert_eq!(overlay_order([11, 9, 13, 11]), vec![13, 11, 9]);
    }
}
