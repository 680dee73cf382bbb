use bytes::Bytes;
use unicode_normalization::UnicodeNormalization;

/// A file received in the `file` field of a predict form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Reduce a client-supplied filename to something safe to join onto the
/// upload directory.
///
/// The name is NFKD-decomposed and whatever is still non-ASCII is dropped,
/// so accents fall away from their base letters. Path separators become
/// spaces, runs of whitespace collapse to a single `_`, anything outside
/// `[A-Za-z0-9_.-]` is removed and leading/trailing `.`/`_` are stripped. The
/// result may be empty.
pub fn sanitize_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    ascii
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(sanitize_filename("My cool   cell.png"), "My_cool_cell.png");
    }

    #[test]
    fn traversal_components_are_flattened() {
        assert_eq!(sanitize_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..\\..\\windows\\win.ini"), "windows_win.ini");
        assert_eq!(sanitize_filename("/abs/path/cell.jpg"), "abs_path_cell.jpg");
    }

    #[test]
    fn unsafe_and_non_ascii_characters_are_removed() {
        assert_eq!(sanitize_filename("c<ll>|*?.png"), "cll.png");
        assert_eq!(sanitize_filename("细胞.png"), "png");
        assert_eq!(sanitize_filename("sample-01_a.JPG"), "sample-01_a.JPG");
    }

    #[test]
    fn accents_decompose_to_their_base_letters() {
        assert_eq!(sanitize_filename("café.png"), "cafe.png");
        assert_eq!(sanitize_filename("Ångström ﬁle.jpg"), "Angstrom_file.jpg");
    }

    #[test]
    fn hidden_and_degenerate_names() {
        assert_eq!(sanitize_filename(".bashrc"), "bashrc");
        assert_eq!(sanitize_filename("../.."), "");
        assert_eq!(sanitize_filename("   "), "");
    }
}
