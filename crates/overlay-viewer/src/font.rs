use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// System font locations tried in order when no font is given.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/ubuntu-font-family/Ubuntu-R.ttf",
    "/usr/share/fonts/truetype/ubuntu/Ubuntu-R.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Picks the label font: the explicit path if given, else the first existing
/// candidate.
pub fn resolve_font(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match first_existing(FONT_CANDIDATES.iter().map(Path::new)) {
        Some(path) => {
            log::debug!("using system font {}", path.display());
            Ok(path)
        }
        None => bail!("no usable font found; pass one with --font"),
    }
}

fn first_existing<'a>(candidates: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let p = resolve_font(Some(Path::new("/tmp/custom.ttf"))).unwrap();
        assert_eq!(p, PathBuf::from("/tmp/custom.ttf"));
    }

    #[test]
    fn first_existing_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("b.ttf");
        std::fs::write(&present, b"x").unwrap();
        let missing = dir.path().join("a.ttf");

        let found = first_existing([missing.as_path(), present.as_path()]);
        assert_eq!(found, Some(present));
    }

    #[test]
    fn directories_are_not_fonts() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(first_existing([dir.path()]), None);
    }
}
