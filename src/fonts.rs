use crate::errors::RenderError;
use std::path::{Path, PathBuf};

/// The four caption font assets, one per style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSet {
    pub regular: PathBuf,
    pub bold: PathBuf,
    pub italic: PathBuf,
    pub bold_italic: PathBuf,
}

impl FontSet {
    /// Number of styles, one asset each.
    pub const STYLES: usize = 4;

    /// The Poppins family under `dir`, using the file names the service ships with.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            regular: dir.join("poppins-regular.ttf"),
            bold: dir.join("poppins-bold.ttf"),
            italic: dir.join("poppins-italic.ttf"),
            bold_italic: dir.join("poppins-bold-italic.ttf"),
        }
    }

    /// Picks bold-italic first, then bold, then italic, then regular.
    pub fn select(&self, is_bold: bool, is_italic: bool) -> &Path {
        match (is_bold, is_italic) {
            (true, true) => self.bold_italic.as_path(),
            (true, false) => self.bold.as_path(),
            (false, true) => self.italic.as_path(),
            (false, false) => self.regular.as_path(),
        }
    }

    fn all(&self) -> [&Path; Self::STYLES] {
        [
            self.regular.as_path(),
            self.bold.as_path(),
            self.italic.as_path(),
            self.bold_italic.as_path(),
        ]
    }
}

/// A font face read from disk at a given pixel size.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    data: Vec<u8>,
    size: f32,
}

impl LoadedFont {
    /// Validates `data` as a TrueType/OpenType face.
    pub fn from_bytes(data: Vec<u8>, size: f32) -> Result<Self, RenderError> {
        if !(size.is_finite() && size > 0.0) {
            return Err(RenderError::Configuration(format!(
                "font size must be positive, got {size}"
            )));
        }
        ttf_parser::Face::parse(&data, 0)
            .map_err(|e| RenderError::Configuration(format!("unreadable font face: {e}")))?;
        Ok(Self { data, size })
    }

    /// Pixels per em.
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn face(&self) -> Result<ttf_parser::Face<'_>, RenderError> {
        ttf_parser::Face::parse(&self.data, 0)
            .map_err(|e| RenderError::Configuration(format!("unreadable font face: {e}")))
    }
}

#[derive(Debug, Clone)]
pub struct FontResolver {
    fonts: FontSet,
}

impl FontResolver {
    pub fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }

    /// Returns the asset path for the style, failing if it is not on disk.
    pub fn resolve(&self, is_bold: bool, is_italic: bool) -> Result<PathBuf, RenderError> {
        let path = self.fonts.select(is_bold, is_italic);
        if !path.is_file() {
            return Err(RenderError::Configuration(format!(
                "font asset missing: {} (install the caption fonts into FONTS_DIR)",
                path.display()
            )));
        }
        Ok(path.to_path_buf())
    }

    /// Resolves and reads the face for the style at `size` pixels. Blocking.
    pub fn load(&self, is_bold: bool, is_italic: bool, size: i64) -> Result<LoadedFont, RenderError> {
        if size <= 0 {
            return Err(RenderError::Configuration(format!(
                "font size must be positive, got {size}"
            )));
        }
        let path = self.resolve(is_bold, is_italic)?;
        let data = std::fs::read(&path).map_err(|e| {
            RenderError::Configuration(format!("cannot read font asset {}: {e}", path.display()))
        })?;
        tracing::debug!(font = %path.display(), size, "Loaded caption font");
        LoadedFont::from_bytes(data, size as f32)
    }

    /// Assets that are not present on disk.
    pub fn missing_assets(&self) -> Vec<&Path> {
        self.fonts
            .all()
            .into_iter()
            .filter(|path| !path.is_file())
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fixture_fonts() -> FontSet {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts");
        FontSet {
            regular: dir.join("DejaVuSans.ttf"),
            bold: dir.join("DejaVuSans-Bold.ttf"),
            italic: dir.join("DejaVuSans-Oblique.ttf"),
            bold_italic: dir.join("DejaVuSans-BoldOblique.ttf"),
        }
    }

    #[test]
    fn style_precedence() {
        let set = FontSet::in_dir("fonts");
        assert_eq!(set.select(true, true), Path::new("fonts/poppins-bold-italic.ttf"));
        assert_eq!(set.select(true, false), Path::new("fonts/poppins-bold.ttf"));
        assert_eq!(set.select(false, true), Path::new("fonts/poppins-italic.ttf"));
        assert_eq!(set.select(false, false), Path::new("fonts/poppins-regular.ttf"));
    }

    #[test]
    fn missing_asset_is_a_configuration_error() {
        let resolver = FontResolver::new(FontSet::in_dir("/nonexistent/fonts"));
        let err = resolver.resolve(false, false).unwrap_err();
        assert!(matches!(err, RenderError::Configuration(_)));
        assert_eq!(resolver.missing_assets().len(), FontSet::STYLES);
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let resolver = FontResolver::new(fixture_fonts());
        for size in [0, -12] {
            let err = resolver.load(false, false, size).unwrap_err();
            assert!(matches!(err, RenderError::Configuration(_)), "size {size}");
        }
    }

    #[test]
    fn loads_each_fixture_style() {
        let resolver = FontResolver::new(fixture_fonts());
        assert!(resolver.missing_assets().is_empty());
        for (bold, italic) in [(false, false), (true, false), (false, true), (true, true)] {
            let font = resolver.load(bold, italic, 20).unwrap();
            assert_eq!(font.size(), 20.0);
            assert!(font.face().unwrap().units_per_em() > 0);
        }
    }

    #[test]
    fn garbage_bytes_are_not_a_font() {
        let err = LoadedFont::from_bytes(b"definitely not a font".to_vec(), 12.0).unwrap_err();
        assert!(matches!(err, RenderError::Configuration(_)));
    }
}
