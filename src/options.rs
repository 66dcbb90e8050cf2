/// Tunables for [`parse_mobi_with`](crate::parse_mobi_with).
///
/// The defaults reproduce the reference behavior; they exist so callers can
/// calibrate segmentation against their own corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Headings closer than this many characters to the previous kept heading
    /// are treated as duplicates.
    pub duplicate_window: usize,
    /// Heading titles must be shorter than this many characters.
    pub max_title_chars: usize,
    /// Title of the single chapter produced when no headings are found and the
    /// container has no name.
    pub fallback_title: String,
    /// Remove trailing entries declared by the MOBI extra-data flags before
    /// decompressing each text record.
    pub strip_trailing_entries: bool,
}

pub const DEFAULT_DUPLICATE_WINDOW: usize = 100;
pub const DEFAULT_MAX_TITLE_CHARS: usize = 200;
pub const DEFAULT_FALLBACK_TITLE: &str = "Content";

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            duplicate_window: DEFAULT_DUPLICATE_WINDOW,
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
            strip_trailing_entries: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_window(mut self, chars: usize) -> Self {
        self.duplicate_window = chars;
        self
    }

    pub fn with_max_title_chars(mut self, chars: usize) -> Self {
        self.max_title_chars = chars;
        self
    }

    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = title.into();
        self
    }

    pub fn with_strip_trailing_entries(mut self, strip: bool) -> Self {
        self.strip_trailing_entries = strip;
        self
    }
}
