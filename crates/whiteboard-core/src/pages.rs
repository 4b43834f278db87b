//! State shared with the page provider (the PDF page extractor).

use serde::{Deserialize, Serialize};

/// The document being paged through and the page currently shown as the
/// canvas background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReaderInfo {
    /// Name of the selected file, empty when none.
    #[serde(default)]
    pub file: String,
    /// Page count, once the provider knows it.
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// 1-based number of the page shown.
    pub current_page_number: u32,
    /// Image source (URL or data URL) of the page shown, empty when none.
    #[serde(default)]
    pub current_page: String,
}

impl Default for FileReaderInfo {
    fn default() -> Self {
        Self {
            file: String::new(),
            total_pages: None,
            current_page_number: 1,
            current_page: String::new(),
        }
    }
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReaderUpdate {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page_number: Option<u32>,
    #[serde(default)]
    pub current_page: Option<String>,
}

impl FileReaderUpdate {
    /// Update for a newly picked file: show it from page one.
    pub fn new_file(name: impl Into<String>) -> Self {
        Self {
            file: Some(name.into()),
            current_page_number: Some(1),
            ..Self::default()
        }
    }

    /// Update carrying a freshly rendered page.
    pub fn page(number: u32, source: impl Into<String>) -> Self {
        Self {
            current_page_number: Some(number),
            current_page: Some(source.into()),
            ..Self::default()
        }
    }
}

impl FileReaderInfo {
    /// Merge `update` field by field. Returns `true` when `current_page`
    /// changed, i.e. a new background has to be loaded.
    pub fn merge(&mut self, update: FileReaderUpdate) -> bool {
        if let Some(file) = update.file {
            self.file = file;
        }
        if let Some(total) = update.total_pages {
            self.total_pages = Some(total);
        }
        if let Some(number) = update.current_page_number {
            self.current_page_number = number.max(1);
        }
        match update.current_page {
            Some(page) if page != self.current_page => {
                self.current_page = page;
                true
            }
            _ => false,
        }
    }

    pub fn has_page(&self) -> bool {
        !self.current_page.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let info = FileReaderInfo::default();
        assert_eq!(info.current_page_number, 1);
        assert_eq!(info.total_pages, None);
        assert!(!info.has_page());
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut info = FileReaderInfo::default();
        info.merge(FileReaderUpdate {
            total_pages: Some(12),
            ..FileReaderUpdate::default()
        });
        assert!(info.merge(FileReaderUpdate::page(3, "data:image/png;base64,AAAA")));
        assert_eq!(info.total_pages, Some(12));
        assert_eq!(info.current_page_number, 3);
    }

    #[test]
    fn test_same_page_is_not_a_change() {
        let mut info = FileReaderInfo::default();
        assert!(info.merge(FileReaderUpdate::page(1, "p1.png")));
        assert!(!info.merge(FileReaderUpdate::page(1, "p1.png")));
        assert!(!info.merge(FileReaderUpdate::new_file("other.pdf")));
    }

    #[test]
    fn test_new_file_resets_page_number() {
        let mut info = FileReaderInfo::default();
        info.merge(FileReaderUpdate::page(7, "p7.png"));
        info.merge(FileReaderUpdate::new_file("report.pdf"));
        assert_eq!(info.file, "report.pdf");
        assert_eq!(info.current_page_number, 1);
    }

    #[test]
    fn test_camel_case_update() {
        let update: FileReaderUpdate =
            serde_json::from_str(r#"{"currentPage":"p.png","totalPages":2}"#).unwrap();
        assert_eq!(update.current_page.as_deref(), Some("p.png"));
        assert_eq!(update.total_pages, Some(2));
        assert_eq!(update.file, None);
    }
}
