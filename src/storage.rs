use crate::config::StorageConfig;
use crate::error::Result;
use crate::models::CatalogRecord;
use std::path::{Path, PathBuf};
use url::Url;

/// Extensions trusted when inferring a file name from an asset URL.
const KNOWN_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "txt", "pdf", "epub", "fb2", "mobi", "djvu",
    "rtf", "zip",
];

pub struct StorageManager {
    config: StorageConfig,
}

impl StorageManager {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub async fn ensure_library_root(&self) -> Result<PathBuf> {
        let root = PathBuf::from(&self.config.library_path);
        tokio::fs::create_dir_all(&root).await?;
        Ok(root)
    }

    /// Directory for one book, created on demand. Existing files in it are
    /// never touched.
    pub async fn book_dir(&self, record: &CatalogRecord) -> Result<PathBuf> {
        let path = Path::new(&self.config.library_path).join(self.book_dir_name(record));
        tokio::fs::create_dir_all(&path).await?;
        Ok(path)
    }

    /// `"{id}. {title} - {author}"`, falling back to the raw ID when
    /// sanitization leaves nothing usable.
    pub fn book_dir_name(&self, record: &CatalogRecord) -> String {
        let title = sanitize_filename(&record.title);
        let author = sanitize_filename(&record.author);

        if title.is_empty() {
            record.id.to_string()
        } else if author.is_empty() {
            format!("{}. {}", record.id, title)
        } else {
            format!("{}. {} - {}", record.id, title, author)
        }
    }

    /// Cover file named after the last URL path segment, like the catalog
    /// serves it; unusable segments fall back to `cover.<default ext>`.
    pub fn cover_path(&self, book_dir: &Path, url: &Url) -> PathBuf {
        let segment = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();
        let name = sanitize_filename(segment);

        if name.is_empty() || known_extension(&name).is_none() {
            book_dir.join(format!("cover.{}", self.config.default_cover_ext))
        } else {
            book_dir.join(name)
        }
    }

    pub fn book_file_path(&self, book_dir: &Path, record: &CatalogRecord, url: &Url) -> PathBuf {
        let ext = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(known_extension)
            .unwrap_or_else(|| self.config.default_book_ext.clone());

        let title = sanitize_filename(&record.title);
        let stem = if title.is_empty() {
            record.id.to_string()
        } else {
            format!("{}. {}", record.id, title)
        };

        book_dir.join(format!("{}.{}", stem, ext))
    }
}

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches('.')
        .trim_matches(' ')
        .to_string()
}

fn known_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if KNOWN_EXTENSIONS.contains(&ext.as_str()) {
        Some(ext)
    } else {
        None
    }
}
